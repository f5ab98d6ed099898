//! Streaming presenter.
//!
//! Turns an already complete result into a timed sequence of growing
//! prefixes so the display layer can show it "typing out", independent of
//! when the network actually returned it.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use twins_core::config::{OrchestratorConfig, RevealGranularity};

/// How a reveal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The final frame (`is_done = true`) was emitted.
    Completed,
    /// The token fired; no further updates were emitted.
    Cancelled,
}

/// Lazy sequence of prefixes of a text, one unit longer each step.
///
/// The last frame is always the full text, so trailing whitespace is
/// revealed together with the final word. Text without any unit (empty or
/// whitespace only) yields exactly one frame: the text itself.
#[derive(Debug, Clone)]
pub struct RevealFrames<'a> {
    text: &'a str,
    granularity: RevealGranularity,
    pos: usize,
    finished: bool,
}

impl<'a> RevealFrames<'a> {
    pub fn new(text: &'a str, granularity: RevealGranularity) -> Self {
        Self {
            text,
            granularity,
            pos: 0,
            finished: false,
        }
    }

    fn unit_end(&self, from: usize) -> Option<usize> {
        let rest = &self.text[from..];
        match self.granularity {
            RevealGranularity::Char => rest.chars().next().map(|c| from + c.len_utf8()),
            RevealGranularity::Word => {
                let start = rest.find(|c: char| !c.is_whitespace())?;
                let word = &rest[start..];
                let len = word.find(char::is_whitespace).unwrap_or(word.len());
                Some(from + start + len)
            }
        }
    }
}

impl<'a> Iterator for RevealFrames<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.finished {
            return None;
        }
        let Some(end) = self.unit_end(self.pos) else {
            self.finished = true;
            return Some(self.text);
        };
        self.pos = end;
        if self.unit_end(end).is_none() {
            self.finished = true;
            return Some(self.text);
        }
        Some(&self.text[..end])
    }
}

/// Counts reveal units in `text` for the given granularity.
///
/// This is also the number of frames a reveal emits. Text without any unit
/// (empty or whitespace only) still emits its single final frame, so it
/// counts as one.
pub fn unit_count(text: &str, granularity: RevealGranularity) -> usize {
    let units = match granularity {
        RevealGranularity::Char => text.chars().count(),
        RevealGranularity::Word => text.split_whitespace().count(),
    };
    units.max(1)
}

#[derive(Debug, Clone)]
pub struct StreamingPresenter {
    granularity: RevealGranularity,
    tick: Duration,
}

impl StreamingPresenter {
    pub fn new(granularity: RevealGranularity, tick: Duration) -> Self {
        Self { granularity, tick }
    }

    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self::new(config.reveal_granularity, config.reveal_tick())
    }

    pub fn granularity(&self) -> RevealGranularity {
        self.granularity
    }

    pub fn frames<'a>(&self, text: &'a str) -> RevealFrames<'a> {
        RevealFrames::new(text, self.granularity)
    }

    /// Reveals `full_text` one unit per tick.
    ///
    /// `on_update(partial, is_done)` is called once per frame; the last call
    /// carries the full text with `is_done = true`. Empty text completes
    /// immediately with a single `("", true)` call. Cancellation is checked
    /// before every tick; once it fires, `on_update` is never called again.
    ///
    /// Each call starts from an empty prefix.
    pub async fn reveal<F>(
        &self,
        full_text: &str,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> RevealOutcome
    where
        F: FnMut(&str, bool),
    {
        if cancel.is_cancelled() {
            return RevealOutcome::Cancelled;
        }
        if full_text.is_empty() {
            on_update("", true);
            return RevealOutcome::Completed;
        }

        let mut frames = self.frames(full_text).peekable();
        while let Some(frame) = frames.next() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return RevealOutcome::Cancelled,
                _ = tokio::time::sleep(self.tick) => {}
            }
            if cancel.is_cancelled() {
                return RevealOutcome::Cancelled;
            }
            on_update(frame, frames.peek().is_none());
        }
        RevealOutcome::Completed
    }
}

impl Default for StreamingPresenter {
    fn default() -> Self {
        Self::from_config(&OrchestratorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str, granularity: RevealGranularity) -> Vec<&str> {
        RevealFrames::new(text, granularity).collect()
    }

    #[test]
    fn test_word_frames_are_prefixes() {
        assert_eq!(
            collect("Good idea, ship it.", RevealGranularity::Word),
            vec!["Good", "Good idea,", "Good idea, ship", "Good idea, ship it."]
        );
    }

    #[test]
    fn test_trailing_whitespace_lands_on_last_frame() {
        assert_eq!(
            collect("  Good idea.\n", RevealGranularity::Word),
            vec!["  Good", "  Good idea.\n"]
        );
    }

    #[test]
    fn test_char_frames_respect_utf8_boundaries() {
        assert_eq!(collect("añb", RevealGranularity::Char), vec!["a", "añ", "añb"]);
    }

    #[test]
    fn test_degenerate_texts_yield_single_frame() {
        assert_eq!(collect("", RevealGranularity::Word), vec![""]);
        assert_eq!(collect("   ", RevealGranularity::Word), vec!["   "]);
        assert_eq!(collect("", RevealGranularity::Char), vec![""]);

        assert_eq!(unit_count("", RevealGranularity::Word), 1);
        assert_eq!(unit_count(" \t\n", RevealGranularity::Word), 1);
        assert_eq!(unit_count("", RevealGranularity::Char), 1);
    }

    #[test]
    fn test_frame_count_matches_unit_count() {
        let texts = [
            "one",
            "Your premise is specific, but I'd sharpen the wedge.",
            "tabs\tand\nnewlines  too ",
            "ünïcödé wörds",
            "   ",
            "",
        ];
        for text in texts {
            for granularity in [RevealGranularity::Word, RevealGranularity::Char] {
                let frames = collect(text, granularity);
                assert_eq!(frames.len(), unit_count(text, granularity), "{text:?}");
                assert_eq!(*frames.last().unwrap(), text);
                assert!(frames.windows(2).all(|w| w[0].len() < w[1].len()));
                assert!(frames.iter().all(|f| text.starts_with(f)));
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_emits_every_frame_then_done() {
        let presenter = StreamingPresenter::new(RevealGranularity::Word, Duration::from_millis(25));
        let mut updates = Vec::new();

        let outcome = presenter
            .reveal("Good idea.", &CancellationToken::new(), |partial, done| {
                updates.push((partial.to_string(), done));
            })
            .await;

        assert_eq!(outcome, RevealOutcome::Completed);
        assert_eq!(
            updates,
            vec![("Good".to_string(), false), ("Good idea.".to_string(), true)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_is_paced_by_tick() {
        let presenter = StreamingPresenter::new(RevealGranularity::Char, Duration::from_millis(40));
        let start = tokio::time::Instant::now();

        presenter
            .reveal("abcd", &CancellationToken::new(), |_, _| {})
            .await;

        assert!(start.elapsed() >= Duration::from_millis(160));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_completes_immediately() {
        let presenter = StreamingPresenter::default();
        let mut updates = Vec::new();

        presenter
            .reveal("", &CancellationToken::new(), |partial, done| {
                updates.push((partial.to_string(), done));
            })
            .await;

        assert_eq!(updates, vec![(String::new(), true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_reveal_suppresses_further_updates() {
        let presenter = StreamingPresenter::new(RevealGranularity::Word, Duration::from_millis(10));
        let cancel = CancellationToken::new();
        let mut updates = Vec::new();

        let outcome = presenter
            .reveal("one two three four", &cancel, |partial, _| {
                updates.push(partial.to_string());
                if updates.len() == 2 {
                    cancel.cancel();
                }
            })
            .await;

        assert_eq!(outcome, RevealOutcome::Cancelled);
        assert_eq!(updates, vec!["one", "one two"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_emits_nothing() {
        let presenter = StreamingPresenter::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut called = false;

        let outcome = presenter.reveal("text", &cancel, |_, _| called = true).await;

        assert_eq!(outcome, RevealOutcome::Cancelled);
        assert!(!called);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_reveal_restarts_from_empty() {
        let presenter = StreamingPresenter::new(RevealGranularity::Word, Duration::from_millis(5));
        let cancel = CancellationToken::new();
        let mut first = Vec::new();
        presenter
            .reveal("a b c", &cancel, |p, _| {
                first.push(p.to_string());
                if first.len() == 1 {
                    cancel.cancel();
                }
            })
            .await;

        let mut second = Vec::new();
        presenter
            .reveal("a b c", &CancellationToken::new(), |p, _| second.push(p.to_string()))
            .await;

        assert_eq!(first, vec!["a"]);
        assert_eq!(second, vec!["a", "a b", "a b c"]);
    }
}
