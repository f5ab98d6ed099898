use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use twins_application::{
    AvailabilityMonitor, JobOrchestrator, JobUpdate, PersonaCatalog, SessionHistoryCache,
};
use twins_core::config::TwinsConfig;
use twins_core::job::JobState;
use twins_core::service::GenerationService;

use super::history_store;

pub async fn execute(
    config: &TwinsConfig,
    service: Arc<dyn GenerationService>,
    persona_ids: Vec<String>,
    prompt: String,
) -> Result<()> {
    let mut catalog = PersonaCatalog::builtin();
    catalog.refresh(service.as_ref()).await;
    let personas = catalog.resolve(&persona_ids)?;

    let monitor = AvailabilityMonitor::new(service.clone(), config.availability.probe_interval());
    monitor.probe().await;
    let cancel = CancellationToken::new();
    let probe_loop = monitor.spawn(cancel.clone());

    let history = Arc::new(SessionHistoryCache::new(history_store(), &config.history));
    history.load().await;

    let mut orchestrator = JobOrchestrator::new(service, monitor.subscribe(), &config.orchestrator)
        .with_history(history);
    let updates = orchestrator.subscribe();
    let stream_inline = personas.len() == 1;

    let started = orchestrator.start_run(personas, prompt).await?;
    if started.fallback_likely {
        println!(
            "{}",
            "Generation service looks unavailable; answers may be canned fallbacks.".yellow()
        );
    }

    let display = tokio::spawn(render(updates, stream_inline));
    tokio::select! {
        _ = orchestrator.run_until_settled() => {}
        _ = tokio::signal::ctrl_c() => {
            orchestrator.dismiss_run(started.run_id);
            println!("\n{}", "Cancelled.".yellow());
        }
    }

    // Closing the update channel ends the display task.
    drop(orchestrator);
    display.await?;
    cancel.cancel();
    probe_loop.await?;

    Ok(())
}

async fn render(mut updates: broadcast::Receiver<JobUpdate>, stream_inline: bool) {
    let mut shown: HashMap<String, usize> = HashMap::new();
    loop {
        match updates.recv().await {
            Ok(update) => render_update(&update, stream_inline, &mut shown),
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "display fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn render_update(update: &JobUpdate, stream_inline: bool, shown: &mut HashMap<String, usize>) {
    let name = update.display_name.as_str();
    match update.state {
        JobState::Submitting => println!("{} {}", "•".dimmed(), format!("asking {}", name).dimmed()),
        JobState::Polling => println!("{} {}", "•".dimmed(), format!("{} is thinking", name).dimmed()),
        JobState::StreamingReveal if stream_inline => {
            let printed = shown.entry(update.persona_id.clone()).or_insert_with(|| {
                println!("\n{}", name.cyan().bold());
                0
            });
            print_delta(&update.revealed_text, printed);
        }
        JobState::StreamingReveal => {}
        JobState::Completed => {
            match shown.get_mut(&update.persona_id) {
                Some(printed) => {
                    print_delta(&update.revealed_text, printed);
                    println!();
                }
                None => {
                    println!("\n{}", name.cyan().bold());
                    println!("{}", update.revealed_text);
                }
            }
            if update.fallback {
                println!("{}", "(offline fallback)".yellow());
            }
            if let Some(media) = &update.media {
                if let Some(url) = &media.video_url {
                    println!("{} {}", "video:".dimmed(), url);
                }
                if let Some(url) = &media.audio_url {
                    println!("{} {}", "audio:".dimmed(), url);
                }
            }
        }
        JobState::Failed => {
            let message = update.error_message.as_deref().unwrap_or("generation failed");
            println!("\n{} {}", name.red().bold(), message);
        }
    }
}

fn print_delta(text: &str, printed: &mut usize) {
    if let Some(delta) = text.get(*printed..) {
        print!("{}", delta);
        let _ = std::io::stdout().flush();
    }
    *printed = text.len();
}
