/// Canned feedback shown when a persona's job could not be submitted.
pub(crate) fn fallback_text(display_name: &str) -> String {
    format!(
        "{}: Here's my quick read. Your premise is specific, but I'd sharpen the wedge: \
         pick one user, one urgent pain, one repeatable moment of delight. \
         Show traction over thesis.",
        display_name
    )
}

pub(crate) const SUPERSEDED_MESSAGE: &str = "superseded by a newer run";
