//! Default persona presets.
//!
//! Used when the remote catalog cannot be reached so the user always has
//! personas to pick from.

use super::model::{PersonaRef, PersonaSource};

/// Returns the built-in persona catalog.
///
/// - **The Pitch Surgeon**: scalpel-precise teardown, founder-friendly
/// - **The Term Sheet Ninja**: quiet, fast, deadly to messy decks
/// - **The Builder's Whisperer**: hands-on feedback for real traction
/// - **The Early Signal**: pre-PMF radar, tastefully early
pub fn get_default_presets() -> Vec<PersonaRef> {
    [
        ("sarah", "The Pitch Surgeon", "Scalpel-precise teardown, founder-friendly"),
        ("alfred", "The Term Sheet Ninja", "Quiet, fast, deadly to messy decks"),
        ("kanu", "The Builder's Whisperer", "Hands-on feedback for real traction"),
        ("leigh", "The Early Signal", "Pre-PMF radar, tastefully early"),
    ]
    .into_iter()
    .map(|(id, name, description)| {
        PersonaRef::new(id, name)
            .with_description(description)
            .with_source(PersonaSource::BuiltIn)
    })
    .collect()
}
