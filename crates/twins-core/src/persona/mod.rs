//! Persona domain module.
//!
//! # Module Structure
//!
//! - `model`: The read-only persona reference (`PersonaRef`, `PersonaSource`)
//! - `preset`: Built-in personas available without the remote catalog

mod model;
mod preset;

pub use model::{PersonaRef, PersonaSource};
pub use preset::get_default_presets;
