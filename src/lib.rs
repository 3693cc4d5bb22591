//! # Replay Insights
//!
//! Replay analytics for competitive Pokémon doubles teams.
//!
//! ## Architecture
//!
//! - **models**: Replay records and derived statistics
//! - **normalize**: Pokémon label normalization and the form table
//! - **calculate**: Usage, lead, matchup and custom matchup statistics
//! - **paste**: Pokepaste roster parsing
//! - **storage**: Per-team JSONL replay store
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod models;
pub mod normalize;
pub mod paste;
pub mod storage;

pub use models::*;

/// Split a free-form selection list (`"ursaluna, incineroar,,-"`) into custom matchup slots.
///
/// Blank entries and `-` mark an empty slot.
pub fn parse_slots(input: &[String]) -> Vec<Option<String>> {
    input
        .iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .map(|s| {
            if s.is_empty() || s == "-" {
                None
            } else {
                Some(s.to_string())
            }
        })
        .collect()
}
