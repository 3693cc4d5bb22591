//! Core data models for replay analytics.

mod ids;
mod replay;
mod stats;

pub use ids::*;
pub use replay::*;
pub use stats::*;
