//! Mock completion backends for testing turn processing.
//!
//! - [`ScriptedBrain`] - replays canned replies and counts calls
//! - [`FailingBrain`] - always fails with a configured error
//! - [`DelayedBrain`] - wraps another backend with artificial latency

mod delayed;
mod failing;
mod scripted;

pub use delayed::DelayedBrain;
pub use failing::FailingBrain;
pub use scripted::ScriptedBrain;
