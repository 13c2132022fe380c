//! # sift-core
//!
//! Operation state tracking and conflict resolution for Sift, built on
//! the parsers and runners in `sift-git`.

pub mod config;
mod conflict;
mod error;
mod operation;
mod outcome;

#[cfg(test)]
mod test_mocks;

pub use config::Config;
pub use conflict::{ConflictResolver, ResolutionAction, ResolutionOutcome};
pub use error::{Error, Result};
pub use operation::{OperationSnapshot, OperationState, OperationTracker};
pub use outcome::require_success;
