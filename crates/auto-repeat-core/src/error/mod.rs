use crate::replay::RunState;

use error_location::ErrorLocation;
use thiserror::Error;

/// Replay errors with source location tracking.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Operation requested in a state that forbids it.
    #[error("Cannot {operation} while {state:?} {location}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// State the coordinator was in when the operation arrived.
        state: RunState,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Scheduled start time is not strictly in the future.
    #[error("Scheduled start {scheduled_at} has already passed {location}")]
    InvalidSchedule {
        /// The rejected wall-clock time.
        scheduled_at: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Captured action data cannot be mapped to a synthesizable input.
    #[error("Unrecognized captured action: {detail} {location}")]
    UnrecognizedAction {
        /// Description of the unmapped data.
        detail: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Synthesizing an input event failed.
    #[error("Input injection failed: {reason} {location}")]
    Injection {
        /// Description of the injection failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A background thread could not be spawned.
    #[error("Failed to spawn background task: {reason} {location}")]
    TaskSpawnFailed {
        /// Description of the spawn failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`ReplayError`].
pub type Result<T> = std::result::Result<T, ReplayError>;
