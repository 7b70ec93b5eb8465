use crate::replay::CapturedAction;

use std::fmt;

/// How a run ended. Exactly one is reported per run, always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalStatus {
    /// The repeat loop ran out without cancellation.
    Completed,
    /// Cancellation was observed at a check or mid-sleep.
    Cancelled,
    /// The action could not be synthesized, or the worker failed internally.
    Failed(String),
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Messages delivered from the background domain to the control domain.
///
/// The channel preserves emission order; a [`Notification::Finished`] is
/// always the last message of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// One-shot capture result from the global listener.
    Captured(CapturedAction),
    /// Human-readable progress line for the status display.
    Progress(String),
    /// Scheduled wait and countdown are over; the repeat phase has begun.
    Started,
    /// Terminal status of the run.
    Finished(TerminalStatus),
}
