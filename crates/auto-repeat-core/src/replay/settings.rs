use crate::replay::CapturedAction;

use std::{ops::RangeInclusive, time::Duration};

/// Accepted repeat counts. The presentation layer clamps input to this range.
pub const REPEAT_COUNT_RANGE: RangeInclusive<u32> = 1..=99_999;

/// Accepted repetition intervals, in milliseconds.
pub const INTERVAL_MILLIS_RANGE: RangeInclusive<u64> = 1..=60_000;

/// Accepted start delays, in whole seconds.
pub const START_DELAY_SECS_RANGE: RangeInclusive<u32> = 0..=60;

/// Parameters for a single run. Constructed fresh per run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// How many times to perform the action.
    pub repeat_count: u32,
    /// Pause between repetitions, in milliseconds.
    pub interval_millis: u64,
    /// Countdown before the first repetition, in whole seconds.
    pub start_delay_secs: u32,
    /// The action to replay.
    pub action: CapturedAction,
}

impl RunSettings {
    /// Pause between repetitions as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_millis)
    }
}
