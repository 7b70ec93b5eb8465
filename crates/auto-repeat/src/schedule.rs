//! Wall-clock resolution for scheduled starts.

use chrono::{DateTime, Local, NaiveTime};

/// Resolve a time-of-day against today's date in the local timezone.
///
/// Returns `None` for times that do not exist locally (DST transitions).
/// Whether the result is still in the future is the coordinator's call.
pub(crate) fn today_at(time: NaiveTime) -> Option<DateTime<Local>> {
    Local::now()
        .date_naive()
        .and_time(time)
        .and_local_timezone(Local)
        .single()
}
