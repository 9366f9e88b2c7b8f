//! Remaining-time breakdown against a target instant.

use chrono::{DateTime, Utc};

use crate::domain::TimeRemaining;

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Time left from `now` until `target`. Negative once the target passed.
pub fn remaining(now: DateTime<Utc>, target: DateTime<Utc>) -> TimeRemaining {
    from_millis((target - now).num_milliseconds())
}

/// Decompose a millisecond count.
///
/// `%` here is the truncating remainder and `floor` is applied afterwards,
/// so a negative count yields negative fields (e.g. -10s gives
/// `-1d -1h -1m -10s`). Only the sign of `total_millis` is meaningful then.
pub fn from_millis(total_millis: i64) -> TimeRemaining {
    let t = total_millis as f64;

    TimeRemaining {
        total_millis,
        days: (t / MS_PER_DAY).floor() as i64,
        hours: ((t / MS_PER_HOUR) % 24.0).floor() as i64,
        minutes: ((t / MS_PER_SECOND / 60.0) % 60.0).floor() as i64,
        seconds: ((t / MS_PER_SECOND) % 60.0).floor() as i64,
    }
}
