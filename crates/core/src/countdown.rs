//! Release countdown decomposition.
//!
//! Pure time math only: sampling on a once-per-second tick, cancellation,
//! and what to do when the remainder hits zero belong to the owning view
//! (see the storefront's countdown service). Every displayed product runs
//! its own timer; small skew between instances is expected and fine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Remaining time until a release, decomposed for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    /// Decompose `max(0, release − now)` by integer floor division at every
    /// level — floor, not round, so a display never overshoots the release.
    #[must_use]
    pub fn until(release: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let ms = (release - now).num_milliseconds().max(0);
        Self {
            days: ms / MS_PER_DAY,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    /// The countdown has reached its end.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}
