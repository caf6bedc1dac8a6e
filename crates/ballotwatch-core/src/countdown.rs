//! Countdown math for the millisecond clock.
//!
//! Every call recomputes the breakdown from the raw timestamp difference, so
//! a driver can tick at sub-10ms resolution without accumulating drift: there
//! is no stored remainder to decrement, only `target - now`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Unit breakdown of the time left until a target instant.
///
/// Invariant: `days*86_400_000 + hours*3_600_000 + minutes*60_000 +
/// seconds*1_000 + milliseconds == max(target - now, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
}

impl TimeRemaining {
    pub const ZERO: TimeRemaining = TimeRemaining {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        milliseconds: 0,
    };

    pub fn is_elapsed(&self) -> bool {
        *self == TimeRemaining::ZERO
    }

    pub fn total_ms(&self) -> u64 {
        self.days * MS_PER_DAY as u64
            + self.hours * MS_PER_HOUR as u64
            + self.minutes * MS_PER_MINUTE as u64
            + self.seconds * MS_PER_SECOND as u64
            + self.milliseconds
    }
}

/// Break the interval `target - now` down by floor division, largest unit
/// first. Clamps to all-zero once the target has passed; there is no
/// "elapsed" mode and no negative fields.
pub fn time_remaining(target: DateTime<Utc>, now: DateTime<Utc>) -> TimeRemaining {
    let difference = target.signed_duration_since(now).num_milliseconds();
    if difference <= 0 {
        return TimeRemaining::ZERO;
    }

    let days = difference / MS_PER_DAY;
    let hours = (difference % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (difference % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (difference % MS_PER_MINUTE) / MS_PER_SECOND;
    let milliseconds = difference % MS_PER_SECOND;

    TimeRemaining {
        days: days as u64,
        hours: hours as u64,
        minutes: minutes as u64,
        seconds: seconds as u64,
        milliseconds: milliseconds as u64,
    }
}

/// Same as [`time_remaining`] but for a stored RFC 3339 timestamp. An
/// unparseable target must never take the caller down; it reads as already
/// elapsed.
pub fn time_remaining_str(target: &str, now: DateTime<Utc>) -> TimeRemaining {
    match DateTime::parse_from_rfc3339(target) {
        Ok(dt) => time_remaining(dt.with_timezone(&Utc), now),
        Err(_) => TimeRemaining::ZERO,
    }
}

/// Which field(s) of the breakdown a display renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    All,
}

impl FromStr for DisplayMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "days" => Ok(DisplayMode::Days),
            "hours" => Ok(DisplayMode::Hours),
            "minutes" => Ok(DisplayMode::Minutes),
            "seconds" => Ok(DisplayMode::Seconds),
            "milliseconds" => Ok(DisplayMode::Milliseconds),
            "all" => Ok(DisplayMode::All),
            other => anyhow::bail!(
                "unknown display mode '{}' (expected days|hours|minutes|seconds|milliseconds|all)",
                other
            ),
        }
    }
}

/// Render a breakdown the way the countdown widget does: two-digit padding
/// everywhere except days (unpadded) and milliseconds (three digits).
pub fn format_remaining(t: &TimeRemaining, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Days => format!("{}d", t.days),
        DisplayMode::Hours => format!("{:02}h", t.hours),
        DisplayMode::Minutes => format!("{:02}m", t.minutes),
        DisplayMode::Seconds => format!("{:02}s", t.seconds),
        DisplayMode::Milliseconds => format!("{:03}ms", t.milliseconds),
        DisplayMode::All => format!(
            "{}d {:02}h {:02}m {:02}s .{:03}",
            t.days, t.hours, t.minutes, t.seconds, t.milliseconds
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn breakdown_sums_back_to_difference() {
        let now = at(1_700_000_000_000);
        for diff in [1, 999, 1_000, 59_999, 3_600_000, 86_400_001, 123_456_789] {
            let t = time_remaining(at(1_700_000_000_000 + diff), now);
            assert_eq!(t.total_ms(), diff as u64, "diff={}", diff);
        }
    }

    #[test]
    fn one_of_each_unit() {
        // 1d 1h 1m 1s 234ms
        let now = at(0);
        let t = time_remaining(at(90_061_234), now);
        assert_eq!(
            t,
            TimeRemaining {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1,
                milliseconds: 234
            }
        );
    }

    #[test]
    fn past_target_clamps_to_zero() {
        let now = at(5_000);
        assert_eq!(time_remaining(at(5_000), now), TimeRemaining::ZERO);
        assert_eq!(time_remaining(at(0), now), TimeRemaining::ZERO);
        assert!(time_remaining(at(0), now).is_elapsed());
    }

    #[test]
    fn unparseable_target_reads_as_elapsed() {
        assert_eq!(
            time_remaining_str("not-a-date", Utc::now()),
            TimeRemaining::ZERO
        );
        assert_eq!(time_remaining_str("", Utc::now()), TimeRemaining::ZERO);
    }

    #[test]
    fn rfc3339_target_parses() {
        let now = at(0);
        let t = time_remaining_str("1970-01-01T00:00:01Z", now);
        assert_eq!(t.seconds, 1);
        assert_eq!(t.total_ms(), 1_000);
    }

    #[test]
    fn formatting_pads_like_the_widget() {
        let t = TimeRemaining {
            days: 3,
            hours: 4,
            minutes: 5,
            seconds: 6,
            milliseconds: 7,
        };
        assert_eq!(format_remaining(&t, DisplayMode::Days), "3d");
        assert_eq!(format_remaining(&t, DisplayMode::Hours), "04h");
        assert_eq!(format_remaining(&t, DisplayMode::Milliseconds), "007ms");
        assert_eq!(format_remaining(&t, DisplayMode::All), "3d 04h 05m 06s .007");
    }

    #[test]
    fn display_mode_parses() {
        assert_eq!("all".parse::<DisplayMode>().unwrap(), DisplayMode::All);
        assert!("weeks".parse::<DisplayMode>().is_err());
    }
}
