// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// A whole-second duration used for time windows, schedules and aggregation intervals.
///
/// Written in repository files as `<n><unit>` where unit is one of `s`, `m`, `h`,
/// `d` or `w`. Displayed in the largest whole unit among days, hours, minutes and
/// seconds, which is also the form used in synthesized aggregation feature names:
///
/// ```
/// use feature_repo::definitions::Interval;
///
/// let window: Interval = "30d".parse().unwrap();
/// assert_eq!(window.to_string(), "30d");
/// assert_eq!("1w".parse::<Interval>().unwrap().to_string(), "7d");
/// assert_eq!("90m".parse::<Interval>().unwrap().to_string(), "90m");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interval {
    seconds: u64,
}

impl Interval {
    pub fn from_seconds(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn minutes(n: u64) -> Self {
        Self::from_seconds(n * MINUTE)
    }

    pub fn hours(n: u64) -> Self {
        Self::from_seconds(n * HOUR)
    }

    pub fn days(n: u64) -> Self {
        Self::from_seconds(n * DAY)
    }

    pub fn as_seconds(&self) -> u64 {
        self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0
    }

    /// Whether this interval is a whole, non-zero multiple of `granularity`.
    pub fn is_multiple_of(&self, granularity: Interval) -> bool {
        granularity.seconds != 0 && self.seconds != 0 && self.seconds % granularity.seconds == 0
    }
}

impl From<Interval> for Duration {
    fn from(interval: Interval) -> Self {
        Duration::from_secs(interval.seconds)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.seconds;
        if s != 0 && s % DAY == 0 {
            write!(f, "{}d", s / DAY)
        } else if s != 0 && s % HOUR == 0 {
            write!(f, "{}h", s / HOUR)
        } else if s != 0 && s % MINUTE == 0 {
            write!(f, "{}m", s / MINUTE)
        } else {
            write!(f, "{}s", s)
        }
    }
}

/// Error produced when an interval literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid interval '{input}': {reason}")]
pub struct IntervalParseError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = |reason| IntervalParseError {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| err("missing unit (expected one of s, m, h, d, w)"))?;
        let (digits, unit) = trimmed.split_at(split);
        if digits.is_empty() {
            return Err(err("missing amount"));
        }

        let amount: u64 = digits.parse().map_err(|_| err("amount out of range"))?;
        let scale = match unit {
            "s" => 1,
            "m" => MINUTE,
            "h" => HOUR,
            "d" => DAY,
            "w" => WEEK,
            _ => return Err(err("unknown unit (expected one of s, m, h, d, w)")),
        };

        amount
            .checked_mul(scale)
            .map(Interval::from_seconds)
            .ok_or_else(|| err("amount out of range"))
    }
}

impl TryFrom<String> for Interval {
    type Error = IntervalParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_table_driven() {
        struct TestCase {
            input: &'static str,
            seconds: u64,
            display: &'static str,
        }

        let cases = vec![
            TestCase { input: "1m", seconds: 60, display: "1m" },
            TestCase { input: "1h", seconds: 3_600, display: "1h" },
            TestCase { input: "1d", seconds: 86_400, display: "1d" },
            TestCase { input: "30d", seconds: 2_592_000, display: "30d" },
            TestCase { input: "2w", seconds: 1_209_600, display: "14d" },
            TestCase { input: "120m", seconds: 7_200, display: "2h" },
            TestCase { input: "45s", seconds: 45, display: "45s" },
            TestCase { input: "0s", seconds: 0, display: "0s" },
        ];

        for case in cases {
            let interval: Interval = case.input.parse().unwrap();
            assert_eq!(interval.as_seconds(), case.seconds, "input '{}'", case.input);
            assert_eq!(interval.to_string(), case.display, "input '{}'", case.input);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "d", "10", "1y", "1.5d", "-1d", "99999999999999999999d"] {
            assert!(input.parse::<Interval>().is_err(), "'{}' should not parse", input);
        }
    }

    #[test]
    fn test_is_multiple_of() {
        assert!(Interval::days(7).is_multiple_of(Interval::days(1)));
        assert!(!Interval::hours(36).is_multiple_of(Interval::days(1)));
        assert!(!Interval::from_seconds(0).is_multiple_of(Interval::days(1)));
        assert!(!Interval::days(1).is_multiple_of(Interval::from_seconds(0)));
    }

    #[test]
    fn test_serde_as_string() {
        let interval: Interval = serde_yaml::from_str("3d").unwrap();
        assert_eq!(interval, Interval::days(3));
        assert_eq!(serde_json::to_string(&interval).unwrap(), "\"3d\"");
    }
}
