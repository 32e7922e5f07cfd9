//! Payroll period identification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A payroll period: one calendar month of one year.
///
/// Serialized as `"YYYY-MM"` (e.g. `"2026-03"`), which is also the textual
/// form used in error messages and logs.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Period;
///
/// let period = Period::new(2026, 3).unwrap();
/// assert_eq!(period.to_string(), "2026-03");
/// assert_eq!("2026-03".parse::<Period>().unwrap(), period);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, returning `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The calendar year of this period.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The calendar month of this period (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid period '{s}': expected YYYY-MM"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid period year in '{s}'"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid period month in '{s}'"))?;
        Period::new(year, month).ok_or_else(|| format!("month out of range in '{s}'"))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_month() {
        assert_eq!(Period::new(2026, 1).unwrap().to_string(), "2026-01");
        assert_eq!(Period::new(2026, 12).unwrap().to_string(), "2026-12");
    }

    #[test]
    fn test_month_out_of_range_rejected() {
        assert!(Period::new(2026, 0).is_none());
        assert!(Period::new(2026, 13).is_none());
    }

    #[test]
    fn test_parse_round_trip() {
        let period: Period = "2025-07".parse().unwrap();
        assert_eq!(period.year(), 2025);
        assert_eq!(period.month(), 7);
        assert_eq!(period.to_string(), "2025-07");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("2025".parse::<Period>().is_err());
        assert!("2025-xx".parse::<Period>().is_err());
        assert!("2025-13".parse::<Period>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let period = Period::new(2026, 3).unwrap();
        let json = serde_json::to_string(&period).unwrap();
        assert_eq!(json, "\"2026-03\"");

        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period);
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a = Period::new(2025, 12).unwrap();
        let b = Period::new(2026, 1).unwrap();
        assert!(a < b);
    }
}
