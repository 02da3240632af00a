//! Voting windows.
//!
//! A [`Duration`] is relative (configured as the maximum voting period) and is
//! turned into an absolute [`Expiration`] against the block a proposal is
//! created in. `is_expired` is a pure predicate; status derivation calls it on
//! every read.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Chain cursor a call executes at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    /// Seconds since the Unix epoch.
    pub time: u64,
}

impl BlockInfo {
    pub fn new(height: u64, time: u64) -> Self {
        Self { height, time }
    }
}

/// Relative length of a voting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    /// Number of blocks.
    Height(u64),
    /// Number of seconds.
    Time(u64),
}

impl Duration {
    /// Absolute expiration of a window opened at `block`.
    pub fn after(&self, block: &BlockInfo) -> Expiration {
        match self {
            Duration::Height(h) => Expiration::AtHeight(block.height.saturating_add(*h)),
            Duration::Time(t) => Expiration::AtTime(block.time.saturating_add(*t)),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Duration::Height(0) | Duration::Time(0))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duration::Height(h) => write!(f, "{} blocks", h),
            Duration::Time(t) => write!(
                f,
                "{}",
                humantime::format_duration(std::time::Duration::from_secs(*t))
            ),
        }
    }
}

/// Parse a voting period.
///
/// `"100 blocks"` (or `"100 block"`) is a height duration; anything else is
/// handed to humantime (`"7d"`, `"48h"`, `"1 week"`).
impl FromStr for Duration {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let blocks = trimmed
            .strip_suffix("blocks")
            .or_else(|| trimmed.strip_suffix("block"));

        if let Some(count) = blocks {
            let count = count.trim();
            return count
                .parse()
                .map(Duration::Height)
                .map_err(|_| format!("Invalid block count '{}'", count));
        }

        humantime::parse_duration(trimmed)
            .map(|d| Duration::Time(d.as_secs()))
            .map_err(|e| format!("Invalid duration '{}': {}", input, e))
    }
}

/// Absolute end of a voting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiration {
    AtHeight(u64),
    /// Seconds since the Unix epoch.
    AtTime(u64),
    /// Never expires. Not reachable through member proposals.
    Never {},
}

impl Expiration {
    pub fn is_expired(&self, block: &BlockInfo) -> bool {
        is_expired(self, block.height, block.time)
    }
}

/// `AtHeight(h)` is expired once `height >= h`, `AtTime(t)` once `time >= t`.
pub fn is_expired(expiration: &Expiration, current_height: u64, current_time: u64) -> bool {
    match expiration {
        Expiration::AtHeight(h) => current_height >= *h,
        Expiration::AtTime(t) => current_time >= *t,
        Expiration::Never {} => false,
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiration::AtHeight(h) => write!(f, "expiration height: {}", h),
            Expiration::AtTime(t) => write!(f, "expiration time: {}", t),
            Expiration::Never {} => write!(f, "expiration: never"),
        }
    }
}

/// Height and time expirations are not comparable with each other.
impl PartialOrd for Expiration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Expiration::AtHeight(a), Expiration::AtHeight(b)) => Some(a.cmp(b)),
            (Expiration::AtTime(a), Expiration::AtTime(b)) => Some(a.cmp(b)),
            (Expiration::Never {}, Expiration::Never {}) => Some(Ordering::Equal),
            (Expiration::Never {}, _) => Some(Ordering::Greater),
            (_, Expiration::Never {}) => Some(Ordering::Less),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_expiry_boundary() {
        let exp = Expiration::AtHeight(100);
        assert!(!exp.is_expired(&BlockInfo::new(99, 0)));
        assert!(exp.is_expired(&BlockInfo::new(100, 0)));
        assert!(exp.is_expired(&BlockInfo::new(101, 0)));
    }

    #[test]
    fn test_time_expiry_boundary() {
        let exp = Expiration::AtTime(1_000);
        assert!(!is_expired(&exp, u64::MAX, 999));
        assert!(is_expired(&exp, 0, 1_000));
    }

    #[test]
    fn test_never_expires() {
        assert!(!is_expired(&Expiration::Never {}, u64::MAX, u64::MAX));
    }

    #[test]
    fn test_duration_after() {
        let block = BlockInfo::new(10, 5_000);
        assert_eq!(Duration::Height(20).after(&block), Expiration::AtHeight(30));
        assert_eq!(Duration::Time(60).after(&block), Expiration::AtTime(5_060));
    }

    #[test]
    fn test_expiration_ordering() {
        assert!(Expiration::AtHeight(5) < Expiration::AtHeight(6));
        assert!(Expiration::Never {} > Expiration::AtTime(u64::MAX));
        assert_eq!(
            Expiration::AtHeight(5).partial_cmp(&Expiration::AtTime(5)),
            None
        );
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!("100 blocks".parse::<Duration>(), Ok(Duration::Height(100)));
        assert_eq!("1 block".parse::<Duration>(), Ok(Duration::Height(1)));
        assert_eq!("7d".parse::<Duration>(), Ok(Duration::Time(604_800)));
        assert_eq!("48h".parse::<Duration>(), Ok(Duration::Time(172_800)));
        assert!("soon".parse::<Duration>().is_err());
        assert!("x blocks".parse::<Duration>().is_err());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_string(&Expiration::AtHeight(7)).unwrap();
        assert_eq!(json, r#"{"at_height":7}"#);
        let json = serde_json::to_string(&Expiration::Never {}).unwrap();
        assert_eq!(json, r#"{"never":{}}"#);
        let json = serde_json::to_string(&Duration::Time(60)).unwrap();
        assert_eq!(json, r#"{"time":60}"#);
    }
}
