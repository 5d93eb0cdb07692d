//! Shopify Admin API version reported to the front end.

use crate::error::ConfigError;
use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An Admin API version, either a quarterly stable release or `unstable`.
///
/// Shopify ships stable versions in January, April, July and October and
/// supports each one for roughly twelve months.
///
/// # Example
///
/// ```rust
/// use shopify_gateway::ApiVersion;
///
/// let version: ApiVersion = "2024-10".parse().unwrap();
/// assert_eq!(version, ApiVersion::default());
/// assert_eq!(version.to_string(), "2024-10");
/// assert!("2024-11".parse::<ApiVersion>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApiVersion {
    /// A quarterly stable release.
    Stable {
        /// Release year.
        year: u16,
        /// Release month: 1, 4, 7 or 10.
        month: u8,
    },
    /// The unstable version, newer than every stable release.
    Unstable,
}

impl ApiVersion {
    const SUPPORT_WINDOW_MONTHS: i32 = 12;

    /// Returns `true` if this stable version left Shopify's support window
    /// before `today`. `Unstable` is never deprecated.
    #[must_use]
    pub fn is_deprecated_on(&self, today: NaiveDate) -> bool {
        match *self {
            Self::Stable { year, month } => {
                let released = i32::from(year) * 12 + i32::from(month) - 1;
                let now = today.year() * 12 + today.month0() as i32;
                now - released > Self::SUPPORT_WINDOW_MONTHS
            }
            Self::Unstable => false,
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::Stable {
            year: 2024,
            month: 10,
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable { year, month } => write!(f, "{year:04}-{month:02}"),
            Self::Unstable => f.write_str("unstable"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "unstable" {
            return Ok(Self::Unstable);
        }

        let invalid = || ConfigError::InvalidApiVersion { version: s.clone() };

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: u16 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        if !matches!(month, 1 | 4 | 7 | 10) {
            return Err(invalid());
        }

        Ok(Self::Stable { year, month })
    }
}

impl Serialize for ApiVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_quarterly_versions() {
        assert_eq!(
            "2025-01".parse::<ApiVersion>().unwrap(),
            ApiVersion::Stable {
                year: 2025,
                month: 1
            }
        );
        assert_eq!(
            " UNSTABLE ".parse::<ApiVersion>().unwrap(),
            ApiVersion::Unstable
        );
    }

    #[test]
    fn test_rejects_malformed_versions() {
        for bad in ["", "2024", "2024-1", "2024-03", "24-10", "abcd-10", "2024-10-01"] {
            assert!(bad.parse::<ApiVersion>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_display_pads_month() {
        let version = ApiVersion::Stable {
            year: 2025,
            month: 4,
        };
        assert_eq!(version.to_string(), "2025-04");
    }

    #[test]
    fn test_default_is_2024_10() {
        assert_eq!(ApiVersion::default().to_string(), "2024-10");
    }

    #[test]
    fn test_unstable_sorts_after_stable() {
        let stable: ApiVersion = "2025-10".parse().unwrap();
        assert!(ApiVersion::Unstable > stable);
        assert!("2024-10".parse::<ApiVersion>().unwrap() < stable);
    }

    #[test]
    fn test_deprecation_window() {
        let version: ApiVersion = "2024-10".parse().unwrap();
        let within = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();

        assert!(!version.is_deprecated_on(within));
        assert!(version.is_deprecated_on(after));
        assert!(!ApiVersion::Unstable.is_deprecated_on(after));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&ApiVersion::default()).unwrap();
        assert_eq!(json, r#""2024-10""#);

        let parsed: ApiVersion = serde_json::from_str(r#""2025-07""#).unwrap();
        assert_eq!(parsed.to_string(), "2025-07");
    }
}
