//! Per-run timestamp tokens
//!
//! Every pipeline run derives both artifact filenames from one `RunToken`,
//! so `output_<token>.png` and `model_<token>.obj` always correlate.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format used for the human-readable part of a token (`YYYYMMDD_HHMMSS`)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A shared filename token for the artifacts of a single run.
///
/// Two runs inside the same second produce the same plain token. Enable
/// the unique suffix to append eight random hex digits after the timestamp.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunToken(String);

impl RunToken {
    /// Token for the current local time
    pub fn now(unique_suffix: bool) -> Self {
        Self::at(Local::now(), unique_suffix)
    }

    /// Token for a specific instant
    pub fn at(instant: DateTime<Local>, unique_suffix: bool) -> Self {
        Self::from_naive(instant.naive_local(), unique_suffix)
    }

    /// Token for a wall-clock time with no zone attached
    pub fn from_naive(time: NaiveDateTime, unique_suffix: bool) -> Self {
        let stamp = time.format(TIMESTAMP_FORMAT).to_string();
        if unique_suffix {
            let id = uuid::Uuid::new_v4().simple().to_string();
            Self(format!("{}_{}", stamp, &id[..8]))
        } else {
            Self(stamp)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `YYYYMMDD_HHMMSS` prefix, without any unique suffix
    pub fn timestamp(&self) -> &str {
        // "YYYYMMDD_HHMMSS" is 15 ASCII bytes
        self.0.get(..15).unwrap_or(&self.0)
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_plain_token_format() {
        let token = RunToken::from_naive(fixed_time(), false);
        assert_eq!(token.as_str(), "20261018_090507");
        assert_eq!(token.timestamp(), "20261018_090507");
    }

    #[test]
    fn test_unique_suffix_keeps_timestamp() {
        let a = RunToken::from_naive(fixed_time(), true);
        let b = RunToken::from_naive(fixed_time(), true);
        assert!(a.as_str().starts_with("20261018_090507_"));
        assert_eq!(a.as_str().len(), 15 + 1 + 8);
        assert_eq!(a.timestamp(), "20261018_090507");
        assert_ne!(a, b);
    }

    #[test]
    fn test_now_has_timestamp_shape() {
        let token = RunToken::now(false);
        let s = token.as_str();
        assert_eq!(s.len(), 15);
        assert_eq!(&s[8..9], "_");
        assert!(s.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }
}
