//! Time window parsing.
//!
//! Window bounds are given on the command line either as plain seconds
//! (`"50"`, `"12.5"`) or as `mm:ss` (`"0:50"`, `"1:10"`). Both forms resolve
//! to a [`TimeSpec`], a non-negative number of seconds from the start of the
//! video.
//!
//! # Example
//!
//! ```
//! use extract_frames::TimeSpec;
//!
//! let start: TimeSpec = "0:50".parse()?;
//! let end: TimeSpec = "70".parse()?;
//! assert_eq!(start.seconds(), 50.0);
//! assert_eq!(end.seconds(), 70.0);
//! # Ok::<(), extract_frames::ExtractError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
    time::Duration,
};

use crate::error::ExtractError;

/// A point in time, in seconds from the start of the video.
///
/// Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct TimeSpec {
    seconds: f64,
}

impl TimeSpec {
    /// The start of the video.
    pub const ZERO: TimeSpec = TimeSpec { seconds: 0.0 };

    /// Build a time from a raw number of seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidRange`] if `seconds` is negative, NaN or
    /// infinite.
    pub fn from_seconds(seconds: f64) -> Result<Self, ExtractError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ExtractError::InvalidRange(format!(
                "time must be a non-negative number of seconds, got {seconds}"
            )));
        }
        Ok(Self { seconds })
    }

    /// Parse a `seconds` or `mm:ss` token.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidTimeFormat`] for anything else,
    /// including more than one `:`, empty parts, signs, exponents, and a
    /// seconds part of 60 or more in the `mm:ss` form.
    pub fn parse(token: &str) -> Result<Self, ExtractError> {
        let invalid = || ExtractError::InvalidTimeFormat {
            input: token.to_string(),
        };
        let trimmed = token.trim();

        let seconds = match trimmed.split_once(':') {
            Some((minutes, seconds)) => {
                if !is_digits(minutes) {
                    return Err(invalid());
                }
                let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
                let seconds = parse_decimal(seconds).ok_or_else(invalid)?;
                if seconds >= 60.0 {
                    return Err(invalid());
                }
                minutes as f64 * 60.0 + seconds
            }
            None => parse_decimal(trimmed).ok_or_else(invalid)?,
        };

        if !seconds.is_finite() {
            return Err(invalid());
        }
        Ok(Self { seconds })
    }

    /// Seconds from the start of the video.
    pub fn seconds(self) -> f64 {
        self.seconds
    }

    /// The same instant as a [`Duration`].
    pub fn as_duration(self) -> Duration {
        Duration::from_secs_f64(self.seconds)
    }
}

impl FromStr for TimeSpec {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSpec::parse(s)
    }
}

impl Display for TimeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}s", self.seconds)
    }
}

impl From<Duration> for TimeSpec {
    fn from(duration: Duration) -> Self {
        Self {
            seconds: duration.as_secs_f64(),
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `digits` or `digits.digits`, nothing else.
fn parse_decimal(s: &str) -> Option<f64> {
    let valid = match s.split_once('.') {
        Some((whole, fraction)) => is_digits(whole) && is_digits(fraction),
        None => is_digits(s),
    };
    if valid { s.parse().ok() } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds(token: &str) -> f64 {
        TimeSpec::parse(token)
            .unwrap_or_else(|error| panic!("{token:?} should parse: {error}"))
            .seconds()
    }

    #[test]
    fn bare_seconds() {
        assert_eq!(seconds("0"), 0.0);
        assert_eq!(seconds("50"), 50.0);
        assert_eq!(seconds("3600"), 3600.0);
        assert_eq!(seconds("12.5"), 12.5);
        assert_eq!(seconds("  7 "), 7.0);
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(seconds("0:50"), 50.0);
        assert_eq!(seconds("1:10"), 70.0);
        assert_eq!(seconds("01:05"), 65.0);
        assert_eq!(seconds("90:00"), 5400.0);
        assert_eq!(seconds("2:59.5"), 179.5);
    }

    #[test]
    fn malformed_tokens() {
        for token in [
            "", "abc", "1:2:3", ":30", "1:", "1:60", "1:75", "-5", "+5", "-1:00", "1e3",
            "inf", "NaN", "5.", ".5", "1.0:30", "1:3x", "1 :30",
        ] {
            match TimeSpec::parse(token) {
                Err(ExtractError::InvalidTimeFormat { input }) => assert_eq!(input, token),
                other => panic!("{token:?} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn from_seconds_rejects_negative() {
        assert!(TimeSpec::from_seconds(-0.5).is_err());
        assert!(TimeSpec::from_seconds(f64::NAN).is_err());
        assert!(TimeSpec::from_seconds(f64::INFINITY).is_err());
        assert_eq!(TimeSpec::from_seconds(2.0).unwrap().seconds(), 2.0);
    }

    #[test]
    fn mm_ss_matches_bare_seconds() {
        assert_eq!(TimeSpec::parse("0:50").unwrap(), TimeSpec::parse("50").unwrap());
        assert_eq!(TimeSpec::parse("1:10").unwrap(), TimeSpec::parse("70").unwrap());
    }
}
