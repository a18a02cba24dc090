//! Duration unit normalization
//!
//! Values are converted to nanoseconds, then one display unit is chosen for
//! the whole set so every series on a chart shares a scale.

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

/// Duration units recognized in benchmark unit labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// Recognize a unit label by its first character (`ns/iter` → ns)
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim_start().chars().next() {
            Some('n') => Ok(Self::Nanoseconds),
            // ASCII u, MICRO SIGN and GREEK SMALL LETTER MU
            Some('u' | '\u{b5}' | '\u{3bc}') => Ok(Self::Microseconds),
            Some('m') => Ok(Self::Milliseconds),
            Some('s') => Ok(Self::Seconds),
            _ => Err(Error::UnknownUnit(label.to_string())),
        }
    }

    /// Nanoseconds in one of this unit
    pub fn nanos(self) -> f64 {
        match self {
            Self::Nanoseconds => 1.0,
            Self::Microseconds => 1e3,
            Self::Milliseconds => 1e6,
            Self::Seconds => 1e9,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "µs",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
        }
    }

    /// Display unit for a set whose largest value is `max_nanos`
    pub fn for_max(max_nanos: f64) -> Self {
        if max_nanos > 1e9 {
            Self::Seconds
        } else if max_nanos > 1e6 {
            Self::Milliseconds
        } else if max_nanos > 1e3 {
            Self::Microseconds
        } else {
            Self::Nanoseconds
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Convert a single value to nanoseconds
pub fn to_nanos(value: f64, label: &str) -> Result<f64> {
    Ok(value * TimeUnit::from_label(label)?.nanos())
}

/// A value set scaled into one display unit
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub unit: TimeUnit,
    /// Values in `unit`, in input order
    pub values: Vec<f64>,
}

impl Normalized {
    /// Factor every nanosecond value was divided by
    pub fn divisor(&self) -> f64 {
        self.unit.nanos()
    }
}

/// Normalize `(value, unit label)` pairs onto a single display unit
///
/// Fails on the first unrecognized unit label rather than guessing a scale.
pub fn normalize<'a, I>(samples: I) -> Result<Normalized>
where
    I: IntoIterator<Item = (f64, &'a str)>,
{
    let nanos = samples
        .into_iter()
        .map(|(value, label)| to_nanos(value, label))
        .collect::<Result<Vec<f64>>>()?;

    let max = nanos.iter().copied().fold(0.0_f64, f64::max);
    let unit = TimeUnit::for_max(max);
    let divisor = unit.nanos();

    Ok(Normalized {
        unit,
        values: nanos.into_iter().map(|v| v / divisor).collect(),
    })
}
