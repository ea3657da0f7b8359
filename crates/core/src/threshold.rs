//! Alert threshold.

use crate::ThresholdError;
use std::fmt;
use std::str::FromStr;

/// Gas price ceiling that triggers a notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasThreshold(f64);

impl GasThreshold {
    /// Create a threshold from a finite value.
    pub fn new(value: f64) -> Result<Self, ThresholdError> {
        if !value.is_finite() {
            return Err(ThresholdError::NotFinite(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Raw threshold value.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// A gas price at or below the threshold triggers an alert.
    #[inline]
    pub fn is_triggered(self, gas: f64) -> bool {
        gas <= self.0
    }
}

impl FromStr for GasThreshold {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ThresholdError::Empty);
        }
        let value = s
            .parse::<f64>()
            .map_err(|_| ThresholdError::NotANumber(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for GasThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
