//! The amount of money for an expense or income.

use std::fmt::Display;

use serde::Serialize;

use crate::Error;

/// An amount of money that is finite and not negative.
///
/// Whether the money is coming in or going out is decided by the kind of
/// transaction the amount belongs to, not by its sign.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    /// Create a new amount.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `value` is NaN, infinite or negative.
    pub fn new(value: f64) -> Result<Self, Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidAmount(value.to_string()));
        }

        // Collapse -0.0 so that it displays as "0".
        Ok(Self(value + 0.0))
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure `value` is finite and not negative, e.g. it was
    /// read back from the database after being validated.
    pub fn new_unchecked(value: f64) -> Self {
        Self(value)
    }

    /// The amount as a float.
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
