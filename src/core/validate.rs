//! Input checks shared by the bond and portfolio calculations.

use crate::core::error::{Result, SandboxError};

/// Tolerance used when checking that portfolio weights sum to one.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

pub fn positive_amount(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SandboxError::invalid_input(format!(
            "{name} must be a positive number, got {value}"
        )));
    }
    Ok(value)
}

/// Rates are decimals in [0, 1], e.g. 0.05 for 5%.
pub fn unit_rate(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(SandboxError::invalid_input(format!(
            "{name} must be between 0 and 1, got {value}"
        )));
    }
    Ok(value)
}

/// Longest maturity accepted, in years. Timelines hold one point per period.
pub const MAX_MATURITY_YEARS: u32 = 100;

pub fn maturity(years: u32) -> Result<u32> {
    if !(1..=MAX_MATURITY_YEARS).contains(&years) {
        return Err(SandboxError::invalid_input(format!(
            "maturity must be between 1 and {MAX_MATURITY_YEARS} years, got {years}"
        )));
    }
    Ok(years)
}

pub fn sums_to_one(total: f64) -> bool {
    (total - 1.0).abs() <= WEIGHT_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_amount() {
        assert_eq!(positive_amount("par", 100.0), Ok(100.0));
        assert!(positive_amount("par", 0.0).is_err());
        assert!(positive_amount("par", -5.0).is_err());
        assert!(positive_amount("par", f64::NAN).is_err());
    }

    #[test]
    fn test_unit_rate_bounds() {
        assert_eq!(unit_rate("rate", 0.0), Ok(0.0));
        assert_eq!(unit_rate("rate", 1.0), Ok(1.0));
        assert!(unit_rate("rate", -0.01).is_err());
        assert!(unit_rate("rate", 1.5).is_err());
    }

    #[test]
    fn test_maturity_and_weights() {
        assert!(maturity(0).is_err());
        assert_eq!(maturity(5), Ok(5));
        assert_eq!(maturity(MAX_MATURITY_YEARS), Ok(MAX_MATURITY_YEARS));
        assert!(maturity(MAX_MATURITY_YEARS + 1).is_err());
        assert!(sums_to_one(0.3 + 0.3 + 0.4));
        assert!(!sums_to_one(0.9));
    }
}
