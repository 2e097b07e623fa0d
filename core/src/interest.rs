//! Simple and compound interest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterestError {
    #[error("n must be positive integer")]
    NonPositiveCompounding,
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
    #[error("numerical result out of range")]
    Overflow,
}

/// Result of a simple interest calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimpleInterest {
    pub si: f64,
    pub total: f64,
}

/// Result of a compound interest calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterest {
    pub ci: f64,
    pub total: f64,
}

fn finite(name: &'static str, value: f64) -> Result<f64, InterestError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InterestError::NonFinite(name))
    }
}

/// `si = P * R * T / 100`, `total = P + si`.
///
/// `rate_percent` is the annual rate in percent, `years` the duration.
pub fn simple_interest(
    principal: f64,
    rate_percent: f64,
    years: f64,
) -> Result<SimpleInterest, InterestError> {
    let p = finite("principal", principal)?;
    let r = finite("rate", rate_percent)?;
    let t = finite("time", years)?;

    let si = (p * r * t) / 100.0;
    let total = p + si;
    if !total.is_finite() {
        return Err(InterestError::Overflow);
    }
    Ok(SimpleInterest { si, total })
}

/// `A = P * (1 + r/n)^(n*T)` with `r = rate_percent / 100`; `ci = A - P`.
pub fn compound_interest(
    principal: f64,
    rate_percent: f64,
    years: f64,
    compounds_per_year: i64,
) -> Result<CompoundInterest, InterestError> {
    let p = finite("principal", principal)?;
    let r = finite("rate", rate_percent)? / 100.0;
    let t = finite("time", years)?;
    if compounds_per_year <= 0 {
        return Err(InterestError::NonPositiveCompounding);
    }

    let n = compounds_per_year as f64;
    let total = p * (1.0 + r / n).powf(n * t);
    if !total.is_finite() {
        return Err(InterestError::Overflow);
    }
    Ok(CompoundInterest {
        ci: total - p,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_interest() {
        let result = simple_interest(1000.0, 7.5, 1.0).unwrap();
        assert!((result.si - 75.0).abs() < 1e-10);
        assert!((result.total - 1075.0).abs() < 1e-10);
    }

    #[test]
    fn test_simple_interest_zero_time() {
        let result = simple_interest(1000.0, 7.5, 0.0).unwrap();
        assert_eq!(result.si, 0.0);
        assert_eq!(result.total, 1000.0);
    }

    #[test]
    fn test_compound_interest_yearly() {
        let result = compound_interest(1000.0, 10.0, 2.0, 1).unwrap();
        assert!((result.total - 1210.0).abs() < 1e-9);
        assert!((result.ci - 210.0).abs() < 1e-9);
    }

    #[test]
    fn test_compound_interest_quarterly() {
        let result = compound_interest(1000.0, 7.5, 1.0, 4).unwrap();
        let expected = 1000.0 * (1.0f64 + 0.075 / 4.0).powf(4.0);
        assert!((result.total - expected).abs() < 1e-9);
        assert!(result.ci > 75.0);
    }

    #[test]
    fn test_compound_interest_rejects_non_positive_n() {
        assert_eq!(
            compound_interest(1000.0, 7.5, 1.0, 0),
            Err(InterestError::NonPositiveCompounding)
        );
        assert_eq!(
            compound_interest(1000.0, 7.5, 1.0, -4).unwrap_err().to_string(),
            "n must be positive integer"
        );
    }

    #[test]
    fn test_non_finite_inputs() {
        assert_eq!(
            simple_interest(f64::NAN, 1.0, 1.0),
            Err(InterestError::NonFinite("principal"))
        );
        assert_eq!(
            compound_interest(1.0, f64::INFINITY, 1.0, 1),
            Err(InterestError::NonFinite("rate"))
        );
    }

    #[test]
    fn test_compound_overflow() {
        assert_eq!(
            compound_interest(1e300, 1000.0, 1000.0, 12),
            Err(InterestError::Overflow)
        );
    }
}
