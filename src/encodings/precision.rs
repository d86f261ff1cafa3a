//! # Coefficient Quantization
//!
//! Real coefficients become integer clause weights by dividing through a
//! precision and rounding to the nearest integer.

use crate::instances::QuadraticModel;

use super::EncodeError;

/// Exponent offset of [`auto_precision`] relative to the largest coefficient
const AUTO_DIGITS: i32 = 4;

/// The precision used to quantize coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Precision {
    /// A caller supplied precision
    Fixed(f64),
    /// Derived from the model with [`auto_precision`]
    Auto,
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Fixed(1e-6)
    }
}

impl Precision {
    /// Resolves the precision for a model
    ///
    /// # Errors
    ///
    /// [`EncodeError::InvalidPrecision`] if a fixed precision is zero,
    /// negative or not finite.
    pub fn resolve(self, model: &QuadraticModel) -> Result<f64, EncodeError> {
        let prec = match self {
            Precision::Fixed(prec) => prec,
            Precision::Auto => auto_precision(model),
        };
        if prec.is_finite() && prec > 0. {
            Ok(prec)
        } else {
            Err(EncodeError::InvalidPrecision(prec))
        }
    }
}

/// Derives a precision from the magnitude of the largest coefficient as
/// `10^(floor(log10(max_abs)) - 4)`, but at least [`f64::MIN_POSITIVE`].
/// The offset is not considered. A model without non-zero coefficients gets
/// precision `1`.
///
/// # Examples
///
/// ```
/// use qubosat::{encodings::auto_precision, instances::QuadraticModel, types::Vartype};
///
/// let mut model = QuadraticModel::new(2, Vartype::Binary);
/// model.add_linear(0, -10.).unwrap();
/// model.add_quadratic(0, 1, 3.5).unwrap();
/// assert_eq!(auto_precision(&model), 1e-3);
/// ```
pub fn auto_precision(model: &QuadraticModel) -> f64 {
    let max_abs = model.max_abs_coefficient();
    if max_abs == 0. {
        return 1.;
    }
    let exp = max_abs.log10().floor() as i32 - AUTO_DIGITS;
    // subnormal coefficients push the power below the smallest normal float
    10f64.powi(exp).max(f64::MIN_POSITIVE)
}

/// Quantizes a coefficient to an integer weight
///
/// # Errors
///
/// [`EncodeError::InvalidPrecision`] for an invalid precision and
/// [`EncodeError::WeightOverflow`] if the scaled value is not finite or does
/// not fit the weight type.
pub fn quantize(coeff: f64, precision: f64) -> Result<i64, EncodeError> {
    if !precision.is_finite() || precision <= 0. {
        return Err(EncodeError::InvalidPrecision(precision));
    }
    let scaled = (coeff / precision).round();
    // i64::MAX is not representable, the bound excludes it
    if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
        return Err(EncodeError::WeightOverflow(scaled));
    }
    Ok(scaled as i64)
}
