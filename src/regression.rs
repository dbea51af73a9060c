use log::debug;
use ndarray::Array1;
use ndarray_linalg::LeastSquaresSvd;
use serde::Serialize;

use crate::math::{r_squared, vandermonde};
use crate::{Error, Result};

/// Ordinary least-squares straight line `y = slope * x + intercept`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Fitted values at each input `x`, in input order
    pub predicted: Vec<f64>,
    pub r_squared: f64,
}

/// The reportable summary of any fit
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FitResult {
    pub parameters: Vec<f64>,
    pub r_squared: f64,
    pub equation: String,
}

/// Fit a straight line through paired samples
///
/// # Errors
/// Returns [`Error::InputShape`] if `x` and `y` differ in length, hold fewer than two points or
/// if every `x` is identical, and propagates LAPACK failures.
#[allow(clippy::float_cmp)]
pub fn linear(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() {
        return Err(Error::input_shape(format!(
            "{} x values paired with {} y values",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(Error::input_shape(format!(
            "a straight line needs at least two points, found {}",
            x.len()
        )));
    }
    if x.iter().all(|&xi| xi == x[0]) {
        return Err(Error::input_shape(
            "every x value is identical, the slope is undetermined",
        ));
    }

    let design = vandermonde(x, 1)?;
    let rhs = Array1::from(y.to_vec());
    let solution = design.least_squares(&rhs)?.solution;

    let (intercept, slope) = (solution[0], solution[1]);
    let predicted = design.dot(&solution).to_vec();
    let r_squared = r_squared(y, &predicted);
    debug!("linear fit: slope {slope}, intercept {intercept}, R² {r_squared}");

    Ok(LinearFit {
        slope,
        intercept,
        predicted,
        r_squared,
    })
}

impl LinearFit {
    /// The line as `y = 1.2345x + 0.5000`, the sign of the intercept folded into the operator
    pub fn equation(&self) -> String {
        if self.intercept < 0.0 {
            format!("y = {:.4}x - {:.4}", self.slope, -self.intercept)
        } else if self.intercept > 0.0 {
            format!("y = {:.4}x + {:.4}", self.slope, self.intercept)
        } else {
            format!("y = {:.4}x", self.slope)
        }
    }
}

impl From<&LinearFit> for FitResult {
    fn from(fit: &LinearFit) -> Self {
        Self {
            parameters: vec![fit.slope, fit.intercept],
            r_squared: fit.r_squared,
            equation: fit.equation(),
        }
    }
}

impl FitResult {
    pub fn r_squared_label(&self) -> String {
        format!("R² = {:.4}", self.r_squared)
    }
}
