use log::info;
use ndarray::Array1;
use serde::Serialize;

use crate::math::r_squared;
use crate::minimisation::Problem;
use crate::regression::FitResult;
use crate::{Error, Result};

/// Langmuir isotherm `qe = qm Ka Ce / (1 + Ka Ce)`
pub fn langmuir(ce: f64, qm: f64, ka: f64) -> f64 {
    qm * ka * ce / ka.mul_add(ce, 1.0)
}

/// Freundlich isotherm `qe = Ka Ce^n`
pub fn freundlich(ce: f64, n: f64, ka: f64) -> f64 {
    ka * ce.powf(n)
}

/// The nonlinear equilibrium isotherms
///
/// Parameters are ordered `[qm, Ka]` for Langmuir and `[n, Ka]` for Freundlich.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum IsothermModel {
    Langmuir,
    Freundlich,
}

impl IsothermModel {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Langmuir => "Langmuir",
            Self::Freundlich => "Freundlich",
        }
    }

    pub fn evaluate(self, ce: f64, params: [f64; 2]) -> f64 {
        match self {
            Self::Langmuir => langmuir(ce, params[0], params[1]),
            Self::Freundlich => freundlich(ce, params[0], params[1]),
        }
    }

    /// Partial derivatives of the model with respect to each parameter at `ce`
    pub(crate) fn gradient(self, ce: f64, params: [f64; 2]) -> [f64; 2] {
        match self {
            Self::Langmuir => {
                let [qm, ka] = params;
                let denominator = ka.mul_add(ce, 1.0);
                [ka * ce / denominator, qm * ce / denominator.powi(2)]
            }
            Self::Freundlich => {
                let [n, ka] = params;
                let power = ce.powf(n);
                [ka * power * ce.ln(), power]
            }
        }
    }

    pub fn equation(self, params: [f64; 2]) -> String {
        match self {
            Self::Langmuir => format!("qm = {:.4}, KL = {:.4}", params[0], params[1]),
            Self::Freundlich => format!("n = {:.4}, KF = {:.4}", params[0], params[1]),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IsothermFit {
    pub model: IsothermModel,
    pub parameters: [f64; 2],
    /// Model values at each input `Ce`
    pub predicted: Vec<f64>,
    pub r_squared: f64,
}

impl IsothermFit {
    pub fn equation(&self) -> String {
        self.model.equation(self.parameters)
    }
}

impl From<&IsothermFit> for FitResult {
    fn from(fit: &IsothermFit) -> Self {
        Self {
            parameters: fit.parameters.to_vec(),
            r_squared: fit.r_squared,
            equation: fit.equation(),
        }
    }
}

/// Fit an isotherm to equilibrium data by nonlinear least squares
///
/// `verbose` traces every solver iteration on the terminal.
///
/// # Errors
/// Returns [`Error::InputShape`] for mismatched or too few points, [`Error::Arithmetic`] for a
/// non-positive concentration under the Freundlich model, and [`Error::FitConvergence`], carrying
/// `initial_guess`, when the solver does not converge.
pub fn fit(
    model: IsothermModel,
    ce: &[f64],
    qe: &[f64],
    initial_guess: [f64; 2],
    verbose: bool,
) -> Result<IsothermFit> {
    if model == IsothermModel::Freundlich {
        if let Some(c) = ce.iter().find(|&&c| c <= 0.0) {
            return Err(Error::arithmetic(format!(
                "the Freundlich isotherm needs positive concentrations, found {c}"
            )));
        }
    }

    let problem = Problem::new(model, ce, qe)?;
    let solution = problem
        .clone()
        .solve(Array1::from(initial_guess.to_vec()), verbose)?;

    let predicted = problem.compute(&solution).to_vec();
    let r_squared = r_squared(qe, &predicted);
    let parameters = [solution[0], solution[1]];
    info!(
        "{} isotherm: {} (R² = {r_squared:.4})",
        model.name(),
        model.equation(parameters)
    );

    Ok(IsothermFit {
        model,
        parameters,
        predicted,
        r_squared,
    })
}
