use log::info;
use serde::Serialize;

use crate::regression::{linear, LinearFit};
use crate::{Error, Result};

/// The linearised kinetic models
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum KineticModel {
    /// `ln(qe - qt) = ln(qe) - k1 t`, against a supplied equilibrium quantity
    PseudoFirstOrder { equilibrium_quantity: f64 },
    /// `t / qt = 1 / (k2 qe²) + t / qe`
    PseudoSecondOrder,
    /// `qt = k_id √t + C`
    IntraparticleDiffusion,
}

/// Paired points on which a kinetic model is a straight line
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Linearization {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl KineticModel {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PseudoFirstOrder { .. } => "pseudo-first-order",
            Self::PseudoSecondOrder => "pseudo-second-order",
            Self::IntraparticleDiffusion => "intraparticle-diffusion",
        }
    }

    /// Transform an adsorption series into the model's straight-line coordinates
    ///
    /// The zero-time point carries no kinetic information and is skipped.
    ///
    /// # Errors
    /// Returns [`Error::InputShape`] if `times` and `quantities` differ in length, and
    /// [`Error::Arithmetic`] when `qe - qt` is not positive (first order) or `qt` is zero
    /// (second order).
    #[allow(clippy::float_cmp)]
    pub fn linearize(&self, times: &[f64], quantities: &[f64]) -> Result<Linearization> {
        if times.len() != quantities.len() {
            return Err(Error::input_shape(format!(
                "{} sampling times for {} adsorbed quantities",
                times.len(),
                quantities.len()
            )));
        }
        let points = times.iter().zip(quantities).skip(1);

        let (x, y) = match *self {
            Self::PseudoFirstOrder {
                equilibrium_quantity,
            } => points
                .map(|(&t, &qt)| {
                    let remaining = equilibrium_quantity - qt;
                    if remaining <= 0.0 {
                        return Err(Error::arithmetic(format!(
                            "ln(qe - qt) is undefined at t = {t}: qt = {qt} is not below qe = {equilibrium_quantity}"
                        )));
                    }
                    Ok((t, remaining.ln()))
                })
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .unzip(),
            Self::PseudoSecondOrder => points
                .map(|(&t, &qt)| {
                    if qt == 0.0 {
                        return Err(Error::arithmetic(format!(
                            "t / qt is undefined at t = {t}: nothing is adsorbed"
                        )));
                    }
                    Ok((t, t / qt))
                })
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .unzip(),
            Self::IntraparticleDiffusion => points.map(|(&t, &qt)| (t.sqrt(), qt)).unzip(),
        };

        Ok(Linearization { x, y })
    }
}

/// A fitted kinetic model with the constants read off its line
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KineticFit {
    pub model: KineticModel,
    pub linearization: Linearization,
    pub fit: LinearFit,
    /// k1 (1/min), k2 (g/(mg min)) or k_id (mg/(g min^0.5)) depending on the model
    pub rate_constant: f64,
    /// The equilibrium quantity implied by the line, where the model defines one
    pub calculated_equilibrium_quantity: Option<f64>,
}

/// Linearise `quantities` against `times` and fit the model's straight line
///
/// # Errors
/// Propagates linearisation and fitting errors. A second order line with zero slope or zero
/// intercept has no finite constants and is an [`Error::Arithmetic`].
#[allow(clippy::float_cmp)]
pub fn fit(model: KineticModel, times: &[f64], quantities: &[f64]) -> Result<KineticFit> {
    let linearization = model.linearize(times, quantities)?;
    let fit = linear(&linearization.x, &linearization.y)?;

    let (rate_constant, calculated_equilibrium_quantity) = match model {
        KineticModel::PseudoFirstOrder { .. } => (-fit.slope, Some(fit.intercept.exp())),
        KineticModel::PseudoSecondOrder => {
            if fit.slope == 0.0 || fit.intercept == 0.0 {
                return Err(Error::arithmetic(format!(
                    "second order line {} has no finite rate constant",
                    fit.equation()
                )));
            }
            (fit.slope.powi(2) / fit.intercept, Some(fit.slope.recip()))
        }
        KineticModel::IntraparticleDiffusion => (fit.slope, None),
    };
    info!(
        "{}: {} (R² = {:.4}), rate constant {rate_constant}",
        model.name(),
        fit.equation(),
        fit.r_squared
    );

    Ok(KineticFit {
        model,
        linearization,
        fit,
        rate_constant,
        calculated_equilibrium_quantity,
    })
}
