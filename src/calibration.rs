use log::{debug, info};
use serde::Serialize;

use crate::regression::{linear, LinearFit};
use crate::spectrum::{BaselineCorrectedTable, WavelengthLookup};
use crate::{Error, Result};

/// Fluorescence intensity as a linear function of concentration at one excitation wavelength
///
/// Produced once per experiment series from the standard curve, then used read-only to
/// back-calculate concentrations from measured intensities.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CalibrationLine {
    pub slope: f64,
    pub intercept: f64,
}

impl CalibrationLine {
    pub const fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    pub fn intensity(&self, concentration: f64) -> f64 {
        self.slope.mul_add(concentration, self.intercept)
    }

    /// Invert the line: `(intensity - intercept) / slope`
    ///
    /// # Errors
    /// Returns [`Error::Arithmetic`] for a zero (or non-finite) slope.
    #[allow(clippy::float_cmp)]
    pub fn concentration(&self, intensity: f64) -> Result<f64> {
        if self.slope == 0.0 || !self.slope.is_finite() {
            return Err(Error::arithmetic(format!(
                "calibration slope {} cannot be inverted",
                self.slope
            )));
        }
        Ok((intensity - self.intercept) / self.slope)
    }
}

impl From<&LinearFit> for CalibrationLine {
    fn from(fit: &LinearFit) -> Self {
        Self::new(fit.slope, fit.intercept)
    }
}

/// Fit the intensity-concentration standard curve
///
/// The intensity of each standard is read from the table row at `excitation_wavelength`; the
/// `i`th column is paired with `concentrations[i]`.
///
/// # Errors
/// Returns [`Error::InputShape`] if the number of concentrations differs from the number of
/// sample columns, [`Error::Lookup`] if the wavelength is absent, or any fitting error.
pub fn standard_curve(
    table: &BaselineCorrectedTable,
    excitation_wavelength: f64,
    lookup: WavelengthLookup,
    concentrations: &[f64],
) -> Result<LinearFit> {
    if concentrations.len() != table.sample_count() {
        return Err(Error::input_shape(format!(
            "{} standard concentrations for {} spectra",
            concentrations.len(),
            table.sample_count()
        )));
    }
    let intensities = table.row_at(excitation_wavelength, lookup)?.to_vec();
    let fit = linear(concentrations, &intensities)?;
    info!(
        "standard curve at {excitation_wavelength} nm: {} (R² = {:.4})",
        fit.equation(),
        fit.r_squared
    );
    Ok(fit)
}

/// Recover the concentration of every sample column from its intensity at the excitation row
///
/// The output is in column order, which is the order the sample files were supplied in.
///
/// # Errors
/// Fails with [`Error::Lookup`] when the excitation wavelength is not on the axis, and with
/// [`Error::Arithmetic`] when the line has zero slope.
pub fn concentrations(
    table: &BaselineCorrectedTable,
    excitation_wavelength: f64,
    lookup: WavelengthLookup,
    line: &CalibrationLine,
) -> Result<Vec<f64>> {
    let concentrations = table
        .row_at(excitation_wavelength, lookup)?
        .iter()
        .map(|&intensity| line.concentration(intensity))
        .collect::<Result<Vec<_>>>()?;
    debug!("concentrations at {excitation_wavelength} nm: {concentrations:?}");
    Ok(concentrations)
}

#[cfg(test)]
mod tests {
    use ndarray_rand::rand::{Rng, SeedableRng};
    use proptest::prelude::*;
    use rand_isaac::Isaac64Rng;

    use super::{concentrations, standard_curve, CalibrationLine};
    use crate::spectrum::{difference, Alignment, Spectrum, WavelengthLookup};
    use crate::Error;

    const EXCITATION: f64 = 518.0;

    fn blank() -> Spectrum {
        Spectrum::new((0..40).map(|ii| (500.0 + f64::from(ii), 30.0 + f64::from(ii % 7))))
    }

    /// A sample whose blank-subtracted intensity is `delta` at every wavelength
    fn sample_with_delta(blank: &Spectrum, delta: f64) -> Spectrum {
        Spectrum::new(
            blank
                .wavelength()
                .iter()
                .zip(blank.intensity())
                .map(|(&w, &i)| (w, i + delta)),
        )
    }

    #[test]
    fn standard_curve_recovers_generating_line() {
        let line = CalibrationLine::new(250.0, 40.0);
        let standards = [1.0, 2.0, 5.0, 10.0, 20.0, 40.0, 50.0];
        let reference = blank();
        let samples = standards
            .iter()
            .map(|&c| sample_with_delta(&reference, line.intensity(c)))
            .collect::<Vec<_>>();
        let table = difference(&reference, &samples, Alignment::Strict).unwrap();

        let fit = standard_curve(&table, EXCITATION, WavelengthLookup::Exact, &standards).unwrap();

        approx::assert_relative_eq!(fit.slope, 250.0, max_relative = 1e-9);
        approx::assert_relative_eq!(fit.intercept, 40.0, max_relative = 1e-9);
        approx::assert_relative_eq!(fit.r_squared, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn standard_curve_rejects_mismatched_labels() {
        let reference = blank();
        let samples = [sample_with_delta(&reference, 1.0)];
        let table = difference(&reference, &samples, Alignment::Strict).unwrap();

        let result = standard_curve(&table, EXCITATION, WavelengthLookup::Exact, &[1.0, 2.0]);

        assert!(matches!(result, Err(Error::InputShape(_))));
    }

    #[test]
    fn concentrations_follow_column_order() {
        let seed = 40;
        let mut rng = Isaac64Rng::seed_from_u64(seed);
        let line = CalibrationLine::new(rng.gen_range(10.0..500.0), rng.gen_range(-50.0..50.0));

        let expected = (0..10)
            .map(|_| rng.gen_range(0.0..60.0))
            .collect::<Vec<f64>>();
        let reference = blank();
        let samples = expected
            .iter()
            .map(|&c| sample_with_delta(&reference, line.intensity(c)))
            .collect::<Vec<_>>();
        let table = difference(&reference, &samples, Alignment::Strict).unwrap();

        let recovered = concentrations(&table, EXCITATION, WavelengthLookup::Exact, &line).unwrap();

        assert_eq!(recovered.len(), expected.len());
        for (recovered, expected) in recovered.into_iter().zip(expected) {
            approx::assert_relative_eq!(recovered, expected, epsilon = 1e-9, max_relative = 1e-9);
        }
    }

    #[test]
    fn missing_excitation_wavelength_is_an_error() {
        let reference = blank();
        let table =
            difference(&reference, &[reference.clone()], Alignment::Strict).unwrap();
        let line = CalibrationLine::new(1.0, 0.0);

        let result = concentrations(&table, 612.5, WavelengthLookup::Exact, &line);

        assert!(matches!(result, Err(Error::Lookup { .. })));
    }

    #[test]
    fn flat_line_cannot_be_inverted() {
        let line = CalibrationLine::new(0.0, 3.0);
        assert!(matches!(line.concentration(3.0), Err(Error::Arithmetic(_))));
    }

    proptest! {
        #[test]
        fn intensity_round_trips_to_concentration(
            slope in prop_oneof![-1e3..-1e-2, 1e-2..1e3f64],
            intercept in -1e3..1e3f64,
            concentration in 0.0..1e3f64,
        ) {
            let line = CalibrationLine::new(slope, intercept);
            let recovered = line.concentration(line.intensity(concentration)).unwrap();
            prop_assert!((recovered - concentration).abs() <= 1e-6 * concentration.abs().max(1.0));
        }
    }
}
