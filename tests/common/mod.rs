#![allow(dead_code)]

use std::path::Path;

use ndarray_rand::rand::Rng;
use serde::Serialize;

use mnp_sorption::Result;

pub const BLANK: &str = "blank.csv";
pub const WARM_UP_ROWS: usize = 3;
pub const NUM_ROWS: usize = 21;
pub const EXCITATION: f64 = 410.0;

// Intensity above the blank at the excitation wavelength is `SLOPE * c + INTERCEPT`
pub const SLOPE: f64 = 250.0;
pub const INTERCEPT: f64 = 40.0;

#[derive(Serialize)]
struct Row {
    wavelength: f64,
    intensity: f64,
}

fn blank_intensity(wavelength: f64) -> f64 {
    3.0f64.mul_add(wavelength - 400.0, 1000.0)
}

/// Write a spectrum over 400nm.. preceded by junk warm-up rows
pub fn write_spectrum(
    path: &Path,
    num_rows: usize,
    mut intensity: impl FnMut(f64) -> f64,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for ii in 0..WARM_UP_ROWS {
        wtr.serialize(Row {
            wavelength: 0.0,
            intensity: 1e6 * (ii as f64 + 1.0),
        })?;
    }
    for wavelength in (400_i32..).take(num_rows).map(f64::from) {
        wtr.serialize(Row {
            wavelength,
            intensity: intensity(wavelength),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_blank(dir: &Path) -> Result<()> {
    write_spectrum(&dir.join(BLANK), NUM_ROWS, blank_intensity)
}

/// Write the spectrum of a solution at `concentration`, with noise away from the excitation line
pub fn write_sample<R: Rng>(
    dir: &Path,
    name: &str,
    concentration: f64,
    num_rows: usize,
    rng: &mut R,
) -> Result<()> {
    write_spectrum(&dir.join(name), num_rows, |wavelength| {
        let delta = if (wavelength - EXCITATION).abs() < 1e-9 {
            SLOPE.mul_add(concentration, INTERCEPT)
        } else {
            rng.gen_range(0.0..500.0)
        };
        blank_intensity(wavelength) + delta
    })
}

/// Write one spectrum per concentration, returning the file names
pub fn write_series<R: Rng>(
    dir: &Path,
    prefix: &str,
    concentrations: &[f64],
    rng: &mut R,
) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(concentrations.len());
    for (ii, c) in concentrations.iter().enumerate() {
        let name = format!("{prefix}_{ii}.csv");
        write_sample(dir, &name, *c, NUM_ROWS, rng)?;
        names.push(name);
    }
    Ok(names)
}

/// Top-level keys and the standard curve table of an `experiment.toml`
///
/// `header` holds any further top-level keys; tables may be appended to the result.
pub fn experiment_toml(header: &str, samples: &[String], concentrations: &[f64]) -> String {
    format!(
        "warm_up_rows = {WARM_UP_ROWS}
blank = \"{BLANK}\"
{header}

[standard_curve]
samples = {samples:?}
concentrations = {concentrations:?}
"
    )
}
