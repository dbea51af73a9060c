mod common;

use ndarray_rand::rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
use tempdir::TempDir;

use mnp_sorption::experiment::run;
use mnp_sorption::{Error, Result};

use common::{
    experiment_toml, write_blank, write_sample, write_series, EXCITATION, INTERCEPT, NUM_ROWS,
    SLOPE,
};

fn generate_standards<R: Rng>(tmp_dir: &TempDir, rng: &mut R) -> Result<(Vec<String>, Vec<f64>)> {
    write_blank(tmp_dir.path())?;
    let num_standards = rng.gen_range(4..12);
    let concentrations = (0..num_standards)
        .map(|_| rng.gen_range(0.5..50.0))
        .collect::<Vec<f64>>();
    let samples = write_series(tmp_dir.path(), "standard", &concentrations, rng)?;
    Ok((samples, concentrations))
}

#[test]
fn standard_curve_fit_matches_input_line() -> Result<()> {
    let seed = 40;
    let mut rng = Isaac64Rng::seed_from_u64(seed);

    // Arrange
    let tmp_dir = TempDir::new("standard_curve_fit_matches_input_line")?;
    let (samples, concentrations) = generate_standards(&tmp_dir, &mut rng)?;
    let header = format!("excitation_wavelength = {EXCITATION:?}\nkind = \"carboxyl\"");
    std::fs::write(
        tmp_dir.path().join("experiment.toml"),
        experiment_toml(&header, &samples, &concentrations),
    )?;

    // Act
    let report = run(tmp_dir.path())?;

    // Assert
    approx::assert_relative_eq!(report.standard_curve.slope, SLOPE, max_relative = 1e-8);
    approx::assert_relative_eq!(report.standard_curve.intercept, INTERCEPT, max_relative = 1e-8);
    approx::assert_relative_eq!(report.standard_curve.r_squared, 1.0, max_relative = 1e-10);
    assert_eq!(report.standard_curve.predicted.len(), concentrations.len());

    for c in concentrations {
        let intensity = SLOPE.mul_add(c, INTERCEPT);
        approx::assert_relative_eq!(
            report.calibration.concentration(intensity)?,
            c,
            max_relative = 1e-8
        );
    }
    assert!(report.kinetics.is_none());
    assert!(report.isotherm.is_none());

    Ok(())
}

#[test]
fn strict_alignment_rejects_short_spectra() -> Result<()> {
    let seed = 41;
    let mut rng = Isaac64Rng::seed_from_u64(seed);

    let tmp_dir = TempDir::new("strict_alignment_rejects_short_spectra")?;
    let (mut samples, mut concentrations) = generate_standards(&tmp_dir, &mut rng)?;
    write_sample(tmp_dir.path(), "short.csv", 12.0, NUM_ROWS - 1, &mut rng)?;
    samples.push("short.csv".to_owned());
    concentrations.push(12.0);

    let header = format!(
        "excitation_wavelength = {EXCITATION:?}\nkind = \"amino\"\nalignment = \"strict\""
    );
    std::fs::write(
        tmp_dir.path().join("experiment.toml"),
        experiment_toml(&header, &samples, &concentrations),
    )?;

    assert!(matches!(run(tmp_dir.path()), Err(Error::InputShape(_))));

    Ok(())
}

#[test]
fn truncating_alignment_exports_the_shared_rows() -> Result<()> {
    let seed = 42;
    let mut rng = Isaac64Rng::seed_from_u64(seed);

    let tmp_dir = TempDir::new("truncating_alignment_exports_the_shared_rows")?;
    let (mut samples, mut concentrations) = generate_standards(&tmp_dir, &mut rng)?;
    write_sample(tmp_dir.path(), "short.csv", 12.0, NUM_ROWS - 3, &mut rng)?;
    samples.push("short.csv".to_owned());
    concentrations.push(12.0);

    let header = format!(
        "excitation_wavelength = {EXCITATION:?}\nkind = \"amino\"\nexport = \"out\""
    );
    std::fs::write(
        tmp_dir.path().join("experiment.toml"),
        experiment_toml(&header, &samples, &concentrations),
    )?;

    let report = run(tmp_dir.path())?;
    approx::assert_relative_eq!(report.standard_curve.slope, SLOPE, max_relative = 1e-8);

    let exported = tmp_dir.path().join("out").join("amino").join("amino.csv");
    let mut rdr = csv::Reader::from_path(exported)?;
    assert_eq!(rdr.headers()?.len(), samples.len() + 1);
    let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
    // The shortest spectrum sets the shared length, and the last shared row is dropped
    assert_eq!(records.len(), NUM_ROWS - 3 - 1);

    Ok(())
}

#[test]
fn off_axis_excitation_needs_a_tolerance() -> Result<()> {
    let seed = 43;
    let mut rng = Isaac64Rng::seed_from_u64(seed);

    let tmp_dir = TempDir::new("off_axis_excitation_needs_a_tolerance")?;
    let (samples, concentrations) = generate_standards(&tmp_dir, &mut rng)?;
    let config_path = tmp_dir.path().join("experiment.toml");

    let exact = format!("excitation_wavelength = {:?}\nkind = \"neutral\"", EXCITATION + 0.3);
    std::fs::write(&config_path, experiment_toml(&exact, &samples, &concentrations))?;
    assert!(matches!(run(tmp_dir.path()), Err(Error::Lookup { .. })));

    let nearest = format!("{exact}\nwavelength_tolerance = 0.5");
    std::fs::write(&config_path, experiment_toml(&nearest, &samples, &concentrations))?;
    let report = run(tmp_dir.path())?;
    approx::assert_relative_eq!(report.standard_curve.slope, SLOPE, max_relative = 1e-8);

    Ok(())
}
