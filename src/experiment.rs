use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::adsorption::{adsorption_quantity, IsothermAccumulator, Vessel};
use crate::calibration::{concentrations, standard_curve, CalibrationLine};
use crate::export::Exporter;
use crate::isotherm::{self, IsothermFit, IsothermModel};
use crate::kinetics::{self, KineticFit, KineticModel};
use crate::labels::{labels, Chart, ChartLabels, Kind, Locale};
use crate::regression::LinearFit;
use crate::spectrum::{difference, Alignment, BaselineCorrectedTable, Spectrum, WavelengthLookup};
use crate::{Error, Result};

const CONFIG_FILE: &str = "experiment.toml";

const fn default_warm_up_rows() -> usize {
    20
}

fn default_locale() -> String {
    "english".to_owned()
}

const fn default_saturation_offset() -> f64 {
    1.0
}

fn default_kinetics_label() -> String {
    "kinetics".to_owned()
}

/// On-disk description of an experiment, read from `experiment.toml`
///
/// Paths are relative to the directory holding the file.
#[derive(Debug, Deserialize, Serialize)]
pub struct ExperimentConfig {
    /// Leading rows of every csv discarded as instrument warm-up
    #[serde(default = "default_warm_up_rows")]
    pub warm_up_rows: usize,
    /// Excitation wavelength of the particles (nm)
    pub excitation_wavelength: f64,
    /// Match the excitation wavelength to the nearest axis value within this many nm, instead of
    /// exactly
    pub wavelength_tolerance: Option<f64>,
    #[serde(default)]
    pub alignment: Alignment,
    /// `carboxyl`, `amino` or `neutral`
    pub kind: String,
    /// `english` or `chinese`
    #[serde(default = "default_locale")]
    pub locale: String,
    /// The pure-solvent spectrum
    pub blank: PathBuf,
    /// Directory to write intermediate tables to
    pub export: Option<PathBuf>,
    /// Trace every nonlinear solver iteration on the terminal
    #[serde(default)]
    pub verbose_fit: bool,
    pub standard_curve: StandardCurveConfig,
    pub kinetics: Option<KineticsConfig>,
    pub isotherm: Option<IsothermConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StandardCurveConfig {
    pub samples: Vec<PathBuf>,
    /// Known concentration of each standard (mg/L)
    pub concentrations: Vec<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct KineticsConfig {
    /// Label used to name exported files
    #[serde(default = "default_kinetics_label")]
    pub label: String,
    /// One spectrum per sampling time, the first at time zero
    pub samples: Vec<PathBuf>,
    /// Sampling times (min)
    pub times: Vec<f64>,
    #[serde(flatten)]
    pub vessel: Vessel,
    /// qe used by the pseudo-first-order linearisation (mg/g)
    pub equilibrium_quantity: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct IsothermConfig {
    /// One list of time-ordered spectra per initial concentration
    pub runs: Vec<Vec<PathBuf>>,
    /// Ce of each run; the last measured concentration of the run when absent
    pub equilibrium_concentrations: Option<Vec<f64>>,
    #[serde(flatten)]
    pub vessel: Vessel,
    /// `[qm, Ka]`
    pub langmuir_guess: [f64; 2],
    /// `[n, Ka]`
    pub freundlich_guess: [f64; 2],
    #[serde(default = "default_saturation_offset")]
    pub saturation_offset: f64,
}

impl ExperimentConfig {
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid experiment description.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn lookup(&self) -> WavelengthLookup {
        self.wavelength_tolerance
            .map_or(WavelengthLookup::Exact, |tolerance| {
                WavelengthLookup::Nearest { tolerance }
            })
    }
}

#[derive(Debug, Serialize)]
pub struct KineticsReport {
    pub times: Vec<f64>,
    pub concentrations: Vec<f64>,
    pub quantities: Vec<f64>,
    pub pseudo_first_order: KineticFit,
    pub pseudo_second_order: KineticFit,
    pub intraparticle_diffusion: KineticFit,
}

#[derive(Debug, Serialize)]
pub struct IsothermReport {
    pub equilibrium_concentrations: Vec<f64>,
    pub saturation: Vec<f64>,
    pub langmuir: IsothermFit,
    pub freundlich: IsothermFit,
}

#[derive(Debug, Serialize)]
pub struct ExperimentReport {
    pub kind: Kind,
    pub locale: Locale,
    pub standard_curve: LinearFit,
    pub calibration: CalibrationLine,
    pub kinetics: Option<KineticsReport>,
    pub isotherm: Option<IsothermReport>,
}

impl ExperimentReport {
    pub fn labels(&self, chart: Chart) -> ChartLabels {
        labels(self.kind, chart, self.locale)
    }
}

/// Run the experiment described by `experiment.toml` in `working_directory`
///
/// # Errors
/// Returns an error if the configuration or any spectrum cannot be read, or if any stage of the
/// pipeline fails.
pub fn run(working_directory: &Path) -> Result<ExperimentReport> {
    let config = ExperimentConfig::from_file(&working_directory.join(CONFIG_FILE))?;
    run_with(working_directory, &config)
}

/// Run an experiment from an already parsed configuration
///
/// # Errors
/// See [`run`].
pub fn run_with(working_directory: &Path, config: &ExperimentConfig) -> Result<ExperimentReport> {
    let kind: Kind = config.kind.parse()?;
    let locale: Locale = config.locale.parse()?;
    let exporter = config
        .export
        .as_ref()
        .map(|export| Exporter::new(&working_directory.join(export), kind))
        .transpose()?;

    let pipeline = Pipeline {
        working_directory,
        config,
        blank: Spectrum::from_file(&working_directory.join(&config.blank), config.warm_up_rows)?,
        lookup: config.lookup(),
    };
    info!("working in {working_directory:?} on {kind} particles");

    let standards = pipeline.differenced(&config.standard_curve.samples)?;
    if let Some(exporter) = &exporter {
        exporter.table(&standards)?;
    }
    let standard_curve = standard_curve(
        &standards,
        config.excitation_wavelength,
        pipeline.lookup,
        &config.standard_curve.concentrations,
    )?;
    let calibration = CalibrationLine::from(&standard_curve);

    let kinetics = config
        .kinetics
        .as_ref()
        .map(|kinetics| pipeline.kinetics(kinetics, &calibration, exporter.as_ref()))
        .transpose()?;

    let isotherm = config
        .isotherm
        .as_ref()
        .map(|isotherm| pipeline.isotherm(isotherm, &calibration, exporter.as_ref()))
        .transpose()?;

    Ok(ExperimentReport {
        kind,
        locale,
        standard_curve,
        calibration,
        kinetics,
        isotherm,
    })
}

struct Pipeline<'a> {
    working_directory: &'a Path,
    config: &'a ExperimentConfig,
    blank: Spectrum,
    lookup: WavelengthLookup,
}

impl Pipeline<'_> {
    fn differenced(&self, samples: &[PathBuf]) -> Result<BaselineCorrectedTable> {
        let spectra = samples
            .iter()
            .map(|path| {
                info!("reading {path:?}");
                Spectrum::from_file(&self.working_directory.join(path), self.config.warm_up_rows)
            })
            .collect::<Result<Vec<_>>>()?;
        difference(&self.blank, &spectra, self.config.alignment)
    }

    fn concentrations(
        &self,
        samples: &[PathBuf],
        calibration: &CalibrationLine,
    ) -> Result<Vec<f64>> {
        let table = self.differenced(samples)?;
        concentrations(
            &table,
            self.config.excitation_wavelength,
            self.lookup,
            calibration,
        )
    }

    fn kinetics(
        &self,
        config: &KineticsConfig,
        calibration: &CalibrationLine,
        exporter: Option<&Exporter>,
    ) -> Result<KineticsReport> {
        if config.times.len() != config.samples.len() {
            return Err(Error::input_shape(format!(
                "{} sampling times for {} kinetics spectra",
                config.times.len(),
                config.samples.len()
            )));
        }

        let concentrations = self.concentrations(&config.samples, calibration)?;
        let quantities = adsorption_quantity(&concentrations, &config.vessel)?;

        let pseudo_first_order = kinetics::fit(
            KineticModel::PseudoFirstOrder {
                equilibrium_quantity: config.equilibrium_quantity,
            },
            &config.times,
            &quantities,
        )?;
        let pseudo_second_order =
            kinetics::fit(KineticModel::PseudoSecondOrder, &config.times, &quantities)?;
        let intraparticle_diffusion = kinetics::fit(
            KineticModel::IntraparticleDiffusion,
            &config.times,
            &quantities,
        )?;

        if let Some(exporter) = exporter {
            exporter.series(&config.label, "concentration", &concentrations)?;
            exporter.series(&config.label, "quantity", &quantities)?;
            exporter.series(&config.label, "pfo_y", &pseudo_first_order.linearization.y)?;
            exporter.series(&config.label, "pso_y", &pseudo_second_order.linearization.y)?;
        }

        Ok(KineticsReport {
            times: config.times.clone(),
            concentrations,
            quantities,
            pseudo_first_order,
            pseudo_second_order,
            intraparticle_diffusion,
        })
    }

    fn isotherm(
        &self,
        config: &IsothermConfig,
        calibration: &CalibrationLine,
        exporter: Option<&Exporter>,
    ) -> Result<IsothermReport> {
        let mut accumulator = IsothermAccumulator::new(config.saturation_offset);
        let mut final_concentrations = Vec::with_capacity(config.runs.len());

        for run in &config.runs {
            let concentrations = self.concentrations(run, calibration)?;
            let quantities = adsorption_quantity(&concentrations, &config.vessel)?;
            accumulator = accumulator.with_run(&quantities)?;
            if let Some(&last) = concentrations.last() {
                final_concentrations.push(last);
            }
        }

        let equilibrium_concentrations = match &config.equilibrium_concentrations {
            Some(ce) if ce.len() != accumulator.len() => {
                return Err(Error::input_shape(format!(
                    "{} equilibrium concentrations for {} isotherm runs",
                    ce.len(),
                    accumulator.len()
                )))
            }
            Some(ce) => ce.clone(),
            None => final_concentrations,
        };

        if let Some(exporter) = exporter {
            exporter.series(
                exporter.kind().as_str(),
                "isotherm_y",
                accumulator.saturation(),
            )?;
        }

        let langmuir = isotherm::fit(
            IsothermModel::Langmuir,
            &equilibrium_concentrations,
            accumulator.saturation(),
            config.langmuir_guess,
            self.config.verbose_fit,
        )?;
        let freundlich = isotherm::fit(
            IsothermModel::Freundlich,
            &equilibrium_concentrations,
            accumulator.saturation(),
            config.freundlich_guess,
            self.config.verbose_fit,
        )?;

        Ok(IsothermReport {
            equilibrium_concentrations,
            saturation: accumulator.into_inner(),
            langmuir,
            freundlich,
        })
    }
}
