use std::fs;
use std::path::Path;

use itertools::Itertools;
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single fluorometer reading: intensity against wavelength, in file order
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    wavelength: Vec<f64>,
    intensity: Vec<f64>,
}

#[derive(Deserialize)]
struct Row(f64, f64);

impl Spectrum {
    pub fn new(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (wavelength, intensity) = points.into_iter().unzip();
        Self {
            wavelength,
            intensity,
        }
    }

    /// Create a `Spectrum` from an on-disk representation
    ///
    /// The file is a two column csv (wavelength, intensity) with a header row. The first
    /// `warm_up_rows` data rows are instrument warm-up noise and are discarded unread.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a retained row is not a pair of numbers.
    pub fn from_file(filepath: &Path, warm_up_rows: usize) -> Result<Self> {
        let file = fs::read(filepath)?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(&file[..]);

        let mut wavelength = vec![];
        let mut intensity = vec![];

        for result in rdr.deserialize().skip(warm_up_rows) {
            let record: Row = result?;
            wavelength.push(record.0);
            intensity.push(record.1);
        }
        debug!("read {} rows from {filepath:?}", wavelength.len());

        Ok(Self {
            wavelength,
            intensity,
        })
    }

    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    pub fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }
}

/// How to treat sample spectra whose row count differs from the blank
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Use only the rows every spectrum shares
    #[default]
    Truncate,
    /// Refuse to difference spectra of unequal length
    Strict,
}

/// How a wavelength is located on the table's wavelength axis
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum WavelengthLookup {
    /// Bit-for-bit equality with the stored axis value, first match wins
    #[default]
    Exact,
    /// The closest axis value, provided it lies within `tolerance` nm
    Nearest { tolerance: f64 },
}

/// Blank-subtracted intensities: one wavelength axis and one column per sample
#[derive(Clone, Debug, PartialEq)]
pub struct BaselineCorrectedTable {
    wavelength: Array1<f64>,
    /// (rows x samples), columns in the order the samples were supplied
    deltas: Array2<f64>,
}

impl BaselineCorrectedTable {
    pub fn row_count(&self) -> usize {
        self.wavelength.len()
    }

    /// The wavelength column plus one column per sample
    pub fn column_count(&self) -> usize {
        1 + self.sample_count()
    }

    pub fn sample_count(&self) -> usize {
        self.deltas.ncols()
    }

    pub fn wavelength(&self) -> ArrayView1<f64> {
        self.wavelength.view()
    }

    pub fn column(&self, sample: usize) -> Option<ArrayView1<f64>> {
        (sample < self.sample_count()).then(|| self.deltas.column(sample))
    }

    /// Each wavelength with the deltas of every sample at it, in axis order
    pub fn rows(&self) -> impl Iterator<Item = (f64, ArrayView1<f64>)> + '_ {
        self.wavelength.iter().copied().zip(self.deltas.rows())
    }

    /// Index of the row holding `wavelength`
    ///
    /// # Errors
    /// Returns [`Error::Lookup`] if no row matches under `lookup`.
    #[allow(clippy::float_cmp)]
    pub fn row_index(&self, wavelength: f64, lookup: WavelengthLookup) -> Result<usize> {
        let found = match lookup {
            WavelengthLookup::Exact => self.wavelength.iter().position(|&w| w == wavelength),
            WavelengthLookup::Nearest { tolerance } => self
                .wavelength
                .iter()
                .map(|w| (w - wavelength).abs())
                .position_min_by(f64::total_cmp)
                .filter(|&ii| (self.wavelength[ii] - wavelength).abs() <= tolerance),
        };
        found.ok_or(Error::Lookup { wavelength })
    }

    /// The intensity delta of every sample at `wavelength`, in sample order
    ///
    /// # Errors
    /// Returns [`Error::Lookup`] if no row matches under `lookup`.
    pub fn row_at(&self, wavelength: f64, lookup: WavelengthLookup) -> Result<ArrayView1<f64>> {
        let index = self.row_index(wavelength, lookup)?;
        Ok(self.deltas.row(index))
    }
}

/// Subtract the blank from every sample spectrum
///
/// Rows are aligned by position, not by wavelength value: row `i` of every sample is paired with
/// row `i` of `reference`, and the output wavelength axis is the reference's. Of the `n` rows
/// shared by all spectra the final one is dropped, so the table holds `n - 1` rows.
///
/// # Errors
/// Returns [`Error::InputShape`] if fewer than two rows are shared, or if `alignment` is
/// [`Alignment::Strict`] and any sample length differs from the reference.
pub fn difference(
    reference: &Spectrum,
    samples: &[Spectrum],
    alignment: Alignment,
) -> Result<BaselineCorrectedTable> {
    if let Some((ii, sample)) = samples
        .iter()
        .find_position(|sample| sample.len() != reference.len())
    {
        match alignment {
            Alignment::Strict => {
                return Err(Error::input_shape(format!(
                    "sample {ii} has {} rows but the blank has {}",
                    sample.len(),
                    reference.len()
                )))
            }
            Alignment::Truncate => warn!(
                "sample {ii} has {} rows but the blank has {}, truncating to the shortest",
                sample.len(),
                reference.len()
            ),
        }
    }

    let shared = samples
        .iter()
        .map(Spectrum::len)
        .fold(reference.len(), usize::min);
    if shared < 2 {
        return Err(Error::input_shape(format!(
            "at least two aligned rows are needed, found {shared}"
        )));
    }
    let rows = shared - 1;

    let wavelength = Array1::from_iter(reference.wavelength[..rows].iter().copied());
    let deltas = Array2::from_shape_fn((rows, samples.len()), |(row, col)| {
        samples[col].intensity[row] - reference.intensity[row]
    });

    Ok(BaselineCorrectedTable { wavelength, deltas })
}
