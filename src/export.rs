use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

use log::info;

use crate::labels::Kind;
use crate::spectrum::BaselineCorrectedTable;
use crate::Result;

/// Writes intermediate tables as csv under `<root>/<kind>/`
pub struct Exporter {
    directory: PathBuf,
    kind: Kind,
}

impl Exporter {
    /// # Errors
    /// Returns an error if the export directory cannot be created.
    pub fn new(root: &Path, kind: Kind) -> Result<Self> {
        let directory = root.join(kind.as_str());
        fs::create_dir_all(&directory)?;
        Ok(Self { directory, kind })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Write the differenced spectra as `<kind>.csv`
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn table(&self, table: &BaselineCorrectedTable) -> Result<PathBuf> {
        let path = self.directory.join(format!("{}.csv", self.kind));
        let mut wtr = csv::Writer::from_path(&path)?;

        let mut header = vec!["wavelength".to_owned()];
        header.extend((1..=table.sample_count()).map(|ii| format!("sample_{ii}")));
        wtr.write_record(&header)?;

        for (wavelength, deltas) in table.rows() {
            let record = iter::once(wavelength)
                .chain(deltas.iter().copied())
                .map(|value| value.to_string());
            wtr.write_record(record)?;
        }
        wtr.flush()?;

        info!("exported differenced spectra to {path:?}");
        Ok(path)
    }

    /// Write a single series as `<label>_<name>.csv`, one value per row
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn series(&self, label: &str, name: &str, values: &[f64]) -> Result<PathBuf> {
        let path = self.directory.join(format!("{label}_{name}.csv"));
        let mut wtr = csv::Writer::from_path(&path)?;

        wtr.write_record(["index", name])?;
        for (ii, value) in values.iter().enumerate() {
            wtr.write_record([ii.to_string(), value.to_string()])?;
        }
        wtr.flush()?;

        info!("exported {name} series to {path:?}");
        Ok(path)
    }
}
