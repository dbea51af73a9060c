use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The adsorption vessel: adsorbent in a solution sampled at every time point
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct Vessel {
    /// Mass of adsorbent (g)
    pub adsorbent_mass: f64,
    /// Solution volume at time zero (L)
    pub init_volume: f64,
    /// Volume withdrawn for each measurement (L)
    pub sample_volume: f64,
}

/// Adsorbed quantity per unit adsorbent mass at every time point
///
/// `concentrations[0]` is the zero-time baseline. Each reading that differs from the baseline
/// marks a withdrawal of `sample_volume` from the vessel, so later readings are corrected for the
/// plastic removed by earlier samples:
///
/// - a reading equal to the baseline gives `(m0 - V * c) / mass` and leaves `V` unchanged,
/// - a reading at index 0 or 1 gives the same expression, then `V` shrinks by `sample_volume`,
/// - any later reading subtracts `sample_volume * S[ind - 2]`, then `V` shrinks,
///
/// where `m0 = init_volume * concentrations[0]` and `S` is the running sum of the non-baseline
/// readings, in order. `S` skips baseline readings, so its index lags `ind` by two.
///
/// # Errors
/// Returns [`Error::Arithmetic`] for a zero adsorbent mass or a non-finite concentration, and
/// [`Error::InputShape`] for an empty series or when repeated baseline readings leave the lagged
/// running sum too short for a later reading.
#[allow(clippy::float_cmp)]
pub fn adsorption_quantity(concentrations: &[f64], vessel: &Vessel) -> Result<Vec<f64>> {
    if vessel.adsorbent_mass == 0.0 {
        return Err(Error::arithmetic(
            "adsorbent mass is zero, the adsorbed quantity per gram is undefined",
        ));
    }
    if let Some(c) = concentrations.iter().find(|c| !c.is_finite()) {
        return Err(Error::arithmetic(format!("non-finite concentration {c}")));
    }
    let Some(&baseline) = concentrations.first() else {
        return Err(Error::input_shape("no concentrations to balance"));
    };

    let initial_total_mass = vessel.init_volume * baseline;
    let withdrawn = concentrations
        .iter()
        .filter(|&&c| c != baseline)
        .scan(0.0, |sum, &c| {
            *sum += c;
            Some(*sum)
        })
        .collect::<Vec<f64>>();

    let mut remaining_volume = vessel.init_volume;
    let mut quantity = Vec::with_capacity(concentrations.len());

    for (ind, &c) in concentrations.iter().enumerate() {
        if c == baseline {
            quantity.push((initial_total_mass - remaining_volume * c) / vessel.adsorbent_mass);
            continue;
        }

        let q = if ind < 2 {
            (initial_total_mass - remaining_volume * c) / vessel.adsorbent_mass
        } else {
            let cumulative = withdrawn.get(ind - 2).ok_or_else(|| {
                Error::input_shape(format!(
                    "reading {ind} needs withdrawal sum {} but only {} non-baseline readings exist",
                    ind - 2,
                    withdrawn.len()
                ))
            })?;
            (initial_total_mass - remaining_volume * c - vessel.sample_volume * cumulative)
                / vessel.adsorbent_mass
        };
        quantity.push(q);
        remaining_volume -= vessel.sample_volume;
    }

    debug!("adsorbed quantities: {quantity:?}");
    Ok(quantity)
}

/// Saturation quantities gathered across the runs of an isotherm series
///
/// Each run, one initial concentration followed through time, contributes its largest adsorbed
/// quantity plus `saturation_offset`. The accumulator belongs to a single experiment series;
/// start a fresh one for every series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IsothermAccumulator {
    saturation_offset: f64,
    saturation: Vec<f64>,
}

impl Default for IsothermAccumulator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl IsothermAccumulator {
    pub const fn new(saturation_offset: f64) -> Self {
        Self {
            saturation_offset,
            saturation: vec![],
        }
    }

    /// Record the saturation quantity of one run
    ///
    /// # Errors
    /// Returns [`Error::InputShape`] if `quantities` is empty.
    pub fn with_run(mut self, quantities: &[f64]) -> Result<Self> {
        let peak = quantities
            .iter()
            .copied()
            .reduce(f64::max)
            .ok_or_else(|| Error::input_shape("an isotherm run has no adsorbed quantities"))?;
        self.saturation.push(peak + self.saturation_offset);
        Ok(self)
    }

    pub fn saturation(&self) -> &[f64] {
        &self.saturation
    }

    pub fn len(&self) -> usize {
        self.saturation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saturation.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.saturation
    }
}
