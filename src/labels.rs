use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::Error;

/// Surface modification of the polystyrene particles under study
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    Carboxyl,
    Amino,
    Neutral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Locale {
    English,
    Chinese,
}

/// The figures produced for an experiment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Chart {
    /// Blank-subtracted intensity against wavelength, one line per standard
    Spectra,
    /// Intensity against concentration at the excitation wavelength
    StandardCurve,
    PseudoFirstOrder,
    PseudoSecondOrder,
    IntraparticleDiffusion,
    Langmuir,
    Freundlich,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

const ADSORBENT: &str = "CNF-AG";

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Carboxyl => "carboxyl",
            Self::Amino => "amino",
            Self::Neutral => "neutral",
        }
    }

    /// Name of the particle in the standard-curve titles
    const fn particle(self) -> &'static str {
        match self {
            Self::Carboxyl => "PS-COOH",
            Self::Amino => "PS-NH2",
            Self::Neutral => "PS",
        }
    }

    /// Name of the particle, with its surface charge, in the adsorption titles
    const fn charged_particle(self) -> &'static str {
        match self {
            Self::Carboxyl => "PSNPs(-)",
            Self::Amino => "PSNPs(+)",
            Self::Neutral => "PSNPs",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "carboxyl" => Ok(Self::Carboxyl),
            "amino" => Ok(Self::Amino),
            "neutral" => Ok(Self::Neutral),
            _ => Err(Error::Usage {
                what: "experiment kind",
                value: s.to_owned(),
            }),
        }
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "chinese" | "zh" => Ok(Self::Chinese),
            _ => Err(Error::Usage {
                what: "locale",
                value: s.to_owned(),
            }),
        }
    }
}

/// Title and axis labels for `chart`, in `locale`
pub fn labels(kind: Kind, chart: Chart, locale: Locale) -> ChartLabels {
    let particle = kind.particle();
    let charged = kind.charged_particle();
    let english = locale == Locale::English;

    let title = match (chart, english) {
        (Chart::Spectra, true) => {
            format!("The fluorescence intensity/concentration standard curve of {particle}")
        }
        (Chart::Spectra, false) => format!("{particle}的荧光强度-浓度标准曲线"),
        (Chart::StandardCurve, true) => {
            format!("The fluorescence intensity/concentration linearity curve of {particle}")
        }
        (Chart::StandardCurve, false) => format!("{particle}的荧光强度-浓度线性拟合曲线"),
        (Chart::PseudoFirstOrder, true) => format!(
            "Experimental data and calculated pseudo-first order curves of {ADSORBENT} for {charged} removal"
        ),
        (Chart::PseudoFirstOrder, false) => {
            format!("{ADSORBENT}去除{charged}的动力学一阶拟合数据曲线")
        }
        (Chart::PseudoSecondOrder, true) => format!(
            "Experimental data and calculated pseudo-second order curves of {ADSORBENT} for {charged} removal"
        ),
        (Chart::PseudoSecondOrder, false) => {
            format!("{ADSORBENT}去除{charged}的动力学二阶拟合数据曲线")
        }
        (Chart::IntraparticleDiffusion, true) => format!(
            "Experimental data and calculated intraparticle diffusion curves of {ADSORBENT} for {charged} removal"
        ),
        (Chart::IntraparticleDiffusion, false) => {
            format!("{ADSORBENT}去除{charged}的颗粒内扩散拟合数据曲线")
        }
        (Chart::Langmuir, true) => format!(
            "Experimental data and calculated Langmuir curves of {ADSORBENT} for {charged} removal"
        ),
        (Chart::Langmuir, false) => format!("{ADSORBENT}去除{charged}的Langmuir拟合数据曲线"),
        (Chart::Freundlich, true) => format!(
            "Experimental data and calculated Freundlich curves of {ADSORBENT} for {charged} removal"
        ),
        (Chart::Freundlich, false) => format!("{ADSORBENT}去除{charged}的Freundlich拟合数据曲线"),
    };

    let (x_label, y_label) = match chart {
        Chart::Spectra if english => ("Wave length(nm)", "Fluorescence intensity"),
        Chart::Spectra => ("波长(nm)", "荧光强度(10^4)"),
        Chart::StandardCurve if english => ("Concentration(mg/L)", "Fluorescence intensity"),
        Chart::StandardCurve => ("浓度(mg/L)", "荧光强度(10^4)"),
        Chart::PseudoFirstOrder => ("t(min)", "ln(qe - qt)"),
        Chart::PseudoSecondOrder => ("t(min)", "t/qt"),
        Chart::IntraparticleDiffusion => ("t^0.5(min^0.5)", "qt(mg/g)"),
        Chart::Langmuir | Chart::Freundlich => ("Ce(mg/L)", "qe(mg/g)"),
    };

    ChartLabels {
        title,
        x_label,
        y_label,
    }
}
