use thiserror::Error;

/// Failures surfaced by the processing pipeline
///
/// Every stage returns these to the caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// Row or column counts disagree between inputs that must be aligned
    #[error("input shape mismatch: {0}")]
    InputShape(String),
    /// The excitation wavelength is not present on the wavelength axis
    #[error("excitation wavelength {wavelength} nm not found on the wavelength axis")]
    Lookup { wavelength: f64 },
    /// Division by zero or a logarithm of a non-positive value
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
    #[error("{model} fit failed to converge from initial guess {guess:?}: {reason}")]
    FitConvergence {
        model: &'static str,
        guess: Vec<f64>,
        reason: String,
    },
    /// An unrecognised categorical tag, such as an experiment kind or locale
    #[error("unrecognised {what}: {value:?}")]
    Usage { what: &'static str, value: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Linalg(#[from] ndarray_linalg::error::LinalgError),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl Error {
    pub(crate) fn input_shape(message: impl Into<String>) -> Self {
        Self::InputShape(message.into())
    }

    pub(crate) fn arithmetic(message: impl Into<String>) -> Self {
        Self::Arithmetic(message.into())
    }
}
