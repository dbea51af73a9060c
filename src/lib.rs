#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// #![warn(clippy::cargo)]

extern crate blas_src;

pub mod adsorption;
pub mod calibration;
mod error;
pub mod experiment;
pub mod export;
pub mod isotherm;
pub mod kinetics;
pub mod labels;
pub mod math;
pub(crate) mod minimisation;
pub mod regression;
pub mod spectrum;

pub use error::Error;

pub type Result<T> = ::std::result::Result<T, Error>;
