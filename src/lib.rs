//! # var-rs
//!
//! Vector autoregressive models for multivariate time series: OLS
//! estimation with a pseudoinverse fallback, recursive forecasts,
//! orthogonalized impulse responses and pairwise Granger causality tests.
//!
//! ```ignore
//! use var_rs::io::load::load_csv;
//! use var_rs::var::{DeterministicTerm, EstimatorExt, ModelSpec, OlsEstimator, ReducedFormExt};
//!
//! let ts = load_csv("surveillance.csv")?;
//! let model = OlsEstimator::default().estimate(&ts, ModelSpec::endogenous(2, DeterministicTerm::Constant))?;
//! let path = model.forecast(ts.observations(), 10)?;
//! ```

pub mod error;
pub mod io;
pub mod report;
pub mod series;
pub mod var;
