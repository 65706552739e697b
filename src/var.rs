//! # Vector autoregression
//!
//! $$
//! y_t=\nu+A_1y_{t-1}+\cdots+A_py_{t-p}+u_t
//! $$
//!
//! Estimation, forecasting, impulse responses and Granger causality for
//! reduced-form VAR(p) models.

mod design;
mod lstsq;

pub mod diagnostics;
pub mod estimator;
pub mod forecast;
pub mod granger;
pub mod irf;
pub mod model;
pub mod shocks;
pub mod spec;
pub mod stability;

pub use diagnostics::check_stationarity;
pub use diagnostics::AdfConfig;
pub use diagnostics::StationarityReport;
pub use estimator::EstimatorExt;
pub use estimator::OlsEstimator;
pub use granger::GrangerCausalityResult;
pub use granger::GrangerCausalityTester;
pub use granger::GrangerConfig;
pub use granger::GrangerMatrix;
pub use irf::ImpulseResponse;
pub use irf::ShockIdentification;
pub use lstsq::SolveMethod;
pub use model::ReducedFormExt;
pub use model::ReducedFormVar;
pub use shocks::ShockAnalysis;
pub use shocks::ShockAnalyzer;
pub use spec::DeterministicTerm;
pub use spec::EstimationConfig;
pub use spec::ModelSpec;
