//! Epsilon-SVR regression pipeline
//!
//! Fits a support vector regression model to a small tabular dataset,
//! reports training RMSE, predicts on a dense grid, and persists the
//! trained model. The training engine sits behind the `RegressionEngine`
//! capability trait; the bundled `SmoEngine` solves the epsilon-SVR dual
//! with sequential minimal optimization.

pub mod cache;
pub mod core;
pub mod engine;
pub mod kernel;
pub mod metrics;
pub mod persistence;
pub mod pipeline;
pub mod problem;
pub mod solver;

// Re-export main types for convenience
pub use crate::cache::KernelCache;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SvrError};
pub use crate::engine::{SmoEngine, SvrModel};
pub use crate::kernel::{Kernel, RbfKernel};
pub use crate::metrics::rmse;
pub use crate::pipeline::{GridSpec, PipelineConfig, PipelineReport};
pub use crate::solver::{SmoSvrSolver, SolveResult, SolverOptions};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
