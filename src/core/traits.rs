//! Capability traits at the regression-engine boundary

use crate::core::{HyperParameters, Result, SvmNode, TrainingProblem};
use std::path::Path;

/// A black-box regression engine exposing a train/predict contract
///
/// The pipeline drives any implementation through this trait and never
/// looks inside the trained model. The explicit release half of the
/// engine contract (release(model), release(problem)) is supplied by
/// Drop on the owned values.
pub trait RegressionEngine {
    type Model: RegressionModel;

    /// Validate a configuration against a problem before training.
    ///
    /// Returns `Some(diagnostic)` when the configuration is unusable;
    /// training must never be attempted in that case.
    fn check_parameters(
        &self,
        problem: &TrainingProblem,
        params: &HyperParameters,
    ) -> Option<String>;

    /// Train a model. Atomic from the caller's perspective: there is no
    /// partial or resumable training.
    fn train(&self, problem: &TrainingProblem, params: &HyperParameters) -> Result<Self::Model>;
}

/// A trained regression model
pub trait RegressionModel {
    /// Predict the output for one sentinel-terminated feature vector
    fn predict(&self, x: &[SvmNode]) -> f64;

    /// Persist the model in the engine's native format
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Number of support vectors retained by the model
    fn n_support_vectors(&self) -> usize;

    /// Bias term of the decision function
    fn bias(&self) -> f64;
}
