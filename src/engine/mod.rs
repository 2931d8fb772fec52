//! Bundled SMO-based regression engine
//!
//! `SmoEngine` is the in-crate implementation of the `RegressionEngine`
//! capability: it validates configurations against a problem, trains an
//! epsilon-SVR model with the SMO solver, and produces `SvrModel` handles
//! usable for prediction and persistence.

use crate::core::{
    HyperParameters, KernelType, RegressionEngine, RegressionModel, Result, SvmNode, SvmType,
    SvrError, TrainingProblem,
};
use crate::kernel::{Kernel, RbfKernel};
use crate::persistence::SerializableModel;
use crate::solver::{SmoSvrSolver, SolverOptions};
use log::{debug, info};
use std::path::Path;

/// SMO-based epsilon-SVR engine
///
/// Supports exactly the epsilon-SVR / RBF pairing; every other
/// formulation or kernel is rejected by `check_parameters` before
/// training can be attempted.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmoEngine;

impl SmoEngine {
    pub fn new() -> Self {
        Self
    }
}

impl RegressionEngine for SmoEngine {
    type Model = SvrModel;

    fn check_parameters(
        &self,
        problem: &TrainingProblem,
        params: &HyperParameters,
    ) -> Option<String> {
        if problem.is_empty() {
            return Some("training problem is empty".to_string());
        }
        if params.svm_type != SvmType::EpsilonSvr {
            return Some(format!(
                "svm type {:?} is not supported by this engine",
                params.svm_type
            ));
        }
        if params.kernel != KernelType::Rbf {
            return Some(format!(
                "kernel {:?} cannot be paired with epsilon-SVR in this engine; only Rbf is supported",
                params.kernel
            ));
        }
        if params.gamma <= 0.0 || !params.gamma.is_finite() {
            return Some(format!("gamma must be positive, got {}", params.gamma));
        }
        if params.c <= 0.0 || !params.c.is_finite() {
            return Some(format!("C must be positive, got {}", params.c));
        }
        if params.p < 0.0 || !params.p.is_finite() {
            return Some(format!("p must be non-negative, got {}", params.p));
        }
        if params.eps <= 0.0 || !params.eps.is_finite() {
            return Some(format!("eps must be positive, got {}", params.eps));
        }
        if !(params.nu > 0.0 && params.nu <= 1.0) {
            return Some(format!("nu must be in (0, 1], got {}", params.nu));
        }
        if params.cache_size == 0 {
            return Some("cache_size must be positive".to_string());
        }
        if params.probability {
            return Some("probability estimates are not supported by this engine".to_string());
        }
        None
    }

    fn train(&self, problem: &TrainingProblem, params: &HyperParameters) -> Result<Self::Model> {
        // Training never runs on an unchecked configuration
        if let Some(diagnostic) = self.check_parameters(problem, params) {
            return Err(SvrError::InvalidParameters(diagnostic));
        }

        let kernel = RbfKernel::new(params.gamma);
        let solver = SmoSvrSolver::new(kernel, SolverOptions::from_params(params));
        let result = solver.solve(problem.nodes(), problem.labels())?;

        let mut support_vectors = Vec::new();
        let mut coefficients = Vec::new();
        for (vector, &beta) in problem.nodes().iter().zip(result.beta.iter()) {
            if beta != 0.0 {
                support_vectors.push(vector.clone());
                coefficients.push(beta);
            }
        }

        info!(
            "trained epsilon-SVR model: {} support vectors out of {} samples",
            support_vectors.len(),
            problem.len()
        );
        debug!("bias = {:.6}, iterations = {}", result.bias, result.iterations);

        Ok(SvrModel {
            kernel,
            support_vectors,
            coefficients,
            bias: result.bias,
            params: params.clone(),
        })
    }
}

/// Trained epsilon-SVR model
///
/// Keeps only the support-vector expansion: samples with a nonzero dual
/// coefficient, their coefficients, and the bias term.
#[derive(Debug)]
pub struct SvrModel {
    kernel: RbfKernel,
    support_vectors: Vec<Vec<SvmNode>>,
    coefficients: Vec<f64>,
    bias: f64,
    params: HyperParameters,
}

impl SvrModel {
    pub(crate) fn from_parts(
        gamma: f64,
        support_vectors: Vec<Vec<SvmNode>>,
        coefficients: Vec<f64>,
        bias: f64,
        params: HyperParameters,
    ) -> Self {
        Self {
            kernel: RbfKernel::new(gamma),
            support_vectors,
            coefficients,
            bias,
            params,
        }
    }

    /// Number of support vectors retained by the model
    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    /// Bias term of the decision function
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// RBF gamma the model was trained with
    pub fn gamma(&self) -> f64 {
        self.kernel.gamma()
    }

    /// Name of the kernel the model was trained with
    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }

    /// Support vectors as sentinel-terminated node vectors
    pub fn support_vectors(&self) -> &[Vec<SvmNode>] {
        &self.support_vectors
    }

    /// Dual coefficients aligned with `support_vectors`
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Training parameters recorded at fit time
    pub fn params(&self) -> &HyperParameters {
        &self.params
    }
}

impl RegressionModel for SvrModel {
    fn predict(&self, x: &[SvmNode]) -> f64 {
        let mut sum = self.bias;
        for (sv, &coef) in self.support_vectors.iter().zip(self.coefficients.iter()) {
            sum += coef * self.kernel.compute(sv, x);
        }
        sum
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        SerializableModel::from_model(self).save_to_file(path)
    }

    fn n_support_vectors(&self) -> usize {
        SvrModel::n_support_vectors(self)
    }

    fn bias(&self) -> f64 {
        SvrModel::bias(self)
    }
}
