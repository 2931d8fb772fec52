//! Core type definitions for the SVR pipeline

use crate::core::{Result, SvrError};
use serde::{Deserialize, Serialize};

/// Index value marking the end of a sparse feature vector.
///
/// The regression engine's wire format is an ordered list of
/// (index, value) nodes closed by a node with this index; the engine
/// relies on the terminator to know vector length without a separate
/// count field.
pub const TERMINATOR_INDEX: i32 = -1;

/// One entry of a sentinel-terminated sparse feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvmNode {
    pub index: i32,
    pub value: f64,
}

impl SvmNode {
    /// Create a new feature node
    pub fn new(index: i32, value: f64) -> Self {
        Self { index, value }
    }

    /// Create the end-of-vector terminator node
    pub fn terminator() -> Self {
        Self {
            index: TERMINATOR_INDEX,
            value: 0.0,
        }
    }

    /// Check whether this node marks the end of a vector
    pub fn is_terminator(&self) -> bool {
        self.index == TERMINATOR_INDEX
    }
}

/// Validated tabular dataset of (input, target) pairs
///
/// Construction is the precondition gate for the whole pipeline: both
/// sequences must have the same length, hold at least 2 samples, and
/// contain only finite values. No cleaning or transformation happens here.
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Vec<f64>,
    targets: Vec<f64>,
}

impl Dataset {
    /// Create a dataset from parallel input and target sequences
    pub fn new(inputs: Vec<f64>, targets: Vec<f64>) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(SvrError::InvalidDataset(format!(
                "inputs and targets differ in length: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.len() < 2 {
            return Err(SvrError::InvalidDataset(format!(
                "at least 2 samples required, got {}",
                inputs.len()
            )));
        }
        if let Some(v) = inputs
            .iter()
            .chain(targets.iter())
            .find(|v| !v.is_finite())
        {
            return Err(SvrError::InvalidDataset(format!(
                "non-finite value in dataset: {v}"
            )));
        }
        Ok(Self { inputs, targets })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Always false for a validated dataset; present for API completeness
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Input values in construction order
    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    /// Target values in construction order
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Iterate over (input, target) pairs in construction order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.inputs
            .iter()
            .copied()
            .zip(self.targets.iter().copied())
    }
}

/// SVM formulation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SvmType {
    /// Epsilon-insensitive support vector regression
    EpsilonSvr,
    /// Nu-parameterized support vector regression
    NuSvr,
}

/// Kernel function selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelType {
    Linear,
    Polynomial,
    Rbf,
    Sigmoid,
}

/// Training configuration for the regression engine
///
/// Immutable once handed to training. Fields that only apply to other
/// kernels or formulations (degree, coef0, nu) are still part of the
/// engine's parameter contract and carry inert defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HyperParameters {
    pub svm_type: SvmType,
    pub kernel: KernelType,
    /// RBF kernel width
    pub gamma: f64,
    /// Regularization parameter (box constraint on the dual variables)
    pub c: f64,
    /// Epsilon-insensitivity: width of the zero-loss tube
    pub p: f64,
    /// Stopping tolerance on the KKT violation gap
    pub eps: f64,
    /// Kernel cache budget in megabytes
    pub cache_size: usize,
    /// Enable the shrinking heuristic in the solver
    pub shrinking: bool,
    /// Request probability estimates (not supported by the bundled engine)
    pub probability: bool,
    /// Polynomial kernel degree (inert for RBF)
    pub degree: i32,
    /// Polynomial/sigmoid offset (inert for RBF)
    pub coef0: f64,
    /// Nu parameter for nu-SVR (inert for epsilon-SVR)
    pub nu: f64,
}

impl Default for HyperParameters {
    /// The reference configuration: epsilon-SVR with an RBF kernel
    fn default() -> Self {
        Self {
            svm_type: SvmType::EpsilonSvr,
            kernel: KernelType::Rbf,
            gamma: 0.5,
            c: 100.0,
            p: 0.05,
            eps: 1e-3,
            cache_size: 100,
            shrinking: true,
            probability: false,
            degree: 3,
            coef0: 0.0,
            nu: 0.5,
        }
    }
}

/// A dataset transformed into the engine's training format
///
/// One sentinel-terminated node vector and one label per sample, in
/// dataset order. Built once per training run and dropped after the
/// engine has consumed it.
#[derive(Debug, Clone)]
pub struct TrainingProblem {
    nodes: Vec<Vec<SvmNode>>,
    labels: Vec<f64>,
}

impl TrainingProblem {
    pub(crate) fn from_parts(nodes: Vec<Vec<SvmNode>>, labels: Vec<f64>) -> Self {
        debug_assert_eq!(nodes.len(), labels.len());
        Self { nodes, labels }
    }

    /// Number of training samples
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the problem holds no samples
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sentinel-terminated feature vectors, one per sample
    pub fn nodes(&self) -> &[Vec<SvmNode>] {
        &self.nodes
    }

    /// Labels, aligned with `nodes`
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }
}

/// One grid point paired with its predicted output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRow {
    pub input: f64,
    pub predicted: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminator_node() {
        let node = SvmNode::terminator();
        assert_eq!(node.index, TERMINATOR_INDEX);
        assert_eq!(node.value, 0.0);
        assert!(node.is_terminator());
        assert!(!SvmNode::new(1, 0.5).is_terminator());
    }

    #[test]
    fn test_dataset_accepts_two_samples() {
        let dataset = Dataset::new(vec![0.3, 0.5], vec![14.2, 13.8]).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.inputs(), &[0.3, 0.5]);
        assert_eq!(dataset.targets(), &[14.2, 13.8]);
    }

    #[test]
    fn test_dataset_rejects_length_mismatch() {
        let result = Dataset::new(vec![0.3, 0.5, 0.7], vec![14.2, 13.8]);
        assert!(matches!(result, Err(crate::core::SvrError::InvalidDataset(_))));
    }

    #[test]
    fn test_dataset_rejects_single_sample() {
        let result = Dataset::new(vec![0.3], vec![14.2]);
        assert!(matches!(result, Err(crate::core::SvrError::InvalidDataset(_))));
    }

    #[test]
    fn test_dataset_rejects_non_finite_values() {
        assert!(Dataset::new(vec![0.3, f64::NAN], vec![14.2, 13.8]).is_err());
        assert!(Dataset::new(vec![0.3, 0.5], vec![f64::INFINITY, 13.8]).is_err());
    }

    #[test]
    fn test_dataset_iteration_order() {
        let dataset = Dataset::new(vec![0.3, 0.5, 0.7], vec![14.2, 13.8, 13.1]).unwrap();
        let pairs: Vec<_> = dataset.iter().collect();
        assert_eq!(pairs, vec![(0.3, 14.2), (0.5, 13.8), (0.7, 13.1)]);
    }

    #[test]
    fn test_hyperparameters_reference_defaults() {
        let params = HyperParameters::default();
        assert_eq!(params.svm_type, SvmType::EpsilonSvr);
        assert_eq!(params.kernel, KernelType::Rbf);
        assert_eq!(params.gamma, 0.5);
        assert_eq!(params.c, 100.0);
        assert_eq!(params.p, 0.05);
        assert_eq!(params.eps, 1e-3);
        assert_eq!(params.cache_size, 100);
        assert!(params.shrinking);
        assert!(!params.probability);
        assert_eq!(params.degree, 3);
        assert_eq!(params.coef0, 0.0);
        assert_eq!(params.nu, 0.5);
    }
}
