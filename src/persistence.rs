//! Model serialization and persistence
//!
//! The engine's native model format: pretty-printed JSON holding the
//! support-vector expansion plus metadata. The pipeline only ever writes
//! this format; the load path exists for tests and external tooling.

use crate::core::{HyperParameters, Result, SvmNode, SvrError};
use crate::engine::SvrModel;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained SVR model
#[derive(Serialize, Deserialize)]
pub struct SerializableModel {
    /// Kernel type identifier
    pub kernel_type: String,
    /// RBF kernel width
    pub gamma: f64,
    /// Support vectors (terminators stripped)
    pub support_vectors: Vec<SerializableVector>,
    /// Dual coefficients aligned with `support_vectors`
    pub coefficients: Vec<f64>,
    /// Bias term
    pub bias: f64,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Serializable sparse vector: parallel index/value arrays
#[derive(Serialize, Deserialize, Clone)]
pub struct SerializableVector {
    pub indices: Vec<i32>,
    pub values: Vec<f64>,
}

/// Model metadata for tracking and validation
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors
    pub n_support_vectors: usize,
    /// Training parameters used
    pub training_params: TrainingParams,
    /// Creation timestamp
    pub created_at: String,
}

/// Training parameters recorded for reference
#[derive(Serialize, Deserialize)]
pub struct TrainingParams {
    pub c: f64,
    pub p: f64,
    pub gamma: f64,
    pub eps: f64,
}

impl SerializableVector {
    fn from_nodes(nodes: &[SvmNode]) -> Self {
        let live = nodes.iter().take_while(|n| !n.is_terminator());
        let (indices, values) = live.map(|n| (n.index, n.value)).unzip();
        Self { indices, values }
    }

    fn to_nodes(&self) -> Vec<SvmNode> {
        let mut nodes: Vec<SvmNode> = self
            .indices
            .iter()
            .zip(self.values.iter())
            .map(|(&i, &v)| SvmNode::new(i, v))
            .collect();
        nodes.push(SvmNode::terminator());
        nodes
    }
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_model(model: &SvrModel) -> Self {
        let params = model.params();
        Self {
            kernel_type: model.kernel_name().to_string(),
            gamma: model.gamma(),
            support_vectors: model
                .support_vectors()
                .iter()
                .map(|v| SerializableVector::from_nodes(v))
                .collect(),
            coefficients: model.coefficients().to_vec(),
            bias: model.bias(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_support_vectors: model.n_support_vectors(),
                training_params: TrainingParams {
                    c: params.c,
                    p: params.p,
                    gamma: params.gamma,
                    eps: params.eps,
                },
                created_at: Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save the model to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SvrError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SvrError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load a serialized model from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SvrError::IoError)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SvrError::SerializationError(e.to_string()))
    }

    /// Reconstruct a usable model
    pub fn to_model(&self) -> Result<SvrModel> {
        if self.kernel_type != "rbf" {
            return Err(SvrError::InvalidParameters(format!(
                "unsupported kernel type in model file: {}",
                self.kernel_type
            )));
        }
        if self.support_vectors.len() != self.coefficients.len() {
            return Err(SvrError::SerializationError(format!(
                "support vector / coefficient mismatch: {} vs {}",
                self.support_vectors.len(),
                self.coefficients.len()
            )));
        }

        let params = HyperParameters {
            c: self.metadata.training_params.c,
            p: self.metadata.training_params.p,
            gamma: self.metadata.training_params.gamma,
            eps: self.metadata.training_params.eps,
            ..Default::default()
        };

        Ok(SvrModel::from_parts(
            self.gamma,
            self.support_vectors.iter().map(|v| v.to_nodes()).collect(),
            self.coefficients.clone(),
            self.bias,
            params,
        ))
    }
}
