//! Kernel trait definition

use crate::core::SvmNode;

/// Kernel function over sentinel-terminated sparse feature vectors
///
/// Implementations must treat the terminator node as end-of-vector and
/// ignore anything after it.
pub trait Kernel: Send + Sync {
    /// Compute the kernel value K(x, y)
    fn compute(&self, x: &[SvmNode], y: &[SvmNode]) -> f64;

    /// Human-readable kernel name for diagnostics and model metadata
    fn name(&self) -> &'static str;
}
