//! RBF (Radial Basis Function) kernel implementation
//!
//! K(x, y) = exp(-gamma * ||x - y||^2), where gamma controls the kernel
//! width. This is the only kernel the bundled engine trains with.

use crate::core::SvmNode;
use crate::kernel::Kernel;

/// RBF kernel: K(x, y) = exp(-gamma * ||x - y||^2)
#[derive(Debug, Clone, Copy)]
pub struct RbfKernel {
    gamma: f64,
}

impl RbfKernel {
    /// Create a new RBF kernel.
    ///
    /// # Panics
    /// Panics if gamma is not positive; parameter checking upstream is
    /// expected to reject such configurations before a kernel is built.
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "gamma must be positive, got: {gamma}");
        Self { gamma }
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Kernel for RbfKernel {
    fn compute(&self, x: &[SvmNode], y: &[SvmNode]) -> f64 {
        (-self.gamma * squared_euclidean_distance(x, y)).exp()
    }

    fn name(&self) -> &'static str {
        "rbf"
    }
}

/// Squared Euclidean distance between two sparse vectors.
///
/// Merge walk over the index-ordered nodes: matching indices contribute
/// (x_i - y_i)^2, unmatched indices contribute the square of the present
/// value. The terminator ends each vector.
fn squared_euclidean_distance(x: &[SvmNode], y: &[SvmNode]) -> f64 {
    let mut sum = 0.0;
    let mut i = 0;
    let mut j = 0;

    loop {
        let xn = x.get(i).filter(|n| !n.is_terminator());
        let yn = y.get(j).filter(|n| !n.is_terminator());

        match (xn, yn) {
            (Some(a), Some(b)) => {
                if a.index == b.index {
                    let d = a.value - b.value;
                    sum += d * d;
                    i += 1;
                    j += 1;
                } else if a.index < b.index {
                    sum += a.value * a.value;
                    i += 1;
                } else {
                    sum += b.value * b.value;
                    j += 1;
                }
            }
            (Some(a), None) => {
                sum += a.value * a.value;
                i += 1;
            }
            (None, Some(b)) => {
                sum += b.value * b.value;
                j += 1;
            }
            (None, None) => break,
        }
    }

    sum
}
