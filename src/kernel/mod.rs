//! Kernel functions for the regression engine

pub mod rbf;
pub mod traits;

pub use self::rbf::*;
pub use self::traits::*;
