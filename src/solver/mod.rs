//! Dual-problem solvers for the regression engine

pub mod smo;

pub use self::smo::{SmoSvrSolver, SolveResult, SolverOptions};
