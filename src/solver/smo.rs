//! SMO solver for the epsilon-SVR dual problem
//!
//! The epsilon-SVR dual is solved in its standard 2l-variable form: for l
//! training samples the variables are (alpha_1..alpha_l, alpha*_1..alpha*_l)
//! in the box [0, C], with signs +1 for the first half and -1 for the
//! second, subject to sum(sign_t * alpha_t) = 0. Each iteration picks the
//! maximal violating pair, solves the two-variable subproblem analytically,
//! clips to the box, and maintains the gradient. Convergence is declared
//! when the KKT violation gap drops below the configured tolerance on the
//! full variable set; the shrinking heuristic only narrows the set searched
//! in between.

use crate::cache::KernelCache;
use crate::core::{HyperParameters, Result, SvmNode, SvrError};
use crate::kernel::Kernel;
use log::debug;
use std::sync::Arc;

/// Guard for a non-positive curvature in the two-variable subproblem
const TAU: f64 = 1e-12;

/// Solver configuration derived from the engine hyperparameters
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Box constraint on the dual variables
    pub c: f64,
    /// Epsilon-insensitivity (width of the zero-loss tube)
    pub p: f64,
    /// Stopping tolerance on the KKT violation gap
    pub eps: f64,
    /// Enable periodic shrinking of bounded variables
    pub shrinking: bool,
    /// Kernel cache budget in megabytes
    pub cache_size_mb: usize,
    /// Hard iteration cap
    pub max_iterations: usize,
}

impl SolverOptions {
    /// Derive solver options from engine hyperparameters
    pub fn from_params(params: &HyperParameters) -> Self {
        Self {
            c: params.c,
            p: params.p,
            eps: params.eps,
            shrinking: params.shrinking,
            cache_size_mb: params.cache_size,
            max_iterations: 10_000_000,
        }
    }
}

/// Result of solving the epsilon-SVR dual
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Per-sample coefficients beta_i = alpha_i - alpha*_i
    pub beta: Vec<f64>,
    /// Bias term of the decision function
    pub bias: f64,
    /// Iterations performed before convergence
    pub iterations: usize,
}

/// SMO solver for epsilon-SVR
pub struct SmoSvrSolver<K: Kernel> {
    kernel: Arc<K>,
    options: SolverOptions,
}

/// Internal solver state over the 2l-variable problem
struct SolverState<'a, K: Kernel> {
    kernel: &'a K,
    nodes: &'a [Vec<SvmNode>],
    l: usize,
    c: f64,
    alpha: Vec<f64>,
    /// Linear term of the dual objective: p - sign_t * y_t
    linear: Vec<f64>,
    grad: Vec<f64>,
    cache: KernelCache,
}

impl<K: Kernel> SmoSvrSolver<K> {
    /// Create a new solver with the given kernel and options
    pub fn new(kernel: K, options: SolverOptions) -> Self {
        Self {
            kernel: Arc::new(kernel),
            options,
        }
    }

    /// Solve the dual for sentinel-terminated sample vectors and labels
    pub fn solve(&self, nodes: &[Vec<SvmNode>], labels: &[f64]) -> Result<SolveResult> {
        if nodes.is_empty() || nodes.len() != labels.len() {
            return Err(SvrError::OptimizationError(format!(
                "malformed problem: {} vectors, {} labels",
                nodes.len(),
                labels.len()
            )));
        }

        let l = labels.len();
        let n = 2 * l;

        let linear: Vec<f64> = (0..n)
            .map(|t| self.options.p - sign(t, l) * labels[t % l])
            .collect();

        let mut state = SolverState {
            kernel: self.kernel.as_ref(),
            nodes,
            l,
            c: self.options.c,
            alpha: vec![0.0; n],
            // With all variables at zero the gradient equals the linear term
            grad: linear.clone(),
            linear,
            cache: KernelCache::with_budget_mb(self.options.cache_size_mb),
        };

        let mut active: Vec<usize> = (0..n).collect();
        let shrink_period = n.clamp(1, 1000);
        let mut next_shrink = shrink_period;
        let mut iterations = 0;

        while iterations < self.options.max_iterations {
            if self.options.shrinking && iterations >= next_shrink {
                state.shrink(&mut active);
                next_shrink = iterations + shrink_period;
            }

            let Some((i, j, gap)) = state.select_working_pair(&active) else {
                // No feasible pair on the active set; fall back to the full set
                if active.len() == n {
                    break;
                }
                state.reconstruct_gradient();
                active = (0..n).collect();
                continue;
            };

            if gap < self.options.eps {
                if active.len() == n {
                    break;
                }
                // Converged on the shrunk set only; re-check everything
                state.reconstruct_gradient();
                active = (0..n).collect();
                continue;
            }

            state.update_pair(i, j, &active);
            iterations += 1;
        }

        if iterations >= self.options.max_iterations {
            return Err(SvrError::OptimizationError(format!(
                "iteration cap of {} reached without convergence",
                self.options.max_iterations
            )));
        }

        let bias = -state.calculate_rho();
        let beta: Vec<f64> = (0..l).map(|i| state.alpha[i] - state.alpha[i + l]).collect();

        debug!(
            "SMO converged after {} iterations (kernel cache hit rate {:.1}%)",
            iterations,
            state.cache.hit_rate() * 100.0
        );

        Ok(SolveResult {
            beta,
            bias,
            iterations,
        })
    }
}

/// Sign of dual variable t: +1 for alpha_i, -1 for alpha*_i
fn sign(t: usize, l: usize) -> f64 {
    if t < l {
        1.0
    } else {
        -1.0
    }
}

impl<K: Kernel> SolverState<'_, K> {
    fn sign(&self, t: usize) -> f64 {
        sign(t, self.l)
    }

    /// Kernel value between the samples underlying variables s and t
    fn k(&mut self, s: usize, t: usize) -> f64 {
        let (si, ti) = (s % self.l, t % self.l);
        let (nodes, kernel) = (self.nodes, self.kernel);
        self.cache
            .get_or_compute(si, ti, || kernel.compute(&nodes[si], &nodes[ti]))
    }

    fn is_upper_bound(&self, t: usize) -> bool {
        self.alpha[t] >= self.c
    }

    fn is_lower_bound(&self, t: usize) -> bool {
        self.alpha[t] <= 0.0
    }

    fn in_i_up(&self, t: usize) -> bool {
        if self.sign(t) > 0.0 {
            !self.is_upper_bound(t)
        } else {
            !self.is_lower_bound(t)
        }
    }

    fn in_i_low(&self, t: usize) -> bool {
        if self.sign(t) > 0.0 {
            !self.is_lower_bound(t)
        } else {
            !self.is_upper_bound(t)
        }
    }

    /// Maximal-violating-pair selection over the active set.
    ///
    /// Returns (i, j, gap) where i maximizes -sign*grad over I_up, j
    /// minimizes it over I_low, and gap is the KKT violation m - M.
    fn select_working_pair(&self, active: &[usize]) -> Option<(usize, usize, f64)> {
        let mut m = f64::NEG_INFINITY;
        let mut i = None;
        let mut mm = f64::INFINITY;
        let mut j = None;

        for &t in active {
            let v = -self.sign(t) * self.grad[t];
            if self.in_i_up(t) && v > m {
                m = v;
                i = Some(t);
            }
            if self.in_i_low(t) && v < mm {
                mm = v;
                j = Some(t);
            }
        }

        Some((i?, j?, m - mm))
    }

    /// Analytic two-variable update with box clipping
    fn update_pair(&mut self, i: usize, j: usize, active: &[usize]) {
        let (si, sj) = (self.sign(i), self.sign(j));
        let ss = si * sj;

        let kii = self.k(i, i);
        let kjj = self.k(j, j);
        let kij = self.k(i, j);
        let eta = (kii + kjj - 2.0 * kij).max(TAU);

        // Unconstrained minimizer along the feasible direction, then clip
        // so both variables stay in [0, C]
        let mut step = -(self.grad[i] - ss * self.grad[j]) / eta;

        let mut lo = -self.alpha[i];
        let mut hi = self.c - self.alpha[i];
        if ss > 0.0 {
            lo = lo.max(self.alpha[j] - self.c);
            hi = hi.min(self.alpha[j]);
        } else {
            lo = lo.max(-self.alpha[j]);
            hi = hi.min(self.c - self.alpha[j]);
        }
        step = step.clamp(lo, hi);

        self.alpha[i] = (self.alpha[i] + step).clamp(0.0, self.c);
        self.alpha[j] = (self.alpha[j] - ss * step).clamp(0.0, self.c);

        for &t in active {
            let kti = self.k(t, i);
            let ktj = self.k(t, j);
            self.grad[t] += self.sign(t) * si * step * (kti - ktj);
        }
    }

    /// Recompute the full gradient from scratch after reactivation
    fn reconstruct_gradient(&mut self) {
        let n = 2 * self.l;
        self.grad.copy_from_slice(&self.linear);
        for u in 0..n {
            if self.alpha[u] == 0.0 {
                continue;
            }
            let su = self.sign(u);
            let au = self.alpha[u];
            for t in 0..n {
                let ktu = self.k(t, u);
                self.grad[t] += self.sign(t) * su * au * ktu;
            }
        }
    }

    /// Shrink bounded variables that cannot re-enter the working set soon
    fn shrink(&self, active: &mut Vec<usize>) {
        let mut gmax1 = f64::NEG_INFINITY; // max over I_up of -sign*grad
        let mut gmax2 = f64::NEG_INFINITY; // max over I_low of sign*grad
        for &t in active.iter() {
            if self.in_i_up(t) {
                gmax1 = gmax1.max(-self.sign(t) * self.grad[t]);
            }
            if self.in_i_low(t) {
                gmax2 = gmax2.max(self.sign(t) * self.grad[t]);
            }
        }

        active.retain(|&t| !self.should_shrink(t, gmax1, gmax2));
    }

    fn should_shrink(&self, t: usize, gmax1: f64, gmax2: f64) -> bool {
        if self.is_upper_bound(t) {
            if self.sign(t) > 0.0 {
                -self.grad[t] > gmax1
            } else {
                self.grad[t] > gmax2
            }
        } else if self.is_lower_bound(t) {
            if self.sign(t) > 0.0 {
                self.grad[t] > gmax2
            } else {
                -self.grad[t] > gmax1
            }
        } else {
            false
        }
    }

    /// Bias offset of the converged solution (libsvm's rho)
    fn calculate_rho(&self) -> f64 {
        let n = 2 * self.l;
        let mut ub = f64::INFINITY;
        let mut lb = f64::NEG_INFINITY;
        let mut sum_free = 0.0;
        let mut n_free = 0usize;

        for t in 0..n {
            let yg = self.sign(t) * self.grad[t];
            if self.is_upper_bound(t) {
                if self.sign(t) < 0.0 {
                    ub = ub.min(yg);
                } else {
                    lb = lb.max(yg);
                }
            } else if self.is_lower_bound(t) {
                if self.sign(t) > 0.0 {
                    ub = ub.min(yg);
                } else {
                    lb = lb.max(yg);
                }
            } else {
                n_free += 1;
                sum_free += yg;
            }
        }

        if n_free > 0 {
            sum_free / n_free as f64
        } else {
            (ub + lb) / 2.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::RbfKernel;
    use crate::problem::feature_vector;
    use approx::assert_relative_eq;

    fn options(c: f64, p: f64) -> SolverOptions {
        SolverOptions {
            c,
            p,
            eps: 1e-3,
            shrinking: true,
            cache_size_mb: 1,
            max_iterations: 100_000,
        }
    }

    fn solve(inputs: &[f64], targets: &[f64], c: f64, p: f64) -> SolveResult {
        let nodes: Vec<Vec<SvmNode>> = inputs.iter().map(|&x| feature_vector(x)).collect();
        let solver = SmoSvrSolver::new(RbfKernel::new(0.5), options(c, p));
        solver.solve(&nodes, targets).expect("solve should succeed")
    }

    fn decision(result: &SolveResult, inputs: &[f64], x: f64) -> f64 {
        let kernel = RbfKernel::new(0.5);
        let xv = feature_vector(x);
        let mut sum = result.bias;
        for (i, &input) in inputs.iter().enumerate() {
            sum += result.beta[i] * kernel.compute(&feature_vector(input), &xv);
        }
        sum
    }

    #[test]
    fn test_constant_targets_converge_to_bias_only_solution() {
        let inputs = [0.0, 1.0, 2.0];
        let targets = [5.0, 5.0, 5.0];
        let result = solve(&inputs, &targets, 100.0, 0.05);

        assert_eq!(result.iterations, 0);
        assert!(result.beta.iter().all(|&b| b == 0.0));
        assert_relative_eq!(result.bias, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_equality_constraint_and_box_hold() {
        let inputs = [0.3, 0.5, 0.7, 0.9, 1.1, 1.3, 1.5];
        let targets = [14.2, 13.8, 13.1, 12.0, 10.5, 9.1, 8.0];
        let result = solve(&inputs, &targets, 100.0, 0.05);

        let beta_sum: f64 = result.beta.iter().sum();
        assert_relative_eq!(beta_sum, 0.0, epsilon = 1e-6);
        assert!(result.beta.iter().all(|&b| b.abs() <= 100.0 + 1e-9));
    }

    #[test]
    fn test_two_point_fit_stays_near_targets() {
        let inputs = [0.0, 1.0];
        let targets = [0.0, 1.0];
        let result = solve(&inputs, &targets, 100.0, 0.001);

        for (&x, &y) in inputs.iter().zip(targets.iter()) {
            let f = decision(&result, &inputs, x);
            assert!(
                (f - y).abs() < 0.1,
                "prediction {f} too far from target {y}"
            );
        }
    }

    #[test]
    fn test_reference_dataset_training_fit() {
        let inputs = [0.3, 0.5, 0.7, 0.9, 1.1, 1.3, 1.5];
        let targets = [14.2, 13.8, 13.1, 12.0, 10.5, 9.1, 8.0];
        let result = solve(&inputs, &targets, 100.0, 0.05);

        for (&x, &y) in inputs.iter().zip(targets.iter()) {
            let f = decision(&result, &inputs, x);
            assert!(f.is_finite());
            assert!(
                (f - y).abs() < 1.0,
                "prediction {f} too far from target {y}"
            );
        }
    }

    #[test]
    fn test_shrinking_flag_does_not_change_result() {
        let inputs = [0.3, 0.5, 0.7, 0.9, 1.1];
        let targets = [1.0, 2.0, 1.5, 0.5, 1.0];
        let nodes: Vec<Vec<SvmNode>> = inputs.iter().map(|&x| feature_vector(x)).collect();

        let mut opts = options(10.0, 0.01);
        opts.shrinking = false;
        let plain = SmoSvrSolver::new(RbfKernel::new(0.5), opts)
            .solve(&nodes, &targets)
            .unwrap();
        let shrunk = SmoSvrSolver::new(RbfKernel::new(0.5), options(10.0, 0.01))
            .solve(&nodes, &targets)
            .unwrap();

        for x in [0.3, 0.8, 1.1] {
            let a = decision(&plain, &inputs, x);
            let b = decision(&shrunk, &inputs, x);
            assert!(
                (a - b).abs() < 0.05,
                "shrinking changed the solution: {a} vs {b}"
            );
        }
    }

    #[test]
    fn test_malformed_problem_is_rejected() {
        let solver = SmoSvrSolver::new(RbfKernel::new(0.5), options(1.0, 0.1));
        let nodes = vec![feature_vector(0.0)];
        let err = solver.solve(&nodes, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, SvrError::OptimizationError(_)));
    }
}
