//! Limited-memory BFGS (L-BFGS) minimization.
//!
//! L-BFGS approximates the inverse Hessian from the last `m` position and
//! gradient differences, which keeps memory linear in the number of
//! parameters. It is the solver behind logistic regression training.
//!
//! # Algorithm
//!
//! 1. Compute gradient `g_k` = ∇`f(x_k)`
//! 2. Compute search direction `d_k` using two-loop recursion
//! 3. Find step size `α_k` via backtracking line search (Armijo condition)
//! 4. Update: x_{k+1} = `x_k` + `α_k` * `d_k`
//! 5. Store position and gradient differences for the next iteration

use std::collections::VecDeque;

/// Outcome of a minimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// Gradient or objective change fell below tolerance.
    Converged,
    /// The iteration budget ran out first.
    MaxIterations,
    /// The line search could not find a decreasing step.
    Stalled,
}

/// Result of a minimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub solution: Vec<f64>,
    pub objective_value: f64,
    pub iterations: usize,
    pub status: ConvergenceStatus,
    /// Largest absolute gradient component at the solution.
    pub gradient_norm: f64,
}

/// Backtracking line search enforcing the Armijo condition
/// `f(x + α*d) ≤ f(x) + c₁*α*∇f(x)ᵀd`.
#[derive(Debug, Clone)]
pub struct BacktrackingLineSearch {
    /// Armijo constant (c₁ ∈ (0, 1))
    c1: f64,
    /// Backtracking factor (ρ ∈ (0, 1))
    rho: f64,
    /// Maximum backtracking iterations
    max_iter: usize,
}

impl BacktrackingLineSearch {
    pub fn new(c1: f64, rho: f64, max_iter: usize) -> Self {
        Self { c1, rho, max_iter }
    }

    /// Search along `d` from `x`. On success returns the step size, the new
    /// objective value, and leaves the new position and gradient in `x_new`
    /// and `g_new`.
    #[allow(clippy::too_many_arguments)]
    fn search<F>(
        &self,
        f: &mut F,
        x: &[f64],
        fx: f64,
        d: &[f64],
        dir_deriv: f64,
        initial_step: f64,
        x_new: &mut [f64],
        g_new: &mut [f64],
    ) -> Option<(f64, f64)>
    where
        F: FnMut(&[f64], &mut [f64]) -> f64,
    {
        let mut alpha = initial_step;
        for _ in 0..self.max_iter {
            for i in 0..x.len() {
                x_new[i] = x[i] + alpha * d[i];
            }
            let fx_new = f(x_new, g_new);
            if fx_new.is_finite() && fx_new <= fx + self.c1 * alpha * dir_deriv {
                return Some((alpha, fx_new));
            }
            alpha *= self.rho;
        }
        None
    }
}

impl Default for BacktrackingLineSearch {
    /// Defaults: c1=1e-4, rho=0.5, `max_iter=50`
    fn default() -> Self {
        Self::new(1e-4, 0.5, 50)
    }
}

/// Limited-memory BFGS optimizer.
#[derive(Debug, Clone)]
pub struct Lbfgs {
    /// Maximum number of iterations
    max_iter: usize,
    /// Convergence tolerance on the largest gradient component
    tol: f64,
    /// Relative objective decrease below which progress counts as converged
    ftol: f64,
    /// History size (number of correction pairs to store)
    m: usize,
    line_search: BacktrackingLineSearch,
}

impl Lbfgs {
    /// Creates a new L-BFGS optimizer.
    ///
    /// * `max_iter` - Maximum number of iterations
    /// * `tol` - Convergence tolerance for the gradient's max-norm
    /// * `m` - History size (typical: 5-20)
    pub fn new(max_iter: usize, tol: f64, m: usize) -> Self {
        Self {
            max_iter,
            tol,
            ftol: 1e-12,
            m: m.max(1),
            line_search: BacktrackingLineSearch::default(),
        }
    }

    /// Minimize `f`, which writes the gradient at `x` into its second
    /// argument and returns the objective value.
    pub fn minimize<F>(&self, mut f: F, x0: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64], &mut [f64]) -> f64,
    {
        let n = x0.len();
        let mut x = x0;
        let mut grad = vec![0.0; n];
        let mut fx = f(&x, &mut grad);

        let mut history: VecDeque<Correction> = VecDeque::with_capacity(self.m);
        let mut x_new = vec![0.0; n];
        let mut grad_new = vec![0.0; n];

        for iter in 0..self.max_iter {
            let grad_norm = max_abs(&grad);
            if grad_norm <= self.tol {
                return Self::finish(x, fx, iter, ConvergenceStatus::Converged, grad_norm);
            }

            let mut d = compute_direction(&grad, &history);
            let mut dir_deriv = dot(&grad, &d);
            if dir_deriv >= 0.0 {
                // Curvature information went stale; restart from steepest descent.
                history.clear();
                d = grad.iter().map(|g| -g).collect();
                dir_deriv = -dot(&grad, &grad);
            }

            let initial_step = if history.is_empty() {
                (1.0 / dot(&grad, &grad).sqrt()).min(1.0)
            } else {
                1.0
            };

            let Some((_, fx_new)) = self.line_search.search(
                &mut f,
                &x,
                fx,
                &d,
                dir_deriv,
                initial_step,
                &mut x_new,
                &mut grad_new,
            ) else {
                return Self::finish(x, fx, iter, ConvergenceStatus::Stalled, grad_norm);
            };

            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = grad_new.iter().zip(&grad).map(|(a, b)| a - b).collect();
            let y_dot_s = dot(&y, &s);
            if y_dot_s > 1e-10 {
                if history.len() == self.m {
                    history.pop_front();
                }
                history.push_back(Correction {
                    rho: 1.0 / y_dot_s,
                    s,
                    y,
                });
            }

            let decrease = (fx - fx_new) / fx.abs().max(fx_new.abs()).max(1.0);
            std::mem::swap(&mut x, &mut x_new);
            std::mem::swap(&mut grad, &mut grad_new);
            fx = fx_new;

            if decrease <= self.ftol {
                let grad_norm = max_abs(&grad);
                return Self::finish(x, fx, iter + 1, ConvergenceStatus::Converged, grad_norm);
            }
        }

        let grad_norm = max_abs(&grad);
        Self::finish(
            x,
            fx,
            self.max_iter,
            ConvergenceStatus::MaxIterations,
            grad_norm,
        )
    }

    fn finish(
        solution: Vec<f64>,
        objective_value: f64,
        iterations: usize,
        status: ConvergenceStatus,
        gradient_norm: f64,
    ) -> OptimizationResult {
        OptimizationResult {
            solution,
            objective_value,
            iterations,
            status,
            gradient_norm,
        }
    }
}

/// One stored correction pair with its cached `1 / (yᵀs)`.
#[derive(Debug, Clone)]
struct Correction {
    s: Vec<f64>,
    y: Vec<f64>,
    rho: f64,
}

/// Two-loop recursion: approximates `-H⁻¹ * grad`.
fn compute_direction(grad: &[f64], history: &VecDeque<Correction>) -> Vec<f64> {
    let mut q: Vec<f64> = grad.iter().map(|g| -g).collect();
    let Some(last) = history.back() else {
        return q;
    };

    let mut alpha = vec![0.0; history.len()];
    for (i, c) in history.iter().enumerate().rev() {
        alpha[i] = c.rho * dot(&c.s, &q);
        for (qj, yj) in q.iter_mut().zip(&c.y) {
            *qj -= alpha[i] * yj;
        }
    }

    let gamma = dot(&last.s, &last.y) / dot(&last.y, &last.y);
    for qj in &mut q {
        *qj *= gamma;
    }

    for (i, c) in history.iter().enumerate() {
        let beta = c.rho * dot(&c.y, &q);
        for (qj, sj) in q.iter_mut().zip(&c.s) {
            *qj += sj * (alpha[i] - beta);
        }
    }

    q
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}
