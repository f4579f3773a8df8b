use log::{debug, trace, warn};
use nalgebra::{DMatrix, SymmetricEigen};
use rand::Rng;
use rand_mt::Mt64;
use sprs::prod::mul_acc_mat_vec_csr;
use sprs::CsMat;

use crate::Error;

/// Relative tolerance of the reference driver, $500\epsilon$.
pub const DEFAULT_REL_TOL: f64 = 500.0 * f64::EPSILON;

/// Absolute tolerance of the reference driver, $\epsilon^{2/3}$.
pub fn default_abs_tol() -> f64 {
    f64::EPSILON.powf(2.0 / 3.0)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Iteration control for the eigenvalue phase: budget, number of requested
/// lowest eigenvalues and the two tolerances.
#[derive(Debug, Clone)]
pub struct LanczosIteration {
    max_iter: usize,
    n_lowest: usize,
    rel_tol: f64,
    abs_tol: f64,
    iterations: usize,
}

impl LanczosIteration {
    pub fn new(max_iter: usize, n_lowest: usize, rel_tol: f64, abs_tol: f64) -> Self {
        LanczosIteration {
            max_iter,
            n_lowest,
            rel_tol,
            abs_tol,
            iterations: 0,
        }
    }

    /// Iteration control with the reference driver tolerances.
    pub fn nlowest(max_iter: usize, n_lowest: usize) -> Self {
        Self::new(max_iter, n_lowest, DEFAULT_REL_TOL, default_abs_tol())
    }

    /// Number of Lanczos steps consumed by the last run.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

/// Diagnostic status of one reconstructed eigenvector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorInfo {
    /// The residual is within tolerance.
    Ok,
    /// The residual check failed; the vector does not belong to a converged
    /// eigenvalue.
    NoEigenvalue,
    /// The replay budget was too small to rebuild the full Krylov basis.
    NotCalculated,
}

#[derive(Debug, Clone)]
struct InfoEntry {
    m1: usize,
    m2: usize,
    ma: usize,
    eigenvalue: f64,
    residual: f64,
    error_info: ErrorInfo,
}

/// Per-eigenvector diagnostics of the eigenvector phase: `m1` is the number
/// of first-pass steps, `m2` the number of replayed steps, `ma` the
/// tridiagonal dimension used for the reconstruction.
#[derive(Debug, Clone, Default)]
pub struct Info {
    entries: Vec<InfoEntry>,
}

impl Info {
    pub fn new() -> Self {
        Info::default()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn m1(&self, i: usize) -> usize {
        self.entries[i].m1
    }

    pub fn m2(&self, i: usize) -> usize {
        self.entries[i].m2
    }

    pub fn ma(&self, i: usize) -> usize {
        self.entries[i].ma
    }

    pub fn eigenvalue(&self, i: usize) -> f64 {
        self.entries[i].eigenvalue
    }

    pub fn residual(&self, i: usize) -> f64 {
        self.entries[i].residual
    }

    pub fn error_info(&self, i: usize) -> ErrorInfo {
        self.entries[i].error_info
    }
}

/// Diagonalizes the tridiagonal projection built from the recurrence
/// coefficients. Returns the Ritz values in ascending order and the
/// eigenvector matrix of the small problem with its columns in the same
/// order.
fn tridiagonal_eigen(alphas: &[f64], betas: &[f64]) -> (Vec<f64>, DMatrix<f64>) {
    let k = alphas.len();
    let mut t = DMatrix::<f64>::zeros(k, k);
    for i in 0..k {
        t[(i, i)] = alphas[i];
        if i + 1 < k {
            t[(i, i + 1)] = betas[i];
            t[(i + 1, i)] = betas[i];
        }
    }
    let eig = SymmetricEigen::new(t);
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
    let values: Vec<f64> = order.iter().map(|&i| eig.eigenvalues[i]).collect();
    let mut vectors = DMatrix::<f64>::zeros(k, k);
    for (c, &i) in order.iter().enumerate() {
        vectors.set_column(c, &eig.eigenvectors.column(i));
    }
    (values, vectors)
}

/// Two-phase Lanczos eigensolver over a sparse symmetric matrix.
/// # Usage
/// The eigenvalue phase ([Lanczos::calculate_eigenvalues]) runs the
/// three-term recurrence and keeps only the $(\alpha_j,\beta_j)$
/// coefficients; the Krylov vectors are discarded to bound memory. The
/// eigenvector phase ([Lanczos::eigenvectors]) replays the recurrence from
/// the same seeded starting vector to rebuild the basis on demand, so
/// identical seed and matrix reproduce identical results.
/// # Failure
/// Running out of budget surfaces [Error::NonConvergence] and a recurrence
/// breakdown before convergence surfaces
/// [Error::InvariantSubspaceBreakdown]; in both cases the Ritz values
/// gathered so far stay readable on the solver. Values past the failure
/// point are unreliable and callers must treat them as such.
pub struct Lanczos<'a> {
    matrix: &'a CsMat<f64>,
    seed: u64,
    alphas: Vec<f64>,
    betas: Vec<f64>,
    eigenvalues: Vec<f64>,
    errors: Vec<f64>,
    multiplicities: Vec<usize>,
    abs_tol: f64,
}

impl<'a> Lanczos<'a> {
    /// New solver run over `matrix`. The seed is owned by this run and
    /// drives the starting vector of both phases.
    pub fn new(matrix: &'a CsMat<f64>, seed: u64) -> Result<Self, Error> {
        if matrix.rows() != matrix.cols() || matrix.rows() == 0 {
            return Err(Error::InvalidParameters {
                details: format!(
                    "expected a square non-empty matrix, got {}x{}",
                    matrix.rows(),
                    matrix.cols()
                ),
            });
        }
        Ok(Lanczos {
            matrix,
            seed,
            alphas: Vec::new(),
            betas: Vec::new(),
            eigenvalues: Vec::new(),
            errors: Vec::new(),
            multiplicities: Vec::new(),
            abs_tol: default_abs_tol(),
        })
    }

    /// Distinct Ritz values found so far, ascending. Populated by
    /// [Lanczos::calculate_eigenvalues], also on failure.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Error estimate $|\beta_k s_{k,i}|$ for each entry of
    /// [Lanczos::eigenvalues].
    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    /// Number of numerically coincident Ritz values clustered into each
    /// entry of [Lanczos::eigenvalues].
    pub fn multiplicities(&self) -> &[usize] {
        &self.multiplicities
    }

    fn starting_vector(&self) -> Vec<f64> {
        let mut rng = Mt64::new(self.seed);
        let dim = self.matrix.rows();
        let mut v: Vec<f64> = (0..dim).map(|_| 2.0 * rng.gen::<f64>() - 1.0).collect();
        let n = norm(&v);
        for x in v.iter_mut() {
            *x /= n;
        }
        v
    }

    fn apply(&self, v: &[f64], out: &mut [f64]) {
        for x in out.iter_mut() {
            *x = 0.0;
        }
        mul_acc_mat_vec_csr(self.matrix.view(), &v[..], out);
    }

    /// Recomputes the distinct Ritz values, their error bounds and their
    /// multiplicities from the current tridiagonal projection. Returns
    /// whether the requested lowest clusters meet both tolerances.
    fn extract(&mut self, iter: &LanczosIteration, beta_last: f64) -> bool {
        let k = self.alphas.len();
        let (theta, s) = tridiagonal_eigen(&self.alphas, &self.betas);
        let bounds: Vec<f64> = (0..k).map(|i| (beta_last * s[(k - 1, i)]).abs()).collect();
        let spread = theta[k - 1] - theta[0];
        let cluster_tol = iter.abs_tol.max(iter.rel_tol * spread);

        self.eigenvalues.clear();
        self.errors.clear();
        self.multiplicities.clear();
        let mut i = 0;
        while i < k {
            let mut j = i + 1;
            while j < k && theta[j] - theta[j - 1] <= cluster_tol {
                j += 1;
            }
            let mean = theta[i..j].iter().sum::<f64>() / (j - i) as f64;
            let err = bounds[i..j].iter().cloned().fold(f64::INFINITY, f64::min);
            self.eigenvalues.push(mean);
            self.errors.push(err);
            self.multiplicities.push(j - i);
            i = j;
        }

        if self.eigenvalues.len() < iter.n_lowest {
            return false;
        }
        let rel_scale = if spread > 0.0 {
            iter.rel_tol * spread
        } else {
            iter.abs_tol
        };
        self.errors
            .iter()
            .take(iter.n_lowest)
            .all(|&e| e <= iter.abs_tol && e <= rel_scale)
    }

    /// Eigenvalue phase. Runs the three-term recurrence until the requested
    /// lowest Ritz values converge, the budget runs out, or the recurrence
    /// breaks down.
    pub fn calculate_eigenvalues(&mut self, iter: &mut LanczosIteration) -> Result<(), Error> {
        self.alphas.clear();
        self.betas.clear();
        self.eigenvalues.clear();
        self.errors.clear();
        self.multiplicities.clear();
        self.abs_tol = iter.abs_tol;
        iter.iterations = 0;

        let dim = self.matrix.rows();
        let mut v_prev = vec![0.0; dim];
        let mut v_cur = self.starting_vector();
        let mut w = vec![0.0; dim];
        let mut beta_prev = 0.0;
        let mut scale: f64 = 0.0;

        loop {
            if iter.iterations == iter.max_iter {
                if !self.alphas.is_empty() {
                    self.extract(iter, beta_prev);
                }
                warn!(
                    "Lanczos budget of {} iterations exhausted before convergence",
                    iter.max_iter
                );
                return Err(Error::NonConvergence {
                    iterations: iter.iterations,
                });
            }

            self.apply(&v_cur, &mut w);
            let alpha = dot(&v_cur, &w);
            for i in 0..dim {
                w[i] -= alpha * v_cur[i] + beta_prev * v_prev[i];
            }
            let beta = norm(&w);
            self.alphas.push(alpha);
            iter.iterations += 1;
            scale = scale.max(alpha.abs()).max(beta);
            trace!(
                "Lanczos step {}: alpha = {:e}, beta = {:e}",
                iter.iterations,
                alpha,
                beta
            );

            let k = self.alphas.len();
            let breakdown = beta <= 64.0 * f64::EPSILON * scale || k == dim;
            let converged = self.extract(iter, beta);
            if converged {
                debug!(
                    "Lanczos converged after {} iterations, {} distinct Ritz values",
                    iter.iterations,
                    self.eigenvalues.len()
                );
                return Ok(());
            }
            if breakdown {
                warn!(
                    "Krylov recurrence breakdown at step {} (beta = {:e})",
                    iter.iterations, beta
                );
                return Err(Error::InvariantSubspaceBreakdown {
                    iterations: iter.iterations,
                });
            }

            self.betas.push(beta);
            for i in 0..dim {
                let next = w[i] / beta;
                v_prev[i] = v_cur[i];
                v_cur[i] = next;
            }
            beta_prev = beta;
        }
    }

    /// Eigenvector phase. Rebuilds dense eigenvectors for the converged
    /// eigenvalues with ranks `start..end` (indices into
    /// [Lanczos::eigenvalues]) by replaying the recurrence from the stored
    /// coefficients and the same seeded starting vector. `max_iter` bounds
    /// the replay; when it is smaller than the first-pass step count the
    /// affected vectors are flagged [ErrorInfo::NotCalculated].
    pub fn eigenvectors(
        &self,
        start: usize,
        end: usize,
        info: &mut Info,
        max_iter: usize,
    ) -> Result<Vec<Vec<f64>>, Error> {
        if self.alphas.is_empty() {
            return Err(Error::InvalidParameters {
                details: "eigenvalue phase has not run".to_owned(),
            });
        }
        if start > end || end > self.eigenvalues.len() {
            return Err(Error::InvalidParameters {
                details: format!(
                    "eigenvalue range {}..{} outside the {} computed values",
                    start,
                    end,
                    self.eigenvalues.len()
                ),
            });
        }

        let dim = self.matrix.rows();
        let k = self.alphas.len();
        let m2 = k.min(max_iter);
        let truncated = m2 < k;
        let (theta, s) = tridiagonal_eigen(&self.alphas, &self.betas);

        // Column of the tridiagonal eigenbasis closest to each requested
        // eigenvalue.
        let requested: Vec<usize> = (start..end)
            .map(|e| {
                let target = self.eigenvalues[e];
                let mut best = 0;
                for (c, th) in theta.iter().enumerate() {
                    if (th - target).abs() < (theta[best] - target).abs() {
                        best = c;
                    }
                }
                best
            })
            .collect();

        let mut xs: Vec<Vec<f64>> = vec![vec![0.0; dim]; end - start];
        let mut v_prev = vec![0.0; dim];
        let mut v_cur = self.starting_vector();
        let mut w = vec![0.0; dim];

        for j in 0..m2 {
            for (x, &col) in xs.iter_mut().zip(requested.iter()) {
                let c = s[(j, col)];
                for i in 0..dim {
                    x[i] += c * v_cur[i];
                }
            }
            if j + 1 == m2 {
                break;
            }
            self.apply(&v_cur, &mut w);
            let alpha = self.alphas[j];
            let beta_prev = if j == 0 { 0.0 } else { self.betas[j - 1] };
            let beta = self.betas[j];
            for i in 0..dim {
                w[i] -= alpha * v_cur[i] + beta_prev * v_prev[i];
            }
            for i in 0..dim {
                let next = w[i] / beta;
                v_prev[i] = v_cur[i];
                v_cur[i] = next;
            }
        }

        info.entries.clear();
        let mut residual_buf = vec![0.0; dim];
        for (n, x) in xs.iter_mut().enumerate() {
            let xnorm = norm(x);
            if xnorm > 0.0 {
                for xi in x.iter_mut() {
                    *xi /= xnorm;
                }
            }
            let eigenvalue = self.eigenvalues[start + n];
            self.apply(x, &mut residual_buf);
            for i in 0..dim {
                residual_buf[i] -= eigenvalue * x[i];
            }
            let residual = norm(&residual_buf);
            let error_info = if truncated {
                ErrorInfo::NotCalculated
            } else if residual <= self.abs_tol.sqrt() {
                ErrorInfo::Ok
            } else {
                ErrorInfo::NoEigenvalue
            };
            trace!(
                "Eigenvector {}: eigenvalue = {}, residual = {:e}, status {:?}",
                start + n,
                eigenvalue,
                residual,
                error_info
            );
            info.entries.push(InfoEntry {
                m1: k,
                m2,
                ma: k,
                eigenvalue,
                residual,
                error_info,
            });
        }
        Ok(xs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert::close;
    use sprs::TriMat;

    fn dense_to_csr(rows: &[&[f64]]) -> CsMat<f64> {
        let n = rows.len();
        let mut tri = TriMat::new((n, n));
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    tri.add_triplet(i, j, v);
                }
            }
        }
        tri.to_csr()
    }

    #[test]
    fn test_tridiagonal_eigen_known_2x2() {
        // T = [[0, 1], [1, 0]] has eigenvalues -1 and 1.
        let (theta, s) = tridiagonal_eigen(&[0.0, 0.0], &[1.0]);
        close(theta[0], -1.0, 1e-12);
        close(theta[1], 1.0, 1e-12);
        // Columns are normalized.
        close(s.column(0).norm(), 1.0, 1e-12);
    }

    #[test]
    fn test_diagonal_matrix_eigenvalues() {
        let mat = dense_to_csr(&[
            &[2.0, 0.0, 0.0],
            &[0.0, -1.0, 0.0],
            &[0.0, 0.0, 5.0],
        ]);
        let mut solver = Lanczos::new(&mat, 7).unwrap();
        let mut iter = LanczosIteration::new(30, 1, 1e-10, 1e-10);
        solver.calculate_eigenvalues(&mut iter).unwrap();
        close(solver.eigenvalues()[0], -1.0, 1e-8);
    }

    #[test]
    fn test_breakdown_on_exhausted_krylov_space() {
        // A scalar matrix has a one-dimensional Krylov space: the first
        // residual vanishes and a second cluster can never appear.
        let mat = dense_to_csr(&[
            &[1.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0],
        ]);
        let mut solver = Lanczos::new(&mat, 3).unwrap();
        let mut iter = LanczosIteration::new(30, 2, 1e-10, 1e-10);
        let result = solver.calculate_eigenvalues(&mut iter);
        assert_eq!(
            result,
            Err(Error::InvariantSubspaceBreakdown { iterations: 1 })
        );
        assert_eq!(iter.iterations(), 1);
        // The partial Ritz sequence stays readable.
        assert_eq!(solver.eigenvalues().len(), 1);
        close(solver.eigenvalues()[0], 1.0, 1e-12);
        assert_eq!(solver.multiplicities(), &[1]);
        assert_eq!(solver.errors().len(), 1);
    }

    #[test]
    fn test_near_degenerate_pair_is_clustered() {
        // Two levels split by less than the absolute tolerance collapse
        // into one reported eigenvalue of multiplicity 2, at the cluster
        // mean.
        let split = 2e-7;
        let mat = dense_to_csr(&[
            &[1.0, 0.0, 0.0],
            &[0.0, 1.0 + split, 0.0],
            &[0.0, 0.0, 5.0],
        ]);
        let mut solver = Lanczos::new(&mat, 11).unwrap();
        let mut iter = LanczosIteration::new(30, 1, 1e-10, 1e-6);
        solver.calculate_eigenvalues(&mut iter).unwrap();
        assert_eq!(solver.eigenvalues().len(), 2);
        assert_eq!(solver.multiplicities(), &[2, 1]);
        close(solver.eigenvalues()[0], 1.0 + split / 2.0, 1e-9);
        close(solver.eigenvalues()[1], 5.0, 1e-8);
    }

    #[test]
    fn test_rejects_rectangular_matrix() {
        let mut tri = TriMat::new((2, 3));
        tri.add_triplet(0, 0, 1.0);
        let mat: CsMat<f64> = tri.to_csr();
        assert!(Lanczos::new(&mat, 0).is_err());
    }

    #[test]
    fn test_eigenvectors_require_eigenvalue_phase() {
        let mat = dense_to_csr(&[&[1.0, 0.0], &[0.0, 2.0]]);
        let solver = Lanczos::new(&mat, 0).unwrap();
        let mut info = Info::new();
        assert!(solver.eigenvectors(0, 1, &mut info, 10).is_err());
    }
}
