/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Dense row-major linear algebra for small thermal networks.

use tracing::debug;

use crate::error::IntegrationError;

/// Sweep cap of the Jacobi method; a few dozen suffice in practice.
pub(crate) const MAX_SWEEPS: usize = 100;

/// `out = M·x` for a square row-major `M`.
pub(crate) fn multiply_vector(m: &[f64], x: &[f64], out: &mut [f64]) {
    let n = x.len();
    debug_assert_eq!(m.len(), out.len() * n);
    for (row, y) in m.chunks_exact(n).zip(out.iter_mut()) {
        *y = row.iter().zip(x).map(|(a, b)| a * b).sum();
    }
}

/// `M·N` for row-major `M` (`rows × inner`) and `N` (`inner × cols`).
pub(crate) fn multiply(m: &[f64], n: &[f64], rows: usize, inner: usize, cols: usize) -> Vec<f64> {
    debug_assert_eq!(m.len(), rows * inner);
    debug_assert_eq!(n.len(), inner * cols);
    let mut out = vec![0.0; rows * cols];
    for i in 0..rows {
        for k in 0..inner {
            let a = m[i * inner + k];
            if a == 0.0 {
                continue;
            }
            for j in 0..cols {
                out[i * cols + j] += a * n[k * cols + j];
            }
        }
    }
    out
}

/// Eigenvalues and eigenvectors of a symmetric matrix.
#[derive(Debug, Clone)]
pub(crate) struct SymmetricEigen {
    /// Eigenvalues, unordered.
    pub values: Vec<f64>,
    /// Orthonormal eigenvectors as columns, `n × n` row-major.
    pub vectors: Vec<f64>,
    /// Sweeps performed.
    pub sweeps: usize,
}

/// Decompose the symmetric row-major `n × n` matrix `m` as `U·diag(λ)·Uᵀ`
/// with the cyclic Jacobi method.
///
/// Only symmetry is assumed; the upper triangle drives the rotations.
///
/// # Errors
/// [`IntegrationError::DecompositionNotConverged`] if a sweep still rotates
/// after [`MAX_SWEEPS`] sweeps.
pub(crate) fn symmetric_eigen(m: &[f64], n: usize) -> Result<SymmetricEigen, IntegrationError> {
    debug_assert_eq!(m.len(), n * n);

    let mut a = m.to_vec();
    let mut v = vec![0.0; n * n];
    for i in 0..n {
        v[i * n + i] = 1.0;
    }

    for sweep in 1..=MAX_SWEEPS {
        let mut rotated = false;

        for p in 0..n {
            for q in p + 1..n {
                let apq = a[p * n + q];
                if apq == 0.0 {
                    continue;
                }
                let (app, aqq) = (a[p * n + p], a[q * n + q]);
                if apq.abs() <= f64::EPSILON * 0.5 * (app.abs() + aqq.abs()) {
                    a[p * n + q] = 0.0;
                    a[q * n + p] = 0.0;
                    continue;
                }
                rotated = true;

                let theta = (aqq - app) / (2.0 * apq);
                let t = if theta.abs() > 1e150 {
                    0.5 / theta
                } else {
                    theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
                };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // A ← A·J
                for k in 0..n {
                    let (akp, akq) = (a[k * n + p], a[k * n + q]);
                    a[k * n + p] = c * akp - s * akq;
                    a[k * n + q] = s * akp + c * akq;
                }
                // A ← Jᵀ·A
                for k in 0..n {
                    let (apk, aqk) = (a[p * n + k], a[q * n + k]);
                    a[p * n + k] = c * apk - s * aqk;
                    a[q * n + k] = s * apk + c * aqk;
                }
                a[p * n + q] = 0.0;
                a[q * n + p] = 0.0;
                // V ← V·J
                for k in 0..n {
                    let (vkp, vkq) = (v[k * n + p], v[k * n + q]);
                    v[k * n + p] = c * vkp - s * vkq;
                    v[k * n + q] = s * vkp + c * vkq;
                }
            }
        }

        if !rotated {
            debug!(size = n, sweeps = sweep, "eigen-decomposition converged");
            return Ok(SymmetricEigen {
                values: (0..n).map(|i| a[i * n + i]).collect(),
                vectors: v,
                sweeps: sweep,
            });
        }
    }

    Err(IntegrationError::DecompositionNotConverged { sweeps: MAX_SWEEPS })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn symmetric(n: usize) -> Vec<f64> {
        let mut m = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..=i {
                let x = ((i * 31 + j * 17) % 11) as f64 - 5.0 + if i == j { 3.0 } else { 0.0 };
                m[i * n + j] = x;
                m[j * n + i] = x;
            }
        }
        m
    }

    #[test]
    fn multiply_vector_matches_hand_computation() {
        let mut out = vec![0.0; 2];
        multiply_vector(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0], &mut out);
        assert_eq!(out, vec![17.0, 39.0]);
    }

    #[test]
    fn multiply_handles_rectangular_shapes() {
        // (2 × 3)·(3 × 1)
        let out = multiply(&[1.0, 0.0, 2.0, 0.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 2, 3, 1);
        assert_eq!(out, vec![7.0, 5.0]);
    }

    #[test]
    fn diagonal_matrix_needs_no_rotation() {
        let eigen = symmetric_eigen(&[2.0, 0.0, 0.0, -3.0], 2).unwrap();
        assert_eq!(eigen.values, vec![2.0, -3.0]);
        assert_eq!(eigen.vectors, vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(eigen.sweeps, 1);
    }

    #[test]
    fn two_by_two_eigenvalues() {
        let eigen = symmetric_eigen(&[2.0, 1.0, 1.0, 2.0], 2).unwrap();
        let mut values = eigen.values.clone();
        values.sort_by(f64::total_cmp);
        assert_approx_eq!(values[0], 1.0, 1e-14);
        assert_approx_eq!(values[1], 3.0, 1e-14);
    }

    #[test]
    fn decomposition_reconstructs_matrix() {
        let n = 7;
        let m = symmetric(n);
        let SymmetricEigen { values, vectors, .. } = symmetric_eigen(&m, n).unwrap();

        let mut scaled = vectors.clone();
        for i in 0..n {
            for j in 0..n {
                scaled[i * n + j] *= values[j];
            }
        }
        let mut transposed = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                transposed[j * n + i] = vectors[i * n + j];
            }
        }
        let rebuilt = multiply(&scaled, &transposed, n, n, n);
        for (x, y) in rebuilt.iter().zip(&m) {
            assert_approx_eq!(*x, *y, 1e-12);
        }

        let identity = multiply(&transposed, &vectors, n, n, n);
        for i in 0..n {
            for j in 0..n {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_approx_eq!(identity[i * n + j], expected, 1e-13);
            }
        }
    }
}
