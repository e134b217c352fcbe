/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Modal form of a thermal system, shared by the closed-form solvers.
//!
//! With `D = C^{-1/2}` the matrix `−D·G·D` is symmetric, so
//!
//! ```text
//! A = −C⁻¹G = D·U·diag(λ)·Uᵀ·D⁻¹
//! ```
//!
//! and over an interval `Δt` with constant power `P` each mode `m` evolves as
//!
//! ```text
//! y_m ← e^{λ_m Δt}·y_m + (e^{λ_m Δt} − 1)/λ_m · (Uᵀ·D·P)_m
//! ```

use tracing::debug;

use super::linear::{self, SymmetricEigen};
use super::ThermalSystem;
use crate::error::IntegrationError;

#[derive(Debug, Clone)]
pub(crate) struct Decomposition {
    /// Eigenvalues `λ` of `A` (real, non-positive for a passive network).
    pub values: Vec<f64>,
    /// `D·U`, `nn × nn`: modal to nodal coordinates.
    pub modes: Vec<f64>,
    /// `Uᵀ·D⁻¹`, `nn × nn`: nodal to modal coordinates.
    pub inverse: Vec<f64>,
    /// `Uᵀ·D` restricted to the core columns, `nn × nc`: power to modal input.
    pub input: Vec<f64>,
    pub nodes: usize,
    pub cores: usize,
}

impl Decomposition {
    pub(crate) fn new(system: &ThermalSystem) -> Result<Self, IntegrationError> {
        let (nn, nc) = (system.nodes(), system.cores());
        let circuit = system.circuit();
        let d: Vec<f64> = circuit.capacitance.iter().map(|c| 1.0 / c.sqrt()).collect();

        let mut m = vec![0.0; nn * nn];
        for i in 0..nn {
            for j in 0..nn {
                m[i * nn + j] = -d[i] * circuit.conductance[i * nn + j] * d[j];
            }
        }
        // Average out rounding so the Jacobi rotations see an exactly
        // symmetric matrix.
        for i in 0..nn {
            for j in i + 1..nn {
                let x = 0.5 * (m[i * nn + j] + m[j * nn + i]);
                m[i * nn + j] = x;
                m[j * nn + i] = x;
            }
        }

        let SymmetricEigen {
            values,
            vectors: u,
            sweeps,
        } = linear::symmetric_eigen(&m, nn)?;

        let mut modes = vec![0.0; nn * nn];
        let mut inverse = vec![0.0; nn * nn];
        let mut input = vec![0.0; nn * nc];
        for i in 0..nn {
            for k in 0..nn {
                modes[i * nn + k] = d[i] * u[i * nn + k];
                inverse[k * nn + i] = u[i * nn + k] / d[i];
            }
        }
        for k in 0..nn {
            for j in 0..nc {
                input[k * nc + j] = u[j * nn + k] * d[j];
            }
        }

        debug!(
            nodes = nn,
            cores = nc,
            sweeps,
            slowest = values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            "thermal system decomposed"
        );

        Ok(Self {
            values,
            modes,
            inverse,
            input,
            nodes: nn,
            cores: nc,
        })
    }

    /// Per-mode decay `e^{λΔt}` and input gain `(e^{λΔt} − 1)/λ` over `dt`.
    pub(crate) fn scalars(&self, dt: f64, decay: &mut [f64], gain: &mut [f64]) {
        for ((&lambda, e), g) in self.values.iter().zip(decay.iter_mut()).zip(gain.iter_mut()) {
            *e = (lambda * dt).exp();
            *g = if lambda == 0.0 {
                dt
            } else {
                (lambda * dt).exp_m1() / lambda
            };
        }
    }

    /// `out = Uᵀ·D·P` for a core power vector `P`.
    pub(crate) fn project_power(&self, power: &[f64], out: &mut [f64]) {
        for (row, y) in self.input.chunks_exact(self.cores).zip(out.iter_mut()) {
            *y = row.iter().zip(power).map(|(a, p)| a * p).sum();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use crate::testing;

    #[test]
    fn modes_times_inverse_is_identity() {
        let system = testing::system();
        let dec = Decomposition::new(&system).unwrap();
        let n = dec.nodes;
        let product = linear::multiply(&dec.modes, &dec.inverse, n, n, n);
        for i in 0..n {
            for j in 0..n {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_approx_eq!(product[i * n + j], expected, 1e-10);
            }
        }
    }

    #[test]
    fn modal_form_reconstructs_state_matrix() {
        let system = testing::system();
        let dec = Decomposition::new(&system).unwrap();
        let n = dec.nodes;
        let mut scaled = dec.modes.clone();
        for i in 0..n {
            for k in 0..n {
                scaled[i * n + k] *= dec.values[k];
            }
        }
        let a = linear::multiply(&scaled, &dec.inverse, n, n, n);
        for (x, y) in a.iter().zip(system.a()) {
            assert_approx_eq!(*x, *y, 1e-9 * y.abs().max(1.0));
        }
    }

    #[test]
    fn passive_network_has_negative_eigenvalues() {
        let dec = Decomposition::new(&testing::system()).unwrap();
        assert!(dec.values.iter().all(|&l| l < 0.0), "{:?}", dec.values);
    }

    #[test]
    fn zero_eigenvalue_gain_is_interval_length() {
        let dec = Decomposition {
            values: vec![0.0, -2.0],
            modes: vec![],
            inverse: vec![],
            input: vec![],
            nodes: 2,
            cores: 1,
        };
        let (mut e, mut g) = (vec![0.0; 2], vec![0.0; 2]);
        dec.scalars(0.5, &mut e, &mut g);
        assert_eq!(e[0], 1.0);
        assert_eq!(g[0], 0.5);
        assert_approx_eq!(e[1], (-1.0f64).exp(), 1e-15);
        assert_approx_eq!(g[1], (1.0 - (-1.0f64).exp()) / 2.0, 1e-15);
    }
}
