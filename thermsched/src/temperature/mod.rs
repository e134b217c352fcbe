/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Thermal model and the solvers of its state equation.
//!
//! A lumped RC network with node capacitances `C` and a symmetric
//! conductance matrix `G` (ambient conductances on the diagonal) obeys
//!
//! ```text
//! dS/dt = A·S + B⊙P(t),     A = −C⁻¹G,   B = C⁻¹,
//! Q(t)  = S(t) + Qamb
//! ```
//!
//! where `S` is the temperature elevation above ambient and `P` the power
//! dissipated at the first `nc` (core) nodes.  Three solvers share the model:
//!
//! | Solver | Input | Method |
//! |---|---|---|
//! | [`FixedIntervalSolver`] | power [`Profile`](crate::profile::Profile) on a uniform grid | closed form, one precomputed transition |
//! | [`VariableIntervalSolver`] | power profile + per-sample durations | closed form, per-sample scalars |
//! | [`NumericIntegrator`] | continuous [`PowerSource`](crate::power::PowerSource) | adaptive Dormand–Prince 5(4) |
//!
//! # Sample-time convention
//! Power sample `k` is constant over its interval; temperature sample `k` is
//! the temperature at the **end** of that interval.

pub(crate) mod decomposition;
pub mod fixed;
pub(crate) mod linear;
pub mod numeric;
pub(crate) mod ode;
pub mod variable;

pub use fixed::FixedIntervalSolver;
pub use numeric::NumericIntegrator;
pub use variable::VariableIntervalSolver;

use tracing::debug;

use crate::error::{ensure_dimension, ConfigError};

/// Relative tolerance of the conductance symmetry check.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

// ── Circuit ───────────────────────────────────────────────────────────────────

/// An RC thermal network as produced by a thermal-model builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Thermal capacitance per node, J/K.
    pub capacitance: Vec<f64>,
    /// Conductance matrix, W/K, `nn × nn` row-major.
    pub conductance: Vec<f64>,
}

impl Circuit {
    /// Number of thermal nodes.
    pub fn nodes(&self) -> usize {
        self.capacitance.len()
    }
}

// ── ThermalSystem ─────────────────────────────────────────────────────────────

/// The linear state equation of a validated [`Circuit`].
///
/// Immutable once built; share it behind an `Arc` between solvers.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalSystem {
    circuit: Circuit,
    cores: usize,
    ambience: f64,
    a: Vec<f64>,
    b: Vec<f64>,
}

impl ThermalSystem {
    /// Derive `A` and `B` from `circuit`; nodes `0..cores` dissipate power.
    ///
    /// # Errors
    /// * [`ConfigError::NoCores`] – `cores` is zero.
    /// * [`ConfigError::DimensionMismatch`] – `cores` exceeds the node count
    ///   or the conductance matrix is not `nn × nn`.
    /// * [`ConfigError::NonPositiveCapacitance`] – a capacitance is not
    ///   positive.
    /// * [`ConfigError::NonFiniteValue`] – a non-finite conductance or
    ///   ambience.
    /// * [`ConfigError::AsymmetricConductance`] – `G ≠ Gᵀ`.
    pub fn new(circuit: Circuit, cores: usize, ambience: f64) -> Result<Self, ConfigError> {
        let nn = circuit.nodes();
        if cores == 0 {
            return Err(ConfigError::NoCores);
        }
        if cores > nn {
            return Err(ConfigError::DimensionMismatch {
                what: "thermal nodes",
                expected: cores,
                found: nn,
            });
        }
        ensure_dimension("conductance entries", nn * nn, circuit.conductance.len())?;
        if !ambience.is_finite() {
            return Err(ConfigError::NonFiniteValue {
                what: "ambience",
                index: 0,
            });
        }
        if let Some((node, &value)) = circuit
            .capacitance
            .iter()
            .enumerate()
            .find(|(_, c)| !(c.is_finite() && **c > 0.0))
        {
            return Err(ConfigError::NonPositiveCapacitance { node, value });
        }
        if let Some(index) = circuit.conductance.iter().position(|g| !g.is_finite()) {
            return Err(ConfigError::NonFiniteValue {
                what: "conductance",
                index,
            });
        }

        let g = &circuit.conductance;
        for row in 0..nn {
            for col in row + 1..nn {
                let (x, y) = (g[row * nn + col], g[col * nn + row]);
                if (x - y).abs() > SYMMETRY_TOLERANCE * x.abs().max(y.abs()) {
                    return Err(ConfigError::AsymmetricConductance { row, col });
                }
            }
        }

        let b: Vec<f64> = circuit.capacitance.iter().map(|c| 1.0 / c).collect();
        let mut a = vec![0.0; nn * nn];
        for row in 0..nn {
            for col in 0..nn {
                a[row * nn + col] = -b[row] * g[row * nn + col];
            }
        }

        debug!(nodes = nn, cores, ambience, "thermal system built");

        Ok(Self {
            circuit,
            cores,
            ambience,
            a,
            b,
        })
    }

    /// The underlying network.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// State matrix `A`, `nn × nn` row-major.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Input coupling `B`, one entry per node.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Ambient temperature, K.
    pub fn ambience(&self) -> f64 {
        self.ambience
    }

    /// Number of thermal nodes `nn`.
    pub fn nodes(&self) -> usize {
        self.b.len()
    }

    /// Number of power-dissipating nodes `nc`.
    pub fn cores(&self) -> usize {
        self.cores
    }

    /// `dS/dt = A·S + B⊙P` with `P` given for the core nodes only.
    pub(crate) fn derivative(&self, state: &[f64], power: &[f64], out: &mut [f64]) {
        linear::multiply_vector(&self.a, state, out);
        for ((d, b), p) in out.iter_mut().zip(&self.b).zip(power) {
            *d += b * p;
        }
    }
}

// ── Leakage ───────────────────────────────────────────────────────────────────

/// Temperature-dependent adjustment of dissipated power.
///
/// [`FixedIntervalSolver::compute_with_leakage`] calls `adjust` once per
/// sample, before the sample is consumed, with the temperature of the cores
/// at the start of that sample.  Changes to `power` persist in the caller's
/// profile.
pub trait Leakage {
    fn adjust(&mut self, temperature: &[f64], power: &mut [f64]);
}

/// Leakage that leaves power untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLeakage;

impl Leakage for NoLeakage {
    #[inline]
    fn adjust(&mut self, _: &[f64], _: &mut [f64]) {}
}

/// Leakage linear in temperature: `P += slope · max(T − reference, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearLeakage {
    /// Temperature below which there is no extra leakage, K.
    pub reference: f64,
    /// Extra power per kelvin above `reference`, W/K.
    pub slope: f64,
}

impl Leakage for LinearLeakage {
    fn adjust(&mut self, temperature: &[f64], power: &mut [f64]) {
        for (p, t) in power.iter_mut().zip(temperature) {
            *p += self.slope * (t - self.reference).max(0.0);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn state_matrix_is_minus_inverse_capacitance_times_conductance() {
        let circuit = Circuit {
            capacitance: vec![2.0, 4.0],
            conductance: vec![3.0, -1.0, -1.0, 5.0],
        };
        let system = ThermalSystem::new(circuit, 1, 300.0).unwrap();
        assert_eq!(system.a(), &[-1.5, 0.5, 0.25, -1.25]);
        assert_eq!(system.b(), &[0.5, 0.25]);
        assert_eq!(system.nodes(), 2);
        assert_eq!(system.cores(), 1);
    }

    #[test]
    fn derivative_injects_power_at_core_nodes_only() {
        let system = testing::system();
        let nn = system.nodes();
        let mut out = vec![f64::NAN; nn];
        system.derivative(&vec![0.0; nn], &[10.0, 20.0], &mut out);
        assert_eq!(out[0], 10.0 * system.b()[0]);
        assert_eq!(out[1], 20.0 * system.b()[1]);
        assert!(out[2..].iter().all(|&d| d == 0.0));
    }

    #[test]
    fn invalid_circuits_are_rejected() {
        let good = testing::circuit();

        let mut c = good.clone();
        c.capacitance[1] = 0.0;
        assert!(matches!(
            ThermalSystem::new(c, 2, 300.0),
            Err(ConfigError::NonPositiveCapacitance { node: 1, .. })
        ));

        let mut c = good.clone();
        c.conductance[1] += 0.5;
        assert!(matches!(
            ThermalSystem::new(c, 2, 300.0),
            Err(ConfigError::AsymmetricConductance { row: 0, col: 1 })
        ));

        let mut c = good.clone();
        c.conductance.pop();
        assert!(matches!(
            ThermalSystem::new(c, 2, 300.0),
            Err(ConfigError::DimensionMismatch { .. })
        ));

        assert_eq!(
            ThermalSystem::new(good.clone(), 0, 300.0).unwrap_err(),
            ConfigError::NoCores
        );
        assert!(ThermalSystem::new(good.clone(), 9, 300.0).is_err());
        assert!(ThermalSystem::new(good, 2, f64::NAN).is_err());
    }

    #[test]
    fn linear_leakage_only_adds_above_reference() {
        let mut leakage = LinearLeakage {
            reference: 320.0,
            slope: 0.5,
        };
        let mut power = vec![1.0, 1.0];
        leakage.adjust(&[310.0, 330.0], &mut power);
        assert_eq!(power, vec![1.0, 6.0]);
    }
}
