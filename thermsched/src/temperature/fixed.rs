/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Closed-form temperature of power profiles sampled on a uniform grid.
//!
//! With power constant over each `Δt`, the state propagates exactly as
//!
//! ```text
//! S_{k+1} = E·S_k + F·P_k,    E = e^{AΔt},    F = A⁻¹(e^{AΔt} − I)·B
//! ```
//!
//! `E` and `F` are assembled once from the modal form at construction; a
//! call to [`compute`](FixedIntervalSolver::compute) is then two dense
//! matrix–vector products per sample.

use tracing::{debug, info};

use super::decomposition::Decomposition;
use super::{linear, Leakage, ThermalSystem};
use crate::error::{ensure_dimension, ConfigError, Result};
use crate::profile::Profile;

/// Solver for a fixed sampling interval.
///
/// Immutable after construction; one instance serves any number of
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct FixedIntervalSolver {
    nodes: usize,
    cores: usize,
    ambience: f64,
    time_step: f64,
    /// `nn × nn`.
    e: Vec<f64>,
    /// `nn × nc`.
    f: Vec<f64>,
}

impl FixedIntervalSolver {
    /// Precompute the one-sample transition of `system` over `time_step`.
    ///
    /// # Errors
    /// * [`ConfigError::NonPositiveTimeStep`] unless `time_step > 0`.
    /// * [`IntegrationError::DecompositionNotConverged`](crate::error::IntegrationError::DecompositionNotConverged)
    ///   if the modal form cannot be computed.
    pub fn new(system: &ThermalSystem, time_step: f64) -> Result<Self> {
        if !(time_step > 0.0 && time_step.is_finite()) {
            return Err(ConfigError::NonPositiveTimeStep(time_step).into());
        }
        let dec = Decomposition::new(system)?;
        let (nn, nc) = (dec.nodes, dec.cores);

        let mut decay = vec![0.0; nn];
        let mut gain = vec![0.0; nn];
        dec.scalars(time_step, &mut decay, &mut gain);

        let mut scaled = dec.modes.clone();
        let mut weighted = dec.modes;
        for i in 0..nn {
            for k in 0..nn {
                scaled[i * nn + k] *= decay[k];
                weighted[i * nn + k] *= gain[k];
            }
        }
        let e = linear::multiply(&scaled, &dec.inverse, nn, nn, nn);
        let f = linear::multiply(&weighted, &dec.input, nn, nn, nc);

        info!(nodes = nn, cores = nc, time_step, "fixed-interval solver ready");

        Ok(Self {
            nodes: nn,
            cores: nc,
            ambience: system.ambience(),
            time_step,
            e,
            f,
        })
    }

    /// The sampling interval.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Number of power-dissipating nodes.
    pub fn cores(&self) -> usize {
        self.cores
    }

    /// Temperature profile, K, of `power`.
    ///
    /// Temperature sample `k` is taken at `(k + 1)·Δt`.
    ///
    /// # Errors
    /// [`ConfigError::DimensionMismatch`] unless `power.units()` is the number
    /// of cores.
    pub fn compute(&self, power: &Profile) -> std::result::Result<Profile, ConfigError> {
        ensure_dimension("power profile units", self.cores, power.units())?;
        let mut temperature = Profile::new(self.cores, power.steps());
        let mut state = vec![0.0; self.nodes];
        let mut next = vec![0.0; self.nodes];
        for k in 0..power.steps() {
            self.advance(&mut state, &mut next, power.sample(k), temperature.sample_mut(k));
        }
        debug!(steps = power.steps(), "fixed-interval temperature computed");
        Ok(temperature)
    }

    /// Like [`compute`](Self::compute), with `leakage` adjusting each power
    /// sample right before it is consumed.
    ///
    /// `leakage` receives the core temperature at the start of the sample,
    /// which is the ambience for the first sample and temperature sample
    /// `k − 1` afterwards.  Adjustments are written back into `power`.
    ///
    /// # Errors
    /// See [`compute`](Self::compute).
    pub fn compute_with_leakage<L: Leakage + ?Sized>(
        &self,
        power: &mut Profile,
        leakage: &mut L,
    ) -> std::result::Result<Profile, ConfigError> {
        ensure_dimension("power profile units", self.cores, power.units())?;
        let mut temperature = Profile::new(self.cores, power.steps());
        let mut state = vec![0.0; self.nodes];
        let mut next = vec![0.0; self.nodes];
        let mut previous = vec![self.ambience; self.cores];
        for k in 0..power.steps() {
            leakage.adjust(&previous, power.sample_mut(k));
            let current = temperature.sample_mut(k);
            self.advance(&mut state, &mut next, power.sample(k), current);
            previous.copy_from_slice(current);
        }
        debug!(steps = power.steps(), "fixed-interval temperature with leakage computed");
        Ok(temperature)
    }

    /// One sample: `state ← E·state + F·power`, then write core temperatures.
    #[inline]
    fn advance(&self, state: &mut Vec<f64>, next: &mut Vec<f64>, power: &[f64], out: &mut [f64]) {
        linear::multiply_vector(&self.e, state, next);
        for (row, s) in self.f.chunks_exact(self.cores).zip(next.iter_mut()) {
            *s += row.iter().zip(power).map(|(f, p)| f * p).sum::<f64>();
        }
        std::mem::swap(state, next);
        for (q, s) in out.iter_mut().zip(state.iter()) {
            *q = s + self.ambience;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use crate::temperature::{LinearLeakage, NoLeakage};
    use crate::testing;

    const DT: f64 = 1e-3;

    fn step_power(steps: usize) -> Profile {
        let mut power = Profile::new(2, steps);
        for k in 0..steps {
            power[(0, k)] = if k < steps / 2 { 10.0 } else { 2.0 };
            power[(1, k)] = 5.0;
        }
        power
    }

    #[test]
    fn zero_power_stays_at_ambience() {
        let system = testing::system();
        let solver = FixedIntervalSolver::new(&system, DT).unwrap();
        let q = solver.compute(&Profile::new(2, 50)).unwrap();
        for &t in q.data() {
            assert_approx_eq!(t, system.ambience(), 1e-12);
        }
    }

    #[test]
    fn first_sample_matches_one_explicit_transition() {
        // For tiny Δt the first sample is ≈ B·P·Δt above ambience.
        let system = testing::system();
        let dt = 1e-7;
        let solver = FixedIntervalSolver::new(&system, dt).unwrap();
        let mut power = Profile::new(2, 1);
        power.sample_mut(0).copy_from_slice(&[10.0, 20.0]);
        let q = solver.compute(&power).unwrap();
        for core in 0..2 {
            let expected = system.b()[core] * power[(core, 0)] * dt;
            let rise = q[(core, 0)] - system.ambience();
            assert_approx_eq!(rise, expected, 1e-3 * expected);
        }
    }

    #[test]
    fn constant_power_approaches_steady_state() {
        // Steady state: G·S = P, so S = G⁻¹P.
        let system = testing::system();
        let solver = FixedIntervalSolver::new(&system, 0.5).unwrap();
        let mut power = Profile::new(2, 400);
        for k in 0..400 {
            power.sample_mut(k).copy_from_slice(&[4.0, 4.0]);
        }
        let q = solver.compute(&power).unwrap();
        let expected = testing::steady_state(&[4.0, 4.0]);
        for core in 0..2 {
            let rise = q[(core, 399)] - system.ambience();
            assert_approx_eq!(rise, expected[core], 1e-9 * expected[core]);
        }
    }

    #[test]
    fn no_leakage_matches_plain_compute_exactly() {
        let system = testing::system();
        let solver = FixedIntervalSolver::new(&system, DT).unwrap();
        let power = step_power(200);
        let plain = solver.compute(&power).unwrap();

        let mut copy = power.clone();
        let leaky = solver.compute_with_leakage(&mut copy, &mut NoLeakage).unwrap();
        assert_eq!(leaky, plain);
        assert_eq!(copy, power, "no-op leakage must not touch power");
    }

    #[test]
    fn leakage_sees_preceding_temperature_and_persists() {
        struct Recorder {
            seen: Vec<Vec<f64>>,
        }
        impl Leakage for Recorder {
            fn adjust(&mut self, temperature: &[f64], power: &mut [f64]) {
                self.seen.push(temperature.to_vec());
                power[0] += 1.0;
            }
        }

        let system = testing::system();
        let solver = FixedIntervalSolver::new(&system, DT).unwrap();
        let mut power = step_power(20);
        let original = power.clone();
        let mut recorder = Recorder { seen: Vec::new() };
        let q = solver.compute_with_leakage(&mut power, &mut recorder).unwrap();

        assert_eq!(recorder.seen.len(), 20);
        assert_eq!(recorder.seen[0], vec![system.ambience(); 2]);
        for k in 1..20 {
            assert_eq!(recorder.seen[k], q.sample(k - 1).to_vec(), "sample {k}");
        }
        for k in 0..20 {
            assert_eq!(power[(0, k)], original[(0, k)] + 1.0);
        }
        // The adjusted profile explains the output.
        assert_eq!(solver.compute(&power).unwrap(), q);
    }

    #[test]
    fn leakage_heats_the_chip() {
        let system = testing::system();
        let solver = FixedIntervalSolver::new(&system, DT).unwrap();
        let power = step_power(300);
        let plain = solver.compute(&power).unwrap();
        let mut leakage = LinearLeakage {
            reference: system.ambience(),
            slope: 0.2,
        };
        let leaky = solver
            .compute_with_leakage(&mut power.clone(), &mut leakage)
            .unwrap();
        assert!(leaky[(0, 299)] > plain[(0, 299)]);
    }

    #[test]
    fn wrong_core_count_is_rejected() {
        let solver = FixedIntervalSolver::new(&testing::system(), DT).unwrap();
        assert!(matches!(
            solver.compute(&Profile::new(3, 4)),
            Err(ConfigError::DimensionMismatch { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn non_positive_time_step_is_rejected() {
        assert!(FixedIntervalSolver::new(&testing::system(), -1.0).is_err());
    }
}
