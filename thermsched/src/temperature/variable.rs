/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Closed-form temperature of power profiles with irregular sampling.
//!
//! The state is kept in modal coordinates, where the transition over a
//! sample of length `Δt_k` is diagonal.  The per-mode scalars are recomputed
//! whenever the duration changes from one sample to the next.

use tracing::{debug, info};

use super::decomposition::Decomposition;
use super::ThermalSystem;
use crate::error::{ensure_dimension, ConfigError, Result};
use crate::profile::Profile;

/// Solver for per-sample sampling intervals.
#[derive(Debug, Clone)]
pub struct VariableIntervalSolver {
    decomposition: Decomposition,
    ambience: f64,
}

impl VariableIntervalSolver {
    /// Decompose `system` once for the lifetime of the solver.
    ///
    /// # Errors
    /// [`IntegrationError::DecompositionNotConverged`](crate::error::IntegrationError::DecompositionNotConverged)
    /// if the modal form cannot be computed.
    pub fn new(system: &ThermalSystem) -> Result<Self> {
        let decomposition = Decomposition::new(system)?;
        info!(
            nodes = decomposition.nodes,
            cores = decomposition.cores,
            "variable-interval solver ready"
        );
        Ok(Self {
            decomposition,
            ambience: system.ambience(),
        })
    }

    /// Number of power-dissipating nodes.
    pub fn cores(&self) -> usize {
        self.decomposition.cores
    }

    /// Temperature profile, K, of `power` where sample `k` lasts
    /// `durations[k]` seconds.
    ///
    /// Temperature sample `k` is taken at the end of sample `k`.
    ///
    /// # Errors
    /// * [`ConfigError::DimensionMismatch`] – `power.units()` is not the number
    ///   of cores or `durations` does not have one entry per sample.
    /// * [`ConfigError::NonPositiveDuration`] – a duration is not positive.
    pub fn compute(&self, power: &Profile, durations: &[f64]) -> std::result::Result<Profile, ConfigError> {
        let dec = &self.decomposition;
        let (nn, nc) = (dec.nodes, dec.cores);

        ensure_dimension("power profile units", nc, power.units())?;
        ensure_dimension("sample durations", power.steps(), durations.len())?;
        if let Some((sample, &value)) = durations
            .iter()
            .enumerate()
            .find(|(_, d)| !(d.is_finite() && **d > 0.0))
        {
            return Err(ConfigError::NonPositiveDuration { sample, value });
        }

        let mut temperature = Profile::new(nc, power.steps());
        let mut modal = vec![0.0; nn];
        let mut input = vec![0.0; nn];
        let mut decay = vec![0.0; nn];
        let mut gain = vec![0.0; nn];
        let mut current = f64::NAN;
        let mut refreshed = 0usize;

        for (k, &dt) in durations.iter().enumerate() {
            if dt != current {
                dec.scalars(dt, &mut decay, &mut gain);
                current = dt;
                refreshed += 1;
            }

            dec.project_power(power.sample(k), &mut input);
            for m in 0..nn {
                modal[m] = decay[m] * modal[m] + gain[m] * input[m];
            }

            for (j, q) in temperature.sample_mut(k).iter_mut().enumerate() {
                let row = &dec.modes[j * nn..(j + 1) * nn];
                *q = row.iter().zip(&modal).map(|(u, y)| u * y).sum::<f64>() + self.ambience;
            }
        }

        debug!(steps = power.steps(), refreshed, "variable-interval temperature computed");
        Ok(temperature)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
