/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Temperature by adaptive numeric integration of the state equation.
//!
//! Unlike the closed-form solvers, the integrator consumes a continuous
//! [`PowerSource`] and makes no assumption about where power changes.  It
//! is the reference the closed-form solvers are checked against.

use std::sync::Arc;

use tracing::info;

use super::ode::{self, Settings};
use super::ThermalSystem;
use crate::config::Config;
use crate::error::{ensure_dimension, ConfigError, Result};
use crate::power::PowerSource;
use crate::profile::Profile;

/// Dormand–Prince integrator of a [`ThermalSystem`].
#[derive(Debug, Clone)]
pub struct NumericIntegrator {
    system: Arc<ThermalSystem>,
    settings: Settings,
}

impl NumericIntegrator {
    /// Create an integrator with the tolerances and step limits of `config`.
    ///
    /// # Errors
    /// The first constraint of `config` that is violated; see
    /// [`Config::validate`].
    pub fn new(
        system: Arc<ThermalSystem>,
        config: &Config,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            system,
            settings: Settings {
                absolute_error: config.absolute_error,
                relative_error: config.relative_error,
                max_steps: config.max_steps,
                max_step: config.max_step,
            },
        })
    }

    /// The integrated system.
    pub fn system(&self) -> &Arc<ThermalSystem> {
        &self.system
    }

    /// Temperature of the cores, K, at each of `times`, starting from thermal
    /// equilibrium with the ambience at `t = 0`.
    ///
    /// Column `i` of the result holds the temperature at exactly `times[i]`.
    ///
    /// # Errors
    /// * [`ConfigError::DimensionMismatch`] – `power` covers a different number
    ///   of cores than the thermal system.
    /// * [`IntegrationError::EmptyTime`], [`IntegrationError::NonFiniteTime`],
    ///   [`IntegrationError::NegativeTime`], [`IntegrationError::NonMonotonicTime`]
    ///   – `times` is not a non-empty, finite, non-negative, strictly
    ///   increasing sequence.
    /// * [`IntegrationError::StepBudgetExhausted`],
    ///   [`IntegrationError::StepSizeUnderflow`],
    ///   [`IntegrationError::NonFiniteState`] – the integration failed.
    ///
    /// [`IntegrationError::EmptyTime`]: crate::error::IntegrationError::EmptyTime
    /// [`IntegrationError::NonFiniteTime`]: crate::error::IntegrationError::NonFiniteTime
    /// [`IntegrationError::NegativeTime`]: crate::error::IntegrationError::NegativeTime
    /// [`IntegrationError::NonMonotonicTime`]: crate::error::IntegrationError::NonMonotonicTime
    /// [`IntegrationError::StepBudgetExhausted`]: crate::error::IntegrationError::StepBudgetExhausted
    /// [`IntegrationError::StepSizeUnderflow`]: crate::error::IntegrationError::StepSizeUnderflow
    /// [`IntegrationError::NonFiniteState`]: crate::error::IntegrationError::NonFiniteState
    pub fn compute<P: PowerSource + ?Sized>(&self, power: &P, times: &[f64]) -> Result<Profile> {
        let system = &*self.system;
        let (nn, nc) = (system.nodes(), system.cores());
        ensure_dimension("power source cores", nc, power.cores())?;
        let ambience = system.ambience();

        let mut temperature = Profile::new(nc, times.len());
        let mut p = vec![0.0; nc];

        let stats = ode::integrate(
            |t, state, derivative| {
                power.power(t, &mut p);
                system.derivative(state, &p, derivative);
            },
            &vec![0.0; nn],
            times,
            &self.settings,
            |i, state| {
                for (q, s) in temperature.sample_mut(i).iter_mut().zip(state) {
                    *q = s + ambience;
                }
            },
        )?;

        info!(
            points = times.len(),
            accepted = stats.accepted,
            rejected = stats.rejected,
            "numeric temperature computed"
        );
        Ok(temperature)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
