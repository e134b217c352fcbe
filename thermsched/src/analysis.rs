/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedule → power → temperature in one call.
//!
//! [`Analysis`] is the entry point for design-space exploration: it is built
//! once per problem and then evaluates any number of priority vectors (or
//! delay vectors against an existing schedule).  Everything it owns is
//! immutable, so evaluations may run concurrently from several threads.
//!
//! # Example
//! ```rust,ignore
//! let analysis = Analysis::new(platform, application, &system, &config)?;
//! let evaluation = analysis.evaluate(&priority)?;
//! let peak = evaluation.peak_temperature();
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::power::Power;
use crate::profile::Profile;
use crate::schedule::{ListScheduler, Schedule};
use crate::system::{Application, Platform};
use crate::temperature::{FixedIntervalSolver, ThermalSystem};

/// The outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub schedule: Schedule,
    /// `cores × ⌊span/Δt⌋` power profile, W.
    pub power: Profile,
    /// Temperature at the end of each power sample, K.
    pub temperature: Profile,
}

impl Evaluation {
    /// Largest temperature reached by each core; `NEG_INFINITY` when the
    /// schedule is shorter than one sample.
    pub fn peak_temperature(&self) -> Vec<f64> {
        self.temperature.peak()
    }
}

/// Scheduler, power profiler, and fixed-interval solver of one problem.
#[derive(Debug, Clone)]
pub struct Analysis {
    scheduler: ListScheduler,
    power: Power,
    solver: FixedIntervalSolver,
}

impl Analysis {
    /// Build the pipeline.
    ///
    /// # Errors
    /// * [`ConfigError`](crate::error::ConfigError) – `config` is invalid,
    ///   the application uses task types the platform lacks, or the thermal
    ///   system's core count differs from the platform's.
    /// * [`IntegrationError`](crate::error::IntegrationError) – the thermal
    ///   system cannot be decomposed.
    pub fn new(
        platform: Arc<Platform>,
        application: Arc<Application>,
        system: &ThermalSystem,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;
        crate::error::ensure_dimension("thermal core nodes", platform.len(), system.cores())?;

        let scheduler = ListScheduler::new(platform.clone(), application.clone())?;
        let power = Power::new(platform, application, config.time_step)?;
        let solver = FixedIntervalSolver::new(system, config.time_step)?;

        info!(time_step = config.time_step, "analysis ready");
        Ok(Self {
            scheduler,
            power,
            solver,
        })
    }

    /// The scheduler used by [`evaluate`](Self::evaluate).
    pub fn scheduler(&self) -> &ListScheduler {
        &self.scheduler
    }

    /// Schedule the application with `priority` and simulate it.
    ///
    /// # Errors
    /// See [`ListScheduler::compute`].
    pub fn evaluate(&self, priority: &[f64]) -> Result<Evaluation> {
        let schedule = self.scheduler.compute(priority)?;
        self.simulate(schedule)
    }

    /// Replay `schedule` with `delay` and simulate the result.
    ///
    /// # Errors
    /// See [`ListScheduler::recompute`].
    pub fn reevaluate(&self, schedule: &Schedule, delay: &[f64]) -> Result<Evaluation> {
        let schedule = self.scheduler.recompute(schedule, delay)?;
        self.simulate(schedule)
    }

    fn simulate(&self, schedule: Schedule) -> Result<Evaluation> {
        let steps = self.power.steps(&schedule);
        let power = self.power.compute(&schedule, steps)?;
        let temperature = self.solver.compute(&power)?;

        debug!(span = schedule.span, steps, "evaluation finished");
        Ok(Evaluation {
            schedule,
            power,
            temperature,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error};
    use crate::testing;

    fn fork_analysis() -> Analysis {
        let (platform, application) = testing::fork();
        Analysis::new(
            Arc::new(platform),
            Arc::new(application),
            &testing::system(),
            &Config::default(),
        )
        .unwrap()
    }

    #[test]
    fn fork_evaluation_end_to_end() {
        let analysis = fork_analysis();
        let evaluation = analysis.evaluate(&[0.0, 1.0, 2.0]).unwrap();

        let schedule = &evaluation.schedule;
        assert_eq!(schedule.mapping, vec![0, 1, 0]);
        assert_eq!(schedule.start, vec![0.0, 0.010, 0.010]);
        assert_eq!(schedule.span, 0.040);

        // ⌊40 ms / 1 ms⌋ samples.
        assert_eq!(evaluation.power.steps(), 40);
        assert_eq!(evaluation.temperature.steps(), 40);
        assert_eq!(evaluation.power[(0, 0)], 10.0);
        assert_eq!(evaluation.power[(0, 35)], 0.0);
        assert_eq!(evaluation.power[(1, 39)], 15.0);

        let peak = evaluation.peak_temperature();
        assert!(peak.iter().all(|&t| t > testing::AMBIENCE), "{peak:?}");
        // Core 1 dissipates 15 W until the end; core 0 idles for the last 10 ms.
        assert!(
            evaluation.temperature[(1, 39)] > evaluation.temperature[(0, 39)],
            "busy core must end hotter"
        );
    }

    #[test]
    fn zero_delay_reevaluation_is_identical() {
        let analysis = fork_analysis();
        let first = analysis.evaluate(&[0.0, 2.0, 1.0]).unwrap();
        let again = analysis.reevaluate(&first.schedule, &[0.0; 3]).unwrap();
        assert_eq!(again, first);
    }

    #[test]
    fn delay_extends_the_profiles() {
        let analysis = fork_analysis();
        let first = analysis.evaluate(&[0.0, 1.0, 2.0]).unwrap();
        let delayed = analysis.reevaluate(&first.schedule, &[0.005, 0.0, 0.0]).unwrap();
        assert_eq!(delayed.power.steps(), 45);
        assert_eq!(delayed.schedule.mapping, first.schedule.mapping);
    }

    #[test]
    fn mismatched_thermal_cores_are_rejected() {
        let (platform, application) = testing::layered();
        let err = Analysis::new(
            Arc::new(platform),
            Arc::new(application),
            &testing::system(),
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::DimensionMismatch { expected: 3, found: 2, .. })
        ));
    }

    #[test]
    fn evaluations_run_concurrently() {
        let analysis = Arc::new(fork_analysis());
        let expected = analysis.evaluate(&[0.0, 1.0, 2.0]).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let analysis = Arc::clone(&analysis);
                std::thread::spawn(move || analysis.evaluate(&[0.0, 1.0, 2.0]).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
