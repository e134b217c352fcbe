/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Power dissipation of a schedule.
//!
//! Two views of the same schedule:
//!
//! * **Sampled** – [`Power::compute`] discretises the schedule onto a grid of
//!   `Δt`-long samples and fills a `cores × steps` [`Profile`].  This is the
//!   input of the closed-form thermal solvers.
//! * **Continuous** – [`Power::query`] returns a [`PowerQuery`] that evaluates
//!   the power of every core at an arbitrary time moment.  This is the forcing
//!   term of the numeric integrator.
//!
//! # Clamping contract
//! Sample `k` covers `[kΔt, (k + 1)Δt)`.  A task occupies the samples
//! `⌊start/Δt⌋ .. ⌊finish/Δt⌋` clipped to the profile.  Samples the schedule
//! does not reach keep the value they had before the call, and activity past
//! the last sample is dropped.  Neither case is an error.

use std::sync::Arc;

use tracing::debug;

use crate::error::{ensure_dimension, ConfigError};
use crate::profile::Profile;
use crate::schedule::Schedule;
use crate::system::{Application, Platform};

// ── PowerSource ───────────────────────────────────────────────────────────────

/// A continuous-time power signal.
///
/// `power` writes the power of every core at `time` into `out`, whose length
/// is [`cores`](Self::cores).
pub trait PowerSource {
    /// Number of cores the signal covers.
    fn cores(&self) -> usize;

    fn power(&self, time: f64, out: &mut [f64]);
}

impl<T: PowerSource + ?Sized> PowerSource for &T {
    #[inline]
    fn cores(&self) -> usize {
        (**self).cores()
    }

    #[inline]
    fn power(&self, time: f64, out: &mut [f64]) {
        (**self).power(time, out)
    }
}

// ── Power ─────────────────────────────────────────────────────────────────────

/// Power distributor for a platform, an application, and a sampling interval.
#[derive(Debug, Clone)]
pub struct Power {
    platform: Arc<Platform>,
    application: Arc<Application>,
    time_step: f64,
}

impl Power {
    /// Create a power distributor sampling every `time_step` seconds.
    ///
    /// # Errors
    /// [`ConfigError::NonPositiveTimeStep`] unless `time_step > 0`.
    pub fn new(
        platform: Arc<Platform>,
        application: Arc<Application>,
        time_step: f64,
    ) -> Result<Self, ConfigError> {
        if !(time_step > 0.0 && time_step.is_finite()) {
            return Err(ConfigError::NonPositiveTimeStep(time_step));
        }
        application.check_types(&platform)?;
        Ok(Self {
            platform,
            application,
            time_step,
        })
    }

    /// The sampling interval.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Number of whole samples the schedule's span covers.
    pub fn steps(&self, schedule: &Schedule) -> usize {
        (schedule.span / self.time_step).floor() as usize
    }

    /// Power profile of `schedule` with `steps` zero-initialised samples.
    ///
    /// # Errors
    /// See [`compute_into`](Self::compute_into).
    pub fn compute(&self, schedule: &Schedule, steps: usize) -> Result<Profile, ConfigError> {
        let mut profile = Profile::new(self.platform.len(), steps);
        self.compute_into(schedule, &mut profile)?;
        Ok(profile)
    }

    /// Write the power profile of `schedule` into `profile`.
    ///
    /// Only samples touched by some task are written; everything else keeps
    /// its pre-supplied value.
    ///
    /// # Errors
    /// * [`ConfigError::DimensionMismatch`] – `profile.units()` differs from
    ///   the number of cores or `schedule` does not cover the application.
    /// * [`ConfigError::InvalidOrder`] – `schedule.order` is not a permutation.
    pub fn compute_into(&self, schedule: &Schedule, profile: &mut Profile) -> Result<(), ConfigError> {
        self.check_schedule(schedule)?;
        ensure_dimension("power profile units", self.platform.len(), profile.units())?;

        let (cores, tasks) = (self.platform.cores(), self.application.tasks());
        let (dt, steps) = (self.time_step, profile.steps());

        for (tid, task) in tasks.iter().enumerate() {
            let cid = schedule.mapping[tid];
            let p = cores[cid].power(task.kind);
            let s = sample_index(schedule.start[tid], dt).min(steps);
            let f = sample_index(schedule.finish[tid], dt).min(steps);
            for step in s..f {
                profile[(cid, step)] = p;
            }
        }

        debug!(
            cores = profile.units(),
            steps,
            covered = self.steps(schedule),
            "power profile computed"
        );
        Ok(())
    }

    /// Continuous-time power of `schedule`.
    ///
    /// # Errors
    /// See [`Schedule::check`].
    pub fn query(&self, schedule: &Schedule) -> Result<PowerQuery, ConfigError> {
        self.check_schedule(schedule)?;

        let (cores, tasks) = (self.platform.cores(), self.application.tasks());
        let mut intervals: Vec<Vec<Interval>> = vec![Vec::new(); cores.len()];
        for &tid in &schedule.order {
            let cid = schedule.mapping[tid];
            intervals[cid].push(Interval {
                start: schedule.start[tid],
                finish: schedule.finish[tid],
                power: cores[cid].power(tasks[tid].kind),
            });
        }

        Ok(PowerQuery { intervals })
    }

    fn check_schedule(&self, schedule: &Schedule) -> Result<(), ConfigError> {
        schedule.check(self.application.len(), self.platform.len())
    }
}

/// `⌊time / Δt⌋`, with negative times mapped to zero.
#[inline]
fn sample_index(time: f64, dt: f64) -> usize {
    (time / dt).floor().max(0.0) as usize
}

// ── PowerQuery ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Interval {
    start: f64,
    finish: f64,
    power: f64,
}

/// Continuous-time power of a schedule.
///
/// Holds, per core, the execution intervals of the tasks mapped to it, so an
/// evaluation scans only the tasks of each core.  The query owns its data and
/// stays valid after the schedule is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerQuery {
    intervals: Vec<Vec<Interval>>,
}

impl PowerSource for PowerQuery {
    fn cores(&self) -> usize {
        self.intervals.len()
    }

    /// Power of the task whose `[start, finish]` contains `time`, or zero.
    ///
    /// Intervals on one core do not overlap, so at most one task matches
    /// except at a shared boundary, where the earlier task wins.
    fn power(&self, time: f64, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.intervals.len());
        for (value, intervals) in out.iter_mut().zip(&self.intervals) {
            *value = intervals
                .iter()
                .find(|i| i.start <= time && time <= i.finish)
                .map_or(0.0, |i| i.power);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ListScheduler;
    use crate::testing;

    fn fork_power(time_step: f64) -> (Power, Schedule) {
        let (platform, app) = testing::fork();
        let (platform, app) = (Arc::new(platform), Arc::new(app));
        let scheduler = ListScheduler::new(platform.clone(), app.clone()).unwrap();
        let schedule = scheduler.compute(&[0.0, 1.0, 2.0]).unwrap();
        (Power::new(platform, app, time_step).unwrap(), schedule)
    }

    // ── Sampled mode ──────────────────────────────────────────────────────────

    #[test]
    fn sampled_fork_profile() {
        // Task 0: core 0, [0, 10) ms, 10 W.
        // Task 1: core 1, [10, 40) ms, 15 W.
        // Task 2: core 0, [10, 30) ms, 12 W.
        let (power, schedule) = fork_power(0.005);
        let steps = power.steps(&schedule);
        assert_eq!(steps, 8);

        let profile = power.compute(&schedule, steps).unwrap();
        assert_eq!(profile.unit(0), vec![10.0, 10.0, 12.0, 12.0, 12.0, 12.0, 0.0, 0.0]);
        assert_eq!(profile.unit(1), vec![0.0, 0.0, 15.0, 15.0, 15.0, 15.0, 15.0, 15.0]);
    }

    #[test]
    fn sampled_profile_is_truncated_to_requested_steps() {
        let (power, schedule) = fork_power(0.005);
        let full = power.compute(&schedule, 8).unwrap();
        let short = power.compute(&schedule, 3).unwrap();
        assert_eq!(short.data(), &full.data()[..2 * 3]);
    }

    #[test]
    fn untouched_samples_keep_their_default() {
        let (power, schedule) = fork_power(0.005);
        let mut profile = Profile::filled(2, 10, -1.0);
        power.compute_into(&schedule, &mut profile).unwrap();
        assert_eq!(profile[(0, 7)], -1.0, "core 0 idle after 30 ms");
        assert_eq!(profile[(1, 0)], -1.0, "core 1 idle before 10 ms");
        assert_eq!(profile[(1, 9)], -1.0, "beyond the span");
        assert_eq!(profile[(1, 7)], 15.0);
    }

    #[test]
    fn profile_with_wrong_units_is_rejected() {
        let (power, schedule) = fork_power(0.005);
        let mut profile = Profile::new(3, 4);
        let err = power.compute_into(&schedule, &mut profile).unwrap_err();
        assert!(matches!(err, ConfigError::DimensionMismatch { .. }));
    }

    #[test]
    fn schedule_with_repeated_task_is_rejected() {
        let (power, mut schedule) = fork_power(0.005);
        schedule.order = vec![0, 0, 2];
        let expected = ConfigError::InvalidOrder {
            position: 1,
            task: 0,
        };
        assert_eq!(power.compute(&schedule, 8).unwrap_err(), expected);
        assert_eq!(power.query(&schedule).unwrap_err(), expected);
    }

    #[test]
    fn non_positive_time_step_is_rejected() {
        let (platform, app) = testing::fork();
        let err = Power::new(Arc::new(platform), Arc::new(app), 0.0).unwrap_err();
        assert_eq!(err, ConfigError::NonPositiveTimeStep(0.0));
    }

    // ── Continuous mode ───────────────────────────────────────────────────────

    #[test]
    fn query_reports_active_task_or_zero() {
        let (power, schedule) = fork_power(0.005);
        let query = power.query(&schedule).unwrap();
        let mut out = vec![f64::NAN; 2];

        query.power(0.004, &mut out);
        assert_eq!(out, vec![10.0, 0.0]);
        query.power(0.020, &mut out);
        assert_eq!(out, vec![12.0, 15.0]);
        query.power(0.035, &mut out);
        assert_eq!(out, vec![0.0, 15.0]);
        query.power(0.050, &mut out);
        assert_eq!(out, vec![0.0, 0.0]);
    }

    #[test]
    fn sampled_matches_query_at_midpoints() {
        // Every task boundary of the fork schedule lies on the 5 ms grid.
        let (power, schedule) = fork_power(0.005);
        let steps = power.steps(&schedule);
        let profile = power.compute(&schedule, steps).unwrap();
        let query = power.query(&schedule).unwrap();

        let mut out = vec![0.0; 2];
        for step in 0..steps {
            query.power((step as f64 + 0.5) * 0.005, &mut out);
            assert_eq!(profile.sample(step), out.as_slice(), "sample {step}");
        }
    }

    #[test]
    fn sampled_matches_query_on_layered_application() {
        let (platform, app) = testing::layered();
        let (platform, app) = (Arc::new(platform), Arc::new(app));
        let scheduler = ListScheduler::new(platform.clone(), app.clone()).unwrap();
        let priority: Vec<f64> = (0..app.len()).map(|i| ((i * 5) % 7) as f64).collect();
        let schedule = scheduler.compute(&priority).unwrap();

        // Execution times of the layered platform are multiples of 2⁻¹⁰ s.
        let dt = testing::GRID;
        let power = Power::new(platform.clone(), app, dt).unwrap();
        let steps = power.steps(&schedule);
        let profile = power.compute(&schedule, steps).unwrap();
        let query = power.query(&schedule).unwrap();

        let mut out = vec![0.0; platform.len()];
        for step in 0..steps {
            query.power((step as f64 + 0.5) * dt, &mut out);
            assert_eq!(profile.sample(step), out.as_slice(), "sample {step}");
        }
    }
}
