/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Greedy list scheduling of an application onto a platform.
//!
//! [`ListScheduler::compute`] turns a priority vector into a [`Schedule`];
//! [`ListScheduler::recompute`] replays an existing schedule with extra
//! per-task delays, keeping its mapping and order.
//!
//! # Algorithm
//! 1. The ready pool starts with the roots.
//! 2. While the pool is not empty: take the ready task with the lowest
//!    priority value and the core with the smallest availability time (lowest
//!    index on ties); start the task at `max(core availability, latest parent
//!    finish)` and advance the core to the task's finish.
//! 3. Children whose parents are now all scheduled enter the pool.
//!
//! Ties between equal priorities are broken by insertion order into the pool
//! (see [`pool`]).  This is a fixed, reproducible policy; it carries no
//! physical meaning.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless `compute()`; all per-run state is local |
//! | Ready pool | Fixed-capacity arena with `swap_remove` |
//! | Malformed graphs | `GraphError::Unschedulable` instead of a partial schedule |
//! | Rescheduling | Fresh `mapping`/`order` vectors, never aliasing the input |
//! | Thread safety | `Send + Sync`; platform and application are shared via `Arc` |
//!
//! # Example
//! ```rust,ignore
//! let scheduler = ListScheduler::new(platform, application)?;
//! let schedule = scheduler.compute(&priority)?;
//! let delayed = scheduler.recompute(&schedule, &delay)?;
//! ```

pub(crate) mod pool;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ensure_dimension, ConfigError, GraphError, Result};
use crate::system::{Application, Platform};

use pool::Pool;

// ── Schedule ──────────────────────────────────────────────────────────────────

/// A feasible execution of an application on a platform.
///
/// Invariants (established by [`ListScheduler`]):
/// * `finish[parent] <= start[child]` for every edge;
/// * intervals of tasks on the same core do not overlap and follow `order`;
/// * every task appears exactly once in `order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    /// Core index per task.
    pub mapping: Vec<usize>,
    /// Tasks in the order the scheduler committed them.
    pub order: Vec<usize>,
    /// Start time per task, in seconds.
    pub start: Vec<f64>,
    /// Finish time per task, in seconds.
    pub finish: Vec<f64>,
    /// Largest finish time.
    pub span: f64,
}

impl Schedule {
    /// Number of scheduled tasks.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` for the schedule of an empty application.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Execution time of `task`.
    pub fn duration(&self, task: usize) -> f64 {
        self.finish[task] - self.start[task]
    }

    /// Check that the schedule covers `tasks` tasks on `cores` cores and that
    /// `order` lists every task exactly once.
    ///
    /// # Errors
    /// * [`ConfigError::DimensionMismatch`] – a vector has the wrong length or
    ///   a task maps onto a missing core.
    /// * [`ConfigError::InvalidOrder`] – `order` is not a permutation.
    pub fn check(&self, tasks: usize, cores: usize) -> std::result::Result<(), ConfigError> {
        ensure_dimension("schedule mapping", tasks, self.mapping.len())?;
        ensure_dimension("schedule order", tasks, self.order.len())?;
        ensure_dimension("schedule start times", tasks, self.start.len())?;
        ensure_dimension("schedule finish times", tasks, self.finish.len())?;
        if let Some(&core) = self.mapping.iter().find(|&&c| c >= cores) {
            return Err(ConfigError::DimensionMismatch {
                what: "cores referenced by the schedule",
                expected: cores,
                found: core + 1,
            });
        }

        let mut seen = vec![false; tasks];
        for (position, &task) in self.order.iter().enumerate() {
            if task >= tasks || seen[task] {
                return Err(ConfigError::InvalidOrder { position, task });
            }
            seen[task] = true;
        }
        Ok(())
    }

    /// Tasks mapped to `core`, in commit order.
    pub fn tasks_on(&self, core: usize) -> impl Iterator<Item = usize> + '_ {
        self.order
            .iter()
            .copied()
            .filter(move |&t| self.mapping[t] == core)
    }
}

// ── ListScheduler ─────────────────────────────────────────────────────────────

/// The list scheduler.
///
/// Holds shared references to the platform and the application; every call
/// allocates its own working state, so one scheduler can serve concurrent
/// evaluations.
#[derive(Debug, Clone)]
pub struct ListScheduler {
    platform: Arc<Platform>,
    application: Arc<Application>,
}

impl ListScheduler {
    /// Create a scheduler for `application` on `platform`.
    ///
    /// # Errors
    /// [`ConfigError::UnknownTaskType`] if a task type is not characterised by
    /// the cores.
    pub fn new(platform: Arc<Platform>, application: Arc<Application>) -> Result<Self> {
        application.check_types(&platform)?;
        Ok(Self {
            platform,
            application,
        })
    }

    /// The platform this scheduler maps onto.
    pub fn platform(&self) -> &Arc<Platform> {
        &self.platform
    }

    /// The application this scheduler maps.
    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    // ── compute ───────────────────────────────────────────────────────────────

    /// Build a schedule from `priority`; lower values are scheduled earlier.
    ///
    /// # Errors
    /// * [`ConfigError::DimensionMismatch`] – `priority.len()` differs from the
    ///   task count.
    /// * [`ConfigError::NonFiniteValue`] – a priority is NaN.
    /// * [`GraphError::Unschedulable`] – a cycle or an unreachable task kept
    ///   some tasks out of the pool.
    pub fn compute(&self, priority: &[f64]) -> Result<Schedule> {
        check_priority(&self.application, priority)?;

        let cores = self.platform.cores();
        let tasks = self.application.tasks();
        let (cc, tc) = (cores.len(), tasks.len());

        let mut mapping = vec![0; tc];
        let mut order = Vec::with_capacity(tc);
        let mut start = vec![0.0f64; tc];
        let mut finish = vec![0.0f64; tc];

        let mut scheduled = vec![false; tc];
        // Time when each core becomes available again.
        let mut ctime = vec![0.0f64; cc];
        // Time when each task could start as far as its parents are concerned.
        let mut ttime = vec![0.0f64; tc];

        let mut pool = Pool::with_capacity(tc);
        for &root in self.application.roots() {
            pool.push(root, priority[root]);
        }

        while let Some(tid) = pool.pop() {
            let cid = earliest_core(&ctime);

            mapping[tid] = cid;
            order.push(tid);
            start[tid] = ctime[cid].max(ttime[tid]);
            finish[tid] = start[tid] + cores[cid].time(tasks[tid].kind);
            scheduled[tid] = true;
            ctime[cid] = finish[tid];

            debug!(
                task = tid,
                core = cid,
                start = start[tid],
                finish = finish[tid],
                "task committed"
            );

            for &kid in &tasks[tid].children {
                if ttime[kid] < finish[tid] {
                    ttime[kid] = finish[tid];
                }
                if tasks[kid].parents.iter().all(|&pid| scheduled[pid]) {
                    pool.push(kid, priority[kid]);
                }
            }
        }

        if order.len() < tc {
            let pending: Vec<usize> = (0..tc).filter(|&t| !scheduled[t]).collect();
            debug_assert_eq!(pending, pool.never_pushed());
            return Err(GraphError::Unschedulable { pending }.into());
        }

        let span = finish.iter().copied().fold(0.0, f64::max);

        info!(
            tasks = tc,
            cores = cc,
            pushed = pool.pushed(),
            span,
            "schedule computed"
        );

        Ok(Schedule {
            mapping,
            order,
            start,
            finish,
            span,
        })
    }

    // ── recompute ─────────────────────────────────────────────────────────────

    /// Replay `schedule` with each task lengthened by `delay[task]`.
    ///
    /// The mapping and the order are kept; start and finish times are
    /// recomputed with the rule of [`compute`](Self::compute).  The result owns
    /// fresh copies of every vector.
    ///
    /// # Errors
    /// * [`ConfigError::DimensionMismatch`] – `delay` or `schedule` does not
    ///   cover the application, or `schedule` maps onto a missing core.
    /// * [`ConfigError::InvalidOrder`] – `schedule.order` is not a permutation
    ///   of the tasks.
    /// * [`ConfigError::NonFiniteValue`] – a delay is not finite.
    /// * [`ConfigError::NegativeDuration`] – a delay shortens a task below zero.
    pub fn recompute(&self, schedule: &Schedule, delay: &[f64]) -> Result<Schedule> {
        let tasks = self.application.tasks();
        let (cc, tc) = (self.platform.len(), tasks.len());

        ensure_dimension("delay vector", tc, delay.len())?;
        schedule.check(tc, cc)?;
        if let Some(index) = delay.iter().position(|d| !d.is_finite()) {
            return Err(ConfigError::NonFiniteValue {
                what: "delay",
                index,
            }
            .into());
        }

        let mut start = vec![0.0f64; tc];
        let mut finish = vec![0.0f64; tc];
        let mut ctime = vec![0.0f64; cc];
        let mut ttime = vec![0.0f64; tc];

        for &tid in &schedule.order {
            let cid = schedule.mapping[tid];
            let duration = schedule.duration(tid) + delay[tid];
            if duration < 0.0 {
                return Err(ConfigError::NegativeDuration {
                    task: tid,
                    value: duration,
                }
                .into());
            }

            start[tid] = ctime[cid].max(ttime[tid]);
            // Zero delay with an unchanged start reproduces the old finish
            // exactly.
            finish[tid] = schedule.finish[tid] + (start[tid] - schedule.start[tid]) + delay[tid];
            ctime[cid] = finish[tid];

            for &kid in &tasks[tid].children {
                if ttime[kid] < finish[tid] {
                    ttime[kid] = finish[tid];
                }
            }
        }

        let span = finish.iter().copied().fold(0.0, f64::max);

        debug!(tasks = tc, span, previous_span = schedule.span, "schedule recomputed");

        Ok(Schedule {
            mapping: schedule.mapping.clone(),
            order: schedule.order.clone(),
            start,
            finish,
            span,
        })
    }
}

/// Index of the core with the smallest availability time; lowest index wins
/// ties.
fn earliest_core(ctime: &[f64]) -> usize {
    let mut cid = 0;
    for i in 1..ctime.len() {
        if ctime[i] < ctime[cid] {
            cid = i;
        }
    }
    cid
}

/// Check that a priority vector covers `application` and holds no NaN.
fn check_priority(application: &Application, priority: &[f64]) -> std::result::Result<(), ConfigError> {
    ensure_dimension("priority vector", application.len(), priority.len())?;
    match priority.iter().position(|p| p.is_nan()) {
        Some(index) => Err(ConfigError::NonFiniteValue {
            what: "priority",
            index,
        }),
        None => Ok(()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
