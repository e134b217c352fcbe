/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Static timing of an application.
//!
//! With the execution time of every task approximated by its mean over all
//! cores, the timing computes
//!
//! * **ASAP** – the earliest start of each task when only precedence matters,
//! * **ALAP** – the latest start that does not stretch the critical path,
//! * **mobility** – `ALAP − ASAP`, the slack of each task.
//!
//! Tasks on the critical path have zero mobility.  Feeding the mobility
//! vector to [`ListScheduler::compute`](crate::schedule::ListScheduler::compute)
//! schedules the least flexible tasks first, which is the conventional
//! starting point for priority search.

use tracing::debug;

use crate::error::Error;
use crate::system::{Application, Platform};

/// ASAP/ALAP/mobility of every task.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    /// Mean execution time over all cores.
    pub duration: Vec<f64>,
    /// Earliest start times.
    pub asap: Vec<f64>,
    /// Latest start times.
    pub alap: Vec<f64>,
    /// `alap − asap`.
    pub mobility: Vec<f64>,
    /// Length of the critical path.
    pub span: f64,
}

impl Timing {
    /// Compute the timing of `application` on `platform`.
    ///
    /// # Errors
    /// * [`GraphError::Cycle`](crate::error::GraphError::Cycle) – no
    ///   topological order exists.
    /// * [`ConfigError::UnknownTaskType`](crate::error::ConfigError::UnknownTaskType) – a task type is not characterised.
    pub fn new(platform: &Platform, application: &Application) -> Result<Self, Error> {
        application.check_types(platform)?;
        let order = application.topological_order()?;
        let tasks = application.tasks();

        let cores = platform.len() as f64;
        let duration: Vec<f64> = tasks
            .iter()
            .map(|t| platform.cores().iter().map(|c| c.time(t.kind)).sum::<f64>() / cores)
            .collect();

        let mut asap = vec![0.0; tasks.len()];
        for &id in &order {
            let finish = asap[id] + duration[id];
            for &child in &tasks[id].children {
                if asap[child] < finish {
                    asap[child] = finish;
                }
            }
        }

        let span = (0..tasks.len())
            .map(|i| asap[i] + duration[i])
            .fold(0.0, f64::max);

        let mut alap: Vec<f64> = duration.iter().map(|d| span - d).collect();
        for &id in order.iter().rev() {
            for &parent in &tasks[id].parents {
                let latest = alap[id] - duration[parent];
                if alap[parent] > latest {
                    alap[parent] = latest;
                }
            }
        }

        let mobility: Vec<f64> = alap
            .iter()
            .zip(&asap)
            .map(|(l, e)| (l - e).max(0.0))
            .collect();

        debug!(tasks = tasks.len(), span, "static timing computed");

        Ok(Self {
            duration,
            asap,
            alap,
            mobility,
            span,
        })
    }

    /// Number of tasks covered by the timing.
    pub fn len(&self) -> usize {
        self.mobility.len()
    }

    /// `true` for an empty application.
    pub fn is_empty(&self) -> bool {
        self.mobility.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
