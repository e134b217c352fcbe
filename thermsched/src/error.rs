/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for thermsched.
//!
//! Three error enums model the three failure layers of the pipeline:
//!
//! * [`GraphError`] – the application graph cannot be scheduled (cycle,
//!   unreachable task, malformed edge list).
//! * [`ConfigError`] – a numeric parameter or a buffer dimension is
//!   inconsistent with the platform or the thermal system.
//! * [`IntegrationError`] – a thermal solver could not produce a trajectory.
//!
//! Every stage returns its error to the immediate caller.  No stage substitutes
//! a default value for a detected inconsistency; the one documented exception
//! is the sample clamping of [`Power::compute`](crate::power::Power::compute).
//!
//! [`Error`] wraps all three so that callers composing several stages can use
//! a single `?`.

use thiserror::Error;

// ── Graph errors ──────────────────────────────────────────────────────────────

/// The application graph is malformed or cannot be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Some tasks never became ready: they lie on a cycle or are not reachable
    /// from any root.  `pending` lists them in index order.
    #[error("{} task(s) never became ready (cycle or unreachable from a root): {pending:?}", pending.len())]
    Unschedulable { pending: Vec<usize> },

    /// A topological ordering does not exist.  `pending` lists the tasks that
    /// remained with unprocessed parents.
    #[error("application graph contains a cycle through tasks {pending:?}")]
    Cycle { pending: Vec<usize> },

    /// An edge refers to a task index outside the application.
    #[error("task {task} refers to unknown task {referenced}")]
    UnknownTask { task: usize, referenced: usize },

    /// A task lists itself as its own child.
    #[error("task {task} depends on itself")]
    SelfLoop { task: usize },

    /// The same edge appears twice in the edge list.
    #[error("edge {parent} → {child} is listed more than once")]
    DuplicateEdge { parent: usize, child: usize },
}

// ── Configuration errors ──────────────────────────────────────────────────────

/// A configuration value or a buffer dimension is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The sampling interval must be strictly positive.
    #[error("time step must be positive, got {0}")]
    NonPositiveTimeStep(f64),

    /// A per-sample duration passed to the variable-interval solver is not
    /// strictly positive.
    #[error("duration of sample {sample} must be positive, got {value}")]
    NonPositiveDuration { sample: usize, value: f64 },

    /// The platform has no cores (or the thermal system has no core nodes).
    #[error("at least one core is required")]
    NoCores,

    /// The cores characterise no task types at all.
    #[error("cores must characterise at least one task type")]
    NoTaskTypes,

    /// An error tolerance of the integrator is not strictly positive.
    #[error("{name} must be positive, got {value}")]
    NonPositiveTolerance { name: &'static str, value: f64 },

    /// The integrator step budget is zero.
    #[error("the step budget of the integrator must be positive")]
    ZeroStepBudget,

    /// A vector or matrix does not have the dimension the consumer expects.
    #[error("{what}: expected {expected} element(s), found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A task has a type the platform does not characterise.
    #[error("task {task} has type {kind}, but cores characterise only {types} type(s)")]
    UnknownTaskType {
        task: usize,
        kind: usize,
        types: usize,
    },

    /// A thermal node has a non-positive heat capacitance.
    #[error("capacitance of node {node} must be positive, got {value}")]
    NonPositiveCapacitance { node: usize, value: f64 },

    /// The conductance matrix is not symmetric.
    #[error("conductance matrix is not symmetric at ({row}, {col})")]
    AsymmetricConductance { row: usize, col: usize },

    /// A value that must be finite (and, for times and powers, non-negative)
    /// is not.
    #[error("{what}[{index}] must be finite and non-negative")]
    NonFiniteValue { what: &'static str, index: usize },

    /// A schedule's `order` is not a permutation of the tasks: the entry at
    /// `position` is out of range or repeats an earlier one.
    #[error("schedule order entry {position} (task {task}) is out of range or repeated")]
    InvalidOrder { position: usize, task: usize },

    /// A cap on the integrator step is not strictly positive.
    #[error("maximum step must be positive, got {0}")]
    NonPositiveMaxStep(f64),

    /// Rescheduling produced a negative execution time for a task.
    #[error("task {task} would run for a negative duration ({value})")]
    NegativeDuration { task: usize, value: f64 },
}

// ── Integration errors ────────────────────────────────────────────────────────

/// A thermal solver failed to produce a trajectory.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    /// No output time points were requested.
    #[error("no output time points requested")]
    EmptyTime,

    /// Output time points must be strictly increasing.
    #[error("output time points must be strictly increasing (violated at index {index})")]
    NonMonotonicTime { index: usize },

    /// An output time point is NaN or infinite.
    #[error("output time point {index} is not finite")]
    NonFiniteTime { index: usize },

    /// Integration starts at zero; earlier output points are meaningless.
    #[error("output time points must be non-negative, got {value}")]
    NegativeTime { value: f64 },

    /// The adaptive integrator used up its step budget.
    #[error("step budget of {steps} exhausted at t = {time}")]
    StepBudgetExhausted { time: f64, steps: usize },

    /// The step size collapsed below the resolution of the time axis.
    #[error("step size {step} underflowed at t = {time}")]
    StepSizeUnderflow { time: f64, step: f64 },

    /// The state left the range of finite numbers.
    #[error("state became non-finite at t = {time}")]
    NonFiniteState { time: f64 },

    /// The eigen-decomposition of the thermal system did not converge.
    #[error("eigen-decomposition did not converge within {sweeps} sweeps")]
    DecompositionNotConverged { sweeps: usize },
}

// ── Umbrella ──────────────────────────────────────────────────────────────────

/// Any error produced by the library.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Fail with [`ConfigError::DimensionMismatch`] unless `found == expected`.
pub(crate) fn ensure_dimension(
    what: &'static str,
    expected: usize,
    found: usize,
) -> std::result::Result<(), ConfigError> {
    if expected == found {
        Ok(())
    } else {
        Err(ConfigError::DimensionMismatch {
            what,
            expected,
            found,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
