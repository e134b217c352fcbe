/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Platform and application models consumed by the scheduler.
//!
//! ```text
//! Platform ──┐
//!            ├──► ListScheduler ──► Schedule ──► Power ──► thermal solvers
//! Application┘
//! ```
//!
//! # Ownership model
//! Both [`Platform`] and [`Application`] are validated once at construction
//! and immutable afterwards.  They are meant to be wrapped in an `Arc` and
//! shared read-only by any number of schedulers and power profilers that run
//! independent evaluations.

pub mod timing;

use crate::error::{ConfigError, GraphError};

// ── Core ──────────────────────────────────────────────────────────────────────

/// A processing element characterised per task type.
///
/// `time[kind]` is the execution time (seconds) and `power[kind]` the power
/// draw (watts) of a task of type `kind` on this core.
#[derive(Debug, Clone, PartialEq)]
pub struct Core {
    /// Position of the core in the platform.
    pub id: usize,
    time: Vec<f64>,
    power: Vec<f64>,
}

impl Core {
    /// Execution time of a task of type `kind`, in seconds.
    #[inline]
    pub fn time(&self, kind: usize) -> f64 {
        self.time[kind]
    }

    /// Power dissipated while executing a task of type `kind`, in watts.
    #[inline]
    pub fn power(&self, kind: usize) -> f64 {
        self.power[kind]
    }
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// An ordered set of heterogeneous cores.
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    cores: Vec<Core>,
    types: usize,
}

impl Platform {
    /// Build a platform from per-core `(time, power)` tables indexed by task
    /// type.
    ///
    /// # Errors
    /// * [`ConfigError::NoCores`] – `cores` is empty.
    /// * [`ConfigError::NoTaskTypes`] – the first core characterises no types.
    /// * [`ConfigError::DimensionMismatch`] – tables of different lengths.
    /// * [`ConfigError::NonFiniteValue`] – a negative or non-finite entry.
    pub fn new(cores: Vec<(Vec<f64>, Vec<f64>)>) -> Result<Self, ConfigError> {
        let Some((first, _)) = cores.first() else {
            return Err(ConfigError::NoCores);
        };
        let types = first.len();
        if types == 0 {
            return Err(ConfigError::NoTaskTypes);
        }

        let mut built = Vec::with_capacity(cores.len());
        for (id, (time, power)) in cores.into_iter().enumerate() {
            crate::error::ensure_dimension("core execution times", types, time.len())?;
            crate::error::ensure_dimension("core power draws", types, power.len())?;
            if let Some(index) = time.iter().position(|t| !(t.is_finite() && *t >= 0.0)) {
                return Err(ConfigError::NonFiniteValue {
                    what: "core execution time",
                    index,
                });
            }
            if let Some(index) = power.iter().position(|p| !(p.is_finite() && *p >= 0.0)) {
                return Err(ConfigError::NonFiniteValue {
                    what: "core power draw",
                    index,
                });
            }
            built.push(Core { id, time, power });
        }

        Ok(Self {
            cores: built,
            types,
        })
    }

    /// The cores in platform order.
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// Number of cores.
    pub fn len(&self) -> usize {
        self.cores.len()
    }

    /// Always `false`: construction rejects empty platforms.
    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Number of task types every core characterises.
    pub fn types(&self) -> usize {
        self.types
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// A node of the application graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Position of the task in the application.
    pub id: usize,
    /// Task type; indexes the per-core time and power tables.
    pub kind: usize,
    /// Tasks that must finish before this one starts (ascending).
    pub parents: Vec<usize>,
    /// Tasks that wait for this one (ascending).
    pub children: Vec<usize>,
}

impl Task {
    /// A task without parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

// ── Application ───────────────────────────────────────────────────────────────

/// A task graph.
///
/// Cycles are **not** rejected at construction: the list scheduler detects
/// and reports them as [`GraphError::Unschedulable`], and
/// [`topological_order`](Self::topological_order) as [`GraphError::Cycle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    tasks: Vec<Task>,
    roots: Vec<usize>,
}

impl Application {
    /// Build an application from task types and `(parent, child)` edges.
    ///
    /// # Errors
    /// * [`GraphError::UnknownTask`] – an edge endpoint is out of range.
    /// * [`GraphError::SelfLoop`] – an edge connects a task to itself.
    /// * [`GraphError::DuplicateEdge`] – an edge is listed twice.
    pub fn new(types: Vec<usize>, edges: &[(usize, usize)]) -> Result<Self, GraphError> {
        let count = types.len();
        let mut tasks: Vec<Task> = types
            .into_iter()
            .enumerate()
            .map(|(id, kind)| Task {
                id,
                kind,
                parents: Vec::new(),
                children: Vec::new(),
            })
            .collect();

        for &(parent, child) in edges {
            if parent >= count {
                return Err(GraphError::UnknownTask {
                    task: child,
                    referenced: parent,
                });
            }
            if child >= count {
                return Err(GraphError::UnknownTask {
                    task: parent,
                    referenced: child,
                });
            }
            if parent == child {
                return Err(GraphError::SelfLoop { task: parent });
            }
            if tasks[parent].children.contains(&child) {
                return Err(GraphError::DuplicateEdge { parent, child });
            }
            tasks[parent].children.push(child);
            tasks[child].parents.push(parent);
        }

        for task in tasks.iter_mut() {
            task.parents.sort_unstable();
            task.children.sort_unstable();
        }

        let roots = tasks.iter().filter(|t| t.is_root()).map(|t| t.id).collect();

        Ok(Self { tasks, roots })
    }

    /// The tasks in index order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// `true` for an application without tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks without parents, in index order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// All `(parent, child)` edges, ordered by parent then child.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.tasks
            .iter()
            .flat_map(|t| t.children.iter().map(move |&c| (t.id, c)))
    }

    /// Kahn's algorithm with a FIFO queue seeded by the roots.
    ///
    /// # Errors
    /// [`GraphError::Cycle`] if some tasks lie on (or behind) a cycle.
    pub fn topological_order(&self) -> Result<Vec<usize>, GraphError> {
        let mut missing: Vec<usize> = self.tasks.iter().map(|t| t.parents.len()).collect();
        let mut queue: std::collections::VecDeque<usize> = self.roots.iter().copied().collect();
        let mut order = Vec::with_capacity(self.tasks.len());

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &child in &self.tasks[id].children {
                missing[child] -= 1;
                if missing[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if order.len() < self.tasks.len() {
            let pending = (0..self.tasks.len()).filter(|&i| missing[i] > 0).collect();
            return Err(GraphError::Cycle { pending });
        }
        Ok(order)
    }

    /// Check that every task type is characterised by `platform`.
    ///
    /// # Errors
    /// [`ConfigError::UnknownTaskType`] for the first offending task.
    pub fn check_types(&self, platform: &Platform) -> Result<(), ConfigError> {
        match self.tasks.iter().find(|t| t.kind >= platform.types()) {
            Some(task) => Err(ConfigError::UnknownTaskType {
                task: task.id,
                kind: task.kind,
                types: platform.types(),
            }),
            None => Ok(()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
