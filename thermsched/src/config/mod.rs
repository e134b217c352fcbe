/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Simulation settings and problem description loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! config:                       # optional, every field has a default
//!   time_step: 0.001            # seconds
//!   ambience: 318.15            # kelvin
//!   absolute_error: 1.0e-6
//!   relative_error: 1.0e-6
//!   max_steps: 1000000
//!   max_step: 0.01              # optional
//! platform:
//!   cores:
//!     - { time: [0.010, 0.020], power: [12.0, 18.0] }   # indexed by task type
//!     - { time: [0.015, 0.030], power: [8.0, 11.0] }
//! application:
//!   tasks:
//!     - { type: 0, children: [1, 2] }
//!     - { type: 1 }
//!     - { type: 1 }
//! thermal:
//!   capacitance: [0.02, 0.02, 0.5, 5.0]                 # J/K per node
//!   conductance:                                        # W/K, symmetric
//!     - [ 2.5, -0.5, -2.0,  0.0]
//!     - [-0.5,  2.5, -2.0,  0.0]
//!     - [-2.0, -2.0,  8.0, -4.0]
//!     - [ 0.0,  0.0, -4.0,  5.0]
//!   cores: 2                    # optional, defaults to the platform's core count
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::system::{Application, Platform};
use crate::temperature::{Circuit, ThermalSystem};

// ── Config ────────────────────────────────────────────────────────────────────

/// Numerical settings shared by the power profiler and the thermal solvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Sampling interval of power and temperature profiles, seconds.
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    /// Ambient temperature, kelvin.
    #[serde(default = "default_ambience")]
    pub ambience: f64,
    /// Absolute error tolerance of the numeric integrator.
    #[serde(default = "default_error")]
    pub absolute_error: f64,
    /// Relative error tolerance of the numeric integrator.
    #[serde(default = "default_error")]
    pub relative_error: f64,
    /// Step budget (accepted plus rejected) of one integration.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Largest step the numeric integrator may take, seconds.
    #[serde(default)]
    pub max_step: Option<f64>,
}

fn default_time_step() -> f64 {
    1e-3
}

fn default_ambience() -> f64 {
    318.15
}

fn default_error() -> f64 {
    1e-6
}

fn default_max_steps() -> usize {
    1_000_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
            ambience: default_ambience(),
            absolute_error: default_error(),
            relative_error: default_error(),
            max_steps: default_max_steps(),
            max_step: None,
        }
    }
}

impl Config {
    /// Check every field.
    ///
    /// # Errors
    /// The first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(ConfigError::NonPositiveTimeStep(self.time_step));
        }
        if !self.ambience.is_finite() {
            return Err(ConfigError::NonFiniteValue {
                what: "ambience",
                index: 0,
            });
        }
        for (name, value) in [
            ("absolute_error", self.absolute_error),
            ("relative_error", self.relative_error),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NonPositiveTolerance { name, value });
            }
        }
        if self.max_steps == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }
        if let Some(value) = self.max_step {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositiveMaxStep(value));
            }
        }
        Ok(())
    }
}

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProblemFile {
    #[serde(default)]
    config: Config,
    platform: PlatformEntry,
    application: ApplicationEntry,
    thermal: ThermalEntry,
}

#[derive(Debug, Deserialize)]
struct PlatformEntry {
    cores: Vec<CoreEntry>,
}

#[derive(Debug, Deserialize)]
struct CoreEntry {
    time: Vec<f64>,
    power: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ApplicationEntry {
    tasks: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize)]
struct TaskEntry {
    #[serde(rename = "type")]
    kind: usize,
    #[serde(default)]
    children: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct ThermalEntry {
    capacitance: Vec<f64>,
    conductance: Vec<Vec<f64>>,
    cores: Option<usize>,
}

// ── Problem ───────────────────────────────────────────────────────────────────

/// A complete, validated problem: settings, platform, application, and the
/// thermal model of the platform.
#[derive(Debug, Clone)]
pub struct Problem {
    pub config: Config,
    pub platform: Platform,
    pub application: Application,
    pub system: ThermalSystem,
}

impl Problem {
    /// Parse and validate the problem description at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is structurally
    /// invalid, or any part of the problem fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading problem description from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open problem file: {}", path.display()))?;

        Self::from_yaml(&content).with_context(|| format!("Invalid problem file: {}", path.display()))
    }

    /// Parse and validate a problem description held in memory.
    ///
    /// # Errors
    /// See [`from_file`](Self::from_file).
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ProblemFile = serde_yaml::from_str(content).context("Failed to parse YAML")?;

        let config = file.config;
        config.validate().context("Invalid config section")?;

        let platform = Platform::new(
            file.platform
                .cores
                .into_iter()
                .map(|c| (c.time, c.power))
                .collect(),
        )
        .context("Invalid platform section")?;

        let mut types = Vec::with_capacity(file.application.tasks.len());
        let mut edges = Vec::new();
        for (id, task) in file.application.tasks.into_iter().enumerate() {
            types.push(task.kind);
            edges.extend(task.children.into_iter().map(|child| (id, child)));
        }
        let application = Application::new(types, &edges).context("Invalid application section")?;
        application
            .check_types(&platform)
            .context("Application does not match the platform")?;

        let nn = file.thermal.capacitance.len();
        let mut conductance = Vec::with_capacity(nn * nn);
        for (row, values) in file.thermal.conductance.into_iter().enumerate() {
            if values.len() != nn {
                bail!(
                    "Conductance row {} has {} entries, expected {}",
                    row,
                    values.len(),
                    nn
                );
            }
            conductance.extend(values);
        }
        let circuit = Circuit {
            capacitance: file.thermal.capacitance,
            conductance,
        };
        let cores = file.thermal.cores.unwrap_or(platform.len());
        if cores != platform.len() {
            bail!(
                "Thermal model has {} core node(s) but the platform has {} core(s)",
                cores,
                platform.len()
            );
        }
        let system =
            ThermalSystem::new(circuit, cores, config.ambience).context("Invalid thermal section")?;

        debug!(
            time_step = config.time_step,
            ambience = config.ambience,
            absolute_error = config.absolute_error,
            relative_error = config.relative_error,
            "Problem settings"
        );
        info!(
            cores = platform.len(),
            types = platform.types(),
            tasks = application.len(),
            nodes = system.nodes(),
            "Problem loaded"
        );

        Ok(Self {
            config,
            platform,
            application,
            system,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
