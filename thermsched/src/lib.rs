/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! thermsched – schedule, power, and temperature simulation of task graphs
//! on heterogeneous multicore platforms.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── error/        – GraphError, ConfigError, IntegrationError
//! ├── config/       – simulation settings + YAML problem loader
//! ├── system/       – platform, application, static timing (mobility)
//! ├── schedule/     – list scheduler and rescheduler
//! ├── profile       – dense cores × samples matrix
//! ├── power/        – sampled power profiles and continuous power queries
//! ├── temperature/  – RC thermal model and its three solvers
//! └── analysis      – schedule → power → temperature facade
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod power;
pub mod profile;
pub mod schedule;
pub mod system;
pub mod temperature;

#[cfg(test)]
pub(crate) mod testing;
