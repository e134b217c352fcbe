/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};

use thermsched::analysis::{Analysis, Evaluation};
use thermsched::config::Problem;
use thermsched::system::timing::Timing;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Thermal-aware schedule evaluation.
///
/// Example:
///   thermsched --problem problem.yaml --priority 0,1,2 --output report.yaml
#[derive(Debug, Parser)]
#[command(
    name = "thermsched",
    about = "Schedule a task graph and simulate its power and temperature",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML problem description.
    #[arg(short = 'p', long = "problem")]
    problem: PathBuf,

    /// Comma-separated priority per task (lower runs earlier).
    /// Defaults to the mobility of each task.
    #[arg(short = 'r', long = "priority", value_delimiter = ',')]
    priority: Option<Vec<f64>>,

    /// Where to write a YAML report of the schedule and the profiles.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Report<'a> {
    priority: &'a [f64],
    peak_temperature: Vec<f64>,
    #[serde(flatten)]
    evaluation: &'a Evaluation,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        problem  = %cli.problem.display(),
        priority = ?cli.priority,
        output   = ?cli.output,
        "Configuration"
    );

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let problem = Problem::from_file(&cli.problem)?;

    let priority = match &cli.priority {
        Some(priority) => priority.clone(),
        None => {
            let timing = Timing::new(&problem.platform, &problem.application)
                .context("Cannot derive the default priority")?;
            info!(span = timing.span, "Using task mobility as priority");
            timing.mobility
        }
    };

    let analysis = Analysis::new(
        Arc::new(problem.platform),
        Arc::new(problem.application),
        &problem.system,
        &problem.config,
    )
    .context("Cannot set up the analysis")?;

    let evaluation = analysis.evaluate(&priority).context("Evaluation failed")?;
    let peak = evaluation.peak_temperature();

    info!(
        span = evaluation.schedule.span,
        samples = evaluation.temperature.steps(),
        "Schedule evaluated"
    );
    for (core, t) in peak.iter().enumerate() {
        info!(core, peak = t, "Peak temperature");
    }

    if let Some(path) = &cli.output {
        write_report(
            path,
            &Report {
                priority: &priority,
                peak_temperature: peak,
                evaluation: &evaluation,
            },
        )?;
    }
    Ok(())
}

fn write_report(path: &Path, report: &Report<'_>) -> Result<()> {
    let content = serde_yaml::to_string(report).context("Failed to serialise the report")?;
    std::fs::write(path, content)
        .with_context(|| format!("Cannot write report file: {}", path.display()))?;
    info!("Report written to: {}", path.display());
    Ok(())
}
