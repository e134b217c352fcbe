/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Shared fixtures for unit tests.

use crate::system::{Application, Platform};
use crate::temperature::{Circuit, ThermalSystem};

/// Time quantum of [`layered`]: every execution time is a multiple of it.
pub(crate) const GRID: f64 = 1.0 / 1024.0;

/// Ambient temperature of [`system`].
pub(crate) const AMBIENCE: f64 = 318.15;

/// Two cores, three tasks: task 0 forks into tasks 1 and 2.
///
/// | core | time (type 0, 1) | power (type 0, 1) |
/// |---|---|---|
/// | 0 | 10 ms, 20 ms | 10 W, 12 W |
/// | 1 | 15 ms, 30 ms | 8 W, 15 W |
pub(crate) fn fork() -> (Platform, Application) {
    let platform = Platform::new(vec![
        (vec![0.010, 0.020], vec![10.0, 12.0]),
        (vec![0.015, 0.030], vec![8.0, 15.0]),
    ])
    .unwrap();
    let application = Application::new(vec![0, 1, 1], &[(0, 1), (0, 2)]).unwrap();
    (platform, application)
}

/// Three cores, three task types, twelve tasks in four layers.
pub(crate) fn layered() -> (Platform, Application) {
    let cores: Vec<(Vec<f64>, Vec<f64>)> = (0..3usize)
        .map(|c| {
            let time: Vec<f64> = (0..3usize).map(|t| ((c + 2) * (t + 3)) as f64 * GRID).collect();
            let power: Vec<f64> = (0..3usize).map(|t| (5 + 2 * c + 3 * t) as f64).collect();
            (time, power)
        })
        .collect();
    let platform = Platform::new(cores).unwrap();

    let types: Vec<usize> = (0..12).map(|i| i % 3).collect();
    let edges = [
        (0, 3),
        (0, 4),
        (1, 4),
        (1, 5),
        (2, 5),
        (2, 6),
        (3, 7),
        (4, 7),
        (4, 8),
        (5, 8),
        (5, 9),
        (6, 9),
        (7, 10),
        (8, 10),
        (8, 11),
        (9, 11),
    ];
    let application = Application::new(types, &edges).unwrap();
    (platform, application)
}

/// Two cores on a shared spreader on a heat sink.
pub(crate) fn circuit() -> Circuit {
    Circuit {
        capacitance: vec![0.02, 0.02, 0.5, 5.0],
        conductance: vec![
            2.5, -0.5, -2.0, 0.0, //
            -0.5, 2.5, -2.0, 0.0, //
            -2.0, -2.0, 8.0, -4.0, //
            0.0, 0.0, -4.0, 5.0,
        ],
    }
}

/// The thermal system of [`circuit`] with two core nodes.
pub(crate) fn system() -> ThermalSystem {
    ThermalSystem::new(circuit(), 2, AMBIENCE).unwrap()
}

/// Three cores on a shared spreader on a heat sink, matching [`layered`].
pub(crate) fn layered_system() -> ThermalSystem {
    let circuit = Circuit {
        capacitance: vec![0.02, 0.02, 0.02, 0.5, 5.0],
        conductance: vec![
            3.0, -0.5, -0.5, -2.0, 0.0, //
            -0.5, 3.0, -0.5, -2.0, 0.0, //
            -0.5, -0.5, 3.0, -2.0, 0.0, //
            -2.0, -2.0, -2.0, 10.0, -4.0, //
            0.0, 0.0, 0.0, -4.0, 5.0,
        ],
    };
    ThermalSystem::new(circuit, 3, AMBIENCE).unwrap()
}

/// Equilibrium elevation `G⁻¹·P` of [`circuit`] under constant core power.
pub(crate) fn steady_state(power: &[f64]) -> Vec<f64> {
    let Circuit { conductance, .. } = circuit();
    let n = 4;
    let mut m = conductance;
    let mut x = vec![0.0; n];
    x[..power.len()].copy_from_slice(power);

    // Gaussian elimination; G is diagonally dominant, no pivoting needed.
    for i in 0..n {
        for r in i + 1..n {
            let factor = m[r * n + i] / m[i * n + i];
            for c in i..n {
                m[r * n + c] -= factor * m[i * n + c];
            }
            x[r] -= factor * x[i];
        }
    }
    for i in (0..n).rev() {
        let tail: f64 = (i + 1..n).map(|c| m[i * n + c] * x[c]).sum();
        x[i] = (x[i] - tail) / m[i * n + i];
    }
    x
}
