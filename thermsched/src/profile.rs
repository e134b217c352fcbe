/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Dense per-core profiles.
//!
//! A profile is a matrix that captures the evolution of a quantity (power,
//! temperature) over a number of samples with respect to a number of units
//! (cores).  Storage is sample-major: the values of all units at one sample
//! are contiguous, which is the access pattern of every solver.

use std::ops::{Index, IndexMut};

use serde::Serialize;

/// A `units × steps` matrix.
///
/// `data.len() == units * steps` holds for every instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    units: usize,
    steps: usize,
    /// `data[step * units + unit]`.
    data: Vec<f64>,
}

impl Profile {
    /// A zero-filled profile.
    pub fn new(units: usize, steps: usize) -> Self {
        Self::filled(units, steps, 0.0)
    }

    /// A profile with every entry set to `value`.
    pub fn filled(units: usize, steps: usize, value: f64) -> Self {
        Self {
            units,
            steps,
            data: vec![value; units * steps],
        }
    }

    /// Wrap sample-major `data`.
    ///
    /// Returns `None` unless `data.len() == units * steps`.
    pub fn from_data(units: usize, steps: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == units * steps).then_some(Self { units, steps, data })
    }

    /// The number of units (cores).
    #[inline]
    pub fn units(&self) -> usize {
        self.units
    }

    /// The number of samples.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The raw sample-major storage.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// The values of all units at `step`.
    #[inline]
    pub fn sample(&self, step: usize) -> &[f64] {
        &self.data[step * self.units..(step + 1) * self.units]
    }

    /// The values of all units at `step`, mutably.
    #[inline]
    pub fn sample_mut(&mut self, step: usize) -> &mut [f64] {
        &mut self.data[step * self.units..(step + 1) * self.units]
    }

    /// Iterate over samples.
    pub fn samples(&self) -> impl Iterator<Item = &[f64]> {
        // `max(1)` keeps `chunks_exact` happy for unit-less profiles.
        self.data.chunks_exact(self.units.max(1))
    }

    /// The trajectory of one unit.
    pub fn unit(&self, unit: usize) -> Vec<f64> {
        (0..self.steps).map(|step| self[(unit, step)]).collect()
    }

    /// Largest value per unit; `NEG_INFINITY` for an empty profile.
    pub fn peak(&self) -> Vec<f64> {
        let mut peak = vec![f64::NEG_INFINITY; self.units];
        for sample in self.samples() {
            for (p, &v) in peak.iter_mut().zip(sample) {
                if v > *p {
                    *p = v;
                }
            }
        }
        peak
    }
}

impl Index<(usize, usize)> for Profile {
    type Output = f64;

    /// `profile[(unit, step)]`.
    #[inline]
    fn index(&self, (unit, step): (usize, usize)) -> &f64 {
        debug_assert!(unit < self.units);
        &self.data[step * self.units + unit]
    }
}

impl IndexMut<(usize, usize)> for Profile {
    #[inline]
    fn index_mut(&mut self, (unit, step): (usize, usize)) -> &mut f64 {
        debug_assert!(unit < self.units);
        &mut self.data[step * self.units + unit]
    }
}

impl From<Profile> for Vec<f64> {
    #[inline]
    fn from(profile: Profile) -> Vec<f64> {
        profile.data
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
