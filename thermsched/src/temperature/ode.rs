/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Dormand–Prince 5(4) with adaptive step size.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Output | Requested times are hit exactly by shortening the step onto them |
//! | Shortened steps | The unshortened proposal is carried over to the next interval |
//! | Error norm | RMS of `err_i / (atol + rtol·max(|y_i|, |ŷ_i|))` |
//! | Step control | `0.9·err^{-1/5}` clamped to `[0.2, 10]`, at most `1` right after a rejection |
//! | First step | Hairer's heuristic from the initial slope |
//! | Stage reuse | FSAL: the last stage of an accepted step is the first of the next |

use tracing::debug;

use crate::error::IntegrationError;

const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

const A: [[f64; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];

/// Fifth-order weights minus fourth-order weights.
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// Step-size control parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Settings {
    pub absolute_error: f64,
    pub relative_error: f64,
    pub max_steps: usize,
    pub max_step: Option<f64>,
}

/// Counters of one integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Stats {
    pub accepted: usize,
    pub rejected: usize,
    pub evaluations: usize,
}

/// Check that `times` is non-empty, finite, non-negative, and strictly
/// increasing.
pub(crate) fn check_times(times: &[f64]) -> Result<(), IntegrationError> {
    let Some(&first) = times.first() else {
        return Err(IntegrationError::EmptyTime);
    };
    if let Some(index) = times.iter().position(|t| !t.is_finite()) {
        return Err(IntegrationError::NonFiniteTime { index });
    }
    if first < 0.0 {
        return Err(IntegrationError::NegativeTime { value: first });
    }
    for (index, pair) in times.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(IntegrationError::NonMonotonicTime { index: index + 1 });
        }
    }
    Ok(())
}

/// Integrate `dy/dt = f(t, y)` from `y(0) = y0` and hand `y(times[i])` to
/// `output(i, y)` in order.
///
/// `times` must satisfy [`check_times`].
pub(crate) fn integrate<F, O>(
    mut f: F,
    y0: &[f64],
    times: &[f64],
    settings: &Settings,
    mut output: O,
) -> Result<Stats, IntegrationError>
where
    F: FnMut(f64, &[f64], &mut [f64]),
    O: FnMut(usize, &[f64]),
{
    check_times(times)?;

    let n = y0.len();
    let mut stats = Stats::default();
    let mut k: Vec<Vec<f64>> = vec![vec![0.0; n]; 7];
    let mut y = y0.to_vec();
    let mut y_new = vec![0.0; n];
    let mut scratch = vec![0.0; n];
    let mut t = 0.0;

    f(t, &y, &mut k[0]);
    stats.evaluations += 1;

    let mut h = initial_step(&mut f, &y, &k[0], settings, &mut scratch, &mut y_new);
    stats.evaluations += 1;
    if let Some(max_step) = settings.max_step {
        h = h.min(max_step);
    }
    let mut rejected = false;

    for (index, &target) in times.iter().enumerate() {
        while t < target {
            if stats.accepted + stats.rejected >= settings.max_steps {
                return Err(IntegrationError::StepBudgetExhausted {
                    time: t,
                    steps: settings.max_steps,
                });
            }
            if let Some(max_step) = settings.max_step {
                h = h.min(max_step);
            }

            let remaining = target - t;
            let clamped = h >= remaining;
            let step = if clamped { remaining } else { h };
            if step <= 16.0 * f64::EPSILON * t.abs() || step <= 0.0 {
                return Err(IntegrationError::StepSizeUnderflow { time: t, step });
            }

            // Stages 2..=7.
            for s in 1..7 {
                for i in 0..n {
                    let mut sum = 0.0;
                    for (j, a) in A[s].iter().enumerate().take(s) {
                        sum += a * k[j][i];
                    }
                    scratch[i] = y[i] + step * sum;
                }
                let (_, rest) = k.split_at_mut(s);
                f(t + C[s] * step, &scratch, &mut rest[0]);
                stats.evaluations += 1;
                if s == 6 {
                    // The seventh stage is evaluated at the fifth-order solution.
                    y_new.copy_from_slice(&scratch);
                }
            }

            let mut sum = 0.0;
            for i in 0..n {
                let mut delta = 0.0;
                for (j, e) in E.iter().enumerate() {
                    delta += e * k[j][i];
                }
                let scale = settings.absolute_error
                    + settings.relative_error * y[i].abs().max(y_new[i].abs());
                let ratio = step * delta / scale;
                sum += ratio * ratio;
            }
            let error = if n == 0 { 0.0 } else { (sum / n as f64).sqrt() };

            if error.is_nan() {
                return Err(IntegrationError::NonFiniteState { time: t });
            }

            if error <= 1.0 {
                t = if clamped { target } else { t + step };
                std::mem::swap(&mut y, &mut y_new);
                k.swap(0, 6);
                stats.accepted += 1;

                let ceiling = if rejected { 1.0 } else { MAX_FACTOR };
                let factor = if error == 0.0 {
                    ceiling
                } else {
                    (SAFETY * error.powf(-0.2)).clamp(MIN_FACTOR, ceiling)
                };
                let proposal = step * factor;
                h = if clamped { proposal.max(h) } else { proposal };
                rejected = false;

                if y.iter().any(|v| !v.is_finite()) {
                    return Err(IntegrationError::NonFiniteState { time: t });
                }
            } else {
                let factor = if error.is_finite() {
                    (SAFETY * error.powf(-0.2)).clamp(MIN_FACTOR, 1.0)
                } else {
                    MIN_FACTOR
                };
                h = step * factor;
                rejected = true;
                stats.rejected += 1;
            }
        }
        output(index, &y);
    }

    debug!(
        accepted = stats.accepted,
        rejected = stats.rejected,
        evaluations = stats.evaluations,
        "integration finished"
    );
    Ok(stats)
}

/// Hairer's starting step, from the slope `f0` at `(0, y0)`.
fn initial_step<F>(
    f: &mut F,
    y0: &[f64],
    f0: &[f64],
    settings: &Settings,
    y1: &mut [f64],
    f1: &mut [f64],
) -> f64
where
    F: FnMut(f64, &[f64], &mut [f64]),
{
    let scale = |y: f64| settings.absolute_error + settings.relative_error * y.abs();

    let d0 = rms(y0.iter().map(|&y| y / scale(y)));
    let d1 = rms(y0.iter().zip(f0).map(|(&y, &d)| d / scale(y)));
    let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };

    for ((y1, y), d) in y1.iter_mut().zip(y0).zip(f0) {
        *y1 = y + h0 * d;
    }
    f(h0, &*y1, &mut *f1);

    let d2 = rms(y0.iter().zip(f0).zip(f1.iter()).map(|((&y, &a), &b)| (b - a) / scale(y))) / h0;
    let d = d1.max(d2);
    let h1 = if d <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d).powf(0.2)
    };

    (100.0 * h0).min(h1)
}

/// Root mean square; zero for an empty sequence.
fn rms(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), x| (s + x * x, c + 1));
    if count == 0 {
        0.0
    } else {
        (sum / count as f64).sqrt()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
