//! Heun's method with an iterated trapezoidal corrector.

use rkode_core::OdeSystem;

use crate::{Error, Evaluator};

use super::StepOutcome;

/// Corrector convergence bound for a single state, in percent.
pub const SCALAR_BOUND_PERCENT: f64 = 0.5;

/// Corrector iteration cap for a single state.
pub const SCALAR_MAX_ITERS: usize = 100;

/// Corrector convergence bound for systems, in percent, on the largest
/// relative change across variables.
pub const SYSTEM_BOUND_PERCENT: f64 = 1.0;

/// Corrector iteration cap for systems.
pub const SYSTEM_MAX_ITERS: usize = 200;

/// Advances `(t, y)` by one Heun step of size `h`.
///
/// The Euler predictor is refined with the trapezoidal corrector
/// `y = y0 + h * (f(t, y0) + f(t + h, y)) / 2` while the relative change
/// between successive iterates is at or above the bound and the iteration cap
/// has not been reached. When the cap is hit, the last iterate is kept.
pub(super) fn step<S: OdeSystem + ?Sized>(
    f: &Evaluator<'_, S>,
    t: &mut f64,
    y: &mut [f64],
    h: f64,
) -> Result<StepOutcome, Error> {
    let (bound, max_iters) = if y.len() == 1 {
        (SCALAR_BOUND_PERCENT, SCALAR_MAX_ITERS)
    } else {
        (SYSTEM_BOUND_PERCENT, SYSTEM_MAX_ITERS)
    };

    let t_next = *t + h;
    let slope_start = f.eval(*t, y)?;

    let mut iterate: Vec<f64> = y
        .iter()
        .zip(&slope_start)
        .map(|(y0, k0)| y0 + h * k0)
        .collect();

    let mut iters = 0;
    let outcome = loop {
        let slope_end = f.eval(t_next, &iterate)?;
        let corrected: Vec<f64> = y
            .iter()
            .zip(slope_start.iter().zip(&slope_end))
            .map(|(y0, (k0, k1))| y0 + 0.5 * h * (k0 + k1))
            .collect();

        let change = corrected
            .iter()
            .zip(&iterate)
            .map(|(new, old)| relative_change_percent(*new, *old))
            .fold(0.0, |worst: f64, change| {
                if change.is_nan() || change > worst {
                    change
                } else {
                    worst
                }
            });

        iterate = corrected;
        iters += 1;

        if change < bound {
            break StepOutcome::Converged { iters };
        }
        if iters >= max_iters {
            break StepOutcome::CapReached { iters };
        }
    };

    y.copy_from_slice(&iterate);
    *t = t_next;

    Ok(outcome)
}

/// Returns `|new - old| / |new|` in percent, treating an unchanged value as
/// converged even when it is zero.
fn relative_change_percent(new: f64, old: f64) -> f64 {
    let diff = (new - old).abs();
    if diff == 0.0 {
        0.0
    } else {
        100.0 * diff / new.abs()
    }
}
