//! Adaptive step-size control over the Cash-Karp pair.
//!
//! # Algorithm
//!
//! Each call to [`advance`] produces exactly one accepted step:
//!
//! 1. Evaluate `dy/dt` at the start point and form the error scale
//!    `|y_i| + |h * dy_i/dt| + 1e-30` for each variable.
//! 2. Clip the step so `t + h` does not pass the segment end.
//! 3. Take a Cash-Karp trial step and compute
//!    `error_max = max_i |error_i / scale_i| / tolerance`.
//! 4. If `error_max > 1`, shrink the step (by at most 4x) and retry. A step
//!    that no longer changes `t` is a fatal underflow.
//! 5. Otherwise accept the fifth-order solution and propose the next step
//!    (grown by at most about 4x).
//!
//! [`advance_to`] repeats [`advance`] until the segment end is reached.

use rkode_core::OdeSystem;

use crate::{Error, Evaluator, cash_karp};

/// Safety factor applied to every step-size proposal.
pub const SAFETY: f64 = 0.9;

/// Exponent of `error_max` when shrinking a rejected step.
pub const SHRINK_EXPONENT: f64 = -0.25;

/// Exponent of `error_max` when growing after an accepted step.
pub const GROW_EXPONENT: f64 = -0.2;

/// Smallest factor a rejected step may be multiplied by.
pub const MAX_SHRINK: f64 = 0.25;

/// Largest factor an accepted step may be multiplied by.
pub const MAX_GROW: f64 = 4.0;

/// Below this `error_max` the growth formula would reach [`MAX_GROW`], so the
/// step grows by exactly [`MAX_GROW`]. Approximately
/// `(MAX_GROW / SAFETY)^(1 / GROW_EXPONENT)`.
pub const ERROR_FLOOR: f64 = 5.7665e-4;

/// Added to every error scale so it stays positive where `y` and `dy/dt`
/// both vanish.
pub const SCALE_FLOOR: f64 = 1.0e-30;

/// The controller's decision for one trial step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Keep the trial; `next` is the proposed size of the following step.
    Accept { next: f64 },

    /// Discard the trial and retry with `retry`.
    Reject { retry: f64 },
}

/// Decides whether a trial of size `step` with normalized error `error_max`
/// is accepted.
///
/// A NaN `error_max` is rejected, so non-finite derivatives shrink the step
/// until it underflows rather than being committed.
#[must_use]
pub fn judge(error_max: f64, step: f64) -> Verdict {
    if error_max <= 1.0 {
        let next = if error_max > ERROR_FLOOR {
            SAFETY * step * error_max.powf(GROW_EXPONENT)
        } else {
            MAX_GROW * step
        };
        Verdict::Accept { next }
    } else {
        let retry = (SAFETY * step * error_max.powf(SHRINK_EXPONENT))
            .abs()
            .max(MAX_SHRINK * step.abs());
        Verdict::Reject { retry }
    }
}

/// Returns `max_i |error_i / scale_i| / tolerance`, or NaN if any ratio is NaN.
#[must_use]
pub fn error_max(error: &[f64], scale: &[f64], tolerance: f64) -> f64 {
    let worst = error
        .iter()
        .zip(scale)
        .map(|(e, s)| (e / s).abs())
        .fold(0.0, |worst: f64, ratio| {
            if ratio.is_nan() || ratio > worst {
                ratio
            } else {
                worst
            }
        });
    worst / tolerance
}

/// Returns the per-variable error scale `|y| + |h * dy/dt| + SCALE_FLOOR`.
#[must_use]
pub fn error_scale(y: &[f64], dydt: &[f64], h: f64) -> Vec<f64> {
    y.iter()
        .zip(dydt)
        .map(|(y_i, dy_i)| y_i.abs() + (h * dy_i).abs() + SCALE_FLOOR)
        .collect()
}

/// One accepted adaptive step.
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    /// Independent variable after the step.
    pub t: f64,

    /// State after the step.
    pub y: Vec<f64>,

    /// Size of the accepted step.
    pub taken: f64,

    /// Proposed size of the next step.
    pub next: f64,

    /// Normalized error of the accepted trial, at most 1.
    pub error_max: f64,

    /// Trials rejected before this one was accepted.
    pub rejected: usize,
}

/// Takes one accepted step from `(t, y)` toward `t_end`.
///
/// `step` is the carried-over step size. It is clipped so the step does not
/// pass `t_end`; a step that lands on `t_end` sets `t` to exactly `t_end`.
///
/// # Errors
///
/// Returns [`Error::StepSizeUnderflow`] if a rejected step shrinks until it no
/// longer changes `t`, or a dimension error from the derivative.
pub fn advance<S: OdeSystem + ?Sized>(
    f: &Evaluator<'_, S>,
    t: f64,
    y: &[f64],
    step: f64,
    t_end: f64,
    tolerance: f64,
) -> Result<Accepted, Error> {
    let dydt = f.eval(t, y)?;
    let scale = error_scale(y, &dydt, step);

    let mut h = step;
    if t + h > t_end {
        h = t_end - t;
    }

    let mut rejected = 0;
    loop {
        let trial = cash_karp::step(f, t, y, h)?;
        let norm = error_max(&trial.error, &scale, tolerance);

        match judge(norm, h) {
            Verdict::Accept { next } => {
                let t_next = if t + h >= t_end { t_end } else { t + h };
                return Ok(Accepted {
                    t: t_next,
                    y: trial.y,
                    taken: h,
                    next,
                    error_max: norm,
                    rejected,
                });
            }
            Verdict::Reject { retry } => {
                log::trace!(
                    "rejected step {h:e} at t = {t} (error_max = {norm:.3e}), retrying with {retry:e}"
                );
                if t + retry == t {
                    return Err(Error::StepSizeUnderflow { t, step: retry });
                }
                rejected += 1;
                h = retry;
            }
        }
    }
}

/// A run of accepted steps ending at a segment boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Independent variable at the segment end.
    pub t: f64,

    /// State at the segment end.
    pub y: Vec<f64>,

    /// Proposed size of the next step.
    pub next: f64,

    /// Accepted steps taken.
    pub accepted: usize,

    /// Trials rejected along the way.
    pub rejected: usize,
}

/// Takes accepted steps from `(t, y)` until `t_end` is reached.
///
/// # Errors
///
/// Propagates any error from [`advance`].
pub fn advance_to<S: OdeSystem + ?Sized>(
    f: &Evaluator<'_, S>,
    t: f64,
    y: &[f64],
    step: f64,
    t_end: f64,
    tolerance: f64,
) -> Result<Segment, Error> {
    let mut segment = Segment {
        t,
        y: y.to_vec(),
        next: step,
        accepted: 0,
        rejected: 0,
    };

    while segment.t < t_end {
        let accepted = advance(f, segment.t, &segment.y, segment.next, t_end, tolerance)?;
        segment.t = accepted.t;
        segment.y = accepted.y;
        segment.next = accepted.next;
        segment.accepted += 1;
        segment.rejected += accepted.rejected;
    }

    Ok(segment)
}
