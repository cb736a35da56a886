//! The outer integration driver.
//!
//! [`solve`] walks the domain one output sample at a time. Between samples it
//! either repeats a fixed-step method or runs the adaptive Cash-Karp
//! controller, then offers the new sample to an observer before committing it
//! to the [`Trajectory`].
//!
//! # Example
//!
//! ```
//! use rkode_solvers::{Config, Mode, fixed::Method, integrate};
//!
//! let decay = |_t: f64, y: &[f64]| vec![-0.6 * y[0]];
//! let config = Config::builder([0.0, 5.0], vec![1.0])
//!     .step(0.1)
//!     .output_interval(0.5)
//!     .mode(Mode::Fixed(Method::Rk4Classic))
//!     .build()
//!     .unwrap();
//!
//! let solution = integrate::solve_unobserved(&decay, &config).unwrap();
//!
//! assert_eq!(solution.last_index(), 10);
//! let (t, y) = solution.trajectory.last().unwrap();
//! assert_eq!(t, 5.0);
//! assert!((y[0] - (-3.0_f64).exp()).abs() < 1e-4);
//! ```

mod action;
mod event;
mod solution;


pub use action::Action;
pub use event::{Event, Predicate};
pub use solution::{Solution, Stats, Status};

use rkode_core::{OdeSystem, Observer};

use crate::{
    AdaptiveOutput, Config, Error, Evaluator, Mode, Trajectory, adaptive,
    fixed::{Method, StepOutcome},
};

/// Integrates `system` over the configured domain.
///
/// # Algorithm
///
/// 1. Commit the initial conditions at index 0.
/// 2. While the last committed `t` is before the domain end:
///    - Pick the segment end: `min(t + output_interval, t1)`, or `t1` for
///      adaptive runs that sample every accepted step. An end within rounding
///      of `t1` snaps to `t1`.
///    - Make room in the trajectory for one more sample.
///    - Advance to the segment end with the configured mode.
///    - Emit an [`Event`] for the new sample. If the observer returns
///      [`Action::StopEarly`], drop the sample and stop.
///    - Commit the sample.
/// 3. Return the committed trajectory with run statistics.
///
/// Fixed-step runs on systems (more than one state variable) always use
/// [`Method::Rk4Classic`].
///
/// # Errors
///
/// Returns [`Error::StepSizeUnderflow`] if a step no longer advances `t`, or
/// [`Error::Dimension`] if the derivative's length differs from the state's.
pub fn solve<S, Obs>(system: &S, config: &Config, mut observer: Obs) -> Result<Solution, Error>
where
    S: OdeSystem + ?Sized,
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let [start, end] = config.domain();
    let nsys = config.nsys();
    let mode = resolve_mode(config.mode(), nsys);

    log::debug!(
        "integrating {nsys} variable(s) over [{start}, {end}] with {mode:?}, step {:e}",
        config.step()
    );

    let f = Evaluator::new(system, nsys);
    let mut trajectory = Trajectory::for_domain(nsys, config.domain(), config.output_interval());
    trajectory.push(start, config.initial());

    let mut t = start;
    let mut y = config.initial().to_vec();
    let mut step = config.step();
    let mut stats = Stats::default();
    let mut status = Status::Complete;

    while t < end {
        let interval = config.output_interval();
        let target = match mode {
            Mode::Adaptive(AdaptiveOutput::EachStep) => end,
            _ if reaches(t, interval, end) => end,
            _ => t + interval,
        };

        let index = trajectory.len();
        trajectory.ensure_capacity(index + 1);

        let (t_next, y_next) = match mode {
            Mode::Fixed(method) => {
                fixed_segment(&f, method, t, &y, step, target, &mut stats)?
            }
            Mode::Adaptive(AdaptiveOutput::EachStep) => {
                let accepted = adaptive::advance(&f, t, &y, step, target, config.tolerance())?;
                step = accepted.next;
                stats.steps += 1;
                stats.rejected += accepted.rejected;
                (accepted.t, accepted.y)
            }
            Mode::Adaptive(AdaptiveOutput::Interval) => {
                let segment =
                    adaptive::advance_to(&f, t, &y, step, target, config.tolerance())?;
                step = segment.next;
                stats.steps += segment.accepted;
                stats.rejected += segment.rejected;
                (segment.t, segment.y)
            }
        };

        let event = Event {
            index,
            t: t_next,
            y: &y_next,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            log::debug!("stopped by event at t = {t_next}, keeping samples 0..={}", index - 1);
            status = Status::StoppedByEvent;
            break;
        }

        trajectory.push(t_next, &y_next);
        t = t_next;
        y = y_next;
    }

    stats.evaluations = f.calls();
    stats.final_step = step;

    log::debug!(
        "finished at t = {t} with {} samples: {} steps, {} rejected, {} evaluations",
        trajectory.len(),
        stats.steps,
        stats.rejected,
        stats.evaluations,
    );

    Ok(Solution {
        status,
        trajectory,
        stats,
    })
}

/// Integrates `system` over the configured domain without observation.
///
/// This is a convenience wrapper around [`solve`] that never stops early.
///
/// # Errors
///
/// Returns the same errors as [`solve`].
pub fn solve_unobserved<S>(system: &S, config: &Config) -> Result<Solution, Error>
where
    S: OdeSystem + ?Sized,
{
    solve(system, config, ())
}

/// Swaps in classic RK4 for fixed-step runs on systems.
fn resolve_mode(mode: Mode, nsys: usize) -> Mode {
    match mode {
        Mode::Fixed(method) if nsys > 1 && method != Method::Rk4Classic => {
            log::warn!("{method} only integrates single equations; using RK4Classic for {nsys} variables");
            Mode::Fixed(Method::Rk4Classic)
        }
        other => other,
    }
}

/// Rounding slack, as a fraction of the stride, within which a target counts
/// as reached.
const SNAP: f64 = 1e-9;

/// Returns whether a stride from `t` reaches `target`.
///
/// Repeated `t += stride` drifts by a few ulps, so a stride that falls short
/// of `target` by at most [`SNAP`] of itself also counts.
fn reaches(t: f64, stride: f64, target: f64) -> bool {
    target - (t + stride) <= SNAP * stride
}

/// Repeats fixed steps of size `step` from `(t, y)` until `target`.
///
/// The last step is shortened (or stretched by rounding slack) to land on
/// `target`, and `t` is set to exactly `target` once it does.
fn fixed_segment<S: OdeSystem + ?Sized>(
    f: &Evaluator<'_, S>,
    method: Method,
    mut t: f64,
    y: &[f64],
    step: f64,
    target: f64,
    stats: &mut Stats,
) -> Result<(f64, Vec<f64>), Error> {
    let mut y = y.to_vec();

    while t < target {
        let last = reaches(t, step, target);
        let h = if last { target - t } else { step };
        if !last && t + h == t {
            return Err(Error::StepSizeUnderflow { t, step: h });
        }

        let outcome = method.step(f, &mut t, &mut y, h)?;
        stats.steps += 1;
        if let StepOutcome::CapReached { iters } = outcome {
            log::debug!("Heun corrector did not converge after {iters} iterations at t = {t}");
            stats.unconverged_correctors += 1;
        }

        if last {
            t = target;
        }
    }

    Ok((t, y))
}
