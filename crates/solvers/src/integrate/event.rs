use rkode_core::Observer;

use super::Action;

/// Event emitted by the driver for each newly advanced output sample.
///
/// The sample has not been committed yet. Returning [`Action::StopEarly`]
/// discards it, so `index` is where it would have been stored.
/// The initial conditions (index 0) are committed without an event.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// Trajectory index the sample will occupy if the run continues.
    pub index: usize,

    /// Independent variable at the sample.
    pub t: f64,

    /// State at the sample.
    pub y: &'a [f64],
}

/// Adapts an integer-flag predicate into an observer.
///
/// The predicate receives `(t, y)` for each new sample; any non-zero return
/// stops the run.
///
/// # Example
///
/// ```
/// use rkode_solvers::{Config, integrate::{self, Predicate, Status}};
///
/// let decay = |_t: f64, y: &[f64]| vec![-0.6 * y[0]];
/// let config = Config::builder([0.0, 5.0], vec![1.0]).build().unwrap();
/// let below_half = Predicate(|_t: f64, y: &[f64]| i32::from(y[0] < 0.5));
///
/// let solution = integrate::solve(&decay, &config, below_half).unwrap();
///
/// assert_eq!(solution.status, Status::StoppedByEvent);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Predicate<F>(pub F);

impl<'a, F> Observer<Event<'a>, Action> for Predicate<F>
where
    F: FnMut(f64, &[f64]) -> i32,
{
    fn observe(&mut self, event: &Event<'a>) -> Option<Action> {
        ((self.0)(event.t, event.y) != 0).then_some(Action::StopEarly)
    }
}
