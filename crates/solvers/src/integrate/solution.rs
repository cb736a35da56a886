use crate::Trajectory;

/// Indicates how the driver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the end of the domain.
    Complete,

    /// Stopped early because the observer returned [`super::Action::StopEarly`].
    StoppedByEvent,
}

/// Counters collected over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    /// Derivative evaluations, including the ones spent on rejected trials.
    pub evaluations: usize,

    /// Accepted steps (fixed steps or accepted adaptive trials).
    pub steps: usize,

    /// Rejected adaptive trials.
    pub rejected: usize,

    /// Heun steps whose corrector hit the iteration cap.
    pub unconverged_correctors: usize,

    /// Step size the next step would have used.
    pub final_step: f64,
}

/// The result of an integration run.
#[derive(Debug, Clone)]
pub struct Solution {
    /// How the run terminated.
    pub status: Status,

    /// Committed samples, starting with the initial conditions.
    pub trajectory: Trajectory,

    /// Run counters.
    pub stats: Stats,
}

impl Solution {
    /// Returns the index of the last committed sample.
    ///
    /// Always at least 0, since the initial conditions are committed first.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.trajectory.len().saturating_sub(1)
    }
}
