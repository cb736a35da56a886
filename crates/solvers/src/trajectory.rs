//! Growable storage for integration results.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

/// Number of samples added each time a [`Trajectory`] runs out of capacity.
pub const GROWTH_INCREMENT: usize = 50;

/// An append-only store of `(t, y)` samples.
///
/// Samples live in two parallel containers: a vector of independent-variable
/// values and an `nsys × capacity` matrix whose column `k` is the state at
/// sample `k`. Capacity is reserved ahead; only the first [`len`](Self::len)
/// samples are committed and only those are exposed.
///
/// When a push would exceed capacity, the storage is reallocated with
/// [`GROWTH_INCREMENT`] more samples and the committed prefix is copied over
/// before the new storage replaces the old.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Array1<f64>,
    states: Array2<f64>,
    len: usize,
}

impl Trajectory {
    /// Creates an empty trajectory for `nsys` variables with room for
    /// `capacity` samples (at least one).
    ///
    /// # Panics
    ///
    /// Panics if `nsys` is zero.
    #[must_use]
    pub fn with_capacity(nsys: usize, capacity: usize) -> Self {
        assert!(nsys > 0, "a trajectory needs at least one state variable");
        let capacity = capacity.max(1);

        Self {
            times: Array1::zeros(capacity),
            states: Array2::zeros((nsys, capacity)),
            len: 0,
        }
    }

    /// Creates an empty trajectory sized for one sample per output interval
    /// across `domain`, plus the initial sample.
    ///
    /// # Panics
    ///
    /// Panics if `nsys` is zero.
    #[must_use]
    pub fn for_domain(nsys: usize, domain: [f64; 2], output_interval: f64) -> Self {
        let intervals = ((domain[1] - domain[0]) / output_interval).floor();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let capacity = if intervals.is_finite() && intervals > 0.0 {
            intervals as usize + 1
        } else {
            1
        };

        Self::with_capacity(nsys, capacity)
    }

    /// Returns the number of state variables.
    #[must_use]
    pub fn nsys(&self) -> usize {
        self.states.nrows()
    }

    /// Returns the number of samples storage is reserved for.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.times.len()
    }

    /// Returns the number of committed samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no samples are committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the index of the last committed sample.
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.len.checked_sub(1)
    }

    /// Grows storage until it holds at least `required` samples.
    pub fn ensure_capacity(&mut self, required: usize) {
        while self.capacity() < required {
            self.grow();
        }
    }

    /// Reallocates with [`GROWTH_INCREMENT`] more samples, copying the
    /// committed prefix.
    fn grow(&mut self) {
        let capacity = self.capacity() + GROWTH_INCREMENT;
        log::trace!("growing trajectory from {} to {capacity} samples", self.capacity());

        let mut times = Array1::zeros(capacity);
        let mut states = Array2::zeros((self.nsys(), capacity));

        times
            .slice_mut(s![..self.len])
            .assign(&self.times.slice(s![..self.len]));
        states
            .slice_mut(s![.., ..self.len])
            .assign(&self.states.slice(s![.., ..self.len]));

        self.times = times;
        self.states = states;
    }

    /// Appends a sample at index [`len`](Self::len), growing storage if needed.
    ///
    /// # Panics
    ///
    /// Panics if `y` does not have [`nsys`](Self::nsys) components, or (in debug
    /// builds) if `t` does not exceed the last committed time.
    pub fn push(&mut self, t: f64, y: &[f64]) {
        assert_eq!(y.len(), self.nsys(), "sample has the wrong dimension");
        debug_assert!(
            self.last().is_none_or(|(last, _)| t > last),
            "samples must be strictly increasing in t"
        );

        self.ensure_capacity(self.len + 1);

        self.times[self.len] = t;
        self.states
            .column_mut(self.len)
            .assign(&ArrayView1::from(y));
        self.len += 1;
    }

    /// Discards every sample at or after index `len`.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Returns the committed independent-variable samples.
    #[must_use]
    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.slice(s![..self.len])
    }

    /// Returns the committed states as an `nsys × len` matrix.
    #[must_use]
    pub fn states(&self) -> ArrayView2<'_, f64> {
        self.states.slice(s![.., ..self.len])
    }

    /// Returns the committed values of variable `var`.
    #[must_use]
    pub fn variable(&self, var: usize) -> Option<ArrayView1<'_, f64>> {
        (var < self.nsys()).then(|| self.states.slice(s![var, ..self.len]))
    }

    /// Returns sample `index`, if committed.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<(f64, ArrayView1<'_, f64>)> {
        (index < self.len).then(|| (self.times[index], self.states.column(index)))
    }

    /// Returns the last committed sample.
    #[must_use]
    pub fn last(&self) -> Option<(f64, ArrayView1<'_, f64>)> {
        self.last_index().and_then(|index| self.get(index))
    }

    /// Iterates over committed samples in order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, ArrayView1<'_, f64>)> {
        (0..self.len).map(|index| (self.times[index], self.states.column(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn sample(k: usize) -> (f64, [f64; 2]) {
        #[allow(clippy::cast_precision_loss)]
        let t = k as f64 * 0.1;
        (t, [t.sin(), t.cos() / 3.0])
    }

    #[test]
    fn sizes_from_domain_and_interval() {
        assert_eq!(Trajectory::for_domain(1, [0.0, 5.0], 0.1).capacity(), 51);
        assert_eq!(Trajectory::for_domain(1, [0.0, 5.0], 0.3).capacity(), 17);
        assert_eq!(Trajectory::for_domain(3, [1.0, 2.0], 4.0).capacity(), 1);
        assert_eq!(Trajectory::for_domain(3, [1.0, 2.0], 4.0).nsys(), 3);
    }

    #[test]
    fn push_fills_columns() {
        let mut trajectory = Trajectory::with_capacity(2, 4);

        trajectory.push(0.0, &[1.0, 2.0]);
        trajectory.push(0.5, &[3.0, 4.0]);

        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.last_index(), Some(1));
        assert_eq!(trajectory.times().to_vec(), vec![0.0, 0.5]);
        assert_eq!(trajectory.variable(1).unwrap().to_vec(), vec![2.0, 4.0]);
        assert_eq!(trajectory.states().shape(), &[2, 2]);
        assert!(trajectory.variable(2).is_none());
        assert!(trajectory.get(2).is_none());
    }

    #[test]
    fn growth_adds_a_fixed_increment() {
        let mut trajectory = Trajectory::with_capacity(2, 3);

        for k in 0..4 {
            let (t, y) = sample(k);
            trajectory.push(t, &y);
        }

        assert_eq!(trajectory.capacity(), 3 + GROWTH_INCREMENT);

        trajectory.ensure_capacity(3 + 2 * GROWTH_INCREMENT + 1);
        assert_eq!(trajectory.capacity(), 3 + 3 * GROWTH_INCREMENT);
    }

    #[test]
    fn growth_preserves_samples_exactly() {
        let mut trajectory = Trajectory::with_capacity(2, 5);
        for k in 0..5 {
            let (t, y) = sample(k);
            trajectory.push(t, &y);
        }
        let before = trajectory.clone();

        trajectory.ensure_capacity(6);

        assert_eq!(trajectory.capacity(), 5 + GROWTH_INCREMENT);
        for k in 0..5 {
            let (t_before, y_before) = before.get(k).unwrap();
            let (t_after, y_after) = trajectory.get(k).unwrap();
            assert_eq!(t_before.to_bits(), t_after.to_bits());
            for (a, b) in y_before.iter().zip(&y_after) {
                assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn truncate_hides_later_samples() {
        let mut trajectory = Trajectory::with_capacity(1, 2);
        trajectory.push(0.0, &[1.0]);
        trajectory.push(1.0, &[2.0]);
        trajectory.push(2.0, &[3.0]);

        trajectory.truncate(2);

        assert_eq!(trajectory.len(), 2);
        let (t, y) = trajectory.last().unwrap();
        assert_relative_eq!(t, 1.0);
        assert_relative_eq!(y[0], 2.0);
        assert_eq!(trajectory.iter().count(), 2);
    }

    #[test]
    fn empty_trajectory_has_no_last_sample() {
        let trajectory = Trajectory::with_capacity(1, 0);

        assert!(trajectory.is_empty());
        assert_eq!(trajectory.capacity(), 1);
        assert_eq!(trajectory.last_index(), None);
        assert!(trajectory.last().is_none());
    }

    #[test]
    #[should_panic(expected = "wrong dimension")]
    fn push_rejects_wrong_dimension() {
        let mut trajectory = Trajectory::with_capacity(2, 1);
        trajectory.push(0.0, &[1.0]);
    }
}
