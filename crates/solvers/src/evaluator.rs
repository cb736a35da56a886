use std::cell::Cell;

use rkode_core::OdeSystem;

use crate::Error;

/// Evaluates an [`OdeSystem`] with a fixed state dimension.
///
/// Every evaluation checks that the derivative has `nsys` components and is
/// counted, so runs can report how much work they did.
#[derive(Debug)]
pub struct Evaluator<'a, S: ?Sized> {
    system: &'a S,
    nsys: usize,
    calls: Cell<usize>,
}

impl<'a, S: OdeSystem + ?Sized> Evaluator<'a, S> {
    /// Wraps `system` for states of length `nsys`.
    #[must_use]
    pub fn new(system: &'a S, nsys: usize) -> Self {
        Self {
            system,
            nsys,
            calls: Cell::new(0),
        }
    }

    /// Returns the number of derivative evaluations so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Returns `dy/dt` at `(t, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dimension`] if the derivative's length is not `nsys`.
    pub fn eval(&self, t: f64, y: &[f64]) -> Result<Vec<f64>, Error> {
        let dydt = self.system.derivative(t, y);
        self.calls.set(self.calls.get() + 1);

        if dydt.len() == self.nsys {
            Ok(dydt)
        } else {
            Err(Error::Dimension {
                expected: self.nsys,
                found: dydt.len(),
            })
        }
    }
}
