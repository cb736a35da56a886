/// The right-hand side of a first-order ODE system `dy/dt = f(t, y)`.
///
/// Implementations must be pure and deterministic: the same `(t, y)` always
/// yields the same derivative, and the returned vector has the same length as
/// `y`. Physical constants belong in the implementing type (or a closure's
/// captures) rather than in shared mutable state.
///
/// Any `Fn(f64, &[f64]) -> Vec<f64>` is an `OdeSystem`, so simple problems can
/// be written inline:
///
/// ```
/// use rkode_core::OdeSystem;
///
/// let decay = |_t: f64, y: &[f64]| vec![-0.6 * y[0]];
///
/// assert_eq!(decay.derivative(0.0, &[2.0]), vec![-1.2]);
/// ```
pub trait OdeSystem {
    /// Returns `dy/dt` at `(t, y)`.
    fn derivative(&self, t: f64, y: &[f64]) -> Vec<f64>;
}

impl<F> OdeSystem for F
where
    F: Fn(f64, &[f64]) -> Vec<f64>,
{
    fn derivative(&self, t: f64, y: &[f64]) -> Vec<f64> {
        self(t, y)
    }
}
