use rkode_core::OdeSystem;

use crate::{Error, Evaluator};

/// An explicit Runge-Kutta Butcher tableau.
///
/// Row `i` of `a` holds the coefficients applied to stages `0..i` when forming
/// the input of stage `i`, which is evaluated at `t + c[i] * h`. The solution
/// weights are `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tableau {
    pub c: &'static [f64],
    pub a: &'static [&'static [f64]],
    pub b: &'static [f64],
}

impl Tableau {
    /// Returns the number of stages (derivative evaluations per step).
    #[must_use]
    pub fn stages(&self) -> usize {
        self.c.len()
    }

    /// Evaluates every stage derivative for a step of size `h` from `(t, y)`.
    pub(crate) fn slopes<S: OdeSystem + ?Sized>(
        &self,
        f: &Evaluator<'_, S>,
        t: f64,
        y: &[f64],
        h: f64,
    ) -> Result<Vec<Vec<f64>>, Error> {
        let mut k: Vec<Vec<f64>> = Vec::with_capacity(self.stages());

        for (c, row) in self.c.iter().zip(self.a) {
            let y_stage = combine(y, h, row, &k);
            k.push(f.eval(t + c * h, &y_stage)?);
        }

        Ok(k)
    }

    /// Returns the solution `y + h * Σ b_j k_j` for precomputed slopes.
    pub(crate) fn advance(&self, y: &[f64], h: f64, k: &[Vec<f64>]) -> Vec<f64> {
        combine(y, h, self.b, k)
    }
}

/// Returns `y + h * Σ w_j k_j`, pairing weights with the leading slopes.
pub(crate) fn combine(y: &[f64], h: f64, weights: &[f64], k: &[Vec<f64>]) -> Vec<f64> {
    y.iter()
        .enumerate()
        .map(|(i, y_i)| {
            let slope: f64 = weights.iter().zip(k).map(|(w, k_j)| w * k_j[i]).sum();
            y_i + h * slope
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    const TRAPEZOID: Tableau = Tableau {
        c: &[0.0, 1.0],
        a: &[&[], &[1.0]],
        b: &[0.5, 0.5],
    };

    #[test]
    fn combine_applies_weights_per_component() {
        let y = [1.0, 2.0];
        let k = vec![vec![1.0, 0.0], vec![0.0, 4.0]];

        let next = combine(&y, 0.5, &[2.0, 0.25], &k);

        assert_relative_eq!(next[0], 2.0);
        assert_relative_eq!(next[1], 2.5);
    }

    #[test]
    fn combine_with_no_weights_is_identity() {
        assert_eq!(combine(&[3.0], 0.1, &[], &[]), vec![3.0]);
    }

    #[test]
    fn slopes_feed_forward() {
        let system = |t: f64, _y: &[f64]| vec![t];
        let f = Evaluator::new(&system, 1);

        let k = TRAPEZOID.slopes(&f, 1.0, &[0.0], 0.5).unwrap();

        assert_eq!(k, vec![vec![1.0], vec![1.5]]);
        assert_relative_eq!(TRAPEZOID.advance(&[0.0], 0.5, &k)[0], 0.625);
        assert_eq!(f.calls(), TRAPEZOID.stages());
    }
}
