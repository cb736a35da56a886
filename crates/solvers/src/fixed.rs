//! Fixed-step single-step methods.
//!
//! Each [`Method`] advances `(t, y)` in place by exactly one step of a given
//! size. The explicit methods perform one derivative evaluation per tableau
//! stage; [`Method::Heun`] iterates its corrector and reports whether it
//! converged through [`StepOutcome`].
//!
//! | id | method                | order | evaluations |
//! |----|-----------------------|-------|-------------|
//! | 1  | [`Method::Euler`]        | 1 | 1 |
//! | 2  | [`Method::Heun`]         | 2 | 1 + corrector iterations |
//! | 3  | [`Method::Midpoint`]     | 2 | 2 |
//! | 4  | [`Method::Ralston`]      | 2 | 2 |
//! | 5  | [`Method::Rk3Classic`]   | 3 | 3 |
//! | 6  | [`Method::Rk3Optimized`] | 3 | 3 |
//! | 7  | [`Method::Rk4Classic`]   | 4 | 4 |
//! | 8  | [`Method::Rk5Butcher`]   | 5 | 6 |
//!
//! All methods treat every state variable identically, evaluating stage by
//! stage and combining per component.

pub mod heun;
mod tableaux;

use rkode_core::OdeSystem;

use crate::{ConfigError, Error, Evaluator, Tableau};

/// A fixed-step integration method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Explicit (forward) Euler.
    Euler,

    /// Euler predictor with an iterated trapezoidal corrector.
    Heun,

    /// Explicit midpoint rule.
    Midpoint,

    /// Ralston's two-stage second-order method.
    Ralston,

    /// Kutta's classic third-order method.
    Rk3Classic,

    /// Heun's third-order method.
    Rk3Optimized,

    /// The classic fourth-order Runge-Kutta method.
    Rk4Classic,

    /// Butcher's six-stage fifth-order method.
    Rk5Butcher,
}

/// Method lookup by identifier; entry `i` has id `i + 1`.
const DISPATCH: [Method; 8] = [
    Method::Euler,
    Method::Heun,
    Method::Midpoint,
    Method::Ralston,
    Method::Rk3Classic,
    Method::Rk3Optimized,
    Method::Rk4Classic,
    Method::Rk5Butcher,
];

/// How a single fixed step finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An explicit method completed its stages.
    Explicit,

    /// Heun's corrector converged after `iters` iterations.
    Converged { iters: usize },

    /// Heun's corrector hit its iteration cap; the last iterate was kept.
    CapReached { iters: usize },
}

impl Method {
    /// Every method, in identifier order.
    pub const ALL: [Method; 8] = DISPATCH;

    /// Looks up a method by its identifier (1 to 8).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownMethod`] for any other identifier.
    pub fn from_id(id: u8) -> Result<Self, ConfigError> {
        usize::from(id)
            .checked_sub(1)
            .and_then(|index| DISPATCH.get(index))
            .copied()
            .ok_or(ConfigError::UnknownMethod(id))
    }

    /// Returns the method's identifier.
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::Euler => 1,
            Self::Heun => 2,
            Self::Midpoint => 3,
            Self::Ralston => 4,
            Self::Rk3Classic => 5,
            Self::Rk3Optimized => 6,
            Self::Rk4Classic => 7,
            Self::Rk5Butcher => 8,
        }
    }

    /// Returns a short name, used in output file names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Euler => "FWE",
            Self::Heun => "Heun",
            Self::Midpoint => "Midpoint",
            Self::Ralston => "RK2Ralston",
            Self::Rk3Classic => "RK3Classic",
            Self::Rk3Optimized => "RK3Optim",
            Self::Rk4Classic => "RK4Classic",
            Self::Rk5Butcher => "RK5Butcher",
        }
    }

    /// Returns the global order of accuracy.
    #[must_use]
    pub fn order(self) -> u32 {
        match self {
            Self::Euler => 1,
            Self::Heun | Self::Midpoint | Self::Ralston => 2,
            Self::Rk3Classic | Self::Rk3Optimized => 3,
            Self::Rk4Classic => 4,
            Self::Rk5Butcher => 5,
        }
    }

    /// Returns the Butcher tableau, or `None` for the iterative Heun method.
    #[must_use]
    pub fn tableau(self) -> Option<&'static Tableau> {
        match self {
            Self::Euler => Some(&tableaux::EULER),
            Self::Heun => None,
            Self::Midpoint => Some(&tableaux::MIDPOINT),
            Self::Ralston => Some(&tableaux::RALSTON),
            Self::Rk3Classic => Some(&tableaux::RK3_CLASSIC),
            Self::Rk3Optimized => Some(&tableaux::RK3_OPTIMIZED),
            Self::Rk4Classic => Some(&tableaux::RK4_CLASSIC),
            Self::Rk5Butcher => Some(&tableaux::RK5_BUTCHER),
        }
    }

    /// Advances `t` and `y` in place by one step of size `h`.
    ///
    /// # Errors
    ///
    /// Returns an error if the derivative has the wrong dimension.
    pub fn step<S: OdeSystem + ?Sized>(
        self,
        f: &Evaluator<'_, S>,
        t: &mut f64,
        y: &mut [f64],
        h: f64,
    ) -> Result<StepOutcome, Error> {
        let Some(tableau) = self.tableau() else {
            return heun::step(f, t, y, h);
        };

        let k = tableau.slopes(f, *t, y, h)?;
        let next = tableau.advance(y, h, &k);

        y.copy_from_slice(&next);
        *t += h;

        Ok(StepOutcome::Explicit)
    }
}

impl TryFrom<u8> for Method {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    const LAMBDA: f64 = 1.0;

    /// Integrates `dy/dt = -λy` from `y(0) = 1` to `t = 1` and returns the
    /// absolute error against `e^{-λ}`.
    fn decay_error(method: Method, h: f64) -> f64 {
        let decay = |_t: f64, y: &[f64]| vec![-LAMBDA * y[0]];
        let f = Evaluator::new(&decay, 1);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (1.0 / h).round() as usize;

        let (mut t, mut y) = (0.0, [1.0]);
        for _ in 0..steps {
            method.step(&f, &mut t, &mut y, h).unwrap();
        }

        assert_relative_eq!(t, 1.0, epsilon = 1e-12);
        (y[0] - (-LAMBDA).exp()).abs()
    }

    #[test]
    fn every_method_converges_at_its_nominal_order() {
        for method in Method::ALL {
            // Steps small enough that Heun's corrector settles in one pass.
            let coarse = decay_error(method, 0.05);
            let fine = decay_error(method, 0.025);
            let observed = (coarse / fine).log2();

            let expected = f64::from(method.order());
            assert!(
                (observed - expected).abs() < 0.35,
                "{method}: observed order {observed:.3}, expected {expected}"
            );
        }
    }

    #[test]
    fn explicit_methods_use_one_evaluation_per_stage() {
        let system = |t: f64, y: &[f64]| vec![t * y[0], -y[1]];

        for method in Method::ALL {
            let Some(tableau) = method.tableau() else {
                continue;
            };
            let f = Evaluator::new(&system, 2);
            let (mut t, mut y) = (0.0, [1.0, 1.0]);

            let outcome = method.step(&f, &mut t, &mut y, 0.1).unwrap();

            assert_eq!(outcome, StepOutcome::Explicit);
            assert_eq!(f.calls(), tableau.stages(), "{method}");
            assert_relative_eq!(t, 0.1);
        }
    }

    #[test]
    fn system_components_advance_independently() {
        // Two decoupled copies of the same equation must stay identical.
        let system = |_t: f64, y: &[f64]| vec![-2.0 * y[0], -2.0 * y[1]];
        let f = Evaluator::new(&system, 2);

        for method in Method::ALL {
            let (mut t, mut y) = (0.0, [1.0, 1.0]);
            method.step(&f, &mut t, &mut y, 0.1).unwrap();
            assert_eq!(y[0], y[1], "{method}");
        }
    }

    #[test]
    fn euler_step_by_hand() {
        let system = |t: f64, y: &[f64]| vec![t + y[0]];
        let f = Evaluator::new(&system, 1);
        let (mut t, mut y) = (1.0, [2.0]);

        Method::Euler.step(&f, &mut t, &mut y, 0.5).unwrap();

        assert_relative_eq!(t, 1.5);
        assert_relative_eq!(y[0], 3.5);
    }

    #[test]
    fn rk4_step_by_hand() {
        // dy/dt = y from y = 1: the step reproduces the Taylor series to h⁴.
        let growth = |_t: f64, y: &[f64]| vec![y[0]];
        let f = Evaluator::new(&growth, 1);
        let (mut t, mut y) = (0.0, [1.0]);
        let h: f64 = 0.2;

        Method::Rk4Classic.step(&f, &mut t, &mut y, h).unwrap();

        let taylor = 1.0 + h + h.powi(2) / 2.0 + h.powi(3) / 6.0 + h.powi(4) / 24.0;
        assert_relative_eq!(y[0], taylor, epsilon = 1e-15);
    }

    #[test]
    fn identifiers_round_trip_through_dispatch() {
        for method in Method::ALL {
            assert_eq!(Method::from_id(method.id()), Ok(method));
        }
        assert_eq!(Method::try_from(7), Ok(Method::Rk4Classic));
    }

    #[test]
    fn out_of_range_identifiers_are_rejected() {
        assert_eq!(Method::from_id(0), Err(ConfigError::UnknownMethod(0)));
        assert_eq!(Method::from_id(9), Err(ConfigError::UnknownMethod(9)));
    }
}
