//! The Cash-Karp embedded Runge-Kutta 4(5) pair.
//!
//! Six stage evaluations yield a fifth-order solution and, with a second set
//! of weights, an embedded fourth-order one. Their difference estimates the
//! local truncation error of the step.

use rkode_core::OdeSystem;

use crate::{Error, Evaluator, Tableau, tableau::combine};

/// The Cash-Karp tableau with its fifth-order solution weights.
pub const TABLEAU: Tableau = Tableau {
    c: &[0.0, 0.2, 0.3, 0.6, 1.0, 0.875],
    a: &[
        &[],
        &[0.2],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[0.3, -0.9, 1.2],
        &[-11.0 / 54.0, 2.5, -70.0 / 27.0, 35.0 / 27.0],
        &[
            1631.0 / 55296.0,
            175.0 / 512.0,
            575.0 / 13824.0,
            44275.0 / 110592.0,
            253.0 / 4096.0,
        ],
    ],
    b: &[
        37.0 / 378.0,
        0.0,
        250.0 / 621.0,
        125.0 / 594.0,
        0.0,
        512.0 / 1771.0,
    ],
};

/// Weights of the embedded fourth-order solution.
pub const EMBEDDED_WEIGHTS: [f64; 6] = [
    2825.0 / 27648.0,
    0.0,
    18575.0 / 48384.0,
    13525.0 / 55296.0,
    277.0 / 14336.0,
    0.25,
];

/// Error weights: fifth-order minus fourth-order weights.
pub const ERROR_WEIGHTS: [f64; 6] = [
    37.0 / 378.0 - 2825.0 / 27648.0,
    0.0,
    250.0 / 621.0 - 18575.0 / 48384.0,
    125.0 / 594.0 - 13525.0 / 55296.0,
    -277.0 / 14336.0,
    512.0 / 1771.0 - 0.25,
];

/// The result of one trial step.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    /// The fifth-order solution at `t + h`.
    pub y: Vec<f64>,

    /// Per-variable error estimate, `h * Σ d_j k_j`.
    pub error: Vec<f64>,
}

/// Takes a trial step of size `h` from `(t, y)` without modifying either.
///
/// # Errors
///
/// Returns an error if the derivative has the wrong dimension.
pub fn step<S: OdeSystem + ?Sized>(
    f: &Evaluator<'_, S>,
    t: f64,
    y: &[f64],
    h: f64,
) -> Result<Trial, Error> {
    let k = TABLEAU.slopes(f, t, y, h)?;

    let zero = vec![0.0; y.len()];

    Ok(Trial {
        y: TABLEAU.advance(y, h, &k),
        error: combine(&zero, h, &ERROR_WEIGHTS, &k),
    })
}
