//! Butcher tableaux for the explicit fixed-step methods.

use crate::Tableau;

pub(super) const EULER: Tableau = Tableau {
    c: &[0.0],
    a: &[&[]],
    b: &[1.0],
};

pub(super) const MIDPOINT: Tableau = Tableau {
    c: &[0.0, 0.5],
    a: &[&[], &[0.5]],
    b: &[0.0, 1.0],
};

/// Ralston's second-order method with the interior stage at `3h/4`.
pub(super) const RALSTON: Tableau = Tableau {
    c: &[0.0, 0.75],
    a: &[&[], &[0.75]],
    b: &[1.0 / 3.0, 2.0 / 3.0],
};

/// Kutta's classic third-order method.
pub(super) const RK3_CLASSIC: Tableau = Tableau {
    c: &[0.0, 0.5, 1.0],
    a: &[&[], &[0.5], &[-1.0, 2.0]],
    b: &[1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0],
};

/// Heun's third-order method.
pub(super) const RK3_OPTIMIZED: Tableau = Tableau {
    c: &[0.0, 1.0 / 3.0, 2.0 / 3.0],
    a: &[&[], &[1.0 / 3.0], &[0.0, 2.0 / 3.0]],
    b: &[0.25, 0.0, 0.75],
};

pub(super) const RK4_CLASSIC: Tableau = Tableau {
    c: &[0.0, 0.5, 0.5, 1.0],
    a: &[&[], &[0.5], &[0.0, 0.5], &[0.0, 0.0, 1.0]],
    b: &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
};

/// Butcher's six-stage fifth-order method.
pub(super) const RK5_BUTCHER: Tableau = Tableau {
    c: &[0.0, 0.25, 0.25, 0.5, 0.75, 1.0],
    a: &[
        &[],
        &[0.25],
        &[0.125, 0.125],
        &[0.0, -0.5, 1.0],
        &[3.0 / 16.0, 0.0, 0.0, 9.0 / 16.0],
        &[-3.0 / 7.0, 2.0 / 7.0, 12.0 / 7.0, -12.0 / 7.0, 8.0 / 7.0],
    ],
    b: &[
        7.0 / 90.0,
        0.0,
        32.0 / 90.0,
        12.0 / 90.0,
        32.0 / 90.0,
        7.0 / 90.0,
    ],
};
