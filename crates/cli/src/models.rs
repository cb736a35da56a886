//! Built-in derivative models.
//!
//! Each model carries its physical constants as fields, with defaults taken
//! from the classic textbook setups. A run file selects one by name:
//!
//! ```toml
//! [model]
//! name = "springs"
//! k2 = 200.0
//! ```

use std::f64::consts::PI;

use rkode_core::OdeSystem;
use serde::Deserialize;
use thiserror::Error;

/// Range below which the pursuit model reports an intercept.
pub const INTERCEPT_RANGE: f64 = 0.001;

/// Middle-spring stiffnesses the spring chain supports, in N/m.
pub const SPRING_STIFFNESSES: [f64; 3] = [100.0, 150.0, 200.0];

/// Missile-to-target speed ratios the pursuit model supports.
pub const PURSUIT_GAINS: [f64; 4] = [0.83, 1.11, 1.67, 5.0];

/// Errors from model parameters outside the supported choices.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ModelError {
    #[error("spring stiffness k2 = {0} is not one of 100, 150, 200")]
    Stiffness(f64),

    #[error("pursuit gain K = {0} is not one of 0.83, 1.11, 1.67, 5")]
    Gain(f64),
}

/// A built-in model, tagged by `name` in run files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Model {
    Decay(Decay),
    Pulse(Pulse),
    Jumper(Jumper),
    Springs(Springs),
    Pursuit(Pursuit),
}

impl Model {
    /// Returns the name used to select the model.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decay(_) => "decay",
            Self::Pulse(_) => "pulse",
            Self::Jumper(_) => "jumper",
            Self::Springs(_) => "springs",
            Self::Pursuit(_) => "pursuit",
        }
    }

    /// Returns the number of state variables the model integrates.
    #[must_use]
    pub fn nsys(&self) -> usize {
        match self {
            Self::Decay(_) | Self::Pulse(_) | Self::Jumper(_) => 1,
            Self::Springs(_) | Self::Pursuit(_) => 6,
        }
    }

    /// Checks parameters that only accept a fixed menu of values.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] naming the unsupported parameter.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Self::Springs(springs) if !SPRING_STIFFNESSES.contains(&springs.k2) => {
                Err(ModelError::Stiffness(springs.k2))
            }
            Self::Pursuit(pursuit) if !PURSUIT_GAINS.contains(&pursuit.k) => {
                Err(ModelError::Gain(pursuit.k))
            }
            _ => Ok(()),
        }
    }

    /// Returns a non-zero flag when the run should stop at `(t, y)`.
    #[must_use]
    pub fn events(&self, _t: f64, y: &[f64]) -> i32 {
        match self {
            Self::Pursuit(_) => i32::from(y[0] - INTERCEPT_RANGE < 0.0),
            _ => 0,
        }
    }
}

impl OdeSystem for Model {
    fn derivative(&self, t: f64, y: &[f64]) -> Vec<f64> {
        match self {
            Self::Decay(model) => model.derivative(t, y),
            Self::Pulse(model) => model.derivative(t, y),
            Self::Jumper(model) => model.derivative(t, y),
            Self::Springs(model) => model.derivative(t, y),
            Self::Pursuit(model) => model.derivative(t, y),
        }
    }
}

/// First-order decay, `dy/dt = -k y`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Decay {
    pub k: f64,
}

impl Default for Decay {
    fn default() -> Self {
        Self { k: 0.6 }
    }
}

impl OdeSystem for Decay {
    fn derivative(&self, _t: f64, y: &[f64]) -> Vec<f64> {
        vec![-self.k * y[0]]
    }
}

/// Decay driven by a Gaussian pulse of height 10 centred on `mu`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pulse {
    pub k: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl Default for Pulse {
    fn default() -> Self {
        Self {
            k: 0.6,
            mu: 2.0,
            sigma: 0.075,
        }
    }
}

impl OdeSystem for Pulse {
    fn derivative(&self, t: f64, y: &[f64]) -> Vec<f64> {
        let pulse = 10.0 * (-(t - self.mu).powi(2) / (2.0 * self.sigma.powi(2))).exp();
        vec![-self.k * y[0] + pulse]
    }
}

/// Velocity of a falling jumper with nonlinear drag.
///
/// `dv/dt = g - (c / m) * (v + a * (v / vmax)^b)`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Jumper {
    pub g: f64,
    pub m: f64,
    pub c: f64,
    pub a: f64,
    pub b: f64,
    pub vmax: f64,
}

impl Default for Jumper {
    fn default() -> Self {
        Self {
            g: 9.81,
            m: 68.1,
            c: 12.5,
            a: 8.3,
            b: 2.2,
            vmax: 46.0,
        }
    }
}

impl OdeSystem for Jumper {
    fn derivative(&self, _t: f64, y: &[f64]) -> Vec<f64> {
        let v = y[0];
        vec![self.g - (self.c / self.m) * (v + self.a * (v / self.vmax).powf(self.b))]
    }
}

/// Three masses hanging in a chain of springs.
///
/// State: `[x1, v1, x2, v2, x3, v3]`, displacements measured downward.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Springs {
    pub g: f64,
    pub m1: f64,
    pub m2: f64,
    pub m3: f64,
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
}

impl Default for Springs {
    fn default() -> Self {
        Self {
            g: 9.81,
            m1: 60.0,
            m2: 70.0,
            m3: 80.0,
            k1: 50.0,
            k2: 150.0,
            k3: 50.0,
        }
    }
}

impl OdeSystem for Springs {
    fn derivative(&self, _t: f64, y: &[f64]) -> Vec<f64> {
        let Self {
            g,
            m1,
            m2,
            m3,
            k1,
            k2,
            k3,
        } = *self;

        vec![
            y[1],
            g + (k2 * (y[2] - y[0]) - k1 * y[0]) / m1,
            y[3],
            g + (k3 * (y[4] - y[2]) + k2 * (y[0] - y[2])) / m2,
            y[5],
            g + (k3 * (y[2] - y[4])) / m3,
        ]
    }
}

/// A missile pursuing a target in the plane, in polar form.
///
/// State: `[R, theta, xm, ym, xt, yt]`, the range and line-of-sight angle
/// followed by missile and target positions. The missile flies at `k * vt`
/// with lead angle `delta_deg`; the target flies at `vt` along `alpha_t`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pursuit {
    pub vt: f64,
    pub k: f64,
    pub alpha_t: f64,
    pub delta_deg: f64,
}

impl Default for Pursuit {
    fn default() -> Self {
        Self {
            vt: 300.0,
            k: 0.83,
            alpha_t: PI,
            delta_deg: 30.0,
        }
    }
}

impl OdeSystem for Pursuit {
    fn derivative(&self, _t: f64, y: &[f64]) -> Vec<f64> {
        let vm = self.k * self.vt;
        let delta = self.delta_deg.to_radians();
        let (range, theta) = (y[0], y[1]);

        vec![
            self.vt * (self.alpha_t - theta).cos() - vm * delta.cos(),
            (self.vt * (self.alpha_t - theta).sin() - vm * delta.sin()) / range,
            vm * (theta + delta).cos(),
            vm * (theta + delta).sin(),
            self.vt * self.alpha_t.cos(),
            self.vt * self.alpha_t.sin(),
        ]
    }
}
