use thiserror::Error;

use crate::fixed::Method;

/// How an integration run advances between output samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fixed steps with the given method.
    ///
    /// The method applies to single-variable problems; systems always use
    /// [`Method::Rk4Classic`].
    Fixed(Method),

    /// Error-controlled Cash-Karp steps.
    Adaptive(AdaptiveOutput),
}

/// Where adaptive runs place their output samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdaptiveOutput {
    /// One sample per accepted step, with steps limited only by the domain
    /// end. Sample spacing follows the controller.
    #[default]
    EachStep,

    /// One sample per output interval, with as many accepted steps between
    /// samples as the tolerance requires.
    Interval,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Adaptive(AdaptiveOutput::default())
    }
}

/// Errors that can occur when validating an integration config.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("domain [{start}, {end}] must be finite with end > start")]
    Domain { start: f64, end: f64 },

    #[error("step size must be finite and positive, got {0}")]
    Step(f64),

    #[error("output interval must be finite and positive, got {0}")]
    OutputInterval(f64),

    #[error("output interval {interval} is wider than the domain ({width})")]
    IntervalExceedsDomain { interval: f64, width: f64 },

    #[error("relative tolerance must be finite and positive, got {0}")]
    Tolerance(f64),

    #[error("initial conditions must not be empty")]
    NoState,

    #[error("initial conditions have {found} values, expected NSYS = {nsys}")]
    Dimension { nsys: usize, found: usize },

    #[error("unknown method identifier {0}, expected 1 to 8")]
    UnknownMethod(u8),
}

/// Validated configuration for one integration run.
///
/// Build with [`Config::builder`]; every field is checked when
/// [`ConfigBuilder::build`] is called.
///
/// # Example
///
/// ```
/// use rkode_solvers::{Config, Mode, fixed::Method};
///
/// let config = Config::builder([0.0, 5.0], vec![1.0])
///     .step(0.1)
///     .output_interval(0.5)
///     .mode(Mode::Fixed(Method::Rk4Classic))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.nsys(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    domain: [f64; 2],
    step: f64,
    output_interval: f64,
    tolerance: f64,
    mode: Mode,
    initial: Vec<f64>,
}

impl Config {
    /// Starts a config for integrating from `initial` across `domain`.
    ///
    /// Unset fields default to a step and output interval of 1/100 of the
    /// domain, a relative tolerance of `1e-6`, and adaptive stepping with one
    /// sample per accepted step.
    #[must_use]
    pub fn builder(domain: [f64; 2], initial: Vec<f64>) -> ConfigBuilder {
        ConfigBuilder {
            domain,
            initial,
            nsys: None,
            step: None,
            output_interval: None,
            tolerance: 1e-6,
            mode: Mode::default(),
        }
    }

    /// Returns the integration domain `[start, end]`.
    #[must_use]
    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    /// Returns the base (fixed) or initial (adaptive) step size.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Returns the spacing of output samples.
    #[must_use]
    pub fn output_interval(&self) -> f64 {
        self.output_interval
    }

    /// Returns the relative error tolerance as a fraction.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns the stepping mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the number of state variables.
    #[must_use]
    pub fn nsys(&self) -> usize {
        self.initial.len()
    }

    /// Returns the initial state.
    #[must_use]
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ConfigBuilder {
    domain: [f64; 2],
    initial: Vec<f64>,
    nsys: Option<usize>,
    step: Option<f64>,
    output_interval: Option<f64>,
    tolerance: f64,
    mode: Mode,
}

impl ConfigBuilder {
    /// Declares the expected number of state variables.
    ///
    /// The initial conditions must then have exactly `nsys` values.
    pub fn nsys(mut self, nsys: usize) -> Self {
        self.nsys = Some(nsys);
        self
    }

    /// Sets the base (fixed) or initial (adaptive) step size.
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Sets the spacing of output samples.
    pub fn output_interval(mut self, output_interval: f64) -> Self {
        self.output_interval = Some(output_interval);
        self
    }

    /// Sets the relative error tolerance as a fraction (`1e-6`, not percent).
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the stepping mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Validates the settings and builds the config.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn build(self) -> Result<Config, ConfigError> {
        let [start, end] = self.domain;
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(ConfigError::Domain { start, end });
        }

        if self.initial.is_empty() {
            return Err(ConfigError::NoState);
        }
        if let Some(nsys) = self.nsys {
            if nsys != self.initial.len() {
                return Err(ConfigError::Dimension {
                    nsys,
                    found: self.initial.len(),
                });
            }
        }

        let default_spacing = (end - start) / 100.0;
        let step = self.step.unwrap_or(default_spacing);
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::Step(step));
        }

        let output_interval = self.output_interval.unwrap_or(default_spacing);
        if !output_interval.is_finite() || output_interval <= 0.0 {
            return Err(ConfigError::OutputInterval(output_interval));
        }
        if output_interval > end - start {
            return Err(ConfigError::IntervalExceedsDomain {
                interval: output_interval,
                width: end - start,
            });
        }

        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::Tolerance(self.tolerance));
        }

        Ok(Config {
            domain: self.domain,
            step,
            output_interval,
            tolerance: self.tolerance,
            mode: self.mode,
            initial: self.initial,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn defaults_follow_the_domain() {
        let config = Config::builder([0.0, 2.0], vec![1.0, 0.0]).build().unwrap();

        assert_relative_eq!(config.step(), 0.02);
        assert_relative_eq!(config.output_interval(), 0.02);
        assert_relative_eq!(config.tolerance(), 1e-6);
        assert_eq!(config.mode(), Mode::Adaptive(AdaptiveOutput::EachStep));
        assert_eq!(config.nsys(), 2);
        assert_eq!(config.initial(), &[1.0, 0.0]);
    }

    #[test]
    fn rejects_bad_domains() {
        for domain in [[1.0, 1.0], [2.0, 1.0], [0.0, f64::INFINITY], [f64::NAN, 1.0]] {
            let result = Config::builder(domain, vec![1.0]).build();
            assert!(
                matches!(result, Err(ConfigError::Domain { .. })),
                "{domain:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_non_positive_settings() {
        let builder = || Config::builder([0.0, 1.0], vec![1.0]);

        assert_eq!(
            builder().step(0.0).build(),
            Err(ConfigError::Step(0.0))
        );
        assert_eq!(
            builder().output_interval(-0.1).build(),
            Err(ConfigError::OutputInterval(-0.1))
        );
        assert_eq!(
            builder().tolerance(0.0).build(),
            Err(ConfigError::Tolerance(0.0))
        );
        assert!(matches!(
            builder().tolerance(f64::NAN).build(),
            Err(ConfigError::Tolerance(_))
        ));
    }

    #[test]
    fn rejects_mismatched_initial_conditions() {
        assert_eq!(
            Config::builder([0.0, 1.0], vec![1.0, 2.0]).nsys(3).build(),
            Err(ConfigError::Dimension { nsys: 3, found: 2 })
        );
        assert_eq!(
            Config::builder([0.0, 1.0], vec![]).build(),
            Err(ConfigError::NoState)
        );
    }

    #[test]
    fn output_interval_must_fit_the_domain() {
        assert_eq!(
            Config::builder([0.0, 1.0], vec![1.0])
                .output_interval(5.0)
                .build(),
            Err(ConfigError::IntervalExceedsDomain {
                interval: 5.0,
                width: 1.0
            })
        );

        let whole = Config::builder([0.0, 1.0], vec![1.0])
            .output_interval(1.0)
            .build()
            .unwrap();
        assert_relative_eq!(whole.output_interval(), 1.0);
    }
}
