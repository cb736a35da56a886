use std::path::Path;

use anyhow::{Context, Result};
use rkode_solvers::{AdaptiveOutput, Config, ConfigError, Method, Mode};
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Model, ModelError};

/// Settings for one run, as read from a TOML or JSON file.
///
/// Field names follow the long-standing input format (`stepsize`,
/// `relative_errorPC`, `yInitCond`, ...), so existing JSON inputs load as-is
/// once a `model` table is added.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunFile {
    pub domain: [f64; 2],

    #[serde(rename = "stepsize")]
    pub step: f64,

    #[serde(rename = "outputInterval")]
    pub output_interval: f64,

    /// Relative error tolerance in percent.
    #[serde(rename = "relative_errorPC", default = "default_error_percent")]
    pub relative_error_percent: f64,

    #[serde(rename = "adaptive_switch", default)]
    pub adaptive: Switch,

    #[serde(default)]
    pub adaptive_output: OutputChoice,

    /// Fixed-step method identifier, 1 to 8. Only single equations need one.
    #[serde(rename = "methodId")]
    pub method_id: Option<u8>,

    #[serde(rename = "NSYS")]
    pub nsys: Option<usize>,

    #[serde(rename = "yInitCond")]
    pub initial: Vec<f64>,

    /// Output subdirectory; defaults to the model's name.
    #[serde(rename = "modelname")]
    pub model_name: Option<String>,

    pub model: Model,

    #[serde(rename = "printResult", default)]
    pub print_result: Switch,

    #[serde(default)]
    pub logging: Logging,
}

fn default_error_percent() -> f64 {
    1e-4
}

/// An on/off setting written either as a boolean or as a number (non-zero is
/// on).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Switch {
    Flag(bool),
    Number(f64),
}

impl Switch {
    #[must_use]
    pub fn is_on(self) -> bool {
        match self {
            Self::Flag(flag) => flag,
            Self::Number(number) => number != 0.0,
        }
    }
}

impl Default for Switch {
    fn default() -> Self {
        Self::Flag(false)
    }
}

/// Where adaptive runs place output samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputChoice {
    #[default]
    EachStep,
    Interval,
}

impl From<OutputChoice> for AdaptiveOutput {
    fn from(choice: OutputChoice) -> Self {
        match choice {
            OutputChoice::EachStep => Self::EachStep,
            OutputChoice::Interval => Self::Interval,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Logging {
    /// 0 is off, then warn, info, debug, and trace from 4 up.
    pub level: Option<u8>,
}

impl Logging {
    /// Returns the log filter, raised by `verbose` levels.
    #[must_use]
    pub fn filter(self, verbose: u8) -> log::LevelFilter {
        match self.level.unwrap_or(2).saturating_add(verbose) {
            0 => log::LevelFilter::Off,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Errors from run files whose settings do not fit together.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RunFileError {
    #[error("fixed-step runs on a single equation need a methodId")]
    MissingMethod,

    #[error("NSYS = {nsys} but the {model} model has {expected} variables")]
    ModelDimension {
        model: &'static str,
        expected: usize,
        nsys: usize,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RunFile {
    /// Returns the output subdirectory name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(self.model.kind())
    }

    /// Builds the integration config, checking the settings against the model.
    ///
    /// # Errors
    ///
    /// Returns a [`RunFileError`] for inconsistent settings.
    pub fn to_config(&self) -> Result<Config, RunFileError> {
        self.model.validate()?;

        let expected = self.model.nsys();
        let nsys = self.nsys.unwrap_or(expected);
        if nsys != expected {
            return Err(RunFileError::ModelDimension {
                model: self.model.kind(),
                expected,
                nsys,
            });
        }

        // Fixed-step systems always use RK4, so they need no method id.
        let mode = if self.adaptive.is_on() {
            Mode::Adaptive(self.adaptive_output.into())
        } else if let Some(id) = self.method_id {
            Mode::Fixed(Method::from_id(id)?)
        } else if nsys > 1 {
            Mode::Fixed(Method::Rk4Classic)
        } else {
            return Err(RunFileError::MissingMethod);
        };

        let config = Config::builder(self.domain, self.initial.clone())
            .nsys(nsys)
            .step(self.step)
            .output_interval(self.output_interval)
            .tolerance(self.relative_error_percent / 100.0)
            .mode(mode)
            .build()?;

        Ok(config)
    }
}

/// Reads a run file, choosing JSON for `.json` paths and TOML otherwise.
pub fn load(path: &Path) -> Result<RunFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read run file {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&contents).context("Failed to parse JSON run file")
    } else {
        toml::from_str(&contents).context("Failed to parse TOML run file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::{Decay, Pursuit};

    const PURSUIT_JSON: &str = r#"{
        "domain": [0, 20],
        "stepsize": 0.01,
        "outputInterval": 0.1,
        "relative_errorPC": 0.0001,
        "adaptive_switch": 1,
        "NSYS": 6,
        "yInitCond": [3000, 0, 0, 0, 3000, 0],
        "modelname": "missile",
        "printResult": 0,
        "model": { "name": "pursuit", "k": 1.67 }
    }"#;

    const DECAY_TOML: &str = r#"
        domain = [0.0, 5.0]
        stepsize = 0.1
        outputInterval = 0.5
        adaptive_switch = false
        methodId = 7
        yInitCond = [1.0]
        printResult = true

        [model]
        name = "decay"

        [logging]
        level = 3
    "#;

    #[test]
    fn parses_json_in_the_classic_format() {
        let run: RunFile = serde_json::from_str(PURSUIT_JSON).unwrap();

        assert!(run.adaptive.is_on());
        assert!(!run.print_result.is_on());
        assert_eq!(run.model_name(), "missile");
        assert_eq!(
            run.model,
            Model::Pursuit(Pursuit {
                k: 1.67,
                ..Pursuit::default()
            })
        );

        let config = run.to_config().unwrap();
        assert_eq!(config.mode(), Mode::Adaptive(AdaptiveOutput::EachStep));
        assert_eq!(config.nsys(), 6);
        assert_relative_eq!(config.tolerance(), 1e-6, max_relative = 1e-12);
    }

    #[test]
    fn parses_toml_with_defaults() {
        let run: RunFile = toml::from_str(DECAY_TOML).unwrap();

        assert_eq!(run.model, Model::Decay(Decay::default()));
        assert_eq!(run.model_name(), "decay");
        assert!(run.print_result.is_on());
        assert_eq!(run.logging.filter(0), log::LevelFilter::Debug);
        assert_eq!(run.logging.filter(1), log::LevelFilter::Trace);

        let config = run.to_config().unwrap();
        assert_eq!(config.mode(), Mode::Fixed(Method::Rk4Classic));
        assert_relative_eq!(config.tolerance(), 1e-6, max_relative = 1e-12);
    }

    #[test]
    fn fixed_runs_need_a_known_method() {
        let mut run: RunFile = toml::from_str(DECAY_TOML).unwrap();

        run.method_id = None;
        assert_eq!(run.to_config(), Err(RunFileError::MissingMethod));

        run.method_id = Some(9);
        assert_eq!(
            run.to_config(),
            Err(RunFileError::Config(ConfigError::UnknownMethod(9)))
        );
    }

    #[test]
    fn fixed_systems_default_to_rk4() {
        let mut run: RunFile = serde_json::from_str(PURSUIT_JSON).unwrap();
        run.adaptive = Switch::Flag(false);
        run.method_id = None;

        let config = run.to_config().unwrap();
        assert_eq!(config.mode(), Mode::Fixed(Method::Rk4Classic));
    }

    #[test]
    fn nsys_must_match_the_model() {
        let mut run: RunFile = serde_json::from_str(PURSUIT_JSON).unwrap();
        run.nsys = Some(1);

        assert_eq!(
            run.to_config(),
            Err(RunFileError::ModelDimension {
                model: "pursuit",
                expected: 6,
                nsys: 1
            })
        );

        run.nsys = None;
        run.initial.pop();
        assert_eq!(
            run.to_config(),
            Err(RunFileError::Config(ConfigError::Dimension { nsys: 6, found: 5 }))
        );
    }

    #[test]
    fn model_parameters_are_validated() {
        let mut run: RunFile = serde_json::from_str(PURSUIT_JSON).unwrap();
        run.model = Model::Pursuit(Pursuit {
            k: 0.5,
            ..Pursuit::default()
        });

        assert_eq!(
            run.to_config(),
            Err(RunFileError::Model(ModelError::Gain(0.5)))
        );
    }

    #[test]
    fn switches_accept_numbers_and_flags() {
        let parse = |text: &str| serde_json::from_str::<Switch>(text).unwrap();

        assert!(parse("true").is_on());
        assert!(parse("1").is_on());
        assert!(parse("2.5").is_on());
        assert!(!parse("0").is_on());
        assert!(!parse("false").is_on());
    }

    #[test]
    fn logging_defaults_to_info() {
        assert_eq!(Logging::default().filter(0), log::LevelFilter::Info);
        assert_eq!(Logging { level: Some(0) }.filter(0), log::LevelFilter::Off);
        assert_eq!(Logging { level: Some(255) }.filter(3), log::LevelFilter::Trace);
    }

    #[test]
    fn shipped_run_files_are_valid() {
        let toml_runs = [
            include_str!("../runs/decay.toml"),
            include_str!("../runs/jumper.toml"),
            include_str!("../runs/springs.toml"),
            include_str!("../runs/pursuit.toml"),
        ];
        for text in toml_runs {
            let run: RunFile = toml::from_str(text).unwrap();
            run.to_config().unwrap();
        }

        let run: RunFile = serde_json::from_str(include_str!("../runs/pulse.json")).unwrap();
        run.to_config().unwrap();
    }
}
