//! Runge-Kutta integrators for ODE systems.
//!
//! The crate is organized leaves first:
//!
//! - [`fixed`]: eight single-step methods, from forward Euler to Butcher's
//!   fifth order, selected through [`Method`]
//! - [`cash_karp`]: the embedded Cash-Karp 4(5) pair with its error estimate
//! - [`adaptive`]: the step-size controller that drives the pair to a
//!   relative tolerance
//! - [`trajectory`]: the growable sample store
//! - [`integrate`]: the driver that ties them together over a [`Config`]

pub mod adaptive;
pub mod cash_karp;
pub mod fixed;
pub mod integrate;
pub mod trajectory;

mod config;
mod error;
mod evaluator;
mod tableau;

pub use config::{AdaptiveOutput, Config, ConfigBuilder, ConfigError, Mode};
pub use error::Error;
pub use evaluator::Evaluator;
pub use fixed::{Method, StepOutcome};
pub use integrate::{Solution, Status, solve, solve_unobserved};
pub use tableau::Tableau;
pub use trajectory::{GROWTH_INCREMENT, Trajectory};
