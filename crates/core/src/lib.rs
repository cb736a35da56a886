//! Core traits for rkode.
//!
//! This crate defines the shared abstractions the integrators build on:
//!
//! - [`OdeSystem`]: the right-hand side of a first-order ODE system, mapping
//!   `(t, y)` to `dy/dt`
//! - [`Observer`]: receives solver events and optionally returns control
//!   actions, such as stopping a run when an event condition is met

mod observer;
mod system;

pub use observer::Observer;
pub use system::OdeSystem;
