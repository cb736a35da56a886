/// Errors that can stop an integration run.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    /// A step became too small to change `t`: `t + step == t`.
    #[error("step size underflow at t = {t}: step {step:e} no longer advances t")]
    StepSizeUnderflow { t: f64, step: f64 },

    /// The derivative returned a vector of the wrong length.
    #[error("derivative returned {found} components, expected {expected}")]
    Dimension { expected: usize, found: usize },
}
