/// Control actions supported by the integration driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Discard the observed sample and end the run at the previous one.
    StopEarly,
}
