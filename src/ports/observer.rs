use crate::domain::state::PipelineState;

/// Receives every pipeline state transition, synchronously with the
/// transition and before the next stage begins. The surrounding
/// presentation layer registers exactly one of these.
#[cfg_attr(test, mockall::automock)]
pub trait StateObserver: Send + Sync {
    /// Called with the controller's state lock held, which is what keeps
    /// transitions ordered. Implementations must not call back into the
    /// controller (`state()`, `cancel()`, `start()`) from here.
    fn on_transition(&self, state: &PipelineState);
}

/// Observer that discards transitions. Useful for callers that only care
/// about `start()`'s resolution.
pub struct NullObserver;

impl StateObserver for NullObserver {
    fn on_transition(&self, _state: &PipelineState) {}
}
