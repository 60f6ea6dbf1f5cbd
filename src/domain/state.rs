use crate::domain::errors::PipelineError;

/// Observable progress signal for one pipeline run.
///
/// Mutated only by the controller; `Success`, `Failed` and `Cancelled` are
/// terminal. `Transcribing` only appears when the optional transcription
/// stage is enabled.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Idle,
    Converting,
    Uploading,
    Transcribing,
    GeneratingSubtitle,
    Success,
    Failed(PipelineError),
    Cancelled,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Success | PipelineState::Failed(_) | PipelineState::Cancelled
        )
    }

    /// A new run may begin from `Idle` or from any terminal state.
    pub fn accepts_start(&self) -> bool {
        matches!(self, PipelineState::Idle) || self.is_terminal()
    }

    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Converting => "converting",
            PipelineState::Uploading => "uploading",
            PipelineState::Transcribing => "transcribing",
            PipelineState::GeneratingSubtitle => "generating_subtitle",
            PipelineState::Success => "success",
            PipelineState::Failed(_) => "failed",
            PipelineState::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{PipelineError, UploadError};

    #[test]
    fn terminal_states() {
        assert!(PipelineState::Success.is_terminal());
        assert!(PipelineState::Cancelled.is_terminal());
        assert!(PipelineState::Failed(PipelineError::Upload(UploadError::Status { status: 500 }))
            .is_terminal());
        assert!(!PipelineState::Idle.is_terminal());
        assert!(!PipelineState::Converting.is_terminal());
    }

    #[test]
    fn start_accepted_from_idle_and_terminals_only() {
        assert!(PipelineState::Idle.accepts_start());
        assert!(PipelineState::Success.accepts_start());
        assert!(PipelineState::Cancelled.accepts_start());
        assert!(!PipelineState::Converting.accepts_start());
        assert!(!PipelineState::Uploading.accepts_start());
        assert!(!PipelineState::GeneratingSubtitle.accepts_start());
    }
}
