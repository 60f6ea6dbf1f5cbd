//! Error taxonomy for the ingestion pipeline.
//!
//! Every stage failure is terminal for the run: no retry, no
//! partial-completion resume. Payloads are plain strings so the errors stay
//! `Clone + PartialEq` and can travel inside `PipelineState::Failed`.

use thiserror::Error;

/// Engine invocation failed or returned malformed output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transcode failed: {diagnostic}")]
pub struct TranscodeError {
    /// Diagnostic payload from the engine (stderr tail or I/O error text).
    pub diagnostic: String,
}

impl TranscodeError {
    pub fn new(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
        }
    }
}

/// The server rejected the audio upload or returned an unparsable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("upload rejected with status {status}")]
    Status { status: u16 },
    #[error("upload response missing video id: {0}")]
    MalformedResponse(String),
    #[error("upload transport error: {0}")]
    Transport(String),
}

/// The server rejected the subtitle request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubtitleRequestError {
    #[error("subtitle request rejected with status {status}")]
    Status { status: u16 },
    #[error("subtitle request transport error: {0}")]
    Transport(String),
}

/// The server rejected the transcription request (optional stage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptionRequestError {
    #[error("transcription request rejected with status {status}")]
    Status { status: u16 },
    #[error("transcription request transport error: {0}")]
    Transport(String),
}

/// `start()` was invoked while a run is already in flight. Raised
/// synchronously at call time, never published through the observer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pipeline already running (state: {current})")]
pub struct InvalidStateError {
    pub current: &'static str,
}

/// Terminal outcome of a failed or aborted run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Transcode(#[from] TranscodeError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Subtitle(#[from] SubtitleRequestError),
    #[error(transparent)]
    Transcription(#[from] TranscriptionRequestError),
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
    #[error("pipeline cancelled")]
    Cancelled,
}
