use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Advisory progress events in `[0.0, 1.0]`, written by the engine adapter
/// and consumed by whoever owns the receiving end. Never authoritative for
/// state transitions.
pub type ProgressSender = tokio::sync::mpsc::UnboundedSender<f32>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Non-zero/abnormal engine outcome, with the engine's diagnostic payload.
    #[error("engine exited abnormally: {diagnostic}")]
    Failed { diagnostic: String },
    #[error("engine invocation cancelled")]
    Cancelled,
    #[error("engine i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port over the external transcoding engine.
///
/// The engine addresses inputs and outputs by logical name inside its own
/// workspace and processes exactly one job at a time; callers serialize
/// concurrent invocations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscodingEngine: Send + Sync {
    /// Load bytes into the engine's addressable input under a logical name.
    async fn write_input(&self, name: String, bytes: Bytes) -> Result<(), EngineError>;

    /// Invoke the engine with an explicit argument sequence. Progress events
    /// are emitted on `progress`; cancellation aborts the invocation.
    async fn execute(
        &self,
        args: Vec<String>,
        progress: ProgressSender,
        cancel: CancellationToken,
    ) -> Result<(), EngineError>;

    /// Read an output buffer back by logical name.
    async fn read_output(&self, name: String) -> Result<Bytes, EngineError>;
}
