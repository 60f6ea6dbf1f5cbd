use crate::domain::errors::{SubtitleRequestError, TranscriptionRequestError, UploadError};
use crate::domain::media::{AudioArtifact, RemoteVideoHandle, SubtitlePrompt};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Port over the remote ingestion service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngestApi: Send + Sync {
    /// Multipart upload of the audio artifact. Resolves to the
    /// server-assigned video identifier.
    async fn upload_audio(
        &self,
        artifact: AudioArtifact,
        cancel: CancellationToken,
    ) -> Result<RemoteVideoHandle, UploadError>;

    /// Request subtitle generation for an uploaded video. No artifact
    /// identifier comes back; retrieval of the generated subtitle is a
    /// follow-up interface the service does not expose yet.
    async fn request_subtitle(
        &self,
        video: RemoteVideoHandle,
        prompt: SubtitlePrompt,
        cancel: CancellationToken,
    ) -> Result<(), SubtitleRequestError>;

    /// Request a raw transcription, distinct from subtitles. Optional stage,
    /// skipped unless the pipeline enables it.
    async fn request_transcription(
        &self,
        video: RemoteVideoHandle,
        prompt: SubtitlePrompt,
        cancel: CancellationToken,
    ) -> Result<(), TranscriptionRequestError>;
}
