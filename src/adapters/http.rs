//! reqwest implementation of the remote ingestion port.
//!
//! Wire contract:
//! - `POST {base}/videos` multipart, field `file` (audio/mpeg bytes),
//!   response `{"video": {"id": "..."}}`
//! - `POST {base}/videos/{id}/subtitle` body `{"prompt": <string>}`
//! - `POST {base}/videos/{id}/transcription` same shape, optional stage
//!
//! No client-side timeout or retry: a stage failure is terminal for the run
//! and a hung remote call hangs the run until cancelled.

use crate::config::IngestConfig;
use crate::domain::errors::{SubtitleRequestError, TranscriptionRequestError, UploadError};
use crate::domain::media::{AudioArtifact, RemoteVideoHandle, SubtitlePrompt};
use crate::ports::ingest::IngestApi;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Logical file name the artifact is uploaded under.
const UPLOAD_FILE_NAME: &str = "audio.mp3";

#[derive(Clone)]
pub struct HttpIngestClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    video: UploadedVideo,
}

#[derive(Debug, Deserialize)]
struct UploadedVideo {
    id: String,
}

#[derive(Debug, Serialize)]
struct PromptBody<'a> {
    prompt: &'a str,
}

impl HttpIngestClient {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a `{"prompt": ...}` body. Resolves to the response status;
    /// transport failures and cancellation come back as strings.
    async fn post_prompt(
        &self,
        path: &str,
        prompt: &SubtitlePrompt,
        cancel: CancellationToken,
    ) -> Result<reqwest::StatusCode, String> {
        let request = self
            .http
            .post(self.endpoint(path))
            .json(&PromptBody {
                prompt: prompt.as_str(),
            })
            .send();

        let response = tokio::select! {
            response = request => response.map_err(|e| e.to_string())?,
            _ = cancel.cancelled() => return Err(String::from("request cancelled")),
        };
        Ok(response.status())
    }
}

#[async_trait]
impl IngestApi for HttpIngestClient {
    async fn upload_audio(
        &self,
        artifact: AudioArtifact,
        cancel: CancellationToken,
    ) -> Result<RemoteVideoHandle, UploadError> {
        let part = Part::bytes(artifact.bytes.to_vec())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(artifact.mime)
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        let request = self.http.post(self.endpoint("/videos")).multipart(form).send();
        let response = tokio::select! {
            response = request => response.map_err(|e| UploadError::Transport(e.to_string()))?,
            _ = cancel.cancelled() => {
                return Err(UploadError::Transport(String::from("request cancelled")))
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::MalformedResponse(e.to_string()))?;
        if body.video.id.is_empty() {
            return Err(UploadError::MalformedResponse(String::from(
                "empty video id",
            )));
        }

        tracing::info!(video_id = %body.video.id, "audio uploaded");
        Ok(RemoteVideoHandle(body.video.id))
    }

    async fn request_subtitle(
        &self,
        video: RemoteVideoHandle,
        prompt: SubtitlePrompt,
        cancel: CancellationToken,
    ) -> Result<(), SubtitleRequestError> {
        let path = format!("/videos/{}/subtitle", video.as_str());
        let status = self
            .post_prompt(&path, &prompt, cancel)
            .await
            .map_err(SubtitleRequestError::Transport)?;
        if !status.is_success() {
            return Err(SubtitleRequestError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn request_transcription(
        &self,
        video: RemoteVideoHandle,
        prompt: SubtitlePrompt,
        cancel: CancellationToken,
    ) -> Result<(), TranscriptionRequestError> {
        let path = format!("/videos/{}/transcription", video.as_str());
        let status = self
            .post_prompt(&path, &prompt, cancel)
            .await
            .map_err(TranscriptionRequestError::Transport)?;
        if !status.is_success() {
            return Err(TranscriptionRequestError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
