//! Local transcode stage: source video buffer in, compressed audio out.

use crate::domain::errors::TranscodeError;
use crate::domain::media::{AudioArtifact, SourceMedia, TranscodeParameters};
use crate::ports::engine::{EngineError, ProgressSender, TranscodingEngine};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Logical input name inside the engine workspace.
pub const INPUT_NAME: &str = "input.mp4";
/// Logical output name inside the engine workspace.
pub const OUTPUT_NAME: &str = "output.mp3";

pub struct TranscoderAdapter<E> {
    engine: Arc<E>,
}

impl<E> TranscoderAdapter<E>
where
    E: TranscodingEngine,
{
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    /// Drop the video stream, encode the first audio stream and hand the
    /// result back as an `audio/mpeg` artifact. Progress events on
    /// `progress` are advisory only. No retry on failure.
    pub async fn transcode(
        &self,
        media: &SourceMedia,
        params: &TranscodeParameters,
        progress: ProgressSender,
        cancel: CancellationToken,
    ) -> Result<AudioArtifact, TranscodeError> {
        tracing::info!(name = %media.name, size = media.bytes.len(), "transcode started");

        self.engine
            .write_input(INPUT_NAME.to_string(), media.bytes.clone())
            .await
            .map_err(into_transcode_error)?;

        let args: Vec<String> = [
            "-i",
            INPUT_NAME,
            "-map",
            params.stream_selector,
            "-b:a",
            params.bitrate,
            "-acodec",
            params.codec,
            OUTPUT_NAME,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        self.engine
            .execute(args, progress, cancel)
            .await
            .map_err(into_transcode_error)?;

        let bytes = self
            .engine
            .read_output(OUTPUT_NAME.to_string())
            .await
            .map_err(into_transcode_error)?;

        tracing::info!(size = bytes.len(), "transcode finished");
        Ok(AudioArtifact::new(bytes))
    }
}

fn into_transcode_error(err: EngineError) -> TranscodeError {
    match err {
        EngineError::Failed { diagnostic } => TranscodeError::new(diagnostic),
        other => TranscodeError::new(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::AUDIO_MIME;
    use crate::ports::engine::MockTranscodingEngine;
    use bytes::Bytes;
    use mockall::predicate::eq;

    fn media() -> SourceMedia {
        SourceMedia::new(Bytes::from_static(b"video bytes"), "video/mp4", "clip.mp4")
    }

    fn progress() -> ProgressSender {
        tokio::sync::mpsc::unbounded_channel().0
    }

    #[tokio::test]
    async fn builds_the_fixed_argument_sequence() {
        let mut engine = MockTranscodingEngine::new();
        engine
            .expect_write_input()
            .with(eq(INPUT_NAME.to_string()), eq(Bytes::from_static(b"video bytes")))
            .times(1)
            .returning(|_, _| Ok(()));
        engine
            .expect_execute()
            .withf(|args, _, _| {
                args == &[
                    "-i",
                    "input.mp4",
                    "-map",
                    "0:a",
                    "-b:a",
                    "20k",
                    "-acodec",
                    "libmp3lame",
                    "output.mp3",
                ]
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        engine
            .expect_read_output()
            .with(eq(OUTPUT_NAME.to_string()))
            .times(1)
            .returning(|_| Ok(Bytes::from_static(b"mp3 bytes")));

        let adapter = TranscoderAdapter::new(Arc::new(engine));
        let artifact = adapter
            .transcode(
                &media(),
                &TranscodeParameters::default(),
                progress(),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(artifact.mime, AUDIO_MIME);
        assert_eq!(artifact.bytes, Bytes::from_static(b"mp3 bytes"));
    }

    #[tokio::test]
    async fn engine_failure_surfaces_the_diagnostic() {
        let mut engine = MockTranscodingEngine::new();
        engine.expect_write_input().returning(|_, _| Ok(()));
        engine.expect_execute().returning(|_, _, _| {
            Err(EngineError::Failed {
                diagnostic: String::from("Stream map '0:a' matches no streams"),
            })
        });
        engine.expect_read_output().times(0);

        let adapter = TranscoderAdapter::new(Arc::new(engine));
        let err = adapter
            .transcode(
                &media(),
                &TranscodeParameters::default(),
                progress(),
                CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(err.diagnostic.contains("matches no streams"));
    }
}
