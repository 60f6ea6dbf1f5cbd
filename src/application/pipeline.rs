//! Pipeline controller: owns the run state machine, sequences the
//! transcode → upload → subtitle-request stages and publishes every
//! transition to the registered observer.

use crate::application::transcoder::TranscoderAdapter;
use crate::domain::errors::{InvalidStateError, PipelineError};
use crate::domain::media::{RemoteVideoHandle, SourceMedia, SubtitlePrompt, TranscodeParameters};
use crate::domain::state::PipelineState;
use crate::ports::engine::{ProgressSender, TranscodingEngine};
use crate::ports::ingest::IngestApi;
use crate::ports::observer::StateObserver;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub struct PipelineController<E, A, O> {
    transcoder: TranscoderAdapter<E>,
    api: A,
    observer: O,
    progress: ProgressSender,
    params: TranscodeParameters,
    request_transcription: bool,
    state: Mutex<PipelineState>,
    run_token: Mutex<CancellationToken>,
}

impl<E, A, O> PipelineController<E, A, O>
where
    E: TranscodingEngine,
    A: IngestApi,
    O: StateObserver,
{
    pub fn new(engine: Arc<E>, api: A, observer: O, progress: ProgressSender) -> Self {
        Self {
            transcoder: TranscoderAdapter::new(engine),
            api,
            observer,
            progress,
            params: TranscodeParameters::default(),
            request_transcription: false,
            state: Mutex::new(PipelineState::Idle),
            run_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Also request a raw transcription before the subtitle stage.
    pub fn with_transcription(mut self) -> Self {
        self.request_transcription = true;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state.lock().unwrap().clone()
    }

    /// Run the pipeline for one selected media. Resolves with the remote
    /// handle on success. Rejects immediately with `InvalidStateError`, and
    /// without any transition, when a run is already in flight; terminal
    /// states implicitly reset.
    pub async fn start(
        &self,
        media: SourceMedia,
        prompt: SubtitlePrompt,
    ) -> Result<RemoteVideoHandle, PipelineError> {
        let cancel = {
            let mut state = self.state.lock().unwrap();
            if !state.accepts_start() {
                return Err(InvalidStateError {
                    current: state.name(),
                }
                .into());
            }
            let token = CancellationToken::new();
            *self.run_token.lock().unwrap() = token.clone();
            *state = PipelineState::Converting;
            self.observer.on_transition(&state);
            token
        };

        match self.run(media, prompt, cancel.clone()).await {
            Ok(handle) => {
                if cancel.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }
                self.transition(PipelineState::Success);
                tracing::info!(video_id = %handle.as_str(), "pipeline finished");
                Ok(handle)
            }
            Err(err) => {
                if cancel.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }
                tracing::warn!(error = %err, "pipeline failed");
                self.transition(PipelineState::Failed(err.clone()));
                Err(err)
            }
        }
    }

    /// Abort the in-flight run, if any. The controller lands in the
    /// terminal `Cancelled` state and publishes no further transitions;
    /// cancellation propagates to whatever stage is outstanding.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        if matches!(*state, PipelineState::Idle) || state.is_terminal() {
            return;
        }
        self.run_token.lock().unwrap().cancel();
        *state = PipelineState::Cancelled;
        self.observer.on_transition(&state);
    }

    async fn run(
        &self,
        media: SourceMedia,
        prompt: SubtitlePrompt,
        cancel: CancellationToken,
    ) -> Result<RemoteVideoHandle, PipelineError> {
        // Converting was entered when start() accepted the run.
        let artifact = self
            .transcoder
            .transcode(&media, &self.params, self.progress.clone(), cancel.clone())
            .await?;
        checkpoint(&cancel)?;

        self.transition(PipelineState::Uploading);
        let handle = self.api.upload_audio(artifact, cancel.clone()).await?;
        checkpoint(&cancel)?;

        if self.request_transcription {
            self.transition(PipelineState::Transcribing);
            self.api
                .request_transcription(handle.clone(), prompt.clone(), cancel.clone())
                .await?;
            checkpoint(&cancel)?;
        }

        self.transition(PipelineState::GeneratingSubtitle);
        self.api
            .request_subtitle(handle.clone(), prompt, cancel.clone())
            .await?;
        checkpoint(&cancel)?;

        Ok(handle)
    }

    fn transition(&self, next: PipelineState) {
        let mut state = self.state.lock().unwrap();
        // Terminal mid-run only happens through cancel(), which already
        // published its transition; nothing may follow it.
        if state.is_terminal() {
            return;
        }
        *state = next;
        self.observer.on_transition(&state);
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}
