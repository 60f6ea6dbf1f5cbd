//! Legenda - Media Ingestion Pipeline Library
//!
//! Ingests a locally selected media file, derives a compact audio artifact
//! from it with ffmpeg, uploads the artifact to a remote service and
//! requests subtitle generation for it, exposing a single observable
//! progress signal throughout.
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (media entities, pipeline state, errors)
//! - ports/: Trait definitions (transcoding engine, ingest API, observer)
//! - adapters/: Concrete implementations (ffmpeg child process, reqwest
//!   client, preview handles)
//! - application/: Generic services (transcoder adapter, pipeline
//!   controller)
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports for convenience
pub use adapters::ffmpeg::FfmpegEngine;
pub use adapters::http::HttpIngestClient;
pub use adapters::preview::{PreviewHandle, PreviewManager};
pub use application::pipeline::PipelineController;
pub use application::transcoder::TranscoderAdapter;
pub use config::IngestConfig;
pub use domain::errors::PipelineError;
pub use domain::media::{
    AudioArtifact, RemoteVideoHandle, SourceMedia, SubtitlePrompt, TranscodeParameters,
};
pub use domain::state::PipelineState;
