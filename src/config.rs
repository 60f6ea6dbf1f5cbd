//! Configuration for the ingestion pipeline.

use std::env;

/// Runtime configuration, loaded from the environment.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Base URL of the remote ingestion service
    pub api_base_url: String,
    /// ffmpeg binary to invoke for local transcoding
    pub ffmpeg_bin: String,
}

impl IngestConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| String::from("http://127.0.0.1:3333")),
            ffmpeg_bin: env::var("FFMPEG_BIN").unwrap_or_else(|_| String::from("ffmpeg")),
        }
    }
}
