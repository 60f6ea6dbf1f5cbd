use bytes::Bytes;

/// User-selected input. Owned by the active pipeline run until a new
/// selection supersedes it.
#[derive(Debug, Clone)]
pub struct SourceMedia {
    pub bytes: Bytes,
    pub mime: String,
    pub name: String,
}

impl SourceMedia {
    pub fn new(bytes: impl Into<Bytes>, mime: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.into(),
            name: name.into(),
        }
    }
}

/// Fixed encoding policy. Not user-configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeParameters {
    /// ffmpeg stream selector, audio-only
    pub stream_selector: &'static str,
    pub codec: &'static str,
    pub bitrate: &'static str,
}

impl Default for TranscodeParameters {
    fn default() -> Self {
        Self {
            stream_selector: "0:a",
            codec: "libmp3lame",
            bitrate: "20k",
        }
    }
}

pub const AUDIO_MIME: &str = "audio/mpeg";

/// Output of the local transcode, consumed once by the upload.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub bytes: Bytes,
    pub mime: &'static str,
}

impl AudioArtifact {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: AUDIO_MIME,
        }
    }
}

/// Server-assigned identity for the uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteVideoHandle(pub String);

impl RemoteVideoHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional natural-language hint guiding subtitle generation. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitlePrompt(pub String);

impl SubtitlePrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubtitlePrompt {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
