//! Ephemeral, locally-addressable preview handles for selected media.
//!
//! One handle is live per slot at a time. Issuing a new handle for a slot
//! releases the prior one exactly once; an unreleased handle keeps its
//! backing file around for the process lifetime, so release is a hard
//! requirement for callers that bypass replacement.

use crate::domain::media::SourceMedia;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    id: Uuid,
    slot: String,
    url: String,
}

impl PreviewHandle {
    /// Locally-addressable URL for display. Opaque to callers.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }
}

struct LiveEntry {
    id: Uuid,
    path: PathBuf,
}

pub struct PreviewManager {
    workspace: TempDir,
    live: Mutex<HashMap<String, LiveEntry>>,
}

impl PreviewManager {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            workspace: TempDir::new()?,
            live: Mutex::new(HashMap::new()),
        })
    }

    /// Materialize `media` under a fresh handle for `slot`, releasing the
    /// slot's prior handle first. I/O failure (resource exhaustion) is
    /// surfaced upward, not retried.
    pub fn create_preview(&self, slot: &str, media: &SourceMedia) -> io::Result<PreviewHandle> {
        let mut live = self.live.lock().unwrap();

        if let Some(prior) = live.remove(slot) {
            let _ = std::fs::remove_file(&prior.path);
        }

        let id = Uuid::new_v4();
        let ext = std::path::Path::new(&media.name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let path = self.workspace.path().join(format!("{}.{}", id, ext));
        std::fs::write(&path, &media.bytes)?;

        let url = format!("file://{}", path.display());
        live.insert(
            slot.to_string(),
            LiveEntry {
                id,
                path: path.clone(),
            },
        );

        Ok(PreviewHandle {
            id,
            slot: slot.to_string(),
            url,
        })
    }

    /// Release a handle. Returns `true` if the handle was live; releasing a
    /// superseded or already-released handle is a checked no-op, never a
    /// double-release.
    pub fn release_preview(&self, handle: &PreviewHandle) -> bool {
        let mut live = self.live.lock().unwrap();
        match live.get(&handle.slot) {
            Some(entry) if entry.id == handle.id => {
                let entry = live.remove(&handle.slot).unwrap();
                let _ = std::fs::remove_file(&entry.path);
                true
            }
            _ => false,
        }
    }

    /// Whether `handle` is the live handle for its slot.
    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.live
            .lock()
            .unwrap()
            .get(&handle.slot)
            .map(|entry| entry.id == handle.id)
            .unwrap_or(false)
    }
}
