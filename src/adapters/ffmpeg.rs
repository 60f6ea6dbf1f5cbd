//! Child-process ffmpeg implementation of the transcoding engine port.
//!
//! Inputs and outputs are addressed by logical name inside a private
//! workspace directory. The engine processes one job at a time; callers
//! serialize invocations (the pipeline's single-run invariant does this).

use crate::ports::engine::{EngineError, ProgressSender, TranscodingEngine};
use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::io;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;
use tokio_util::sync::CancellationToken;

static SHARED: OnceCell<Arc<FfmpegEngine>> = OnceCell::new();

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2})\.(\d{2})").unwrap());

/// How many trailing diagnostic lines to keep for error reporting.
const STDERR_TAIL: usize = 20;

pub struct FfmpegEngine {
    bin: String,
    workspace: TempDir,
}

impl FfmpegEngine {
    pub fn new(bin: impl Into<String>) -> io::Result<Self> {
        Ok(Self {
            bin: bin.into(),
            workspace: TempDir::new()?,
        })
    }

    /// Process-wide engine instance, initialized once on first use and
    /// reused across runs. `bin` only matters for the initializing call.
    pub fn shared(bin: &str) -> Result<Arc<Self>, EngineError> {
        let engine = SHARED.get_or_try_init(|| Ok::<_, io::Error>(Arc::new(Self::new(bin)?)))?;
        Ok(engine.clone())
    }

    fn resolve(&self, name: &str) -> Result<std::path::PathBuf, EngineError> {
        // Logical names are bare file names; anything path-like could
        // escape the workspace.
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(EngineError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid logical name: {:?}", name),
            )));
        }
        Ok(self.workspace.path().join(name))
    }
}

#[async_trait]
impl TranscodingEngine for FfmpegEngine {
    async fn write_input(&self, name: String, bytes: Bytes) -> Result<(), EngineError> {
        let path = self.resolve(&name)?;
        tokio::fs::write(&path, &bytes).await?;
        Ok(())
    }

    async fn execute(
        &self,
        args: Vec<String>,
        progress: ProgressSender,
        cancel: CancellationToken,
    ) -> Result<(), EngineError> {
        tracing::debug!(bin = %self.bin, ?args, "invoking engine");

        let mut child = TokioCommand::new(&self.bin)
            .current_dir(self.workspace.path())
            .arg("-hide_banner")
            .arg("-nostdin")
            .arg("-y")
            .arg("-progress")
            .arg("pipe:1")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            EngineError::Io(io::Error::new(io::ErrorKind::Other, "stdout not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            EngineError::Io(io::Error::new(io::ErrorKind::Other, "stderr not captured"))
        })?;

        // The stderr banner carries the input duration; progress lines on
        // stdout carry the transcoded position. Both must be drained so the
        // child never blocks on a full pipe.
        let duration_us = Arc::new(AtomicU64::new(0));
        let stderr_task = tokio::spawn(collect_stderr(stderr, duration_us.clone()));
        let stdout_task = tokio::spawn(forward_progress(stdout, duration_us, progress.clone()));

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = cancel.cancelled() => {
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                tracing::info!("engine invocation cancelled");
                return Err(EngineError::Cancelled);
            }
        };

        let _ = stdout_task.await;
        let tail = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(EngineError::Failed {
                diagnostic: tail.join("\n"),
            });
        }

        let _ = progress.send(1.0);
        Ok(())
    }

    async fn read_output(&self, name: String) -> Result<Bytes, EngineError> {
        let path = self.resolve(&name)?;
        let bytes = tokio::fs::read(&path).await?;
        Ok(Bytes::from(bytes))
    }
}

async fn collect_stderr<R: AsyncRead + Unpin>(
    stderr: R,
    duration_us: Arc<AtomicU64>,
) -> Vec<String> {
    let mut tail = Vec::new();
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(caps) = DURATION_RE.captures(&line) {
            let h: u64 = caps[1].parse().unwrap_or(0);
            let m: u64 = caps[2].parse().unwrap_or(0);
            let s: u64 = caps[3].parse().unwrap_or(0);
            let cs: u64 = caps[4].parse().unwrap_or(0);
            let us = ((h * 3600 + m * 60 + s) * 100 + cs) * 10_000;
            duration_us.store(us, Ordering::Relaxed);
        }
        tail.push(line);
        if tail.len() > STDERR_TAIL {
            tail.remove(0);
        }
    }
    tail
}

async fn forward_progress<R: AsyncRead + Unpin>(
    stdout: R,
    duration_us: Arc<AtomicU64>,
    progress: ProgressSender,
) {
    let mut lines = BufReader::new(stdout).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let out_us = if let Some(v) = line.strip_prefix("out_time_us=") {
            v.trim().parse::<u64>().ok()
        } else if let Some(v) = line.strip_prefix("out_time_ms=") {
            // Despite the name, ffmpeg reports microseconds here too.
            v.trim().parse::<u64>().ok()
        } else {
            None
        };

        if let Some(out_us) = out_us {
            let total = duration_us.load(Ordering::Relaxed);
            if total > 0 {
                let fraction = (out_us as f32 / total as f32).clamp(0.0, 1.0);
                let _ = progress.send(fraction);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> FfmpegEngine {
        FfmpegEngine::new("ffmpeg").unwrap()
    }

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let engine = engine();
        engine
            .write_input("input.mp4".to_string(), Bytes::from_static(b"abc"))
            .await
            .unwrap();
        let out = engine.read_output("input.mp4".to_string()).await.unwrap();
        assert_eq!(out, Bytes::from_static(b"abc"));
    }

    #[tokio::test]
    async fn rejects_path_like_logical_names() {
        let engine = engine();
        for name in ["../escape.mp3", "a/b.mp3", "a\\b.mp3", ""] {
            let result = engine
                .write_input(name.to_string(), Bytes::from_static(b"x"))
                .await;
            assert!(result.is_err(), "name {:?} should be rejected", name);
        }
    }

    #[test]
    fn shared_instance_is_initialized_once() {
        let first = FfmpegEngine::shared("ffmpeg").unwrap();
        // The binary argument only matters for the initializing call.
        let second = FfmpegEngine::shared("/nonexistent/other-ffmpeg").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.bin, "ffmpeg");
    }

    #[test]
    fn parses_duration_banner() {
        let caps = DURATION_RE
            .captures("  Duration: 00:01:23.45, start: 0.0, bitrate: 128 kb/s")
            .unwrap();
        assert_eq!(&caps[1], "00");
        assert_eq!(&caps[2], "01");
        assert_eq!(&caps[3], "23");
        assert_eq!(&caps[4], "45");
    }

    #[cfg(unix)]
    mod fake_engine {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Stand in a shell script for the ffmpeg binary so invocation,
        /// progress forwarding and failure reporting can be exercised
        /// without a real transcode.
        fn script_engine(body: &str) -> (TempDir, FfmpegEngine) {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("fake-ffmpeg");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            let engine = FfmpegEngine::new(path.to_str().unwrap()).unwrap();
            (dir, engine)
        }

        #[tokio::test]
        async fn successful_run_reports_progress_up_to_one() {
            let (_dir, engine) = script_engine(
                "echo 'Duration: 00:00:10.00, start: 0' >&2\n\
                 sleep 1\n\
                 echo 'out_time_us=5000000'\n\
                 exit 0",
            );
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            engine
                .execute(vec!["-i".into(), "input.mp4".into()], tx, CancellationToken::new())
                .await
                .unwrap();

            let mut events = Vec::new();
            while let Ok(v) = rx.try_recv() {
                events.push(v);
            }
            assert!(events.iter().any(|v| (*v - 0.5).abs() < 0.01));
            assert_eq!(events.last().copied(), Some(1.0));
            assert!(events.iter().all(|v| (0.0..=1.0).contains(v)));
        }

        #[tokio::test]
        async fn abnormal_exit_carries_diagnostic_payload() {
            let (_dir, engine) = script_engine("echo 'boom: no such stream' >&2\nexit 1");
            let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
            let err = engine
                .execute(vec![], tx, CancellationToken::new())
                .await
                .unwrap_err();
            match err {
                EngineError::Failed { diagnostic } => {
                    assert!(diagnostic.contains("boom: no such stream"))
                }
                other => panic!("expected Failed, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn cancellation_kills_the_child() {
            let (_dir, engine) = script_engine("sleep 30");
            let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
            let cancel = CancellationToken::new();
            let cancel2 = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                cancel2.cancel();
            });
            let err = engine.execute(vec![], tx, cancel).await.unwrap_err();
            assert!(matches!(err, EngineError::Cancelled));
        }
    }
}
