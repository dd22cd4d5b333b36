//! yt-dlp subprocess extractor.
//!
//! Drives the `yt-dlp` binary: `-J` for probing and a progress-template
//! download for acquisition. The dynamic JSON it prints is mapped into
//! [`FormatDescriptor`]s right here so nothing downstream ever sees a raw
//! extractor dictionary.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::progress::ProgressEvent;

use super::error::{AcquisitionError, ProbeError};
use super::traits::MediaExtractor;
use super::types::{AcquisitionRequest, FormatDescriptor, FormatSelection, ProbeInfo};

/// Output filename template; the title is capped so the path stays sane.
const OUTPUT_TEMPLATE: &str = "%(title).200s.%(ext)s";

/// Machine-readable progress line emitted once per sample.
const PROGRESS_TEMPLATE: &str = "download:%(progress.downloaded_bytes)s|\
%(progress.total_bytes)s|%(progress.total_bytes_estimate)s|\
%(progress.speed)s|%(progress.eta)s";

/// How many trailing stderr lines are kept for error messages.
const STDERR_TAIL_LINES: usize = 12;

/// Extractor backed by the `yt-dlp` command-line tool.
pub struct YtDlpExtractor {
    binary: PathBuf,
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlpExtractor {
    /// Creates an extractor using the given binary name or path.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// Raw probe response, straight from `yt-dlp -J`.
#[derive(Debug, Deserialize)]
struct RawProbe {
    title: Option<String>,
    thumbnail: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

/// Raw format entry. Numeric fields are floats because the extractor is
/// inconsistent about integer vs. float encoding.
#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: Option<String>,
    height: Option<f64>,
    fps: Option<f64>,
    ext: Option<String>,
    tbr: Option<f64>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
}

impl RawFormat {
    /// Maps the raw entry into the typed descriptor.
    ///
    /// Entries without an identifier are unusable and filtered out here, at
    /// the boundary.
    fn into_descriptor(self) -> Option<FormatDescriptor> {
        let id = self.format_id?;
        Some(FormatDescriptor {
            id,
            height: self.height.map(|h| h as u32),
            fps: self.fps,
            ext: self.ext,
            bitrate_kbps: self.tbr,
            size_bytes: self.filesize.or(self.filesize_approx).map(|s| s as u64),
        })
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn probe(&self, url: &str) -> Result<ProbeInfo, ProbeError> {
        debug!("Probing {}", url);
        let output = Command::new(&self.binary)
            .args(["-J", "--no-warnings", "--no-playlist"])
            .arg(url)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(ProbeError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::failed(tail(&stderr, STDERR_TAIL_LINES)));
        }

        let raw: RawProbe = serde_json::from_slice(&output.stdout)
            .map_err(|e| ProbeError::parse(e.to_string()))?;

        if raw.title.is_none() && raw.formats.is_empty() {
            return Err(ProbeError::NoFormats);
        }

        Ok(ProbeInfo {
            title: raw.title.unwrap_or_else(|| "video".to_string()),
            thumbnail: raw.thumbnail,
            formats: raw
                .formats
                .into_iter()
                .filter_map(RawFormat::into_descriptor)
                .collect(),
        })
    }

    async fn acquire(
        &self,
        request: AcquisitionRequest,
        progress_tx: mpsc::Sender<ProgressEvent>,
    ) -> Result<(), AcquisitionError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["--newline", "--no-warnings", "--no-playlist"])
            .args(["--progress-template", PROGRESS_TEMPLATE])
            .arg("-o")
            .arg(request.work_dir.join(OUTPUT_TEMPLATE));

        match &request.selection {
            FormatSelection::Format(id) => {
                cmd.args(["-f", id]);
            }
            FormatSelection::AudioTranscode => {
                cmd.args(["-f", "bestaudio/best"])
                    .args(["-x", "--audio-format", "mp3", "--audio-quality", "192K"]);
            }
        }

        cmd.arg(&request.source_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            "Acquiring {} into {:?}",
            request.source_url, request.work_dir
        );
        let mut child = cmd.spawn().map_err(AcquisitionError::Spawn)?;
        let stdout = child.stdout.take().expect("stdout is piped");
        let stderr = child.stderr.take().expect("stderr is piped");

        let forward_progress = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(event) = parse_progress_line(&line) {
                    // A full channel means the consumer is behind; the
                    // sample is superseded anyway, so drop it.
                    let _ = progress_tx.try_send(event);
                }
            }
        };

        let collect_stderr = async {
            let mut kept = Vec::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if kept.len() >= STDERR_TAIL_LINES {
                    kept.remove(0);
                }
                kept.push(line);
            }
            kept.join("\n")
        };

        let ((), stderr_tail, status) =
            tokio::join!(forward_progress, collect_stderr, child.wait());

        let status = status.map_err(|e| AcquisitionError::failed(e.to_string()))?;
        if status.success() {
            let _ = progress_tx.send(ProgressEvent::finished()).await;
            Ok(())
        } else {
            warn!("yt-dlp exited with {}: {}", status, stderr_tail);
            let _ = progress_tx.send(ProgressEvent::error()).await;
            Err(AcquisitionError::failed(if stderr_tail.is_empty() {
                format!("extractor exited with {}", status)
            } else {
                stderr_tail
            }))
        }
    }
}

/// Parses one progress-template line into an event.
fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.strip_prefix("download:")?;
    let mut fields = rest.trim().split('|');
    let transferred = parse_field(fields.next()?).unwrap_or(0);
    let total = parse_field(fields.next()?);
    let total_estimate = parse_field(fields.next()?);
    let rate = parse_field(fields.next()?);
    let eta = parse_field(fields.next()?);
    Some(ProgressEvent::downloading(
        transferred,
        total.or(total_estimate),
        rate,
        eta,
    ))
}

/// Parses a numeric template field; `NA` and empty mean unknown.
fn parse_field(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "NA" {
        return None;
    }
    raw.parse::<f64>().ok().map(|v| v as u64)
}

/// Keeps the last `n` lines of a block of text.
fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
