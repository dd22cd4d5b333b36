//! Rate-limited progress reporter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::types::{ProgressEvent, ProgressPhase};

/// Default minimum interval between forwarded updates.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(800);

/// A consumer of status text.
///
/// Each call replaces the previously displayed text; the operation is
/// idempotent and no history is retained.
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Replaces the displayed status text.
    async fn replace_text(&self, text: &str) -> anyhow::Result<()>;
}

struct ReporterState {
    last_forward: Option<Instant>,
    last_phase: Option<ProgressPhase>,
}

/// Bridges a high-frequency event producer to a rate-limited status sink.
///
/// One reporter instance belongs to exactly one pipeline; the inner lock
/// serializes forwards so renders never interleave. Cloning is cheap and
/// shares the same rate-limit state.
#[derive(Clone)]
pub struct ProgressReporter {
    inner: Arc<ReporterInner>,
}

struct ReporterInner {
    sink: Arc<dyn StatusSink>,
    min_interval: Duration,
    state: Mutex<ReporterState>,
}

impl ProgressReporter {
    /// Creates a reporter with the default 800 ms interval.
    pub fn new(sink: Arc<dyn StatusSink>) -> Self {
        Self::with_interval(sink, DEFAULT_MIN_INTERVAL)
    }

    /// Creates a reporter with a custom minimum inter-update interval.
    pub fn with_interval(sink: Arc<dyn StatusSink>, min_interval: Duration) -> Self {
        Self {
            inner: Arc::new(ReporterInner {
                sink,
                min_interval,
                state: Mutex::new(ReporterState {
                    last_forward: None,
                    last_phase: None,
                }),
            }),
        }
    }

    /// Reports an event, forwarding or dropping it.
    ///
    /// An event is always forwarded when it is the first of its phase or when
    /// the phase is terminal; otherwise it is forwarded only if the minimum
    /// interval has elapsed since the last successful forward. Sink failures
    /// are swallowed: a broken status message must never abort the transfer.
    pub async fn report(&self, event: ProgressEvent) {
        let mut state = self.inner.state.lock().await;

        let phase_changed = state.last_phase != Some(event.phase);
        let due = match state.last_forward {
            Some(at) => at.elapsed() >= self.inner.min_interval,
            None => true,
        };

        if !phase_changed && !event.phase.is_terminal() && !due {
            return;
        }

        state.last_phase = Some(event.phase);
        let text = render(&event);

        // The state lock is held across the sink call so forwarded updates
        // are strictly ordered and never interleave.
        match self.inner.sink.replace_text(&text).await {
            Ok(()) => state.last_forward = Some(Instant::now()),
            Err(e) => {
                debug!("Dropping failed status update: {}", e);
            }
        }
    }

    /// Replaces the status text directly, bypassing rate limiting.
    ///
    /// Used for one-off messages outside the event stream (e.g. announcing
    /// the switch to a remote upload). Failures are swallowed like any other
    /// update.
    pub async fn set_text(&self, text: &str) {
        let mut state = self.inner.state.lock().await;
        match self.inner.sink.replace_text(text).await {
            Ok(()) => state.last_forward = Some(Instant::now()),
            Err(e) => warn!("Failed to set status text: {}", e),
        }
    }
}

/// Renders an event into user-facing status text.
fn render(event: &ProgressEvent) -> String {
    match event.phase {
        ProgressPhase::Downloading => {
            let percent = event.percent().unwrap_or(0.0);
            let eta = event
                .eta_secs
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                "Downloading: {:.1}% ({} / {})\nSpeed: {}/s\nETA: {}s",
                percent,
                human_size(event.transferred),
                human_size_opt(event.total),
                human_size_opt(event.rate),
                eta,
            )
        }
        ProgressPhase::Uploading => format!(
            "Uploading: {} / {}",
            human_size(event.transferred),
            human_size_opt(event.total),
        ),
        ProgressPhase::Finished => "Download finished. Processing...".to_string(),
        ProgressPhase::Error => "Download error.".to_string(),
    }
}

/// Formats a byte count using 1024-based units with one decimal.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", value, UNITS[unit])
}

/// Formats an optional byte count, `"unknown"` when absent.
pub fn human_size_opt(bytes: Option<u64>) -> String {
    match bytes {
        Some(n) => human_size(n),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct RecordingSink {
        texts: RwLock<Vec<String>>,
        fail: AtomicUsize,
    }

    #[async_trait]
    impl StatusSink for RecordingSink {
        async fn replace_text(&self, text: &str) -> anyhow::Result<()> {
            if self.fail.load(Ordering::Relaxed) > 0 {
                self.fail.fetch_sub(1, Ordering::Relaxed);
                anyhow::bail!("simulated edit failure");
            }
            self.texts.write().await.push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512.0B");
        assert_eq!(human_size(1024), "1.0KB");
        assert_eq!(human_size(1536), "1.5KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0MB");
        assert_eq!(human_size_opt(None), "unknown");
    }

    #[test]
    fn test_render_downloading() {
        let text = render(&ProgressEvent::downloading(
            512 * 1024,
            Some(1024 * 1024),
            Some(256 * 1024),
            Some(2),
        ));
        assert!(text.contains("50.0%"));
        assert!(text.contains("512.0KB / 1.0MB"));
        assert!(text.contains("256.0KB/s"));
        assert!(text.contains("ETA: 2s"));
    }

    #[test]
    fn test_render_downloading_unknowns() {
        let text = render(&ProgressEvent::downloading(100, None, None, None));
        assert!(text.contains("0.0%"));
        assert!(text.contains("unknown"));
        assert!(text.contains("ETA: -s"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_event_always_forwards() {
        let sink = Arc::new(RecordingSink::default());
        let reporter = ProgressReporter::new(sink.clone());

        reporter
            .report(ProgressEvent::downloading(1, Some(100), None, None))
            .await;
        assert_eq!(sink.texts.read().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_events_are_dropped() {
        let sink = Arc::new(RecordingSink::default());
        let reporter = ProgressReporter::new(sink.clone());

        // 50 events well above 10/s: only the first in the window passes.
        for i in 0..50u64 {
            reporter
                .report(ProgressEvent::downloading(i, Some(100), None, None))
                .await;
            tokio::time::advance(Duration::from_millis(10)).await;
        }
        assert_eq!(sink.texts.read().await.len(), 1);

        // After the interval elapses the next event passes again.
        tokio::time::advance(Duration::from_millis(800)).await;
        reporter
            .report(ProgressEvent::downloading(99, Some(100), None, None))
            .await;
        assert_eq!(sink.texts.read().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_event_always_forwards() {
        let sink = Arc::new(RecordingSink::default());
        let reporter = ProgressReporter::new(sink.clone());

        reporter
            .report(ProgressEvent::downloading(1, Some(100), None, None))
            .await;
        // Immediately after, without waiting for the interval.
        reporter.report(ProgressEvent::finished()).await;

        let texts = sink.texts.read().await;
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[1], "Download finished. Processing...");
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_transition_forwards() {
        let sink = Arc::new(RecordingSink::default());
        let reporter = ProgressReporter::new(sink.clone());

        reporter
            .report(ProgressEvent::downloading(1, Some(100), None, None))
            .await;
        // First event of the uploading phase passes without waiting.
        reporter.report(ProgressEvent::uploading(1, Some(100))).await;
        assert_eq!(sink.texts.read().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sink_failure_is_swallowed() {
        let sink = Arc::new(RecordingSink::default());
        sink.fail.store(1, Ordering::Relaxed);
        let reporter = ProgressReporter::new(sink.clone());

        reporter
            .report(ProgressEvent::downloading(1, Some(100), None, None))
            .await;
        // Failed forward does not count as a successful one, so the next
        // event goes straight through.
        reporter
            .report(ProgressEvent::downloading(2, Some(100), None, None))
            .await;
        assert_eq!(sink.texts.read().await.len(), 1);
    }
}
