//! Periodic progress reports for a running collapse.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wfc_core::{runner::ProgressCallback, ProgressInfo, RunReport, WfcError};

/// Trait for reporting the progress of the collapse driver.
pub trait ProgressReporter: Send {
    /// Called after every collapse with updated progress information.
    fn report(&mut self, info: &ProgressInfo) -> Result<()>;

    /// Called when an attempt completes successfully.
    fn finish(&mut self, report: &RunReport) -> Result<()>;

    /// Called when an attempt fails.
    fn fail(&mut self, error: &WfcError) -> Result<()>;
}

/// A `ProgressReporter` that logs status lines, at most once per interval.
pub struct ConsoleProgressReporter {
    last_report_time: Option<Instant>,
    report_interval: Duration,
    reports_emitted: usize,
}

impl ConsoleProgressReporter {
    /// Creates a reporter emitting at most one line per `report_interval`.
    pub fn new(report_interval: Duration) -> Self {
        Self {
            last_report_time: None,
            report_interval,
            reports_emitted: 0,
        }
    }

    /// Number of progress lines written so far.
    pub fn reports_emitted(&self) -> usize {
        self.reports_emitted
    }

    fn format_duration(duration: Duration) -> String {
        format!("{}.{:03}s", duration.as_secs(), duration.subsec_millis())
    }

    fn status_line(info: &ProgressInfo) -> String {
        let percentage = if info.total_cells > 0 {
            (info.placed_cells as f32 / info.total_cells as f32) * 100.0
        } else {
            100.0
        };
        let elapsed_secs = info.elapsed_time.as_secs_f64();
        let rate = if elapsed_secs > 0.0 {
            info.placed_cells as f64 / elapsed_secs
        } else {
            0.0
        };

        format!(
            "Progress: Iter {} | Placed {}/{} ({:.1}%) | Collapsed {} | Last {} at {} | Elapsed: {} | Rate: {:.1} cells/s",
            info.iterations,
            info.placed_cells,
            info.total_cells,
            percentage,
            info.collapsed_cells,
            info.last_resolved.tile,
            info.last_resolved.position,
            Self::format_duration(info.elapsed_time),
            rate
        )
    }

    fn due(&self, now: Instant) -> bool {
        self.last_report_time
            .map_or(true, |last| now.duration_since(last) >= self.report_interval)
    }
}

/// Wraps a shared reporter into a callback for [`wfc_core::WfcConfig`].
///
/// The caller keeps its handle to call [`ProgressReporter::finish`] or
/// [`ProgressReporter::fail`] once the run returns.
pub fn progress_callback<R>(reporter: Arc<Mutex<R>>) -> ProgressCallback
where
    R: ProgressReporter + 'static,
{
    Box::new(move |info: &ProgressInfo| -> Result<(), WfcError> {
        let mut guard = reporter
            .lock()
            .map_err(|_| WfcError::InternalError("Progress reporter mutex poisoned".into()))?;
        guard
            .report(info)
            .map_err(|e| WfcError::InternalError(format!("Progress reporting failed: {e}")))
    })
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report(&mut self, info: &ProgressInfo) -> Result<()> {
        let now = Instant::now();
        if !self.due(now) {
            return Ok(());
        }

        log::info!("{}", Self::status_line(info));
        self.last_report_time = Some(now);
        self.reports_emitted += 1;
        Ok(())
    }

    fn finish(&mut self, report: &RunReport) -> Result<()> {
        log::info!(
            "Collapse finished: {} tiles placed in {} (seed {})",
            report.tiles.len(),
            Self::format_duration(report.elapsed),
            report.seed
        );
        Ok(())
    }

    fn fail(&mut self, error: &WfcError) -> Result<()> {
        log::warn!("Collapse attempt failed: {}", error);
        Ok(())
    }
}
