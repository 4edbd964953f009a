use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::client::StudyPlanService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyTimeEntry {
    pub task_id: String,
    pub seconds: u64,
}

/// Destination for finished timer measurements.
pub trait TimerSink: Send {
    fn flush(&self, entry: StudyTimeEntry);
}

impl TimerSink for UnboundedSender<StudyTimeEntry> {
    fn flush(&self, entry: StudyTimeEntry) {
        if let Err(err) = self.send(entry) {
            tracing::warn!(task_id = %err.0.task_id, "study time uploader gone, entry dropped");
        }
    }
}

pub struct StudyTimer;

impl StudyTimer {
    pub fn start<S: TimerSink>(task_id: impl Into<String>, sink: S) -> TimerGuard<S> {
        let task_id = task_id.into();
        tracing::debug!(task_id = %task_id, "study timer started");
        TimerGuard {
            task_id,
            started_at: Instant::now(),
            sink,
            flushed: false,
        }
    }
}

/// A running timer. Flushes its measurement exactly once, on [`TimerGuard::stop`]
/// or when dropped.
pub struct TimerGuard<S: TimerSink> {
    task_id: String,
    started_at: Instant,
    sink: S,
    flushed: bool,
}

impl<S: TimerSink> TimerGuard<S> {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stop and flush. Returns the entry, or `None` when less than a second
    /// elapsed (nothing worth recording).
    pub fn stop(mut self) -> Option<StudyTimeEntry> {
        self.flush()
    }

    fn flush(&mut self) -> Option<StudyTimeEntry> {
        if self.flushed {
            return None;
        }
        self.flushed = true;

        let seconds = self.elapsed().as_secs();
        if seconds == 0 {
            tracing::debug!(task_id = %self.task_id, "study timer stopped under a second, skipped");
            return None;
        }

        let entry = StudyTimeEntry {
            task_id: self.task_id.clone(),
            seconds,
        };
        self.sink.flush(entry.clone());
        Some(entry)
    }
}

impl<S: TimerSink> Drop for TimerGuard<S> {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Drain timer entries into `record_study_time` until every sender is gone.
pub fn spawn_study_time_uploader<S>(
    service: Arc<S>,
    mut entries: UnboundedReceiver<StudyTimeEntry>,
) -> JoinHandle<()>
where
    S: StudyPlanService + 'static,
{
    tokio::spawn(async move {
        while let Some(entry) = entries.recv().await {
            match service.record_study_time(&entry.task_id, entry.seconds).await {
                Ok(task) => tracing::debug!(
                    task_id = %task.id,
                    total_secs = task.time_spent_secs,
                    "study time uploaded"
                ),
                Err(err) => tracing::warn!(
                    task_id = %entry.task_id,
                    seconds = entry.seconds,
                    error = %err,
                    "study time upload failed"
                ),
            }
        }
        tracing::debug!("study time uploader stopped");
    })
}
