//! Polling handle for exports running on their own thread.

use crossbeam_channel::Receiver;
use std::thread::JoinHandle;

use crate::error::{ExportError, Result};

/// Observable state of a background export.
///
/// Progress is a single fraction over the whole job: the render accounts
/// for the first tenth, encoding for the rest. A cache-warm export jumps
/// straight toward completion.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportStatus {
    /// Nothing reported yet.
    Pending,
    /// Overall fraction in [0.0, 1.0].
    Running(f32),
    /// Finished; carries the output filename.
    Complete(String),
    /// Failed with an error message.
    Failed(String),
}

/// Handle to an export started by
/// [`Exporter::export_async()`](crate::Exporter::export_async).
///
/// Cheap to poll every UI frame via [`progress()`](Self::progress); once
/// the export finishes, the terminal status sticks. [`wait()`](Self::wait)
/// blocks instead and yields the output filename.
pub struct ExportHandle {
    progress_rx: Receiver<f32>,
    thread: Option<JoinHandle<Result<String>>>,
    fraction: Option<f32>,
    outcome: Option<std::result::Result<String, String>>,
}

impl ExportHandle {
    pub(crate) fn new(progress_rx: Receiver<f32>, thread: JoinHandle<Result<String>>) -> Self {
        Self {
            progress_rx,
            thread: Some(thread),
            fraction: None,
            outcome: None,
        }
    }

    /// Latest status, without blocking.
    ///
    /// Fractions never move backwards: stale messages left in the channel
    /// are folded in with `max`.
    pub fn progress(&mut self) -> ExportStatus {
        while let Ok(f) = self.progress_rx.try_recv() {
            self.fraction = Some(self.fraction.unwrap_or(0.0).max(f));
        }

        if self.outcome.is_none() {
            if let Some(thread) = self.thread.take_if(|t| t.is_finished()) {
                self.outcome = Some(match thread.join() {
                    Ok(Ok(filename)) => Ok(filename),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err("export thread panicked".to_string()),
                });
            }
        }

        match (&self.outcome, self.fraction) {
            (Some(Ok(filename)), _) => ExportStatus::Complete(filename.clone()),
            (Some(Err(e)), _) => ExportStatus::Failed(e.clone()),
            (None, Some(fraction)) => ExportStatus::Running(fraction),
            (None, None) => ExportStatus::Pending,
        }
    }

    /// Block until the export finishes; returns the output filename.
    pub fn wait(mut self) -> Result<String> {
        if let Some(outcome) = self.outcome.take() {
            return outcome.map_err(ExportError::Encoding);
        }
        match self.thread.take() {
            Some(thread) => match thread.join() {
                Ok(result) => result,
                Err(_) => Err(ExportError::Encoding("export thread panicked".into())),
            },
            None => Err(ExportError::Encoding("export already joined".into())),
        }
    }
}
