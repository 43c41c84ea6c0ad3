//! Progress output for verbose uploads

use indicatif::{ProgressBar, ProgressStyle};
use vblob_core::{AttemptOutcome, ProgressEvent, ProgressListener};

/// Renders upload progress events as a byte progress bar on stderr
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(total_bytes: u64) -> Self {
        let bar = ProgressBar::new(total_bytes);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressListener for BarProgress {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Attempt { outcome, .. } => {
                if matches!(outcome, AttemptOutcome::Transient(_)) {
                    self.bar.println(format!("retrying: {event}"));
                }
            }
            ProgressEvent::BytesSent { bytes, .. } => self.bar.set_position(*bytes),
            ProgressEvent::SessionStarted { parts, .. } => {
                self.bar.set_message(format!("0/{parts} parts"));
            }
            ProgressEvent::PartCompleted {
                size,
                completed,
                total,
                ..
            } => {
                self.bar.inc(*size);
                self.bar.set_message(format!("{completed}/{total} parts"));
            }
            ProgressEvent::Committing { .. } => self.bar.set_message("committing"),
            ProgressEvent::Aborted { .. } => self.bar.abandon_with_message("aborted"),
        }
    }
}

/// Prints one line per event on stderr, for when no terminal is attached
pub struct EventLines;

impl ProgressListener for EventLines {
    fn on_event(&self, event: &ProgressEvent) {
        eprintln!("{event}");
    }
}
