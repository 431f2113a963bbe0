//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinners for the stages of a merge run
#[derive(Debug)]
pub struct ProgressReporter {
    pub load_pb: Option<ProgressBar>,
    pub match_pb: Option<ProgressBar>,
    pub write_pb: Option<ProgressBar>,
    show_progress: bool,
    start_time: std::time::Instant,
}

impl ProgressReporter {
    /// Create progress reporter for a merge; the load spinner starts at once
    pub fn new_for_merge() -> Self {
        Self {
            load_pb: Some(create_spinner("Loading flow lists...")),
            match_pb: None,
            write_pb: None,
            show_progress: true,
            start_time: std::time::Instant::now(),
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            load_pb: None,
            match_pb: None,
            write_pb: None,
            show_progress: false,
            start_time: std::time::Instant::now(),
        }
    }

    /// Finish loading and start the matching spinner
    pub fn finish_load(&mut self, message: &str) {
        if let Some(pb) = self.load_pb.take() {
            pb.finish_with_message(message.to_string());
        }
        if self.show_progress && self.match_pb.is_none() {
            self.match_pb = Some(create_spinner("Matching flows..."));
        }
    }

    /// Finish matching and start the writing spinner
    pub fn finish_match(&mut self, message: &str) {
        if let Some(pb) = self.match_pb.take() {
            pb.finish_with_message(message.to_string());
        }
        if self.show_progress && self.write_pb.is_none() {
            self.write_pb = Some(create_spinner("Writing mapping..."));
        }
    }

    /// Run `f` with the matching spinner hidden so its output stays readable
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        match &self.match_pb {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }

    pub fn finish_write(&mut self, message: &str) {
        if let Some(pb) = self.write_pb.take() {
            pb.finish_with_message(format!("{} ({:.2?})", message, self.start_time.elapsed()));
        }
    }

    /// Clear every spinner still running, e.g. before printing to stdout
    pub fn clear(&mut self) {
        for pb in [self.load_pb.take(), self.match_pb.take(), self.write_pb.take()]
            .into_iter()
            .flatten()
        {
            pb.finish_and_clear();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
