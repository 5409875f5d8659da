use std::time::Duration;

use coursepack_engine::PreloadEvent;
use indicatif::{ProgressBar, ProgressStyle};

use crate::utils::format_bytes;

fn preload_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg}\n[{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} files")
        .unwrap()
        .progress_chars("=> ")
}

/// Terminal progress bar fed from preload events. The batch runs one
/// file at a time, so a single bar over the file count is enough.
#[derive(Clone)]
pub struct PreloadProgress {
    bar: ProgressBar,
}

impl PreloadProgress {
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);
        bar.set_style(preload_style());
        bar.enable_steady_tick(Duration::from_millis(500));
        Self { bar }
    }

    pub fn handle_event(&self, event: &PreloadEvent) {
        match event {
            PreloadEvent::FileStarted { id, .. } => {
                self.bar.set_message(format!("Downloading {id}"));
            }
            PreloadEvent::FileFailed { id, error } => {
                self.bar.set_message(format!("Failed {id}: {error}"));
            }
            PreloadEvent::BatchProgress {
                attempted,
                bytes_transferred,
                ..
            } => {
                self.bar.set_position(*attempted as u64);
                self.bar
                    .set_message(format!("{} downloaded", format_bytes(*bytes_transferred)));
            }
            PreloadEvent::FileCompleted { .. } => {}
        }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Preload finished");
    }
}
