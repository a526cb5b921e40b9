//! # Progress Tracking Module
//!
//! Progress bar visuale con `indicatif` durante il batch.
//!
//! ## Responsabilità:
//! - Barra di progresso con percentuale completamento e tempo elapsed
//! - Messaggio con l'ultimo file completato
//! - Condivisibile tra i worker (`ProgressBar` è thread-safe e `Clone`)
//!
//! Il risultato di ogni file viene comunque stampato dal logging; la barra è
//! solo feedback visivo e può essere disattivata (`--no-progress`).
//!
//! ```text
//! ⠋ [00:02:15] [========================================] 150/150 (100%) a.png
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a conversion batch
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        // The template is a constant, parsing only fails on a malformed literal
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that draws nothing
    pub fn hidden(total_files: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total_files);
        Self { bar }
    }

    /// Advance by one file with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Hide the bar while `f` writes to the terminal
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Number of files reported so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finish and remove the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
