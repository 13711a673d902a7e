//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress bar e le statistiche di conversione batch.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Progress bar `indicatif` per feedback real-time
//! - `BatchStats`: Accumulatore dei risultati di un singolo batch
//!
//! ## Statistiche tracciate:
//! - **success**: File convertiti
//! - **failed**: File con errore di conversione
//! - **skipped**: File saltati (output già esistente nello stesso formato)
//! - **total_original_size** / **total_converted_size**: Byte dei file convertiti
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========================>---------------] 12/20 (60%) [OK] photo.png
//! ```

use crate::file_manager::FileManager;
use crate::image_processor::ConversionOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Manages progress reporting for batch conversion
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Outcome counts for one batch run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_original_size: u64,
    pub total_converted_size: u64,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally one outcome
    pub fn record(&mut self, outcome: &ConversionOutcome) {
        match outcome {
            ConversionOutcome::Success => self.success += 1,
            ConversionOutcome::Failure(_) => self.failed += 1,
            ConversionOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    /// Add the sizes of a successful conversion
    pub fn add_sizes(&mut self, original_size: u64, converted_size: u64) {
        self.total_original_size += original_size;
        self.total_converted_size += converted_size;
    }

    pub fn total(&self) -> usize {
        self.success + self.failed + self.skipped
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Success: {} | Failed: {} | Skipped: {} | Size: {} -> {} ({:.1}%)",
            self.success,
            self.failed,
            self.skipped,
            FileManager::format_size(self.total_original_size),
            FileManager::format_size(self.total_converted_size),
            FileManager::calculate_reduction(self.total_original_size, self.total_converted_size)
        )
    }
}
