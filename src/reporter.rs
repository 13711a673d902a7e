//! # Reporter Module
//!
//! Handle esplicito per gli eventi visibili all'utente, passato alla pipeline e
//! all'orchestratore batch. Vive per una singola invocazione del processo.
//!
//! ## Modalità:
//! - `Human`: Log `tracing` e progress bar in modalità batch
//! - `Json`: Un oggetto JSON per riga su stdout (vedi `json_output`)
//! - `Silent`: Nessun output (test e uso come libreria)

use crate::error::ConvertError;
use crate::image_processor::ConversionOutcome;
use crate::json_output::{FileStatus, JsonMessage};
use crate::progress::{BatchStats, ProgressManager};
use std::path::Path;
use tracing::{error, info, warn};

/// Where user-facing events go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Silent,
}

/// Reporter for conversion events
#[derive(Debug, Clone)]
pub struct Reporter {
    mode: OutputMode,
}

impl Reporter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn silent() -> Self {
        Self::new(OutputMode::Silent)
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Progress bar for a batch of `total` files, only in human mode
    pub fn progress(&self, total: usize) -> Option<ProgressManager> {
        match self.mode {
            OutputMode::Human => Some(ProgressManager::new(total as u64)),
            _ => None,
        }
    }

    /// One file went through the pipeline (or was skipped before it)
    pub fn conversion_finished(&self, input: &Path, output: &Path, outcome: &ConversionOutcome) {
        match self.mode {
            OutputMode::Silent => {}
            OutputMode::Human => match outcome {
                ConversionOutcome::Success => {
                    info!("Converted: {} -> {}", input.display(), output.display())
                }
                ConversionOutcome::Failure(e) => {
                    error!("Conversion failed {}: {}", input.display(), e)
                }
                ConversionOutcome::Skipped(reason) => {
                    info!("Skipped {}: {}", input.display(), reason)
                }
            },
            OutputMode::Json => {
                let status = match outcome {
                    ConversionOutcome::Success => FileStatus::Success,
                    ConversionOutcome::Failure(_) => FileStatus::Failed,
                    ConversionOutcome::Skipped(_) => FileStatus::Skipped,
                };
                JsonMessage::FileComplete {
                    input: input.to_path_buf(),
                    output: output.to_path_buf(),
                    status,
                    reason: outcome.reason(),
                }
                .emit();
            }
        }
    }

    pub fn batch_started(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        target_format: &str,
        recursive: bool,
        total_files: usize,
    ) {
        match self.mode {
            OutputMode::Silent => {}
            OutputMode::Human => info!(
                "Converting {} files from {} to {} (format: {}, recursive: {})",
                total_files,
                input_dir.display(),
                output_dir.display(),
                target_format.to_uppercase(),
                recursive
            ),
            OutputMode::Json => JsonMessage::BatchStart {
                input_dir: input_dir.to_path_buf(),
                output_dir: output_dir.to_path_buf(),
                target_format: target_format.to_string(),
                recursive,
                total_files,
            }
            .emit(),
        }
    }

    pub fn batch_finished(&self, stats: &BatchStats, duration_seconds: f64) {
        match self.mode {
            OutputMode::Silent => {}
            OutputMode::Human => info!(
                "Batch conversion finished in {:.1}s - {}",
                duration_seconds,
                stats.format_summary()
            ),
            OutputMode::Json => JsonMessage::batch_complete(stats, duration_seconds).emit(),
        }
    }

    /// A run-level problem that does not abort the process
    pub fn error(&self, err: &ConvertError) {
        match self.mode {
            OutputMode::Silent => {}
            OutputMode::Human => error!("{}", err),
            OutputMode::Json => JsonMessage::Error { message: err.to_string() }.emit(),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.mode != OutputMode::Silent {
            warn!("{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_only_in_human_mode() {
        assert!(Reporter::silent().progress(3).is_none());
        assert!(Reporter::new(OutputMode::Json).progress(3).is_none());
        assert_eq!(Reporter::new(OutputMode::Json).mode(), OutputMode::Json);
    }
}
