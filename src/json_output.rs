//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso programmatico.
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout
//! - Fornisce interfaccia standardizzata per comunicazione inter-processo
//!
//! ## Tipi di messaggi:
//! - `batch_start`: Inizio conversione batch
//! - `file_complete`: Fine conversione di un file (success / failed / skipped)
//! - `batch_complete`: Fine batch con statistiche finali
//! - `error`: Errore generale (es. directory mancante)

use crate::progress::BatchStats;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-file result as reported in JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Failed,
    Skipped,
}

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del batch
    #[serde(rename = "batch_start")]
    BatchStart {
        input_dir: PathBuf,
        output_dir: PathBuf,
        target_format: String,
        recursive: bool,
        total_files: usize,
    },

    /// Fine conversione di un file
    #[serde(rename = "file_complete")]
    FileComplete {
        input: PathBuf,
        output: PathBuf,
        status: FileStatus,
        reason: Option<String>,
    },

    /// Batch completato
    #[serde(rename = "batch_complete")]
    BatchComplete {
        success: usize,
        failed: usize,
        skipped: usize,
        total_original_size: u64,
        total_converted_size: u64,
        duration_seconds: f64,
    },

    /// Errore generale
    #[serde(rename = "error")]
    Error { message: String },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn batch_complete(stats: &BatchStats, duration_seconds: f64) -> Self {
        Self::BatchComplete {
            success: stats.success,
            failed: stats.failed,
            skipped: stats.skipped,
            total_original_size: stats.total_original_size,
            total_converted_size: stats.total_converted_size,
            duration_seconds,
        }
    }
}
