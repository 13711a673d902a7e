//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Discovery dei file immagine in una directory (ricorsiva o solo primo livello)
//! - Scrittura atomica dei file convertiti (temp file + rename)
//! - Utilità per dimensioni file e percentuali di riduzione
//! - Formattazione human-readable delle dimensioni
//!
//! ## Operazioni sui file:
//! - `find_image_files()`: Trova i file con estensione supportata, ordinati per path
//! - `write_atomic()`: Nessun output troncato in caso di errore
//! - `file_size()`: Dimensione in byte
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::find_image_files(Path::new("/photos"), true);
//! for file in files {
//!     // convert image
//! }
//! ```

use crate::format::FormatRegistry;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find all supported image files under a directory.
    ///
    /// With `recursive == false` only direct children are returned. Unreadable
    /// entries are logged and skipped.
    pub fn find_image_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| FormatRegistry::is_supported(path))
            .collect()
    }

    /// Write bytes so that `path` either keeps its old content or gets the new one in full
    pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Size of a file in bytes
    pub fn file_size(path: &Path) -> std::io::Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
