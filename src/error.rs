//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore della pipeline di conversione.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare ogni fallimento per-file
//! - Fornisce messaggi leggibili che diventano la `reason` di un `Failure`
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `InputNotFound`: File di input inesistente
//! - `UnsupportedFormat`: Estensione non presente nel registry
//! - `InvalidResizeSpec`: Dimensioni di resize non positive o malformate
//! - `Decode`: Errore del codec in lettura
//! - `Encode`: Errore del codec o del filesystem in scrittura
//! - `DirectoryMissing`: Directory di input batch inesistente (non fatale)
//! - `Io`: Errori di I/O generici
//!
//! ## Esempio:
//! ```rust,ignore
//! if !input.exists() {
//!     return Err(ConvertError::InputNotFound(input.to_path_buf()));
//! }
//! ```

use std::path::PathBuf;

/// Per-file conversion errors
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("unsupported {0}")]
    UnsupportedFormat(String),

    #[error("invalid resize dimensions: {0}")]
    InvalidResizeSpec(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("input directory does not exist: {}", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
