//! # Image Format Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `format`: Registro dei formati supportati e mapping estensione → formato
//! - `config`: Configurazione, qualità e opzioni di conversione
//! - `error`: Tipi di errore della pipeline
//! - `resize`: Parsing `WxH` e ridimensionamento (fill o stretch)
//! - `encoder`: Parametri per formato e codifica in memoria
//! - `image_processor`: Pipeline di conversione di un singolo file
//! - `file_manager`: Discovery delle immagini e scrittura atomica
//! - `batch`: Conversione parallela di una directory
//! - `progress`: Progress bar e statistiche batch
//! - `reporter` / `json_output`: Eventi per l'utente (testo o JSON)
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use image_format_converter::{ConversionOptions, ImageConverter, Reporter};
//!
//! let converter = ImageConverter::new(Reporter::silent());
//! let outcome = converter.convert(&input, &output, &ConversionOptions::default());
//! ```

pub mod batch;
pub mod config;
pub mod encoder;
pub mod error;
pub mod file_manager;
pub mod format;
pub mod image_processor;
pub mod json_output;
pub mod progress;
pub mod reporter;
pub mod resize;

pub use batch::BatchConverter;
pub use config::{Config, ConversionOptions, Quality};
pub use error::ConvertError;
pub use format::{FormatId, FormatRegistry};
pub use image_processor::{ConversionOutcome, ImageConverter};
pub use progress::BatchStats;
pub use reporter::{OutputMode, Reporter};
pub use resize::ResizeSpec;
