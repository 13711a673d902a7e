//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `Quality`, clampata in [1,100] alla costruzione
//! - Definisce `ConversionOptions`, immutabile e condivisa tra conversioni
//! - Definisce la struct `Config` con i parametri di esecuzione del tool
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `quality`: Qualità JPEG/WEBP (1-100, default: 95)
//! - `optimize`: Flag di ottimizzazione passato all'encoder (default: true)
//! - `maintain_aspect_ratio`: Fill (crop) invece di stretch nel resize (default: true)
//! - `resize`: Dimensioni target opzionali (default: None)
//! - `target_format`: Token formato per la modalità batch (default: "png")
//! - `recursive`: Scansione ricorsiva delle sottodirectory (default: false)
//! - `workers`: Numero di conversioni parallele in batch (default: 4)
//! - `json_output`: Eventi JSON su stdout invece del progress bar (default: false)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     quality: 85,
//!     target_format: "webp".to_string(),
//!     ..Default::default()
//! };
//! config.validate()?;
//! let options = config.conversion_options();
//! ```

use crate::format::FormatRegistry;
use crate::resize::{ResizeMode, ResizeSpec};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lossy encoding quality (1-100). Clamped on construction, never at encode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: i64) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Options applied to every conversion of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionOptions {
    quality: Quality,
    optimize: bool,
    resize: Option<ResizeSpec>,
    maintain_aspect_ratio: bool,
}

impl ConversionOptions {
    pub fn new(quality: i64, optimize: bool) -> Self {
        Self {
            quality: Quality::new(quality),
            optimize,
            ..Self::default()
        }
    }

    pub fn with_resize(self, resize: Option<ResizeSpec>) -> Self {
        Self { resize, ..self }
    }

    pub fn with_maintain_aspect_ratio(self, maintain_aspect_ratio: bool) -> Self {
        Self { maintain_aspect_ratio, ..self }
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn optimize(&self) -> bool {
        self.optimize
    }

    pub fn resize(&self) -> Option<ResizeSpec> {
        self.resize
    }

    pub fn maintain_aspect_ratio(&self) -> bool {
        self.maintain_aspect_ratio
    }

    pub fn resize_mode(&self) -> ResizeMode {
        ResizeMode::from_maintain_aspect(self.maintain_aspect_ratio)
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            optimize: true,
            resize: None,
            maintain_aspect_ratio: true,
        }
    }
}

/// Configuration for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JPEG/WEBP quality (1-100)
    pub quality: u8,
    /// Pass the optimize flag to encoders
    pub optimize: bool,
    /// Crop-and-scale instead of stretching when resizing
    pub maintain_aspect_ratio: bool,
    /// Optional resize target
    pub resize: Option<ResizeSpec>,
    /// Target format token for batch mode
    pub target_format: String,
    /// Descend into subdirectories in batch mode
    pub recursive: bool,
    /// Number of parallel conversions in batch mode
    pub workers: usize,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: 95,
            optimize: true,
            maintain_aspect_ratio: true,
            resize: None,
            target_format: "png".to_string(),
            recursive: false,
            workers: 4,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 1 and 100"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        FormatRegistry::parse_target(&self.target_format)?;

        if let Some(ref resize) = self.resize {
            resize.validate()?;
        }

        Ok(())
    }

    /// Immutable options for the conversion pipeline
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions::new(self.quality as i64, self.optimize)
            .with_resize(self.resize)
            .with_maintain_aspect_ratio(self.maintain_aspect_ratio)
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
