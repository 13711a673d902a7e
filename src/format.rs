//! # Format Registry Module
//!
//! Questo modulo mappa le estensioni dei file ai formati canonici supportati.
//!
//! ## Responsabilità:
//! - Tabella fissa estensione → formato canonico (case-insensitive)
//! - Lookup stretto per validare i file di input
//! - Helper separato con fallback JPEG per derivare il formato di output
//! - Parsing del token di formato target (`png`, `.JPG`, ...)
//!
//! ## Estensioni supportate:
//! | Estensione | Formato |
//! |------------|---------|
//! | `.jpg` `.jpeg` | JPEG |
//! | `.png` | PNG |
//! | `.bmp` | BMP |
//! | `.tif` `.tiff` | TIFF |
//! | `.gif` | GIF |
//! | `.webp` | WEBP |
//! | `.ico` | ICO |
//!
//! Il registry non ha stato: tutte le funzioni sono pure e sicure da chiamare
//! da più conversioni in parallelo.

use crate::error::ConvertError;
use std::fmt;
use std::path::Path;

/// Canonical image container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    Jpeg,
    Png,
    Bmp,
    Tiff,
    Gif,
    WebP,
    Ico,
}

impl FormatId {
    /// Whether the container can carry an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, FormatId::Jpeg | FormatId::Bmp)
    }

    /// Codec-library format used for decoding and generic encoding.
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            FormatId::Jpeg => image::ImageFormat::Jpeg,
            FormatId::Png => image::ImageFormat::Png,
            FormatId::Bmp => image::ImageFormat::Bmp,
            FormatId::Tiff => image::ImageFormat::Tiff,
            FormatId::Gif => image::ImageFormat::Gif,
            FormatId::WebP => image::ImageFormat::WebP,
            FormatId::Ico => image::ImageFormat::Ico,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FormatId::Jpeg => "JPEG",
            FormatId::Png => "PNG",
            FormatId::Bmp => "BMP",
            FormatId::Tiff => "TIFF",
            FormatId::Gif => "GIF",
            FormatId::WebP => "WEBP",
            FormatId::Ico => "ICO",
        }
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed extension table. Every key maps to exactly one format.
const SUPPORTED_FORMATS: &[(&str, FormatId)] = &[
    ("jpg", FormatId::Jpeg),
    ("jpeg", FormatId::Jpeg),
    ("png", FormatId::Png),
    ("bmp", FormatId::Bmp),
    ("tiff", FormatId::Tiff),
    ("tif", FormatId::Tiff),
    ("gif", FormatId::Gif),
    ("webp", FormatId::WebP),
    ("ico", FormatId::Ico),
];

/// Format used when an output path carries no recognised extension.
pub const DEFAULT_OUTPUT_FORMAT: FormatId = FormatId::Jpeg;

/// Lookup table between extensions and canonical formats
pub struct FormatRegistry;

impl FormatRegistry {
    /// All recognised extensions, lower-case, without the leading dot.
    pub fn extensions() -> impl Iterator<Item = &'static str> {
        SUPPORTED_FORMATS.iter().map(|(ext, _)| *ext)
    }

    /// Lower-cased extension of a path, if any
    pub fn extension_of(path: &Path) -> Option<String> {
        path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
    }

    fn find(ext: &str) -> Option<FormatId> {
        SUPPORTED_FORMATS
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, format)| *format)
    }

    /// True iff the path's extension (case-insensitive) is in the table
    pub fn is_supported(path: &Path) -> bool {
        Self::extension_of(path)
            .and_then(|ext| Self::find(&ext))
            .is_some()
    }

    /// Strict lookup used to validate inputs. Unknown extensions are an error.
    pub fn lookup(path: &Path) -> Result<FormatId, ConvertError> {
        Self::extension_of(path)
            .and_then(|ext| Self::find(&ext))
            .ok_or_else(|| {
                ConvertError::UnsupportedFormat(format!("input format: {}", path.display()))
            })
    }

    /// Derive the encoding format from an output path.
    ///
    /// Falls back to [`DEFAULT_OUTPUT_FORMAT`] for unknown or missing extensions.
    /// Never use this to validate an input file.
    pub fn output_format(path: &Path) -> FormatId {
        Self::extension_of(path)
            .and_then(|ext| Self::find(&ext))
            .unwrap_or(DEFAULT_OUTPUT_FORMAT)
    }

    /// Parse a target format token such as `png`, `.JPG` or `tif`.
    ///
    /// Returns the normalised extension (as the user spelled it, lower-cased) together
    /// with its canonical format, so that `jpeg` keeps producing `.jpeg` files.
    pub fn parse_target(token: &str) -> Result<(String, FormatId), ConvertError> {
        let ext = token.trim().trim_start_matches('.').to_lowercase();
        Self::find(&ext)
            .map(|format| (ext, format))
            .ok_or_else(|| ConvertError::UnsupportedFormat(format!("target format: {}", token)))
    }
}
