//! # Image Resize Module
//!
//! Questo modulo gestisce il ridimensionamento in memoria delle immagini decodificate.
//!
//! ## Caratteristiche
//! - **Parsing**: `ResizeSpec` da stringa `WIDTHxHEIGHT` (es. `800x600`)
//! - **Validazione**: Dimensioni non positive rifiutate prima di qualsiasi decode
//! - **Fill**: Scala per coprire il box target e croppa al centro (dimensioni esatte)
//! - **Stretch**: Scala direttamente alle dimensioni target ignorando l'aspect ratio
//! - **Filtro**: Lanczos3 per entrambe le modalità
//!
//! ## Modalità
//! ```text
//! 1000x500 → 400x400 (Fill)    → 400x400, bordi laterali croppati
//! 1000x500 → 400x400 (Stretch) → 400x400, contenuto deformato
//! ```

use crate::error::ConvertError;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resampling filter shared by every resize path
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Largest side an ICO entry can have
pub const ICO_MAX_DIMENSION: u32 = 256;

/// Requested output dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeSpec {
    pub width: u32,
    pub height: u32,
}

impl ResizeSpec {
    /// Build a validated spec. Both sides must be positive.
    pub fn new(width: u32, height: u32) -> Result<Self, ConvertError> {
        let spec = Self { width, height };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConvertError::InvalidResizeSpec(self.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for ResizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ResizeSpec {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConvertError::InvalidResizeSpec(format!("'{}' (expected WIDTHxHEIGHT, e.g. 800x600)", s));

        let lower = s.trim().to_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width: i64 = w.trim().parse().map_err(|_| invalid())?;
        let height: i64 = h.trim().parse().map_err(|_| invalid())?;

        if width <= 0 || height <= 0 {
            return Err(invalid());
        }

        let width = u32::try_from(width).map_err(|_| invalid())?;
        let height = u32::try_from(height).map_err(|_| invalid())?;
        Self::new(width, height)
    }
}

/// How a resize treats the source aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Scale to cover the target box, then crop the centre to exact dimensions
    Fill,
    /// Scale to exact dimensions without preserving aspect ratio
    Stretch,
}

impl ResizeMode {
    pub fn from_maintain_aspect(maintain_aspect_ratio: bool) -> Self {
        if maintain_aspect_ratio {
            ResizeMode::Fill
        } else {
            ResizeMode::Stretch
        }
    }
}

/// Apply a resize. Output dimensions always equal the spec.
pub fn apply_resize(img: &DynamicImage, spec: ResizeSpec, mode: ResizeMode) -> DynamicImage {
    match mode {
        ResizeMode::Fill => img.resize_to_fill(spec.width, spec.height, RESIZE_FILTER),
        ResizeMode::Stretch => img.resize_exact(spec.width, spec.height, RESIZE_FILTER),
    }
}

/// Shrink an image so that it fits an ICO entry, keeping its aspect ratio.
///
/// Images already within bounds are returned unchanged.
pub fn fit_ico_bounds(img: DynamicImage) -> DynamicImage {
    if img.width() <= ICO_MAX_DIMENSION && img.height() <= ICO_MAX_DIMENSION {
        return img;
    }
    img.resize(ICO_MAX_DIMENSION, ICO_MAX_DIMENSION, RESIZE_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    #[test]
    fn test_parse_resize_spec() {
        assert_eq!("800x600".parse::<ResizeSpec>().unwrap(), ResizeSpec { width: 800, height: 600 });
        assert_eq!("800X600".parse::<ResizeSpec>().unwrap(), ResizeSpec { width: 800, height: 600 });
        assert_eq!(" 32 x 16 ".parse::<ResizeSpec>().unwrap(), ResizeSpec { width: 32, height: 16 });
    }

    #[test]
    fn test_reject_non_positive_dimensions() {
        for bad in ["0x100", "-5x10", "100x0", "10x-1"] {
            let err = bad.parse::<ResizeSpec>().unwrap_err();
            assert!(matches!(err, ConvertError::InvalidResizeSpec(_)), "{}", bad);
        }
        assert!(ResizeSpec::new(0, 10).is_err());
        assert!(ResizeSpec { width: 10, height: 0 }.validate().is_err());
    }

    #[test]
    fn test_reject_malformed_spec() {
        for bad in ["800", "800x", "x600", "axb", "800x600x2", ""] {
            assert!(bad.parse::<ResizeSpec>().is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_fill_crops_to_exact_size() {
        let img = gradient(1000, 500);
        let out = apply_resize(&img, ResizeSpec::new(400, 400).unwrap(), ResizeMode::Fill);
        assert_eq!((out.width(), out.height()), (400, 400));
    }

    #[test]
    fn test_stretch_to_exact_size() {
        let img = gradient(1000, 500);
        let out = apply_resize(&img, ResizeSpec::new(400, 400).unwrap(), ResizeMode::Stretch);
        assert_eq!((out.width(), out.height()), (400, 400));
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(ResizeMode::from_maintain_aspect(true), ResizeMode::Fill);
        assert_eq!(ResizeMode::from_maintain_aspect(false), ResizeMode::Stretch);
    }

    #[test]
    fn test_fit_ico_bounds() {
        let small = fit_ico_bounds(gradient(64, 32));
        assert_eq!((small.width(), small.height()), (64, 32));

        let large = fit_ico_bounds(gradient(1024, 512));
        assert_eq!((large.width(), large.height()), (256, 128));
    }
}
