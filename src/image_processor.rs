//! # Image Processing Module
//!
//! Questo modulo implementa la pipeline di conversione per un singolo file.
//!
//! ## Pipeline di Conversione
//!
//! 1. **Validazione resize**: Dimensioni non positive rifiutate prima di tutto
//! 2. **Esistenza input**: `input not found`
//! 3. **Formato input**: Lookup stretto nel registry (`unsupported input format`)
//! 4. **Directory output**: Creazione ricorsiva, idempotente
//! 5. **Decode**: Tramite la libreria `image` (`decode error: ...`)
//! 6. **Formato target**: Derivato dall'estensione di output (fallback JPEG)
//! 7. **Trasparenza**: Composizione su bianco per target senza alpha (JPEG, BMP)
//! 8. **Resize**: Fill (crop centrato) o Stretch, filtro Lanczos3
//! 9. **Encoding**: Parametri per formato, scrittura atomica (`encode error: ...`)
//!
//! ## Gestione Trasparenza
//!
//! | Layout sorgente | Target JPEG/BMP | Altri target |
//! |-----------------|-----------------|--------------|
//! | RGBA            | alpha blend su bianco | invariato |
//! | Luma+Alpha      | paste diretto (alpha ignorato) | invariato |
//! | Senza alpha     | invariato | invariato |
//!
//! ## Error Handling
//!
//! Ogni errore viene catturato al confine della pipeline e convertito in
//! `ConversionOutcome::Failure`: nessun errore per-file è fatale per il processo.
//!
//! ## Esempio:
//! ```rust,ignore
//! let converter = ImageConverter::new(Reporter::new(OutputMode::Human));
//! let options = ConversionOptions::new(90, true);
//! let outcome = converter.convert(Path::new("in.png"), Path::new("out/in.jpg"), &options);
//! assert!(outcome.is_success());
//! ```

use crate::config::ConversionOptions;
use crate::encoder::{self, EncodingParams};
use crate::error::ConvertError;
use crate::file_manager::FileManager;
use crate::format::{FormatId, FormatRegistry};
use crate::reporter::Reporter;
use crate::resize::apply_resize;
use image::{ColorType, DynamicImage, ImageReader, Rgba, RgbaImage};
use std::path::Path;
use tracing::debug;

/// Result of converting one file
#[derive(Debug)]
pub enum ConversionOutcome {
    Success,
    Failure(ConvertError),
    Skipped(String),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success)
    }

    /// Human-readable reason for failures and skips
    pub fn reason(&self) -> Option<String> {
        match self {
            ConversionOutcome::Success => None,
            ConversionOutcome::Failure(e) => Some(e.to_string()),
            ConversionOutcome::Skipped(reason) => Some(reason.clone()),
        }
    }
}

/// How transparency is removed for targets without an alpha channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlattenStrategy {
    /// Blend onto opaque white using the alpha channel as mask
    AlphaMask,
    /// Luminance+alpha: paste the luminance directly, alpha is dropped
    DirectPaste,
}

/// Decide whether and how an image must be flattened for a target format.
///
/// Driven by the pixel layout: images without alpha are never flattened.
pub fn flatten_strategy(color: ColorType, target: FormatId) -> Option<FlattenStrategy> {
    if target.supports_alpha() {
        return None;
    }
    match color {
        ColorType::La8 | ColorType::La16 => Some(FlattenStrategy::DirectPaste),
        c if c.has_alpha() => Some(FlattenStrategy::AlphaMask),
        _ => None,
    }
}

/// Remove transparency so the image can be stored in a format without alpha
pub fn flatten_transparency(img: DynamicImage, target: FormatId) -> DynamicImage {
    match flatten_strategy(img.color(), target) {
        None => img,
        Some(FlattenStrategy::DirectPaste) => DynamicImage::ImageRgb8(img.to_rgb8()),
        Some(FlattenStrategy::AlphaMask) => {
            let mut background = RgbaImage::from_pixel(img.width(), img.height(), Rgba([255, 255, 255, 255]));
            image::imageops::overlay(&mut background, &img.to_rgba8(), 0, 0);
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(background).to_rgb8())
        }
    }
}

/// Converts single image files between container formats
pub struct ImageConverter {
    reporter: Reporter,
}

impl ImageConverter {
    /// Creates a new converter reporting through the given handle
    pub fn new(reporter: Reporter) -> Self {
        Self { reporter }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Convert `input_path` into `output_path`.
    ///
    /// The output format is taken from the output extension. Every error is
    /// turned into [`ConversionOutcome::Failure`]; this never panics on bad input.
    pub fn convert(&self, input_path: &Path, output_path: &Path, options: &ConversionOptions) -> ConversionOutcome {
        let outcome = match self.try_convert(input_path, output_path, options) {
            Ok(()) => ConversionOutcome::Success,
            Err(e) => ConversionOutcome::Failure(e),
        };
        self.reporter.conversion_finished(input_path, output_path, &outcome);
        outcome
    }

    fn try_convert(&self, input_path: &Path, output_path: &Path, options: &ConversionOptions) -> Result<(), ConvertError> {
        if let Some(spec) = options.resize() {
            spec.validate()?;
        }

        if !input_path.exists() {
            return Err(ConvertError::InputNotFound(input_path.to_path_buf()));
        }

        let source_format = FormatRegistry::lookup(input_path)?;

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let img = Self::decode(input_path)?;
        let target_format = FormatRegistry::output_format(output_path);
        debug!(
            "Decoded {} ({}, {}x{}, {:?}) -> {}",
            input_path.display(),
            source_format,
            img.width(),
            img.height(),
            img.color(),
            target_format
        );

        let img = flatten_transparency(img, target_format);

        let img = match options.resize() {
            Some(spec) => apply_resize(&img, spec, options.resize_mode()),
            None => img,
        };

        let params = EncodingParams::for_format(target_format, options);
        let bytes = encoder::encode(img, &params)?;

        FileManager::write_atomic(output_path, &bytes)
            .map_err(|e| ConvertError::Encode(format!("{}: {}", output_path.display(), e)))?;

        Ok(())
    }

    fn decode(path: &Path) -> Result<DynamicImage, ConvertError> {
        ImageReader::open(path)
            .map_err(|e| ConvertError::Decode(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| ConvertError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ConvertError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resize::ResizeSpec;
    use image::{GrayAlphaImage, LumaA, Rgb, RgbImage};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn converter() -> ImageConverter {
        ImageConverter::new(Reporter::silent())
    }

    fn write_rgb_png(path: &Path, width: u32, height: u32) {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 200]))
            .save(path)
            .unwrap();
    }

    /// Left half fully transparent, right half opaque red
    fn write_rgba_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 0, 0, 255])
            }
        })
        .save(path)
        .unwrap();
    }

    #[test]
    fn test_strategy_is_mode_driven() {
        assert_eq!(flatten_strategy(ColorType::Rgba8, FormatId::Jpeg), Some(FlattenStrategy::AlphaMask));
        assert_eq!(flatten_strategy(ColorType::Rgba16, FormatId::Bmp), Some(FlattenStrategy::AlphaMask));
        assert_eq!(flatten_strategy(ColorType::La8, FormatId::Jpeg), Some(FlattenStrategy::DirectPaste));
        assert_eq!(flatten_strategy(ColorType::Rgb8, FormatId::Jpeg), None);
        assert_eq!(flatten_strategy(ColorType::L8, FormatId::Bmp), None);
        assert_eq!(flatten_strategy(ColorType::Rgba8, FormatId::Png), None);
        assert_eq!(flatten_strategy(ColorType::Rgba8, FormatId::WebP), None);
    }

    #[test]
    fn test_flatten_blends_on_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(4, 1, |x, _| match x {
            0 => Rgba([0, 0, 0, 0]),
            1 => Rgba([255, 0, 0, 255]),
            _ => Rgba([0, 0, 0, 128]),
        }));
        let flat = flatten_transparency(img, FormatId::Jpeg).to_rgb8();

        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(flat.get_pixel(1, 0), &Rgb([255, 0, 0]));
        let half = flat.get_pixel(2, 0);
        assert!(half[0] > 100 && half[0] < 160, "{:?}", half);
    }

    #[test]
    fn test_flatten_luma_alpha_pastes_directly() {
        let img = DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(2, 2, LumaA([40, 0])));
        let flat = flatten_transparency(img, FormatId::Bmp);
        assert_eq!(flat.color(), ColorType::Rgb8);
        assert_eq!(flat.to_rgb8().get_pixel(0, 0), &Rgb([40, 40, 40]));
    }

    #[test]
    fn test_opaque_image_passes_through() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([9, 8, 7])));
        let out = flatten_transparency(img.clone(), FormatId::Jpeg);
        assert_eq!(out, img);
    }

    #[test]
    fn test_missing_input() {
        let tmp = TempDir::new().unwrap();
        let outcome = converter().convert(
            &tmp.path().join("absent.png"),
            &tmp.path().join("out.jpg"),
            &ConversionOptions::default(),
        );
        assert!(matches!(outcome, ConversionOutcome::Failure(ConvertError::InputNotFound(_))));
        assert!(outcome.reason().unwrap().starts_with("input not found"));
    }

    #[test]
    fn test_unsupported_input() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("notes.txt");
        std::fs::write(&input, "hello").unwrap();

        let outcome = converter().convert(&input, &tmp.path().join("notes.png"), &ConversionOptions::default());
        assert!(matches!(outcome, ConversionOutcome::Failure(ConvertError::UnsupportedFormat(_))));
        assert!(!tmp.path().join("notes.png").exists());
    }

    #[test]
    fn test_invalid_resize_rejected_before_decode() {
        let tmp = TempDir::new().unwrap();
        // Not a real PNG: a decode attempt would report a decode error instead
        let input = tmp.path().join("broken.png");
        std::fs::write(&input, b"not an image").unwrap();

        let options = ConversionOptions::default().with_resize(Some(ResizeSpec { width: 0, height: 100 }));
        let outcome = converter().convert(&input, &tmp.path().join("out.jpg"), &options);
        assert!(matches!(outcome, ConversionOutcome::Failure(ConvertError::InvalidResizeSpec(_))));
    }

    #[test]
    fn test_decode_error() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("broken.png");
        std::fs::write(&input, b"not an image").unwrap();

        let outcome = converter().convert(&input, &tmp.path().join("out.jpg"), &ConversionOptions::default());
        assert!(matches!(outcome, ConversionOutcome::Failure(ConvertError::Decode(_))));
        assert!(outcome.reason().unwrap().starts_with("decode error: "));
        assert!(!tmp.path().join("out.jpg").exists());
    }

    #[test]
    fn test_opaque_png_to_jpeg() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("opaque.png");
        write_rgb_png(&input, 64, 48);
        let output = tmp.path().join("nested/dir/opaque.jpg");

        let outcome = converter().convert(&input, &output, &ConversionOptions::default());
        assert!(outcome.is_success(), "{:?}", outcome);

        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
        assert_eq!(image::ImageFormat::from_path(&output).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_rgba_png_to_bmp_turns_transparent_white() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("alpha.png");
        write_rgba_png(&input, 20, 10);
        let output = tmp.path().join("alpha.bmp");

        assert!(converter().convert(&input, &output, &ConversionOptions::default()).is_success());

        let decoded = image::open(&output).unwrap();
        assert!(!decoded.color().has_alpha());
        let rgb = decoded.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(19, 9), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_rgba_png_to_jpeg_turns_transparent_white() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("alpha.png");
        write_rgba_png(&input, 32, 16);
        let output = tmp.path().join("alpha.jpg");

        assert!(converter().convert(&input, &output, &ConversionOptions::new(100, true)).is_success());

        let rgb = image::open(&output).unwrap().to_rgb8();
        let corner = rgb.get_pixel(1, 1);
        assert!(corner.0.iter().all(|c| *c >= 245), "{:?}", corner);
    }

    #[test]
    fn test_fill_resize_on_conversion() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("wide.png");
        write_rgb_png(&input, 1000, 500);
        let output = tmp.path().join("wide_fill.png");

        let options = ConversionOptions::default().with_resize(Some(ResizeSpec::new(400, 400).unwrap()));
        assert!(converter().convert(&input, &output, &options).is_success());
        assert_eq!(image::image_dimensions(&output).unwrap(), (400, 400));
    }

    #[test]
    fn test_stretch_resize_on_conversion() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("wide.png");
        write_rgb_png(&input, 1000, 500);
        let output = tmp.path().join("wide_stretch.bmp");

        let options = ConversionOptions::default()
            .with_resize(Some(ResizeSpec::new(400, 400).unwrap()))
            .with_maintain_aspect_ratio(false);
        assert!(converter().convert(&input, &output, &options).is_success());
        assert_eq!(image::image_dimensions(&output).unwrap(), (400, 400));
    }

    #[test]
    fn test_unknown_output_extension_encodes_jpeg() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in.png");
        write_rgb_png(&input, 16, 16);
        let output = tmp.path().join("out.xyz");

        assert!(converter().convert(&input, &output, &ConversionOptions::default()).is_success());
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_encode_error_on_unwritable_output() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in.png");
        write_rgb_png(&input, 8, 8);
        // A directory occupies the output path, so persisting over it fails
        let output: PathBuf = tmp.path().join("taken.jpg");
        std::fs::create_dir(&output).unwrap();

        let outcome = converter().convert(&input, &output, &ConversionOptions::default());
        assert!(matches!(outcome, ConversionOutcome::Failure(ConvertError::Encode(_))));
        assert!(output.is_dir());
    }
}
