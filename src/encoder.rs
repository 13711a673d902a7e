//! # Encoder Module
//!
//! Selezione dei parametri di encoding per formato e scrittura in memoria tramite
//! la libreria codec.
//!
//! ## Parametri per formato
//!
//! | Formato | Parametri |
//! |---------|-----------|
//! | JPEG    | `quality`, progressive, `optimize` (tabelle Huffman ottimizzate) |
//! | PNG     | compressione livello 6 (scala 0-9), `optimize` passato comunque |
//! | WEBP    | `quality`, method 6 (scala 0-6, preset massima qualità) |
//! | BMP, TIFF, GIF, ICO | solo `optimize` |
//!
//! ## Normalizzazione pixel
//! Ogni encoder accetta solo alcuni layout: prima di scrivere l'immagine viene
//! convertita nel layout compatibile (es. RGB8 per JPEG, RGBA8 per GIF/ICO).

use crate::config::{ConversionOptions, Quality};
use crate::error::ConvertError;
use crate::format::FormatId;
use crate::resize::fit_ico_bounds;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::{ColorType, DynamicImage};
use std::io::Cursor;
use tracing::debug;

/// zlib level used for PNG output, regardless of the optimize flag
pub const PNG_COMPRESSION_LEVEL: u8 = 6;

/// libwebp effort preset (0 = fastest, 6 = best quality)
pub const WEBP_METHOD: u8 = 6;

/// Format-specific encoding parameters for one conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingParams {
    pub format: FormatId,
    pub optimize: bool,
    pub quality: Option<Quality>,
    pub progressive: bool,
    pub compression_level: Option<u8>,
    pub method: Option<u8>,
}

impl EncodingParams {
    /// Pick the parameters for a target format
    pub fn for_format(format: FormatId, options: &ConversionOptions) -> Self {
        let base = Self {
            format,
            optimize: options.optimize(),
            quality: None,
            progressive: false,
            compression_level: None,
            method: None,
        };

        match format {
            FormatId::Jpeg => Self {
                quality: Some(options.quality()),
                progressive: true,
                ..base
            },
            FormatId::Png => Self {
                compression_level: Some(PNG_COMPRESSION_LEVEL),
                ..base
            },
            FormatId::WebP => Self {
                quality: Some(options.quality()),
                method: Some(WEBP_METHOD),
                ..base
            },
            FormatId::Bmp | FormatId::Tiff | FormatId::Gif | FormatId::Ico => base,
        }
    }
}

/// Convert the pixel layout into one the target encoder accepts
pub fn prepare_pixels(img: DynamicImage, format: FormatId) -> DynamicImage {
    match format {
        FormatId::Jpeg | FormatId::Bmp => match img {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => img,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        },
        FormatId::Gif => DynamicImage::ImageRgba8(img.to_rgba8()),
        FormatId::Ico => DynamicImage::ImageRgba8(fit_ico_bounds(img).to_rgba8()),
        FormatId::WebP => {
            if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            }
        }
        FormatId::Png => match img.color() {
            ColorType::Rgb32F => DynamicImage::ImageRgb16(img.to_rgb16()),
            ColorType::Rgba32F => DynamicImage::ImageRgba16(img.to_rgba16()),
            _ => img,
        },
        // TIFF writer has no luminance+alpha layouts
        FormatId::Tiff => match img.color() {
            ColorType::La8 => DynamicImage::ImageRgba8(img.to_rgba8()),
            ColorType::La16 | ColorType::Rgba32F => DynamicImage::ImageRgba16(img.to_rgba16()),
            ColorType::Rgb32F => DynamicImage::ImageRgb16(img.to_rgb16()),
            _ => img,
        },
    }
}

/// Encode an image to an in-memory buffer with the selected parameters
pub fn encode(img: DynamicImage, params: &EncodingParams) -> Result<Vec<u8>, ConvertError> {
    let img = prepare_pixels(img, params.format);
    debug!(
        "Encoding {}x{} {:?} as {} ({:?})",
        img.width(),
        img.height(),
        img.color(),
        params.format,
        params
    );

    let mut buffer = Cursor::new(Vec::new());
    let result = match params.format {
        FormatId::Jpeg => return encode_jpeg(&img, params),
        FormatId::Png => {
            let compression = png_compression(params.compression_level.unwrap_or(PNG_COMPRESSION_LEVEL));
            img.write_with_encoder(PngEncoder::new_with_quality(
                &mut buffer,
                compression,
                PngFilterType::Adaptive,
            ))
        }
        FormatId::WebP => return encode_webp(&img, params),
        other => img.write_to(&mut buffer, other.to_image_format()),
    };

    result.map_err(|e| ConvertError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// JPEG through `jpeg-encoder`, which can write progressive scans and optimized Huffman tables
fn encode_jpeg(img: &DynamicImage, params: &EncodingParams) -> Result<Vec<u8>, ConvertError> {
    let (data, color) = match img {
        DynamicImage::ImageRgb8(rgb) => (rgb.as_raw(), jpeg_encoder::ColorType::Rgb),
        DynamicImage::ImageLuma8(luma) => (luma.as_raw(), jpeg_encoder::ColorType::Luma),
        other => {
            return Err(ConvertError::Encode(format!(
                "unexpected pixel layout for JPEG: {:?}",
                other.color()
            )))
        }
    };

    let too_large = || ConvertError::Encode(format!("{}x{} exceeds the JPEG size limit", img.width(), img.height()));
    let width = u16::try_from(img.width()).map_err(|_| too_large())?;
    let height = u16::try_from(img.height()).map_err(|_| too_large())?;

    let mut buffer = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut buffer, params.quality.unwrap_or_default().value());
    encoder.set_progressive(params.progressive);
    encoder.set_optimized_huffman_tables(params.optimize);
    encoder
        .encode(data, width, height, color)
        .map_err(|e| ConvertError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Map a 0-9 zlib level onto the codec's compression presets
fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn encode_webp(img: &DynamicImage, params: &EncodingParams) -> Result<Vec<u8>, ConvertError> {
    let encoder = match img {
        DynamicImage::ImageRgba8(rgba) => webp::Encoder::from_rgba(rgba.as_raw(), img.width(), img.height()),
        DynamicImage::ImageRgb8(rgb) => webp::Encoder::from_rgb(rgb.as_raw(), img.width(), img.height()),
        other => {
            return Err(ConvertError::Encode(format!(
                "unexpected pixel layout for WEBP: {:?}",
                other.color()
            )))
        }
    };

    let mut config = webp::WebPConfig::new()
        .map_err(|_| ConvertError::Encode("failed to initialise WEBP encoder config".to_string()))?;
    config.lossless = 0;
    config.quality = params.quality.unwrap_or_default().value() as f32;
    config.method = params.method.unwrap_or(WEBP_METHOD) as i32;

    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| ConvertError::Encode(format!("WEBP encode failed: {:?}", e)))?;
    Ok(memory.to_vec())
}
