//! # Image Processing Module
//!
//! Conversione delle immagini (PNG/JPEG) in WebP lossy entro un budget di byte.
//!
//! ## Ricerca della qualità
//!
//! La qualità parte da 90 e scende a passi di 5 finché l'output in memoria
//! non rientra nel budget, senza mai scendere sotto 20:
//!
//! ```text
//! 90 → 85 → 80 → … → 25 → 20   (max 15 encode)
//! ```
//!
//! È una ricerca lineare e non una bisezione: la curva qualità → dimensione
//! di libwebp non è abbastanza monotona da fidarsi della bisezione, e un encode
//! costa poco. Se anche a qualità 20 il file supera il budget viene accettato
//! così com'è (non è un errore).
//!
//! ## Codec
//!
//! Il decode è fatto dal crate `image`; l'encode lossy passa per il trait
//! [`QualityEncoder`], implementato in produzione da [`LibWebpEncoder`].
//! Il trait permette di verificare la ricerca con encoder finti nei test.
//!
//! ## Esempio
//!
//! ```rust,ignore
//! let processor = ImageProcessor::new();
//! let encoded = processor.convert_file(
//!     Path::new("img/a.png"),
//!     Path::new("converted_img/a.webp"),
//!     100 * 1024,
//! )?;
//! println!("quality {} -> {} bytes", encoded.quality, encoded.bytes.len());
//! ```

use crate::error::ConvertError;
use anyhow::Result;
use image::DynamicImage;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// First quality tried
pub const START_QUALITY: u8 = 90;
/// Lowest quality the search will use
pub const QUALITY_FLOOR: u8 = 20;
/// Quality decrement between attempts
pub const QUALITY_STEP: u8 = 5;

/// Lossy encoder parametrized by a 0-100 quality
pub trait QualityEncoder: Send + Sync {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>>;
}

/// libwebp lossy encoder
#[derive(Debug, Default, Clone, Copy)]
pub struct LibWebpEncoder;

impl QualityEncoder for LibWebpEncoder {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        let (width, height) = (image.width(), image.height());
        let encoded = match image {
            DynamicImage::ImageRgb8(buffer) => {
                webp::Encoder::from_rgb(buffer.as_raw(), width, height)
                    .encode_simple(false, quality as f32)
            }
            DynamicImage::ImageRgba8(buffer) => {
                webp::Encoder::from_rgba(buffer.as_raw(), width, height)
                    .encode_simple(false, quality as f32)
            }
            other => {
                let buffer = other.to_rgba8();
                webp::Encoder::from_rgba(buffer.as_raw(), width, height)
                    .encode_simple(false, quality as f32)
            }
        };

        let memory = encoded.map_err(|e| {
            ConvertError::Encode(format!(
                "libwebp rejected {}x{} image at quality {}: {:?}",
                width, height, quality, e
            ))
        })?;

        Ok(memory.to_vec())
    }
}

/// Output of the quality search
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    /// Quality of the returned buffer
    pub quality: u8,
    /// Number of encodes performed
    pub attempts: u32,
}

impl EncodedImage {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn within_budget(&self, target_bytes: u64) -> bool {
        self.size() <= target_bytes
    }

    /// The search gave up at the floor instead of meeting the budget
    pub fn hit_floor(&self, target_bytes: u64) -> bool {
        !self.within_budget(target_bytes) && self.quality == QUALITY_FLOOR
    }
}

/// Size-targeted WebP encoder
pub struct ImageProcessor<E = LibWebpEncoder> {
    encoder: E,
}

impl ImageProcessor<LibWebpEncoder> {
    pub fn new() -> Self {
        Self {
            encoder: LibWebpEncoder,
        }
    }
}

impl Default for ImageProcessor<LibWebpEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: QualityEncoder> ImageProcessor<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self { encoder }
    }

    /// Encode `image` at the highest quality step whose output fits `target_bytes`.
    ///
    /// The loop runs at most `(START_QUALITY - QUALITY_FLOOR) / QUALITY_STEP + 1` times
    /// and returns the floor-quality buffer when nothing fits.
    pub fn encode_to_target(&self, image: &DynamicImage, target_bytes: u64) -> Result<EncodedImage> {
        let mut quality = START_QUALITY;
        let mut attempts = 0;

        loop {
            let bytes = self.encoder.encode(image, quality)?;
            attempts += 1;
            debug!(
                "WebP attempt {} at quality {}: {} bytes (target {})",
                attempts,
                quality,
                bytes.len(),
                target_bytes
            );

            if bytes.len() as u64 <= target_bytes || quality <= QUALITY_FLOOR {
                return Ok(EncodedImage {
                    bytes,
                    quality,
                    attempts,
                });
            }

            quality = quality.saturating_sub(QUALITY_STEP).max(QUALITY_FLOOR);
        }
    }

    /// Decode `input`, run the quality search and write the result to `output`.
    pub fn convert_file(&self, input: &Path, output: &Path, target_bytes: u64) -> Result<EncodedImage> {
        let image = image::open(input).map_err(|source| ConvertError::Decode {
            path: input.to_path_buf(),
            source,
        })?;
        let image = normalize(image);

        let encoded = self.encode_to_target(&image, target_bytes)?;
        drop(image);

        if encoded.hit_floor(target_bytes) {
            debug!(
                "{} stays above budget at quality floor ({} > {} bytes)",
                input.display(),
                encoded.size(),
                target_bytes
            );
        }

        write_atomically(output, &encoded.bytes)?;
        Ok(encoded)
    }
}

/// Bring any decoded raster to 8-bit RGB or RGBA, the layouts libwebp imports
fn normalize(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Write through a temp file in the destination directory, then rename into place
fn write_atomically(output: &Path, bytes: &[u8]) -> Result<()> {
    let parent = output.parent().unwrap_or(Path::new("."));
    let mut temp = NamedTempFile::new_in(parent).map_err(|e| ConvertError::filesystem(parent, e))?;
    temp.write_all(bytes)
        .map_err(|e| ConvertError::filesystem(temp.path(), e))?;
    temp.persist(output)
        .map_err(|e| ConvertError::filesystem(output, e.error))?;
    Ok(())
}
