//! GIF frame I/O used by the video converter.
//!
//! Frames are full-canvas RGBA buffers; palette quantization (NeuQuant) is done
//! by the `image` crate's GIF encoder, whose `speed` argument trades palette
//! quality for encode time (1 = best, 30 = fastest).
//!
//! Il passaggio di ottimizzazione riduce la palette di ogni frame in base alla
//! qualità (100 → 256 colori, 1 → 16) prima di riscrivere la GIF.

use crate::error::ConvertError;
use color_quant::NeuQuant;
use anyhow::Result;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

/// NeuQuant speed for regular encodes
pub const ENCODE_SPEED: i32 = 10;

/// Map a 1-100 quality onto the NeuQuant speed range (100 -> 1, 1 -> 30)
pub fn speed_for_quality(quality: u8) -> i32 {
    let quality = quality.clamp(1, 100) as i32;
    1 + (100 - quality) * 29 / 99
}

/// Palette size for a 1-100 quality (100 -> 256 colours, 1 -> 16)
pub fn palette_size(quality: u8) -> usize {
    let quality = quality.clamp(1, 100) as usize;
    16 + (quality - 1) * 240 / 99
}

/// Map every pixel of `frames` onto a per-frame palette sized by `quality`
pub fn quantize_frames(frames: &mut [RgbaImage], quality: u8) {
    let colors = palette_size(quality);
    let sample_factor = speed_for_quality(quality);

    for frame in frames.iter_mut() {
        let quantizer = NeuQuant::new(sample_factor, colors, frame.as_raw());
        for pixel in frame.pixels_mut() {
            quantizer.map_pixel(&mut pixel.0);
        }
    }
}

/// Per-frame delay for a playback rate
pub fn frame_delay(fps: f64) -> Delay {
    Delay::from_saturating_duration(Duration::from_secs_f64(1.0 / fps))
}

/// Keep every other frame, starting with the first
pub fn stride_frames(frames: Vec<RgbaImage>) -> Vec<RgbaImage> {
    frames.into_iter().step_by(2).collect()
}

/// Encode `frames` as a looping GIF at `fps` and atomically replace `output`.
///
/// Returns the size of the written file.
pub fn write_frames(output: &Path, frames: &[RgbaImage], fps: f64, speed: i32) -> Result<u64> {
    if frames.is_empty() {
        return Err(ConvertError::Encode(format!(
            "no frames to write to {}",
            output.display()
        ))
        .into());
    }

    let parent = output.parent().unwrap_or(Path::new("."));
    let mut temp = NamedTempFile::new_in(parent).map_err(|e| ConvertError::filesystem(parent, e))?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        {
            let mut encoder = GifEncoder::new_with_speed(&mut writer, speed);
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(ConvertError::Codec)?;
            let delay = frame_delay(fps);
            for buffer in frames {
                encoder
                    .encode_frame(Frame::from_parts(buffer.clone(), 0, 0, delay))
                    .map_err(ConvertError::Codec)?;
            }
        }
        writer
            .flush()
            .map_err(|e| ConvertError::filesystem(output, e))?;
    }

    let file = temp
        .persist(output)
        .map_err(|e| ConvertError::filesystem(output, e.error))?;
    let size = file
        .metadata()
        .map_err(|e| ConvertError::filesystem(output, e))?
        .len();
    Ok(size)
}

/// Decode every frame of a GIF as full-canvas RGBA buffers
pub fn read_frames(path: &Path) -> Result<Vec<RgbaImage>> {
    let file = File::open(path).map_err(|e| ConvertError::filesystem(path, e))?;
    let decoder = GifDecoder::new(BufReader::new(file)).map_err(ConvertError::Codec)?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(ConvertError::Codec)?
        .into_iter()
        .map(Frame::into_buffer)
        .collect();
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn numbered_frames(count: u8) -> Vec<RgbaImage> {
        (0..count)
            .map(|i| RgbaImage::from_pixel(4, 4, Rgba([i, i, i, 255])))
            .collect()
    }

    #[test]
    fn test_stride_keeps_even_indices() {
        let frames = numbered_frames(7);
        let kept = stride_frames(frames);
        let marks: Vec<u8> = kept.iter().map(|f| f.get_pixel(0, 0)[0]).collect();
        assert_eq!(marks, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_stride_is_ceil_half() {
        for n in 1..20u8 {
            let kept = stride_frames(numbered_frames(n));
            assert_eq!(kept.len(), (n as usize + 1) / 2);
        }
    }

    #[test]
    fn test_speed_for_quality_bounds() {
        assert_eq!(speed_for_quality(100), 1);
        assert_eq!(speed_for_quality(1), 30);
        assert_eq!(speed_for_quality(0), 30);
        let mid = speed_for_quality(85);
        assert!((1..=30).contains(&mid));
    }

    #[test]
    fn test_palette_size_bounds() {
        assert_eq!(palette_size(100), 256);
        assert_eq!(palette_size(1), 16);
        assert_eq!(palette_size(0), 16);
        assert!(palette_size(20) < palette_size(85));
    }

    #[test]
    fn test_quantize_frames_limits_colours() {
        let mut state: u32 = 0x1234_5678;
        let mut frames: Vec<RgbaImage> = (0..2)
            .map(|_| {
                RgbaImage::from_fn(48, 48, |_, _| {
                    state ^= state << 13;
                    state ^= state >> 17;
                    state ^= state << 5;
                    let [r, g, b, _] = state.to_le_bytes();
                    Rgba([r, g, b, 255])
                })
            })
            .collect();

        quantize_frames(&mut frames, 1);

        for frame in &frames {
            let colours: std::collections::HashSet<[u8; 4]> = frame.pixels().map(|p| p.0).collect();
            assert!(colours.len() <= palette_size(1));
            assert_eq!(frame.dimensions(), (48, 48));
        }
    }

    #[test]
    fn test_frame_delay_halves_with_fps() {
        let (n10, d10) = frame_delay(10.0).numer_denom_ms();
        let (n5, d5) = frame_delay(5.0).numer_denom_ms();
        let ms10 = n10 as f64 / d10 as f64;
        let ms5 = n5 as f64 / d5 as f64;
        assert!((ms10 - 100.0).abs() < 1.0);
        assert!((ms5 - 200.0).abs() < 1.0);
    }

    #[test]
    fn test_write_then_read_keeps_frame_count_and_size() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("clip.gif");

        let size = write_frames(&output, &numbered_frames(5), 10.0, ENCODE_SPEED).unwrap();
        assert_eq!(size, std::fs::metadata(&output).unwrap().len());

        let frames = read_frames(&output).unwrap();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0].dimensions(), (4, 4));
    }

    #[test]
    fn test_write_empty_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("empty.gif");
        assert!(write_frames(&output, &[], 10.0, ENCODE_SPEED).is_err());
        assert!(!output.exists());
    }
}
