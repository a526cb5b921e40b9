//! # Video Processing Module
//!
//! Questo modulo converte i video in GIF animate entro un budget di byte.
//!
//! ## Pipeline:
//! 1. **Probe**: `ffprobe` legge dimensioni, frame rate e rotazione dello stream video
//! 2. **Decode + resize**: `ffmpeg` ricampiona a `fps` (default 10) e altezza 360
//!    (aspect ratio preservato) ed emette frame RGBA grezzi su pipe
//! 3. **Encode**: i frame vengono scritti come GIF in loop (quantizzazione NeuQuant)
//! 4. **Ottimizzazione**: un unico passaggio lossy a qualità fissa (default 85),
//!    indipendente dal budget: la palette di ogni frame viene ridotta a un
//!    numero di colori proporzionale alla qualità
//! 5. **Riduzione**: finché il file supera il budget si tiene un frame su due e
//!    si dimezza il frame rate; con 2 frame o meno ci si ferma e si accetta il file
//!
//! ## Riduzione dei frame
//!
//! La riduzione geometrica (×0.5) converge in O(log n) iterazioni; dopo N
//! iterazioni restano `ceil(n / 2^N)` frame a `fps / 2^N`. I frame decodificati
//! dopo l'ottimizzazione restano in memoria tra un'iterazione e l'altra.
//!
//! ## Dipendenze richieste:
//! - `ffmpeg`: decodifica e resampling
//! - `ffprobe`: analisi proprietà video
//!
//! ## Esempio:
//! ```rust,ignore
//! let processor = VideoProcessor::new(VideoSettings::default());
//! let outcome = processor.convert_file(&input, &output, 1000 * 1024)?;
//! println!("{} frames, {} bytes", outcome.frame_count, outcome.size_bytes);
//! ```

use crate::animation::{self, ENCODE_SPEED};
use crate::config::VideoSettings;
use crate::error::ConvertError;
use crate::platform::PlatformCommands;
use anyhow::Result;
use image::RgbaImage;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Reduction stops once the sequence is this short
pub const MIN_FRAMES: usize = 2;

/// Handles video to GIF conversion
pub struct VideoProcessor {
    settings: VideoSettings,
}

/// Video stream information from ffprobe
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Display width (rotation applied)
    pub width: u32,
    /// Display height (rotation applied)
    pub height: u32,
    pub source_fps: Option<f64>,
    pub duration: Option<f64>,
}

impl VideoInfo {
    /// Width matching `target_height` with the aspect ratio preserved
    pub fn scaled_width(&self, target_height: u32) -> u32 {
        let width = (self.width as f64 * target_height as f64 / self.height as f64).round();
        (width as u32).max(1)
    }
}

/// Decoded, resized frame sequence
pub struct VideoClip {
    pub frames: Vec<RgbaImage>,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

/// State of the output after the reduction loop
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionOutcome {
    pub size_bytes: u64,
    pub frame_count: usize,
    pub fps: f64,
    pub iterations: u32,
}

impl ReductionOutcome {
    pub fn within_budget(&self, target_bytes: u64) -> bool {
        self.size_bytes <= target_bytes
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl VideoProcessor {
    pub fn new(settings: VideoSettings) -> Self {
        Self { settings }
    }

    /// Convert `input` to a GIF at `output` that fits `target_bytes` or has hit the frame floor.
    pub fn convert_file(&self, input: &Path, output: &Path, target_bytes: u64) -> Result<ReductionOutcome> {
        let info = self.probe(input)?;
        debug!(
            "Probed {}: {}x{} @ {:?} fps, {:?}s",
            input.display(),
            info.width,
            info.height,
            info.source_fps,
            info.duration
        );

        let clip = self.decode_clip(input, &info)?;
        self.encode_clip(clip, output, target_bytes)
    }

    /// Write `clip` as a GIF, run the optimize pass once, then reduce to `target_bytes`.
    pub fn encode_clip(&self, clip: VideoClip, output: &Path, target_bytes: u64) -> Result<ReductionOutcome> {
        debug!(
            "Encoding {} frames at {}x{} ({} fps)",
            clip.frames.len(),
            clip.width,
            clip.height,
            clip.fps
        );

        animation::write_frames(output, &clip.frames, clip.fps, ENCODE_SPEED)?;
        let fps = clip.fps;
        drop(clip);

        let (frames, size) = self.optimize_pass(output, fps)?;
        Self::reduce_to_target(frames, fps, size, output, target_bytes)
    }

    /// Requantize the written GIF once to the palette allowed by the optimize quality.
    fn optimize_pass(&self, output: &Path, fps: f64) -> Result<(Vec<RgbaImage>, u64)> {
        let quality = self.settings.optimize_quality;
        let mut frames = animation::read_frames(output)?;
        animation::quantize_frames(&mut frames, quality);

        let size = animation::write_frames(output, &frames, fps, animation::speed_for_quality(quality))?;
        debug!(
            "Optimized {} at quality {} ({} colours): {} bytes",
            output.display(),
            quality,
            animation::palette_size(quality),
            size
        );
        Ok((frames, size))
    }

    /// Halve frames and fps until the file at `output` fits `target_bytes`.
    ///
    /// `size_bytes` is the current size of `output`, which must hold `frames` at `fps`.
    pub fn reduce_to_target(
        mut frames: Vec<RgbaImage>,
        mut fps: f64,
        mut size_bytes: u64,
        output: &Path,
        target_bytes: u64,
    ) -> Result<ReductionOutcome> {
        let mut iterations = 0;

        while size_bytes > target_bytes {
            if frames.len() <= MIN_FRAMES {
                debug!(
                    "{} stays above budget with {} frames ({} > {} bytes)",
                    output.display(),
                    frames.len(),
                    size_bytes,
                    target_bytes
                );
                break;
            }

            frames = animation::stride_frames(frames);
            fps /= 2.0;
            iterations += 1;
            size_bytes = animation::write_frames(output, &frames, fps, ENCODE_SPEED)?;
            debug!(
                "Reduction {}: {} frames at {} fps -> {} bytes",
                iterations,
                frames.len(),
                fps,
                size_bytes
            );
        }

        Ok(ReductionOutcome {
            size_bytes,
            frame_count: frames.len(),
            fps,
            iterations,
        })
    }

    /// Get video information using ffprobe
    pub fn probe(&self, input: &Path) -> Result<VideoInfo> {
        let ffprobe = PlatformCommands::instance().tool_path("ffprobe")?;

        let output = Command::new(ffprobe)
            .args(["-v", "error", "-print_format", "json", "-show_streams", "-show_format"])
            .args(["-select_streams", "v:0"])
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| anyhow::anyhow!("Failed to execute ffprobe: {}", e))?;

        if !output.status.success() {
            return Err(ConvertError::FFmpeg(format!(
                "ffprobe failed on {}: {}",
                input.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ))
            .into());
        }

        parse_probe_output(&output.stdout)
            .map_err(|e| anyhow::anyhow!("Cannot read ffprobe output for {}: {:#}", input.display(), e))
    }

    /// Resample to the configured fps and height and collect raw RGBA frames
    pub fn decode_clip(&self, input: &Path, info: &VideoInfo) -> Result<VideoClip> {
        let ffmpeg = PlatformCommands::instance().tool_path("ffmpeg")?;
        let height = self.settings.height;
        let width = info.scaled_width(height);
        let fps = self.settings.fps;

        let filter = format!("fps={},scale={}:{}:flags=lanczos", fps, width, height);
        let mut child = Command::new(ffmpeg)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(input)
            .args(["-an", "-vf", &filter, "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to execute ffmpeg: {}", e))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("ffmpeg stdout not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("ffmpeg stderr not captured"))?;

        // Drain stderr on its own thread so a chatty ffmpeg cannot block the pipe
        let stderr_reader = std::thread::spawn(move || {
            let mut text = String::new();
            let _ = stderr.read_to_string(&mut text);
            text
        });

        let frame_len = width as usize * height as usize * 4;
        let read_result = read_raw_frames(&mut stdout, frame_len, width, height);
        drop(stdout);

        let status = child
            .wait()
            .map_err(|e| anyhow::anyhow!("Failed to wait for ffmpeg: {}", e))?;
        let stderr_text = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(ConvertError::FFmpeg(format!(
                "ffmpeg failed on {}: {}",
                input.display(),
                stderr_text.trim()
            ))
            .into());
        }

        let frames = read_result?;
        if frames.is_empty() {
            return Err(ConvertError::FFmpeg(format!(
                "no frames decoded from {}",
                input.display()
            ))
            .into());
        }

        Ok(VideoClip {
            frames,
            fps,
            width,
            height,
        })
    }

    /// Check if required tools are available
    pub fn check_dependencies() -> Result<()> {
        let missing = PlatformCommands::instance().missing_video_tools();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConvertError::MissingDependency(format!(
                "{} required for video conversion",
                missing.join(", ")
            ))
            .into())
        }
    }
}

/// Split a raw RGBA stream into frames; a truncated trailing frame is dropped
fn read_raw_frames<R: Read>(reader: &mut R, frame_len: usize, width: u32, height: u32) -> Result<Vec<RgbaImage>> {
    let mut frames = Vec::new();

    loop {
        let mut buffer = vec![0u8; frame_len];
        let mut filled = 0;
        while filled < frame_len {
            let read = reader
                .read(&mut buffer[filled..])
                .map_err(|e| anyhow::anyhow!("Failed to read frames from ffmpeg: {}", e))?;
            if read == 0 {
                break;
            }
            filled += read;
        }

        if filled < frame_len {
            if filled > 0 {
                warn!("Dropping truncated trailing frame ({} of {} bytes)", filled, frame_len);
            }
            return Ok(frames);
        }

        let frame = RgbaImage::from_raw(width, height, buffer)
            .ok_or_else(|| anyhow::anyhow!("Frame buffer does not match {}x{}", width, height))?;
        frames.push(frame);
    }
}

fn parse_probe_output(json: &[u8]) -> Result<VideoInfo> {
    let probe: ProbeOutput = serde_json::from_slice(json)?;

    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| ConvertError::FFmpeg("no video stream found".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(ConvertError::FFmpeg("video stream has no dimensions".to_string()).into())
        }
    };

    let rotation = stream
        .side_data_list
        .iter()
        .find_map(|side| side.rotation)
        .or_else(|| stream.tags.get("rotate").and_then(|r| r.parse::<f64>().ok()))
        .unwrap_or(0.0);
    let quarter_turns = (rotation / 90.0).round() as i64;
    let (width, height) = if quarter_turns.rem_euclid(2) == 1 {
        (height, width)
    } else {
        (width, height)
    };

    let source_fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate));

    let duration = stream
        .duration
        .or_else(|| probe.format.and_then(|f| f.duration))
        .and_then(|d| d.parse::<f64>().ok());

    Ok(VideoInfo {
        width,
        height,
        source_fps,
        duration,
    })
}

/// Parse ffprobe rates such as "30000/1001" or "25"
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn noisy_frames(count: usize, size: u32) -> Vec<RgbaImage> {
        let mut state: u32 = 0x9E37_79B9;
        (0..count)
            .map(|_| {
                RgbaImage::from_fn(size, size, |_, _| {
                    state ^= state << 13;
                    state ^= state >> 17;
                    state ^= state << 5;
                    let [r, g, b, _] = state.to_le_bytes();
                    Rgba([r, g, b, 255])
                })
            })
            .collect()
    }

    fn write_initial(output: &Path, frames: &[RgbaImage], fps: f64) -> u64 {
        animation::write_frames(output, frames, fps, ENCODE_SPEED).unwrap()
    }

    #[test]
    fn test_reduction_not_needed_leaves_file() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("clip.gif");
        let frames = noisy_frames(6, 8);
        let size = write_initial(&output, &frames, 10.0);
        let before = std::fs::read(&output).unwrap();

        let outcome = VideoProcessor::reduce_to_target(frames, 10.0, size, &output, size).unwrap();

        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.frame_count, 6);
        assert_eq!(outcome.fps, 10.0);
        assert_eq!(std::fs::read(&output).unwrap(), before);
    }

    #[test]
    fn test_reduction_bottoms_out_at_two_frames() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("clip.gif");
        let frames = noisy_frames(16, 16);
        let size = write_initial(&output, &frames, 10.0);

        let outcome = VideoProcessor::reduce_to_target(frames, 10.0, size, &output, 1).unwrap();

        // 16 -> 8 -> 4 -> 2
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.frame_count, 2);
        assert_eq!(outcome.fps, 10.0 / 8.0);
        assert!(!outcome.within_budget(1));
        assert_eq!(animation::read_frames(&output).unwrap().len(), 2);
        assert_eq!(std::fs::metadata(&output).unwrap().len(), outcome.size_bytes);
    }

    #[test]
    fn test_frame_count_follows_ceil_halving() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("clip.gif");
        let frames = noisy_frames(13, 16);
        let size = write_initial(&output, &frames, 10.0);

        let outcome = VideoProcessor::reduce_to_target(frames, 10.0, size, &output, 1).unwrap();

        // 13 -> 7 -> 4 -> 2
        let n = outcome.iterations as i32;
        assert_eq!(n, 3);
        assert_eq!(outcome.frame_count, (13f64 / 2f64.powi(n)).ceil() as usize);
        assert_eq!(outcome.fps, 10.0 / 2f64.powi(n));
    }

    #[test]
    fn test_reduction_stops_once_within_budget() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("clip.gif");
        let frames = noisy_frames(16, 16);
        let size = write_initial(&output, &frames, 10.0);
        let target = size * 6 / 10;

        let outcome = VideoProcessor::reduce_to_target(frames, 10.0, size, &output, target).unwrap();

        assert!(outcome.within_budget(target) || outcome.frame_count <= MIN_FRAMES);
        assert!(outcome.iterations >= 1);
        assert!(outcome.frame_count < 16);
    }

    #[test]
    fn test_short_clip_oversize_is_accepted() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("clip.gif");
        let frames = noisy_frames(2, 16);
        let size = write_initial(&output, &frames, 10.0);

        let outcome = VideoProcessor::reduce_to_target(frames, 10.0, size, &output, 1).unwrap();

        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.frame_count, 2);
    }

    #[test]
    fn test_scaled_width_preserves_aspect() {
        let info = VideoInfo {
            width: 1920,
            height: 1080,
            source_fps: Some(30.0),
            duration: Some(30.0),
        };
        assert_eq!(info.scaled_width(360), 640);

        let tall = VideoInfo {
            width: 10,
            height: 4000,
            source_fps: None,
            duration: None,
        };
        assert_eq!(tall.scaled_width(360), 1);
    }

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{
            "streams": [{
                "index": 0,
                "codec_type": "video",
                "width": 1280,
                "height": 720,
                "avg_frame_rate": "30000/1001",
                "r_frame_rate": "30000/1001",
                "duration": "30.030000"
            }],
            "format": {"duration": "30.100000"}
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.width, 1280);
        assert_eq!(info.height, 720);
        assert!((info.source_fps.unwrap() - 29.97).abs() < 0.01);
        assert_eq!(info.duration, Some(30.03));
    }

    #[test]
    fn test_parse_probe_output_rotated() {
        let json = br#"{
            "streams": [{
                "width": 1920,
                "height": 1080,
                "avg_frame_rate": "0/0",
                "r_frame_rate": "25/1",
                "side_data_list": [{"side_data_type": "Display Matrix", "rotation": -90}]
            }],
            "format": {"duration": "4.0"}
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert_eq!((info.width, info.height), (1080, 1920));
        assert_eq!(info.source_fps, Some(25.0));
        assert_eq!(info.duration, Some(4.0));
    }

    #[test]
    fn test_parse_probe_output_without_video_stream() {
        assert!(parse_probe_output(br#"{"streams": []}"#).is_err());
        assert!(parse_probe_output(b"not json").is_err());
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_read_raw_frames_drops_truncated_tail() {
        let frame_len = 2 * 2 * 4;
        let mut data = vec![7u8; frame_len * 3];
        data.extend_from_slice(&[1, 2, 3]);
        let mut cursor = std::io::Cursor::new(data);

        let frames = read_raw_frames(&mut cursor, frame_len, 2, 2).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].get_pixel(1, 1), &Rgba([7, 7, 7, 7]));
    }

    fn clip_of(frames: Vec<RgbaImage>, fps: f64) -> VideoClip {
        let (width, height) = frames[0].dimensions();
        VideoClip {
            frames,
            fps,
            width,
            height,
        }
    }

    #[test]
    fn test_lower_optimize_quality_gives_smaller_file() {
        let temp_dir = TempDir::new().unwrap();
        let frames = noisy_frames(4, 64);

        let mut sizes = Vec::new();
        for quality in [100u8, 10] {
            let output = temp_dir.path().join(format!("q{}.gif", quality));
            write_initial(&output, &frames, 10.0);
            let processor = VideoProcessor::new(VideoSettings {
                optimize_quality: quality,
                ..VideoSettings::default()
            });
            let (optimized, size) = processor.optimize_pass(&output, 10.0).unwrap();
            assert_eq!(optimized.len(), 4);
            assert_eq!(size, std::fs::metadata(&output).unwrap().len());
            sizes.push(size);
        }

        assert!(sizes[1] < sizes[0], "q10 {} should be below q100 {}", sizes[1], sizes[0]);
    }

    #[test]
    fn test_optimize_pass_rewrites_file_with_reduced_palette() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("clip.gif");
        write_initial(&output, &noisy_frames(3, 48), 10.0);

        let processor = VideoProcessor::new(VideoSettings {
            optimize_quality: 1,
            ..VideoSettings::default()
        });
        processor.optimize_pass(&output, 10.0).unwrap();

        for frame in animation::read_frames(&output).unwrap() {
            let colours: std::collections::HashSet<[u8; 4]> = frame.pixels().map(|p| p.0).collect();
            assert!(colours.len() <= animation::palette_size(1));
        }
    }

    #[test]
    fn test_encode_clip_within_budget_keeps_every_frame() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("clip.gif");
        let clip = clip_of(noisy_frames(6, 36), 10.0);

        let processor = VideoProcessor::new(VideoSettings::default());
        let outcome = processor.encode_clip(clip, &output, u64::MAX).unwrap();

        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.frame_count, 6);
        assert_eq!(outcome.fps, 10.0);
        assert_eq!(std::fs::metadata(&output).unwrap().len(), outcome.size_bytes);

        let written = animation::read_frames(&output).unwrap();
        assert_eq!(written.len(), 6);
        assert_eq!(written[0].dimensions(), (36, 36));
    }

    #[test]
    fn test_encode_clip_reduces_to_frame_floor() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("clip.gif");
        let clip = clip_of(noisy_frames(10, 24), 10.0);

        let processor = VideoProcessor::new(VideoSettings::default());
        let outcome = processor.encode_clip(clip, &output, 1).unwrap();

        // 10 -> 5 -> 3 -> 2
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.frame_count, MIN_FRAMES);
        assert_eq!(outcome.fps, 10.0 / 8.0);
        assert_eq!(std::fs::metadata(&output).unwrap().len(), outcome.size_bytes);
        assert_eq!(animation::read_frames(&output).unwrap().len(), MIN_FRAMES);
    }

    #[test]
    fn test_encode_clip_meets_budget_or_floor() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("clip.gif");
        let clip = clip_of(noisy_frames(12, 32), 10.0);
        let full = animation::write_frames(&temp_dir.path().join("full.gif"), &clip.frames, 10.0, ENCODE_SPEED).unwrap();
        let target = full / 3;

        let processor = VideoProcessor::new(VideoSettings::default());
        let outcome = processor.encode_clip(clip, &output, target).unwrap();

        let on_disk = std::fs::metadata(&output).unwrap().len();
        assert_eq!(on_disk, outcome.size_bytes);
        assert!(on_disk <= target || outcome.frame_count <= MIN_FRAMES);
        assert_eq!(
            outcome.frame_count,
            (12f64 / 2f64.powi(outcome.iterations as i32)).ceil() as usize
        );
    }

    /// Full pipeline against a synthetic clip
    #[test]
    #[ignore = "requires ffmpeg and ffprobe"]
    fn test_convert_synthetic_clip() {
        let platform = PlatformCommands::instance();
        let ffmpeg = platform.tool_path("ffmpeg").unwrap();
        assert!(platform.is_command_available("ffprobe"));

        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("clip.mp4");
        let output = temp_dir.path().join("clip.gif");

        let status = Command::new(ffmpeg)
            .args(["-v", "error", "-f", "lavfi", "-i", "testsrc=duration=3:size=640x480:rate=30"])
            .args(["-pix_fmt", "yuv420p", "-y"])
            .arg(&input)
            .status()
            .unwrap();
        assert!(status.success());

        let processor = VideoProcessor::new(VideoSettings::default());
        let target = 200 * 1024;
        let outcome = processor.convert_file(&input, &output, target).unwrap();

        assert!(outcome.within_budget(target) || outcome.frame_count <= MIN_FRAMES);
        let frames = animation::read_frames(&output).unwrap();
        assert_eq!(frames.len(), outcome.frame_count);
        assert_eq!(frames[0].height(), 360);
        assert_eq!(frames[0].width(), 480);
    }
}
