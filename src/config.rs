//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di conversione
//! - Fornisce validazione robusta dei parametri di input
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `input_path`: Directory sorgente (default: "img")
//! - `output_path`: Directory di output, struttura speculare (default: "converted_img")
//! - `image_size_kb`: Budget per ogni WebP in KB (default: 100)
//! - `video_size_kb`: Budget per ogni GIF in KB (default: 1000)
//! - `workers`: Numero di worker paralleli (default: numero di CPU)
//! - `video_fps`: Frame rate iniziale delle GIF (default: 10)
//! - `video_height`: Altezza fissa delle GIF in pixel (default: 360)
//! - `gif_optimize_quality`: Qualità del passaggio di ottimizzazione GIF (default: 85)
//! - `show_progress`: Mostra la progress bar (default: true)
//!
//! I budget sono espressi in KB e convertiti in byte (×1024) internamente.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     image_size_kb: 50,
//!     workers: 8,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a conversion batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the tree to convert
    pub input_path: PathBuf,
    /// Root of the mirrored output tree
    pub output_path: PathBuf,
    /// Byte budget for each WebP, in KB
    pub image_size_kb: u64,
    /// Byte budget for each GIF, in KB
    pub video_size_kb: u64,
    /// Number of parallel workers
    pub workers: usize,
    /// Starting frame rate of the animated output
    pub video_fps: f64,
    /// Output height of the animated output, aspect ratio preserved
    pub video_height: u32,
    /// Fixed quality (1-100) of the one-time GIF optimization pass
    pub gif_optimize_quality: u8,
    /// Draw a progress bar while converting
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("img"),
            output_path: PathBuf::from("converted_img"),
            image_size_kb: 100,
            video_size_kb: 1000,
            workers: num_cpus::get(),
            video_fps: 10.0,
            video_height: 360,
            gif_optimize_quality: 85,
            show_progress: true,
        }
    }
}

/// Settings handed to every video job
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoSettings {
    pub fps: f64,
    pub height: u32,
    pub optimize_quality: u8,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            fps: 10.0,
            height: 360,
            optimize_quality: 85,
        }
    }
}

impl Config {
    pub fn image_budget_bytes(&self) -> u64 {
        self.image_size_kb.saturating_mul(1024)
    }

    pub fn video_budget_bytes(&self) -> u64 {
        self.video_size_kb.saturating_mul(1024)
    }

    pub fn video_settings(&self) -> VideoSettings {
        VideoSettings {
            fps: self.video_fps,
            height: self.video_height,
            optimize_quality: self.gif_optimize_quality,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.image_size_kb == 0 {
            return Err(anyhow::anyhow!("Image size budget must be greater than 0 KB"));
        }

        if self.video_size_kb == 0 {
            return Err(anyhow::anyhow!("Video size budget must be greater than 0 KB"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if !self.video_fps.is_finite() || self.video_fps <= 0.0 {
            return Err(anyhow::anyhow!("Video fps must be a positive number"));
        }

        // GIF logical screen dimensions are 16 bit
        if self.video_height == 0 || self.video_height > u16::MAX as u32 {
            return Err(anyhow::anyhow!("Video height must be between 1 and {}", u16::MAX));
        }

        if self.gif_optimize_quality == 0 || self.gif_optimize_quality > 100 {
            return Err(anyhow::anyhow!("GIF optimize quality must be between 1 and 100"));
        }

        Ok(())
    }
}
