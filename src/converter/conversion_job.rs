//! # Conversion Job Module
//!
//! Worker per la conversione di un singolo file.
//! Ogni job viene consumato una sola volta (`execute(self)`) e non restituisce
//! mai un errore al chiamante: qualsiasi fallimento diventa un
//! `EncodeStatus::Failure` con il messaggio completo della catena di cause.

use crate::{
    config::{Config, VideoSettings},
    file_manager::{FileManager, MediaKind},
    converter::path_resolver::PathResolver,
    image_processor::ImageProcessor,
    video_processor::VideoProcessor,
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// One discovered file and everything needed to convert it
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub source_path: PathBuf,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub image_budget_bytes: u64,
    pub video_budget_bytes: u64,
    pub kind: MediaKind,
    pub video: VideoSettings,
}

/// Outcome of a single job
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeStatus {
    Success {
        output_path: PathBuf,
        final_size_bytes: u64,
    },
    Failure {
        reason: String,
    },
}

/// Per-file result, logged by the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeResult {
    pub source_path: PathBuf,
    pub kind: MediaKind,
    pub status: EncodeStatus,
}

impl EncodeResult {
    pub fn failure(source_path: PathBuf, kind: MediaKind, reason: String) -> Self {
        Self {
            source_path,
            kind,
            status: EncodeStatus::Failure { reason },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, EncodeStatus::Success { .. })
    }

    fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }

    /// Print the console line for this file
    pub fn log(&self) {
        match &self.status {
            EncodeStatus::Success { final_size_bytes, .. } => info!(
                "Converted {} to {}. Final size: {}",
                self.file_name(),
                self.kind.output_format(),
                FileManager::format_kb(*final_size_bytes)
            ),
            EncodeStatus::Failure { reason } => {
                error!("Error converting {}: {}", self.file_name(), reason)
            }
        }
    }
}

impl ConversionJob {
    /// Build the job for `source_path`, or `None` when the extension is not on the allow-list
    pub fn from_config(source_path: PathBuf, config: &Config) -> Option<Self> {
        let kind = FileManager::classify(&source_path)?;
        Some(Self {
            source_path,
            input_root: config.input_path.clone(),
            output_root: config.output_path.clone(),
            image_budget_bytes: config.image_budget_bytes(),
            video_budget_bytes: config.video_budget_bytes(),
            kind,
            video: config.video_settings(),
        })
    }

    /// Calcola path di output atteso (delegato a PathResolver)
    pub fn output_path(&self) -> Result<PathBuf> {
        PathResolver::get_output_path(&self.source_path, &self.input_root, &self.output_root, self.kind)
    }

    /// Run the conversion to completion; every error ends up in the returned status
    pub fn execute(self) -> EncodeResult {
        let status = match self.convert() {
            Ok((output_path, final_size_bytes)) => EncodeStatus::Success {
                output_path,
                final_size_bytes,
            },
            Err(e) => EncodeStatus::Failure {
                reason: format!("{:#}", e),
            },
        };

        EncodeResult {
            source_path: self.source_path,
            kind: self.kind,
            status,
        }
    }

    fn convert(&self) -> Result<(PathBuf, u64)> {
        let output = self.output_path()?;
        PathResolver::ensure_parent_dirs(&output)?;
        debug!("Converting {} -> {}", self.source_path.display(), output.display());

        let size = match self.kind {
            MediaKind::Image => self.convert_image(&output)?,
            MediaKind::Video => self.convert_video(&output)?,
        };

        Ok((output, size))
    }

    fn convert_image(&self, output: &Path) -> Result<u64> {
        let encoded = ImageProcessor::new().convert_file(&self.source_path, output, self.image_budget_bytes)?;
        debug!(
            "{}: quality {} after {} attempts",
            self.source_path.display(),
            encoded.quality,
            encoded.attempts
        );
        Ok(encoded.size())
    }

    fn convert_video(&self, output: &Path) -> Result<u64> {
        let outcome = VideoProcessor::new(self.video)
            .convert_file(&self.source_path, output, self.video_budget_bytes)?;
        debug!(
            "{}: {} frames at {} fps after {} reductions",
            self.source_path.display(),
            outcome.frame_count,
            outcome.fps,
            outcome.iterations
        );

        Ok(outcome.size_bytes)
    }
}
