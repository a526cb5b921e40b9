//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei media e le utilità sui file.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di file media in directory
//! - Classificazione formato file (immagine vs video) tramite estensione
//! - Formattazione delle dimensioni in KB per le righe di log
//!
//! ## Formati supportati (case-insensitive):
//! - **Immagini**: PNG, JPG, JPEG → convertite in WebP
//! - **Video**: MP4, AVI, MOV, MKV, FLV, WMV → convertiti in GIF
//!
//! Tutti gli altri file vengono ignorati silenziosamente.
//!
//! ## Errori:
//! - Se la directory radice non è leggibile l'errore viene propagato (fatale per il batch)
//! - Le sottodirectory illeggibili vengono segnalate con `warn!` e saltate
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::find_media_files(Path::new("img"))?;
//! for file in files {
//!     match FileManager::classify(&file) {
//!         Some(MediaKind::Image) => { /* webp */ }
//!         Some(MediaKind::Video) => { /* gif */ }
//!         None => {}
//!     }
//! }
//! ```

use crate::error::ConvertError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "flv", "wmv"];

/// Which encoder a file is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Extension of the converted file
    pub fn output_extension(&self) -> &'static str {
        match self {
            Self::Image => "webp",
            Self::Video => "gif",
        }
    }

    /// Format name used in console lines
    pub fn output_format(&self) -> &'static str {
        match self {
            Self::Image => "WebP",
            Self::Video => "GIF",
        }
    }
}

/// Manages file discovery and size utilities
pub struct FileManager;

impl FileManager {
    /// Find all supported media files below `media_dir`.
    ///
    /// Only a failure to read the root itself is returned as an error.
    pub fn find_media_files(media_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(media_dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("cannot walk input directory"));
                    return Err(ConvertError::filesystem(media_dir, source).into());
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && Self::is_supported_format(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Classify a path by its extension
    pub fn classify(path: &Path) -> Option<MediaKind> {
        let ext_lower = path.extension()?.to_string_lossy().to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext_lower.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext_lower.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Check if a file format is supported
    pub fn is_supported_format(path: &Path) -> bool {
        Self::classify(path).is_some()
    }

    /// Size in KB with two decimals, as printed on the per-file lines
    pub fn format_kb(size: u64) -> String {
        format!("{:.2} KB", size as f64 / 1024.0)
    }
}
