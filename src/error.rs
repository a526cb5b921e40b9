//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare gli errori di conversione
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//! - Mantiene la catena delle cause (`#[source]`) per i messaggi per-file
//!
//! ## Categorie di errori:
//! - `Decode`: Sorgente illeggibile o corrotta (decoder immagini)
//! - `FFmpeg`: Errori di probe/decodifica video con ffmpeg/ffprobe
//! - `Encode` / `Codec`: Errori durante l'encoding size-targeted
//! - `Filesystem`: Impossibile creare directory o scrivere l'output
//! - `MissingDependency`: Tool esterno mancante (ffmpeg, ffprobe)
//! - `Validation`: Errori di validazione input
//!
//! Nessuno di questi errori interrompe il batch: vengono convertiti in un
//! `EncodeResult::Failure` al confine del singolo job.
//!
//! ## Esempio:
//! ```rust,ignore
//! if !platform.is_command_available("ffmpeg") {
//!     return Err(ConvertError::MissingDependency("ffmpeg".to_string()).into());
//! }
//! ```

use std::path::{Path, PathBuf};

/// Custom error types for media conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("Cannot decode {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("Filesystem error at {}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConvertError {
    /// Wrap an I/O error with the path it happened on
    pub fn filesystem(path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}
