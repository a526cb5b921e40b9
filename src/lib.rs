//! # Media Budget Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce `convert_all` come punto di ingresso per main.rs e altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `file_manager`: Discovery media e classificazione per estensione
//! - `image_processor`: Immagini → WebP entro un budget (ricerca sulla qualità)
//! - `video_processor`: Video → GIF entro un budget (riduzione dei frame)
//! - `animation`: Lettura/scrittura frame GIF
//! - `converter`: Dispatcher del batch, job per file, calcolo path di output
//! - `platform`: Risoluzione dei tool esterni (ffmpeg, ffprobe)
//! - `progress`: Progress bar
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use media_budget_converter::{convert_all, Config};
//!
//! let config = Config {
//!     image_size_kb: 50,
//!     ..Default::default()
//! };
//! let results = convert_all(config).await?;
//! ```

pub mod animation;
pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod platform;
pub mod progress;
pub mod video_processor;

pub use config::{Config, VideoSettings};
pub use converter::{BatchDispatcher, ConversionJob, EncodeResult, EncodeStatus};
pub use error::ConvertError;
pub use image_processor::ImageProcessor;
pub use video_processor::VideoProcessor;

/// Convert every image and video under `config.input_path` into `config.output_path`.
///
/// Per-file failures are logged and returned as `EncodeStatus::Failure`; only an
/// invalid configuration or an unreadable input root yields `Err`.
pub async fn convert_all(config: Config) -> anyhow::Result<Vec<EncodeResult>> {
    BatchDispatcher::new(config)?.run().await
}
