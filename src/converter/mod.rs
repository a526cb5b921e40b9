//! # Converter Module
//!
//! Modulo che separa le responsabilità del batch in sottomoduli:
//! - `batch_dispatcher`: Discovery, pool di worker e raccolta risultati
//! - `conversion_job`: Worker per il singolo file (isolamento errori)
//! - `path_resolver`: Logica di calcolo path di output centralizzata

pub mod batch_dispatcher;
pub mod conversion_job;
pub mod path_resolver;

pub use batch_dispatcher::BatchDispatcher;
pub use conversion_job::{ConversionJob, EncodeResult, EncodeStatus};
pub use path_resolver::PathResolver;
