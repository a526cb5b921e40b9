//! # Batch Dispatcher
//!
//! Orchestratore principale: trova i file, costruisce un `ConversionJob` per
//! ciascuno e li esegue su un pool di worker di dimensione fissa.
//!
//! ## Concorrenza
//! - Un semaforo con `workers` permessi limita i job in esecuzione
//! - Ogni job gira sul blocking pool di tokio (thread nativi, encode CPU-bound)
//! - I completamenti vengono raccolti in ordine arbitrario
//!
//! ## Isolamento
//! Un job non può far fallire il batch: gli errori diventano
//! `EncodeStatus::Failure` dentro il job, e un panic del worker viene
//! intercettato tramite il `JoinError`. L'unico errore fatale è l'impossibilità
//! di leggere la directory di input.

use crate::{
    config::Config,
    converter::conversion_job::{ConversionJob, EncodeResult},
    file_manager::{FileManager, MediaKind},
    progress::ProgressManager,
    video_processor::VideoProcessor,
};
use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Discovers, routes and runs every conversion of a batch
pub struct BatchDispatcher {
    config: Config,
}

impl BatchDispatcher {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Convert every supported file under the input root.
    ///
    /// Per-file failures are reported in the returned results; `Err` means the
    /// input root could not be enumerated.
    pub async fn run(&self) -> Result<Vec<EncodeResult>> {
        let start_time = Instant::now();
        let input = &self.config.input_path;

        info!("Starting conversion in: {}", input.display());
        let files = FileManager::find_media_files(input)?;

        if files.is_empty() {
            info!("No media files found to convert");
            return Ok(Vec::new());
        }

        let jobs: Vec<ConversionJob> = files
            .into_iter()
            .filter_map(|file| ConversionJob::from_config(file, &self.config))
            .collect();

        self.log_configuration(&jobs);
        self.check_dependencies(&jobs);

        let total = jobs.len() as u64;
        let progress = if self.config.show_progress {
            ProgressManager::new(total)
        } else {
            ProgressManager::hidden(total)
        };

        let results = self.dispatch(jobs, progress.clone()).await?;
        progress.finish();

        debug!(
            "Batch finished: {}/{} files reported in {:.1}s",
            progress.position(),
            total,
            start_time.elapsed().as_secs_f64()
        );
        Ok(results)
    }

    /// Run `jobs` on the worker pool and collect results as they complete
    async fn dispatch(&self, jobs: Vec<ConversionJob>, progress: ProgressManager) -> Result<Vec<EncodeResult>> {
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut pending = FuturesUnordered::new();

        for job in jobs {
            let permit = semaphore.clone().acquire_owned().await?;
            let source = job.source_path.clone();
            let kind = job.kind;
            let worker_progress = progress.clone();

            let handle = tokio::task::spawn_blocking(move || {
                // Released when the job finishes or unwinds
                let _permit = permit;
                let result = job.execute();
                report(&worker_progress, &result);
                result
            });

            let progress = progress.clone();
            pending.push(async move {
                match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        let result = EncodeResult::failure(source, kind, format!("worker panicked: {}", e));
                        report(&progress, &result);
                        result
                    }
                }
            });
        }

        let mut results = Vec::with_capacity(pending.len());
        while let Some(result) = pending.next().await {
            results.push(result);
        }

        Ok(results)
    }

    fn log_configuration(&self, jobs: &[ConversionJob]) {
        let videos = jobs
            .iter()
            .filter(|job| job.kind == MediaKind::Video)
            .count();

        info!("Output directory: {}", self.config.output_path.display());
        info!(
            "Found {} media files ({} images, {} videos)",
            jobs.len(),
            jobs.len() - videos,
            videos
        );
        info!(
            "Budgets: images {} KB, videos {} KB | workers: {}",
            self.config.image_size_kb, self.config.video_size_kb, self.config.workers
        );
    }

    /// Warn once when videos are queued but the video tools are missing
    fn check_dependencies(&self, jobs: &[ConversionJob]) {
        let has_videos = jobs.iter().any(|job| job.kind == MediaKind::Video);
        if has_videos {
            if let Err(e) = VideoProcessor::check_dependencies() {
                warn!("{:#}; video files will be reported as failed", e);
            }
        }
    }
}

fn report(progress: &ProgressManager, result: &EncodeResult) {
    progress.suspend(|| result.log());
    let name = result
        .source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    progress.update(&name);
}
