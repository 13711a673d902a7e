//! # Batch Converter
//!
//! Orchestratore della conversione di una directory.
//!
//! ## Flusso di esecuzione:
//! 1. **Validazione**: Directory di input e formato target (statistiche vuote se invalidi)
//! 2. **Output**: Creazione ricorsiva della directory di output
//! 3. **Discovery**: File supportati, ricorsiva o solo primo livello
//! 4. **Conversione**: Worker pool limitato da semaforo, `spawn_blocking` per file;
//!    input con lo stesso output vengono elaborati in sequenza nello stesso task
//! 5. **Skip**: Output esistente con stessa estensione → `Skipped`, verificato
//!    subito prima della conversione del file
//! 6. **Statistiche**: Aggregate in un unico punto mentre i risultati arrivano
//!
//! ## Error handling:
//! - Errori per singoli file non bloccano gli altri
//! - Directory mancante o formato target invalido non sono fatali: il batch
//!   ritorna statistiche a zero

use crate::{
    batch::path_resolver::PathResolver,
    config::ConversionOptions,
    error::ConvertError,
    file_manager::FileManager,
    format::FormatRegistry,
    image_processor::{ConversionOutcome, ImageConverter},
    progress::{BatchStats, ProgressManager},
};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::debug;

/// Converts every supported image of a directory to one target format
pub struct BatchConverter {
    converter: Arc<ImageConverter>,
    options: ConversionOptions,
    workers: usize,
}

impl BatchConverter {
    pub fn new(converter: ImageConverter, options: ConversionOptions, workers: usize) -> Self {
        Self {
            converter: Arc::new(converter),
            options,
            workers: workers.max(1),
        }
    }

    /// Convert all candidates under `input_dir` into `output_dir`.
    ///
    /// Never fails: run-level problems are reported and yield empty stats.
    pub async fn convert_all(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        target_format: &str,
        recursive: bool,
    ) -> BatchStats {
        let start_time = Instant::now();
        let reporter = self.converter.reporter();

        if !input_dir.exists() {
            reporter.error(&ConvertError::DirectoryMissing(input_dir.to_path_buf()));
            return BatchStats::new();
        }

        let target_ext = match FormatRegistry::parse_target(target_format) {
            Ok((ext, _)) => ext,
            Err(e) => {
                reporter.error(&e);
                return BatchStats::new();
            }
        };

        if let Err(e) = std::fs::create_dir_all(output_dir) {
            reporter.error(&ConvertError::Io(e));
            return BatchStats::new();
        }

        let files = self.collect_candidates(input_dir, output_dir, recursive);
        reporter.batch_started(input_dir, output_dir, &target_ext, recursive, files.len());

        let progress = reporter.progress(files.len());
        let mut stats = BatchStats::new();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut pending = FuturesUnordered::new();

        for (output, inputs) in Self::group_by_output(files, input_dir, output_dir, &target_ext) {
            let semaphore = Arc::clone(&semaphore);
            let converter = Arc::clone(&self.converter);
            let options = self.options;
            let target_ext = target_ext.clone();

            pending.push(async move {
                let _permit = semaphore.acquire_owned().await;
                let mut results = Vec::with_capacity(inputs.len());
                for input in inputs {
                    let outcome = Self::process_file(&converter, &input, &output, &target_ext, options).await;
                    // sizes now, a later input of the group may replace the output
                    let sizes = if outcome.is_success() {
                        FileManager::file_size(&input).ok().zip(FileManager::file_size(&output).ok())
                    } else {
                        None
                    };
                    results.push((input, outcome, sizes));
                }
                results
            });
        }

        while let Some(results) = pending.next().await {
            for (input, outcome, sizes) in results {
                Self::tally(&mut stats, progress.as_ref(), &input, &outcome, sizes);
            }
        }

        if let Some(progress) = progress {
            progress.finish(&stats.format_summary());
        }
        reporter.batch_finished(&stats, start_time.elapsed().as_secs_f64());

        stats
    }

    /// Candidates keyed by output path, in discovery order.
    ///
    /// Inputs sharing an output (`a.jpg`, `a.png` -> `a.png`) end up in one group and
    /// are processed one after the other, so the skip rule sees earlier results.
    fn group_by_output(
        files: Vec<PathBuf>,
        input_dir: &Path,
        output_dir: &Path,
        target_ext: &str,
    ) -> Vec<(PathBuf, Vec<PathBuf>)> {
        let mut groups: Vec<(PathBuf, Vec<PathBuf>)> = Vec::new();
        let mut index: HashMap<PathBuf, usize> = HashMap::new();

        for input in files {
            let output = PathResolver::output_path(&input, input_dir, output_dir, target_ext);
            match index.get(&output) {
                Some(&i) => groups[i].1.push(input),
                None => {
                    index.insert(output.clone(), groups.len());
                    groups.push((output, vec![input]));
                }
            }
        }

        groups
    }

    /// Skip check and conversion of one file, run right before its encode
    async fn process_file(
        converter: &Arc<ImageConverter>,
        input: &Path,
        output: &Path,
        target_ext: &str,
        options: ConversionOptions,
    ) -> ConversionOutcome {
        let reporter = converter.reporter();

        if PathResolver::should_skip(input, output, target_ext) {
            let outcome = ConversionOutcome::Skipped(format!("output already exists: {}", output.display()));
            reporter.conversion_finished(input, output, &outcome);
            return outcome;
        }

        if output.exists() {
            reporter.warning(&format!(
                "Overwriting existing output {} with conversion of {}",
                output.display(),
                input.display()
            ));
        }

        let task_converter = Arc::clone(converter);
        let (task_input, task_output) = (input.to_path_buf(), output.to_path_buf());
        match tokio::task::spawn_blocking(move || task_converter.convert(&task_input, &task_output, &options)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let outcome = ConversionOutcome::Failure(ConvertError::Io(std::io::Error::other(format!(
                    "conversion task failed: {}",
                    e
                ))));
                reporter.conversion_finished(input, output, &outcome);
                outcome
            }
        }
    }

    /// Supported files, excluding anything inside an output dir nested in the input dir
    fn collect_candidates(&self, input_dir: &Path, output_dir: &Path, recursive: bool) -> Vec<PathBuf> {
        let files = FileManager::find_image_files(input_dir, recursive);

        match PathResolver::nested_output_dir(input_dir, output_dir) {
            Some(nested) => files
                .into_iter()
                .filter(|file| {
                    let inside = file
                        .strip_prefix(input_dir)
                        .map(|rel| rel.starts_with(&nested))
                        .unwrap_or(false);
                    if inside {
                        debug!("Ignoring {} (inside output directory)", file.display());
                    }
                    !inside
                })
                .collect(),
            None => files,
        }
    }

    fn tally(
        stats: &mut BatchStats,
        progress: Option<&ProgressManager>,
        input: &Path,
        outcome: &ConversionOutcome,
        sizes: Option<(u64, u64)>,
    ) {
        stats.record(outcome);

        if let Some((original, converted)) = sizes {
            stats.add_sizes(original, converted);
        }

        if let Some(progress) = progress {
            let name = input.file_name().unwrap_or_default().to_string_lossy();
            let message = match outcome {
                ConversionOutcome::Success => format!("[OK] {}", name),
                ConversionOutcome::Skipped(_) => format!("[SKIP] {}", name),
                ConversionOutcome::Failure(_) => format!("[ERROR] {}", name),
            };
            progress.update(&message);
        }
    }
}
