//! # Image Format Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Merge tra file di configurazione opzionale e flag espliciti
//! - Avvio della conversione singola o batch
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (input, output, formato, qualità, resize, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, `RUST_LOG` se presente)
//! 3. Valida che il path di input esista
//! 4. Costruisce e valida la `Config`
//! 5. Converte un singolo file oppure l'intera directory
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-convert /path/to/photos --batch --format webp --quality 80 --recursive
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use image_format_converter::{
    file_manager::FileManager, BatchConverter, Config, FormatRegistry, ImageConverter, OutputMode, Reporter,
    ResizeSpec,
};

#[derive(Parser)]
#[command(name = "image-convert")]
#[command(about = "Convert images between JPEG, PNG, BMP, TIFF, GIF, WEBP and ICO")]
struct Args {
    /// Input image file or directory
    input_path: PathBuf,

    /// Output file or directory (defaults next to the input)
    output_path: Option<PathBuf>,

    /// Convert every supported image in the input directory
    #[arg(short, long)]
    batch: bool,

    /// Target format (jpg, jpeg, png, bmp, tiff, tif, gif, webp, ico) [default: png]
    #[arg(short, long)]
    format: Option<String>,

    /// JPEG/WEBP quality (1-100) [default: 95]
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Resize to WIDTHxHEIGHT (e.g. 800x600)
    #[arg(short, long, value_name = "WxH", allow_hyphen_values = true)]
    resize: Option<ResizeSpec>,

    /// Descend into subdirectories (batch mode)
    #[arg(long)]
    recursive: bool,

    /// Disable encoder optimization
    #[arg(long)]
    no_optimize: bool,

    /// Crop to fill the resize target, keeping aspect ratio (default)
    #[arg(long, overrides_with = "no_maintain_aspect")]
    maintain_aspect: bool,

    /// Stretch to the exact resize target
    #[arg(long, overrides_with = "maintain_aspect")]
    no_maintain_aspect: bool,

    /// Number of parallel workers (batch mode) [default: 4]
    #[arg(short, long)]
    workers: Option<usize>,

    /// Output progress and results as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// JSON configuration file supplying defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Explicit flags win over the configuration file
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref format) = self.format {
            config.target_format = format.clone();
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if self.resize.is_some() {
            config.resize = self.resize;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.no_optimize {
            config.optimize = false;
        }
        if self.no_maintain_aspect {
            config.maintain_aspect_ratio = false;
        } else if self.maintain_aspect {
            config.maintain_aspect_ratio = true;
        }
        config.recursive |= self.recursive;
        config.json_output |= self.json;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.input_path.exists() {
        return Err(anyhow::anyhow!("Input path does not exist: {}", args.input_path.display()));
    }

    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;

    let reporter = Reporter::new(if config.json_output { OutputMode::Json } else { OutputMode::Human });

    if args.batch {
        run_batch(&args, &config, reporter).await
    } else {
        run_single(&args, &config, reporter).await
    }
}

async fn run_single(args: &Args, config: &Config, reporter: Reporter) -> Result<()> {
    let output_path = match args.output_path {
        Some(ref path) => path.clone(),
        None => {
            let (ext, _) = FormatRegistry::parse_target(&config.target_format)?;
            args.input_path.with_extension(ext)
        }
    };

    let json = reporter.mode() == OutputMode::Json;
    let converter = ImageConverter::new(reporter);
    let options = config.conversion_options();
    let input = args.input_path.clone();
    let output = output_path.clone();

    let outcome = tokio::task::spawn_blocking(move || converter.convert(&input, &output, &options)).await?;

    if !outcome.is_success() {
        std::process::exit(1);
    }

    if !json {
        let original = FileManager::file_size(&args.input_path)?;
        let converted = FileManager::file_size(&output_path)?;
        println!("Converted: {} -> {}", args.input_path.display(), output_path.display());
        println!("Original size:  {}", FileManager::format_size(original));
        println!("Converted size: {}", FileManager::format_size(converted));
        println!("Size reduction: {:.1}%", FileManager::calculate_reduction(original, converted));
    }

    Ok(())
}

async fn run_batch(args: &Args, config: &Config, reporter: Reporter) -> Result<()> {
    let output_dir = match args.output_path {
        Some(ref path) => path.clone(),
        None => default_batch_output(&args.input_path),
    };

    let json = reporter.mode() == OutputMode::Json;
    let batch = BatchConverter::new(ImageConverter::new(reporter), config.conversion_options(), config.workers);
    let stats = batch
        .convert_all(&args.input_path, &output_dir, &config.target_format, config.recursive)
        .await;

    if !json {
        println!("Batch conversion complete:");
        println!("  Successful: {}", stats.success);
        println!("  Failed:     {}", stats.failed);
        println!("  Skipped:    {}", stats.skipped);
    }

    Ok(())
}

/// `<input>_converted`, ignoring trailing separators
fn default_batch_output(input: &Path) -> PathBuf {
    let mut name = input.components().as_path().as_os_str().to_os_string();
    name.push("_converted");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_resize_reports_dimensions_error() {
        let err = match Args::try_parse_from(["image-convert", "in.png", "--resize", "-5x10"]) {
            Ok(_) => panic!("negative resize accepted"),
            Err(e) => e,
        };
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("invalid resize dimensions"), "{}", err);
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "image-convert",
            "photos",
            "-b",
            "-f",
            "webp",
            "-r",
            "800x600",
            "--no-maintain-aspect",
            "--no-optimize",
        ])
        .unwrap();
        let mut config = Config {
            quality: 70,
            ..Config::default()
        };
        args.apply_to(&mut config);

        assert_eq!(config.target_format, "webp");
        assert_eq!(config.quality, 70);
        assert_eq!(config.resize, Some(ResizeSpec::new(800, 600).unwrap()));
        assert!(!config.maintain_aspect_ratio);
        assert!(!config.optimize);
    }

    #[test]
    fn test_default_batch_output() {
        assert_eq!(default_batch_output(Path::new("photos/")), PathBuf::from("photos_converted"));
        assert_eq!(default_batch_output(Path::new("/a/b")), PathBuf::from("/a/b_converted"));
    }
}
