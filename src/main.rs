use clap::{Parser, Subcommand};
use imgbatch::batch::{self, BatchReport};
use imgbatch::config::{self, AppConfig};
use imgbatch::imaging::{AspectPreset, RustBackend};
use imgbatch::output;
use imgbatch::pdf;
use imgbatch::session::Session;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imgbatch")]
#[command(about = "Batch image converter: grayscale, black and white, PDF and resize")]
#[command(long_about = "\
Batch image converter: grayscale, black and white, PDF and resize

Every command works on the images directly inside one folder (subfolders are
not entered). Run without a command for the interactive menu.

  grayscale  photo.png -> photo_grayscale.png   (png, jpg, jpeg)
  bw         photo.png -> photo_bw.png          (png, jpg, jpeg)
  pdf        all images -> <folder>/output.pdf  (png, jpg, jpeg, bmp, gif)
  resize     stretch to a preset aspect ratio, OVERWRITING the originals

Config files are layered: stock defaults, then ./imgbatch.toml (or --config),
then <folder>/imgbatch.toml. Run 'imgbatch gen-config' for a documented file.

Set RUST_LOG=debug for per-file diagnostics on stderr.")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./imgbatch.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print batch reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write a grayscale copy of every png/jpg/jpeg image
    Grayscale {
        /// Input folder
        dir: PathBuf,
    },
    /// Write a black-and-white copy of every png/jpg/jpeg image
    #[command(name = "bw")]
    BlackAndWhite {
        /// Input folder
        dir: PathBuf,
        /// Pixels brighter than this become white (overrides config)
        #[arg(long)]
        threshold: Option<u8>,
    },
    /// Combine every image into one PDF, one centered image per page
    Pdf {
        /// Input folder
        dir: PathBuf,
        /// Write the PDF here instead of <DIR>/output.pdf
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Stretch every image to a preset aspect ratio, overwriting originals
    Resize {
        /// Input folder
        dir: PathBuf,
        /// Preset number 1-10 (see 'imgbatch presets')
        #[arg(long)]
        preset: String,
        /// Confirm that the original files may be overwritten
        #[arg(long)]
        yes: bool,
    },
    /// List the numbered aspect-ratio presets
    Presets,
    /// Print a stock imgbatch.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match &cli.command {
        Some(Command::Presets) => {
            output::print_presets();
            return Ok(());
        }
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        _ => {}
    }

    let base = config::base_layer(cli.config.as_deref())?;
    let user_config = config::resolve_config(base.clone(), None)?;
    init_thread_pool(&user_config.processing);
    let backend = RustBackend::new();

    match cli.command {
        None => {
            let stdin = std::io::stdin();
            Session::new(&backend, base).run(stdin.lock(), std::io::stdout())?;
        }
        Some(Command::Grayscale { dir }) => {
            let config = config::config_for_folder(&base, &dir)?;
            let report = batch::run_grayscale(&backend, &dir, &config)?.require_inputs()?;
            show_report(&report, cli.json)?;
        }
        Some(Command::BlackAndWhite { dir, threshold }) => {
            let mut config = config::config_for_folder(&base, &dir)?;
            if let Some(threshold) = threshold {
                config.black_and_white.threshold = threshold;
            }
            let report = batch::run_black_and_white(&backend, &dir, &config)?.require_inputs()?;
            show_report(&report, cli.json)?;
        }
        Some(Command::Pdf { dir, output }) => {
            let config = config::config_for_folder(&base, &dir)?;
            let report = pdf::images_to_pdf(&backend, &dir, output.as_deref(), &config)?;
            show_report(&report, cli.json)?;
        }
        Some(Command::Resize { dir, preset, yes }) => {
            let preset: AspectPreset = preset.parse()?;
            let config = config::config_for_folder(&base, &dir)?;
            require_resize_confirmation(&config, &dir, yes)?;
            let report = batch::run_resize(&backend, &dir, preset, &config)?;
            show_report(&report, cli.json)?;
        }
        Some(Command::Presets) | Some(Command::GenConfig) => {}
    }

    Ok(())
}

/// Structured diagnostics on stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn require_resize_confirmation(
    config: &AppConfig,
    dir: &Path,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.resize.confirm_overwrite && !yes {
        return Err(format!(
            "resize overwrites the original images in {}; pass --yes to confirm",
            dir.display()
        )
        .into());
    }
    Ok(())
}

fn show_report(report: &BatchReport, json: bool) -> Result<(), serde_json::Error> {
    if json {
        output::print_batch_report_json(report)
    } else {
        output::print_batch_report(report);
        Ok(())
    }
}
