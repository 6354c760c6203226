use clap::{Parser, Subcommand, builder::styling};
use corpus_pipeline::cli::{self, RunOverrides};
use corpus_pipeline::etl::Stage;
use eyre::Result;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Corpus pipeline: filter and clean text datasets per source, then across sources
#[derive(Parser)]
#[command(name = "corpus", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source settings from (ignored if missing)
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline manifest and write one NDJSON file per source
    Run {
        /// The pipeline manifest
        #[arg(default_value = "pipeline.yml")]
        manifest: PathBuf,

        /// Directory to write cleaned sources to [default: output/ next to the manifest]
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Annotate rows with filter criteria instead of removing them
        #[arg(long)]
        dry_run: bool,

        /// Run cleaners before filters
        #[arg(long)]
        cleaning_first: bool,

        /// Worker threads per dataset operation
        #[arg(short = 'j', long)]
        num_proc: Option<usize>,
    },

    /// Validate a manifest and the transforms it names without reading data
    Check {
        /// The pipeline manifest
        #[arg(default_value = "pipeline.yml")]
        manifest: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if Path::new(&cli.env).exists() {
        dotenvy::from_filename(&cli.env)?;
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match cli.command {
        Commands::Run {
            manifest,
            output_dir,
            dry_run,
            cleaning_first,
            num_proc,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| cli::default_output_dir(&manifest));
            log::info!(
                "Running {} into {}",
                manifest.display().bright_black(),
                output_dir.display().bright_black()
            );
            let overrides = RunOverrides {
                dry_run,
                cleaning_first,
                num_proc,
            };
            let summary = cli::run_manifest(&manifest, &output_dir, &overrides).await?;

            if summary.global == Stage::GlobalDone {
                log::info!("Global stage: {}", "applied".cyan());
            }
            for (name, rows) in &summary.rows {
                log::info!("✓ {}: {} row(s)", name.green(), rows);
            }
        }
        Commands::Check { manifest } => {
            let count = cli::check_manifest(&manifest)?;
            log::info!(
                "✓ {} is valid ({} source(s))",
                manifest.display().bright_black(),
                count
            );
        }
    }

    Ok(())
}
