use anyhow::Result;
use clap::Parser;
use fmd_core::EstimatorKind;
use fmd_io::Config;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "fmd", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (default: ~/.config/fmd/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Compute the Frechet Music Distance between two embedding sets
    ///
    /// Both files hold one embedding per music piece, as produced by an
    /// external feature extractor, in JSON:
    ///
    /// - a bare array of rows: [[0.1, 0.2, ...], ...]
    /// - or an object: {"embeddings": [[0.1, 0.2, ...], ...]}
    ///
    /// A Gaussian is fitted to each set independently with the selected
    /// estimator, and the squared Frechet distance between the two Gaussians
    /// is printed. Lower is closer; identical sets score 0.
    ///
    /// Both sets must share the same embedding dimensionality. The number of
    /// pieces may differ. When a set has fewer pieces than dimensions, prefer
    /// `--estimator shrinkage`.
    Score {
        /// Embeddings of the reference corpus
        reference: PathBuf,

        /// Embeddings of the candidate (e.g. generated) corpus
        candidate: PathBuf,

        #[command(flatten)]
        estimator: EstimatorArgs,

        /// Relative eigenvalue tolerance for the matrix square root
        #[arg(long)]
        tolerance: Option<f64>,

        /// Print a JSON breakdown instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Fit a Gaussian to one embedding set and show diagnostics
    Fit {
        /// Embeddings to fit
        embeddings: PathBuf,

        #[command(flatten)]
        estimator: EstimatorArgs,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Inspect or initialize the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Args)]
struct EstimatorArgs {
    /// Gaussian estimator: mle or shrinkage (alias: ledoit_wolf)
    #[arg(long, short)]
    estimator: Option<EstimatorKind>,

    /// Column block width for the shrinkage estimator
    #[arg(long)]
    block_size: Option<usize>,
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults if it doesn't exist
    Init,
}

impl EstimatorArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(kind) = self.estimator {
            config.estimator = kind;
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.verbose {
        config.logging.level = String::from("debug");
    }

    twyg::setup(config.logging.to_twyg()?)
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {:?}", e))?;

    match cli.command {
        Commands::Score {
            reference,
            candidate,
            estimator,
            tolerance,
            json,
        } => {
            estimator.apply(&mut config);
            if let Some(tolerance) = tolerance {
                config.tolerance = tolerance;
            }
            commands::run_score(&config, &reference, &candidate, json)?;
        }
        Commands::Fit {
            embeddings,
            estimator,
            json,
        } => {
            estimator.apply(&mut config);
            commands::run_fit(&config, &embeddings, json)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config, cli.config.as_deref())?,
            ConfigAction::Path => commands::config::show_path(cli.config.as_deref())?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config(cli.config.as_deref())?,
        },
    }

    Ok(())
}
