use anyhow::{Context, Result};
use confyg::{env, Confygery};
use fmd_core::{
    Estimator, EstimatorKind, FrechetDistanceEngine, DEFAULT_BLOCK_SIZE,
    DEFAULT_EIGENVALUE_TOLERANCE,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for fmd.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (FMD_* prefix)
/// 3. Config file (~/.config/fmd/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Gaussian estimator used for both corpora.
    ///
    /// Can be set via:
    /// - CLI: --estimator shrinkage
    /// - ENV: FMD_ESTIMATOR
    /// - Config: estimator = "shrinkage"
    /// - Default: mle
    #[serde(default)]
    pub estimator: EstimatorKind,

    /// Column block width for the shrinkage estimator.
    ///
    /// Can be set via:
    /// - CLI: --block-size 512
    /// - Config: block_size = 512
    /// - Default: 1000
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Relative eigenvalue tolerance of the distance engine.
    ///
    /// Can be set via:
    /// - CLI: --tolerance 1e-8
    /// - Config: tolerance = 1e-8
    /// - Default: 1e-6
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging settings, handed to twyg at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_true")]
    pub coloured: bool,

    #[serde(default)]
    pub report_caller: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            estimator: EstimatorKind::default(),
            block_size: default_block_size(),
            tolerance: default_tolerance(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            coloured: true,
            report_caller: false,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/fmd/config.toml
    /// Reads environment variables with FMD_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from an explicit file path plus the environment.
    ///
    /// A missing file is not an error; defaults and environment apply.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("fmd");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;
        log::debug!(
            "Loaded configuration (estimator {}, block size {}, tolerance {:e})",
            config.estimator,
            config.block_size,
            config.tolerance
        );

        Ok(config)
    }

    /// Parse configuration from TOML text, without consulting the
    /// environment.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse configuration")
    }

    /// The estimator selected by this configuration.
    pub fn estimator(&self) -> Result<Estimator> {
        Estimator::new(self.estimator, self.block_size).context("Invalid estimator configuration")
    }

    /// A distance engine using the configured tolerance.
    pub fn engine(&self) -> Result<FrechetDistanceEngine> {
        FrechetDistanceEngine::with_tolerance(self.tolerance)
            .context("Invalid tolerance configuration")
    }
}

impl LoggingConfig {
    /// Build twyg options from these settings.
    pub fn to_twyg(&self) -> Result<twyg::Opts> {
        let level = match self.level.trim().to_ascii_lowercase().as_str() {
            "trace" => twyg::LogLevel::Trace,
            "debug" => twyg::LogLevel::Debug,
            "info" => twyg::LogLevel::Info,
            "warn" | "warning" => twyg::LogLevel::Warn,
            "error" => twyg::LogLevel::Error,
            other => anyhow::bail!(
                "Unknown log level: {}\n\nValid levels: trace, debug, info, warn, error",
                other
            ),
        };

        twyg::OptsBuilder::new()
            .coloured(self.coloured)
            .level(level)
            .report_caller(self.report_caller)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build logging options: {:?}", e))
    }
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_tolerance() -> f64 {
    DEFAULT_EIGENVALUE_TOLERANCE
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_true() -> bool {
    true
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/fmd/config.toml
/// - macOS: ~/Library/Application Support/fmd/config.toml
/// - Windows: %APPDATA%\fmd\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fmd")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# fmd Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (FMD_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Gaussian estimator applied to both corpora
#
# - "mle": sample mean and unbiased sample covariance
# - "shrinkage": Ledoit-Wolf shrinkage, better conditioned when a corpus
#   has fewer pieces than embedding dimensions
#
# Can also be set via:
# - CLI: fmd score --estimator shrinkage ref.json gen.json
# - Environment: FMD_ESTIMATOR=shrinkage
estimator = "mle"

# Column block width for the shrinkage estimator's internal products.
# Only changes memory use and floating-point accumulation order.
#block_size = 1000

# Relative tolerance for clipping round-off eigenvalues in the matrix
# square root. Larger values accept noisier inputs.
#tolerance = 1e-6

[logging]
level = "info"
coloured = true
report_caller = false
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    ensure_config_file_at(&config_file_path())
}

/// Create the example config file at `config_path` if it doesn't exist.
pub fn ensure_config_file_at(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
