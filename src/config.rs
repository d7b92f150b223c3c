use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directories searched for `exiftool` before falling back to `PATH`.
pub const DEFAULT_SEARCH_PATHS: &[&str] = &["/usr/local/bin", "/opt/homebrew/bin", "/usr/bin", "/bin"];

/// Top-level configuration for film-exif.
///
/// Controls how `exiftool` is located and invoked, how many files are tagged
/// at once, and whether anything is actually written.
///
/// # Loading
///
/// ```rust,no_run
/// use film_exif::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.batch.concurrency = 8;
/// config.exiftool.path = Some("/opt/homebrew/bin/exiftool".into());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How to find and run exiftool.
    pub exiftool: ExifToolConfig,
    /// Worker pool and per-directory input settings.
    pub batch: BatchConfig,
    /// Output behavior.
    pub output: OutputConfig,
}

/// exiftool discovery and invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExifToolConfig {
    /// Explicit executable path. Takes precedence over the search paths.
    pub path: Option<String>,
    /// Directories probed for an `exiftool` executable, in order, before `PATH`.
    pub search_paths: Vec<String>,
    /// Upper bound for a single exiftool invocation.
    pub timeout_secs: u64,
    /// Pass `-P` so exiftool keeps the file modification date.
    pub preserve_file_times: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of files tagged at the same time.
    pub concurrency: usize,
    /// Name of the per-directory metadata file.
    pub metadata_file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// If `true`, log the tag requests without running exiftool.
    pub dry_run: bool,
}

impl Default for ExifToolConfig {
    fn default() -> Self {
        Self {
            path: None,
            search_paths: DEFAULT_SEARCH_PATHS.iter().map(|s| s.to_string()).collect(),
            timeout_secs: 60,
            preserve_file_times: true,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 20,
            metadata_file: "metadata.json".to_string(),
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Effective worker count, never below one.
    pub fn concurrency(&self) -> usize {
        self.batch.concurrency.max(1)
    }
}
