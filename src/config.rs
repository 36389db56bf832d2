//! Application configuration management.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config PATH`, or `config.toml` in the platform config dir)
//! 3. `CROSSDUPE_*` environment variables
//! 4. Command-line flags ([`Config::apply_cli`])
//!
//! ```toml
//! workers = 8
//! hash_algorithm = "blake3"
//! match_key = "relative-path"
//! trash = true
//! progress = false
//! buffer_size = 131072
//! ```

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::duplicates::MatchKey;
use crate::scanner::hasher::DEFAULT_BUFFER_SIZE;
use crate::scanner::{default_workers, HashAlgorithm};

/// Prefix of environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "CROSSDUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hashing workers (at least 1)
    pub workers: usize,
    /// Content fingerprint algorithm
    pub hash_algorithm: HashAlgorithm,
    /// How files in two directories are paired up
    pub match_key: MatchKey,
    /// Move deleted files to the trash instead of removing them
    pub trash: bool,
    /// Draw progress bars
    pub progress: bool,
    /// Read buffer for hashing, in bytes
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            hash_algorithm: HashAlgorithm::default(),
            match_key: MatchKey::default(),
            trash: false,
            progress: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// A missing default config file is not an error. A missing file named
    /// with `--config` is.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any layer holds an
    /// invalid value.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
        }

        let file = explicit.map(Path::to_path_buf).or_else(Self::config_path);
        if let Some(path) = &file {
            log::debug!("Reading config from {}", path.display());
        }

        let config: Config = Self::figment(file.as_deref())
            .extract()
            .context("invalid configuration")?;
        Ok(config.normalized())
    }

    fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn normalized(mut self) -> Self {
        self.workers = self.workers.max(1);
        self.buffer_size = self.buffer_size.max(1);
        self
    }

    /// Overlay command-line flags. Flags only ever switch a setting on or
    /// replace a value; an absent flag keeps the loaded value.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(workers) = cli.workers {
            self.workers = workers.max(1);
        }
        if let Some(algorithm) = cli.hash_algorithm {
            self.hash_algorithm = algorithm;
        }
        if cli.match_relative_path {
            self.match_key = MatchKey::RelativePath;
        }
        if cli.trash {
            self.trash = true;
        }
        if cli.no_progress {
            self.progress = false;
        }
    }

    /// Save the configuration to the default platform-specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if no config directory exists for this platform or
    /// the file cannot be written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save the configuration as TOML at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("cannot serialize configuration")?;
        fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "crossdupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
