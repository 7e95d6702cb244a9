use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub search: SearchConfig,
  #[serde(default)]
  pub detail: DetailConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Root of the API, ending in a slash
  pub base_url: String,
  /// Host every deprecated host is rewritten to
  pub canonical_host: String,
  pub deprecated_hosts: Vec<String>,
  /// Rewrite http:// references to https://
  pub upgrade_insecure: bool,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://swapi.py4e.com/api/".to_string(),
      canonical_host: "swapi.py4e.com".to_string(),
      deprecated_hosts: vec!["swapi.dev".to_string()],
      upgrade_insecure: true,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
  /// Quiet period after the last keystroke before a search is issued
  pub debounce_ms: u64,
}

impl SearchConfig {
  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self { debounce_ms: 400 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetailConfig {
  /// Maximum number of co-cast members resolved for one person (at most 24)
  pub co_cast_limit: usize,
  /// Films prefetched when hovering a person
  pub prefetch_films: usize,
}

impl Default for DetailConfig {
  fn default() -> Self {
    Self {
      co_cast_limit: 24,
      prefetch_films: 3,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Persist responses across runs
  pub persist: bool,
  /// Database location (defaults to $XDG_DATA_HOME/swx/cache.db)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      persist: true,
      path: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./swx.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/swx/config.yaml
  ///
  /// Without any file the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("swx.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("swx").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file deserializes to null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }
}
