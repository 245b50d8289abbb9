//! Configuration management for cvmtrack using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scrape::{BrowserOptions, RetryPolicy};

/// Bulk registry download, as named by the regulator.
pub const DEFAULT_BULK_FILENAME: &str = "oferta_resolucao_160.csv";

/// Canonical tracking table.
pub const DEFAULT_TABLE_FILENAME: &str = "DCM_CVM.csv";

/// Detail-page URL prefix; the record key is appended.
pub const DEFAULT_BASE_URL: &str = "https://web.cvm.gov.br/sre-publico-cvm/#/oferta-publica/";

/// First render wait in seconds. The page is an Angular shell that takes
/// a while to populate on first load.
pub const DEFAULT_INITIAL_WAIT_SECS: u64 = 20;

/// Wait after each reload, seconds.
pub const DEFAULT_RETRY_WAIT_SECS: u64 = 15;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory; feeds and the table live here by default.
    pub data_dir: PathBuf,
    /// Bulk feed filename inside the data directory.
    pub bulk_filename: String,
    /// Canonical table filename inside the data directory.
    pub table_filename: String,
    /// Reference feed filename inside the data directory, if configured.
    pub reference_filename: Option<String>,
    /// Detail-page URL prefix.
    pub base_url: String,
    /// Wait after first navigation, seconds.
    pub initial_wait_secs: u64,
    /// Wait after each reload, seconds.
    pub retry_wait_secs: u64,
    /// Fetch attempts per record.
    pub max_attempts: u32,
    /// Browser launch/connect options.
    pub browser: BrowserOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            bulk_filename: DEFAULT_BULK_FILENAME.to_string(),
            table_filename: DEFAULT_TABLE_FILENAME.to_string(),
            reference_filename: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            initial_wait_secs: DEFAULT_INITIAL_WAIT_SECS,
            retry_wait_secs: DEFAULT_RETRY_WAIT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            browser: BrowserOptions::default(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    pub fn bulk_path(&self) -> PathBuf {
        self.data_dir.join(&self.bulk_filename)
    }

    pub fn table_path(&self) -> PathBuf {
        self.data_dir.join(&self.table_filename)
    }

    pub fn reference_path(&self) -> Option<PathBuf> {
        self.reference_filename
            .as_ref()
            .map(|name| self.data_dir.join(name))
    }

    /// Fetch timing derived from the wait settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_wait: std::time::Duration::from_secs(self.initial_wait_secs),
            retry_wait: std::time::Duration::from_secs(self.retry_wait_secs),
        }
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory '{}': {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }
}

/// `[browser]` section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct BrowserFileConfig {
    /// Run Chrome headless (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headless: Option<bool>,
    /// Explicit Chrome executable path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    /// DevTools endpoint of an already-running Chrome (ws:// or http://).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// User agent override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Extra Chrome arguments appended to the stock set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub chrome_args: Vec<String>,
}

impl BrowserFileConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Bulk feed filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_feed: Option<String>,
    /// Canonical table filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Reference feed filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_feed: Option<String>,
    /// Detail-page URL prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Wait after first navigation, seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_wait_secs: Option<u64>,
    /// Wait after each reload, seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_wait_secs: Option<u64>,
    /// Fetch attempts per record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Browser options.
    #[serde(default, skip_serializing_if = "BrowserFileConfig::is_default")]
    #[prefer(default)]
    pub browser: BrowserFileConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers cvmtrack config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("cvmtrack").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(_) => Self::default(),
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML, YAML, and other formats based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// `base_dir` is used to resolve relative paths (typically config file dir or CWD).
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref bulk_feed) = self.bulk_feed {
            settings.bulk_filename = bulk_feed.clone();
        }
        if let Some(ref table) = self.table {
            settings.table_filename = table.clone();
        }
        if let Some(ref reference_feed) = self.reference_feed {
            settings.reference_filename = Some(reference_feed.clone());
        }
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(wait) = self.initial_wait_secs {
            settings.initial_wait_secs = wait;
        }
        if let Some(wait) = self.retry_wait_secs {
            settings.retry_wait_secs = wait;
        }
        if let Some(attempts) = self.max_attempts {
            settings.max_attempts = attempts;
        }

        if let Some(headless) = self.browser.headless {
            settings.browser.headless = headless;
        }
        if let Some(ref executable) = self.browser.executable {
            settings.browser.executable =
                Some(PathBuf::from(shellexpand::tilde(executable).as_ref()));
        }
        if let Some(ref remote_url) = self.browser.remote_url {
            settings.browser.remote_url = Some(remote_url.clone());
        }
        if let Some(ref user_agent) = self.browser.user_agent {
            settings.browser.user_agent = user_agent.clone();
        }
        if !self.browser.chrome_args.is_empty() {
            settings.browser.chrome_args = self.browser.chrome_args.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Data directory or table file (--data flag).
    /// Can be a directory containing the table or a .csv file directly.
    pub data: Option<PathBuf>,
}

/// Resolved data path information.
#[derive(Debug, Clone)]
pub struct ResolvedData {
    /// The canonical table filename.
    pub table_filename: String,
    /// The directory holding feeds and table.
    pub data_dir: PathBuf,
}

impl ResolvedData {
    /// Resolve a data path to table filename and directory.
    /// - If path is a .csv file, extract filename and parent directory
    /// - If path is a directory, the default table filename applies
    pub fn from_path(path: &Path) -> Self {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(path)
        };

        let is_table_file = path.extension().is_some_and(|ext| ext == "csv")
            || (path.exists() && path.is_file());

        if is_table_file {
            let table_filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_TABLE_FILENAME)
                .to_string();
            let data_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            Self {
                table_filename,
                data_dir,
            }
        } else {
            Self {
                table_filename: DEFAULT_TABLE_FILENAME.to_string(),
                data_dir: path,
            }
        }
    }
}

/// Look for a config file inside the data directory.
/// Checks for cvmtrack.{ext} and config.{ext} for all formats prefer supports.
fn find_config_in_data_dir(data_dir: &Path) -> Option<PathBuf> {
    let extensions = ["json", "json5", "yaml", "yml", "toml", "ini", "xml"];
    let basenames = ["cvmtrack", "config"];

    for basename in basenames {
        for ext in extensions {
            let path = data_dir.join(format!("{}.{}", basename, ext));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

/// Load config from the appropriate source based on options.
async fn load_file_config(options: &LoadOptions, data_dir_override: Option<&PathBuf>) -> Config {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path)
            .await
            .unwrap_or_else(|_| Config::default());
    }

    // Priority 2: Config next to the data directory
    if let Some(data_dir) = data_dir_override {
        if let Some(config_path) = find_config_in_data_dir(data_dir) {
            tracing::debug!("Found config next to data dir: {}", config_path.display());
            return Config::load_from_path(&config_path)
                .await
                .unwrap_or_else(|_| Config::default());
        }
    }

    // Priority 3: Auto-discover via prefer
    Config::load().await
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let resolved_data = options.data.as_ref().map(|d| ResolvedData::from_path(d));
    let data_dir_override = resolved_data.as_ref().map(|r| r.data_dir.clone());

    let config = load_file_config(&options, data_dir_override.as_ref()).await;

    let mut settings = Settings::default();

    // Determine base directory for resolving relative paths
    let base_dir = if options.use_cwd {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        config
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    };

    config.apply_to_settings(&mut settings, &base_dir);

    // --data override takes precedence for the data directory and table
    if let Some(resolved) = resolved_data {
        settings.data_dir = resolved.data_dir;
        settings.table_filename = resolved.table_filename;
    }

    // CVMTRACK_BASE_URL environment variable takes precedence over config
    if let Some(base_url) = std::env::var("CVMTRACK_BASE_URL")
        .ok()
        .filter(|s| !s.is_empty())
    {
        tracing::debug!("Using CVMTRACK_BASE_URL from environment: {}", base_url);
        settings.base_url = base_url;
    }

    // CVMTRACK_BROWSER_URL points at an already-running Chrome
    if let Some(remote) = std::env::var("CVMTRACK_BROWSER_URL")
        .ok()
        .filter(|s| !s.is_empty())
    {
        tracing::debug!("Using CVMTRACK_BROWSER_URL from environment: {}", remote);
        settings.browser.remote_url = Some(remote);
    }

    (settings, config)
}
