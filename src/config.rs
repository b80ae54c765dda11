//! Configuration for docmind paths and limits.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (DOCMIND_HOME, DOCMIND_POLL_INTERVAL_MS, ...)
//! 2. Config file (.docmind/config.yaml)
//! 3. Defaults (~/.docmind, 5s interval, 120s poll cap, 50MB uploads)
//!
//! Config file discovery:
//! - Searches current directory and parents for .docmind/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Refresh cadence while a document is non-terminal
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Maximum polling duration per status observation
pub const DEFAULT_MAX_POLL_DURATION_MS: u64 = 120_000;

/// Maximum accepted upload size (50MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 52_428_800;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub limits: Option<LimitsConfig>,
    #[serde(default)]
    pub backend: Option<BackendConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Engine state directory (relative to config file)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub poll_interval_ms: Option<u64>,
    pub max_poll_duration_ms: Option<u64>,
    pub max_upload_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of a real retrieval backend; absent means local mock
    pub api_url: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to docmind home (engine state)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Tunable limits
    pub limits: Limits,
    /// Base URL of a real retrieval backend (if configured)
    pub api_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Limits {
    pub poll_interval_ms: u64,
    pub max_poll_duration_ms: u64,
    pub max_upload_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_duration_ms: DEFAULT_MAX_POLL_DURATION_MS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".docmind").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".docmind");

    let config_file = find_config_file();

    let (file_home, file_limits, file_api_url) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        let home = config.paths.home.map(|home_path| {
            let docmind_dir = config_path.parent().unwrap_or(Path::new("."));
            resolve_path(docmind_dir, &home_path)
        });

        let limits = config.limits;
        let api_url = config.backend.and_then(|b| b.api_url);

        (home, limits, api_url)
    } else {
        (None, None, None)
    };

    let home = if let Ok(env_home) = std::env::var("DOCMIND_HOME") {
        PathBuf::from(env_home)
    } else {
        file_home.unwrap_or(default_home)
    };

    let limits = Limits {
        poll_interval_ms: env_u64("DOCMIND_POLL_INTERVAL_MS")
            .or(file_limits.as_ref().and_then(|l| l.poll_interval_ms))
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        max_poll_duration_ms: env_u64("DOCMIND_MAX_POLL_DURATION_MS")
            .or(file_limits.as_ref().and_then(|l| l.max_poll_duration_ms))
            .unwrap_or(DEFAULT_MAX_POLL_DURATION_MS),
        max_upload_bytes: env_u64("DOCMIND_MAX_UPLOAD_BYTES")
            .or(file_limits.as_ref().and_then(|l| l.max_upload_bytes))
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
    };

    let api_url = std::env::var("DOCMIND_API_URL").ok().or(file_api_url);

    Ok(ResolvedConfig {
        home,
        config_file,
        limits,
        api_url,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Get the docmind home directory (engine state)
pub fn docmind_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the store directory ($DOCMIND_HOME/store)
pub fn store_dir() -> Result<PathBuf> {
    Ok(config()?.home.join("store"))
}

/// Get the uploads directory ($DOCMIND_HOME/uploads)
pub fn uploads_dir() -> Result<PathBuf> {
    Ok(config()?.home.join("uploads"))
}
