//! Configuration for capcheck.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (CAPCHECK_HOME, OPENAI_API_KEY, OPENAI_MODEL,
//!    DIFY_API_ENDPOINT, DIFY_API_KEY, CAPCHECK_KNOWLEDGE,
//!    CAPCHECK_HASHTAGS)
//! 2. Config file (.capcheck/config.yaml)
//! 3. Defaults (~/.capcheck)
//!
//! Config file discovery:
//! - Searches current directory and parents for .capcheck/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::openai::DEFAULT_MODEL;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub openai: Option<OpenAiConfig>,
    #[serde(default)]
    pub dify: Option<DifyConfig>,
    #[serde(default)]
    pub review: Option<ReviewConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Capcheck state directory (relative to config file)
    pub home: Option<String>,
    /// knowledge.json location (relative to config file's parent)
    pub knowledge: Option<String>,
    /// Hashtag keyword CSV location (relative to config file's parent)
    pub hashtags: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DifyConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    pub max_caption_bytes: Option<usize>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to capcheck home (history ledger, default data files)
    pub home: PathBuf,
    /// Absolute path to knowledge.json
    pub knowledge: PathBuf,
    /// Absolute path to the hashtag keyword CSV
    pub hashtags: PathBuf,
    pub openai: OpenAiSettings,
    pub dify: DifySettings,
    pub review: ReviewSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DifySettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewSettings {
    pub max_caption_bytes: usize,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            max_caption_bytes: 1_048_576, // 1MB
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".capcheck").join("config.yaml");
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

/// Env var lookup that treats empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".capcheck");

    let config_file = find_config_file();
    let file = match &config_file {
        Some(path) => Some(load_config_file(path)?),
        None => None,
    };

    // Base directory for relative paths is the parent of .capcheck/.
    let base_dir = config_file
        .as_deref()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let home = if let Some(env_home) = env_var("CAPCHECK_HOME") {
        PathBuf::from(env_home)
    } else if let Some(home_path) = file.as_ref().and_then(|f| f.paths.home.as_ref()) {
        // home is relative to the .capcheck/ directory
        let capcheck_dir = config_file
            .as_deref()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));
        resolve_path(capcheck_dir, home_path)
    } else {
        default_home
    };

    let knowledge = if let Some(env_path) = env_var("CAPCHECK_KNOWLEDGE") {
        PathBuf::from(env_path)
    } else if let Some(path) = file.as_ref().and_then(|f| f.paths.knowledge.as_ref()) {
        resolve_path(&base_dir, path)
    } else {
        home.join("knowledge.json")
    };

    let hashtags = if let Some(env_path) = env_var("CAPCHECK_HASHTAGS") {
        PathBuf::from(env_path)
    } else if let Some(path) = file.as_ref().and_then(|f| f.paths.hashtags.as_ref()) {
        resolve_path(&base_dir, path)
    } else {
        home.join("hashtags.csv")
    };

    let file_openai = file.as_ref().and_then(|f| f.openai.clone());
    let openai = OpenAiSettings {
        api_key: env_var("OPENAI_API_KEY")
            .or_else(|| file_openai.as_ref().and_then(|o| o.api_key.clone())),
        model: env_var("OPENAI_MODEL")
            .or_else(|| file_openai.as_ref().and_then(|o| o.model.clone()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        endpoint: file_openai.and_then(|o| o.endpoint),
    };

    let file_dify = file.as_ref().and_then(|f| f.dify.clone());
    let dify = DifySettings {
        endpoint: env_var("DIFY_API_ENDPOINT")
            .or_else(|| file_dify.as_ref().and_then(|d| d.endpoint.clone())),
        api_key: env_var("DIFY_API_KEY").or_else(|| file_dify.and_then(|d| d.api_key)),
    };

    let review = ReviewSettings {
        max_caption_bytes: file
            .as_ref()
            .and_then(|f| f.review.as_ref())
            .and_then(|r| r.max_caption_bytes)
            .unwrap_or_else(|| ReviewSettings::default().max_caption_bytes),
    };

    Ok(ResolvedConfig {
        home,
        knowledge,
        hashtags,
        openai,
        dify,
        review,
        config_file,
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

/// Get the capcheck home directory.
pub fn capcheck_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the knowledge.json path.
pub fn knowledge_path() -> Result<PathBuf> {
    Ok(config()?.knowledge.clone())
}

/// Get the hashtag keyword CSV path.
pub fn hashtags_path() -> Result<PathBuf> {
    Ok(config()?.hashtags.clone())
}

/// Get the review history ledger path ($CAPCHECK_HOME/history.jsonl)
pub fn history_path() -> Result<PathBuf> {
    Ok(config()?.home.join("history.jsonl"))
}
