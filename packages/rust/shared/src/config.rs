//! Application configuration for TopicLens.
//!
//! User config lives at `~/.topiclens/topiclens.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in the file, only the names of the env vars
//! that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopicLensError};
use crate::types::ResearchMode;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "topiclens.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".topiclens";

// ---------------------------------------------------------------------------
// Config structs (matching topiclens.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Web-search provider.
    #[serde(default)]
    pub search: SearchConfig,

    /// Page extraction.
    #[serde(default)]
    pub extract: ExtractConfig,

    /// OpenRouter (or any OpenAI-compatible) chat endpoint.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Diagram providers.
    #[serde(default)]
    pub diagram: DiagramConfig,

    /// HTTP API server.
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path of the libSQL database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Research pipeline policy when no page survives extraction.
    #[serde(default)]
    pub research_mode: ResearchMode,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            research_mode: ResearchMode::default(),
        }
    }
}

fn default_db_path() -> String {
    "var/topiclens.db".into()
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint (SerpApi-compatible JSON API).
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Name of the env var holding the search API key.
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Number of organic results requested.
    #[serde(default = "default_num_results")]
    pub num_results: u32,

    /// Interface language hint.
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds.
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key_env: default_search_key_env(),
            num_results: default_num_results(),
            language: default_language(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://serpapi.com/search.json".into()
}
fn default_search_key_env() -> String {
    "SERPAPI_API_KEY".into()
}
fn default_num_results() -> u32 {
    10
}
fn default_language() -> String {
    "en".into()
}
fn default_provider_timeout() -> u64 {
    30
}

/// `[extract]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Per-page fetch timeout in seconds.
    #[serde(default = "default_extract_timeout")]
    pub timeout_secs: u64,

    /// Maximum pages fetched at once.
    #[serde(default = "default_extract_concurrency")]
    pub concurrency: usize,

    /// User-Agent sent with page fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum kept page length for the content pipeline.
    #[serde(default = "default_content_min_chars")]
    pub content_min_chars: usize,

    /// Minimum kept page length for the research pipeline.
    #[serde(default = "default_research_min_chars")]
    pub research_min_chars: usize,

    /// Allow fetching loopback/private hosts (local testing only).
    #[serde(default)]
    pub allow_private_hosts: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_extract_timeout(),
            concurrency: default_extract_concurrency(),
            user_agent: default_user_agent(),
            content_min_chars: default_content_min_chars(),
            research_min_chars: default_research_min_chars(),
            allow_private_hosts: false,
        }
    }
}

fn default_extract_timeout() -> u64 {
    5
}
fn default_extract_concurrency() -> usize {
    4
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
}
fn default_content_min_chars() -> usize {
    100
}
fn default_research_min_chars() -> usize {
    200
}

/// `[openrouter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for research and content generation.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key_env: default_api_key_env(),
            default_model: default_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "moonshotai/kimi-k2.5".into()
}
fn default_llm_timeout() -> u64 {
    120
}

/// `[diagram]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramConfig {
    /// Mermaid rendering service base URL.
    #[serde(default = "default_mermaid_ink_url")]
    pub mermaid_ink_url: String,

    /// Image generation endpoint.
    #[serde(default = "default_image_api_url")]
    pub image_api_url: String,

    /// Name of the env var holding the image API key.
    #[serde(default = "default_image_key_env")]
    pub image_api_key_env: String,

    /// Diagramming service base URL.
    #[serde(default = "default_diagramming_api_url")]
    pub diagramming_api_url: String,

    /// Name of the env var holding the diagramming API key.
    #[serde(default = "default_diagramming_key_env")]
    pub diagramming_api_key_env: String,

    /// Timeline render service. Unset means timelines always use the placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_render_url: Option<String>,

    /// Request timeout in seconds for every diagram provider.
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            mermaid_ink_url: default_mermaid_ink_url(),
            image_api_url: default_image_api_url(),
            image_api_key_env: default_image_key_env(),
            diagramming_api_url: default_diagramming_api_url(),
            diagramming_api_key_env: default_diagramming_key_env(),
            timeline_render_url: None,
            timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_mermaid_ink_url() -> String {
    "https://mermaid.ink".into()
}
fn default_image_api_url() -> String {
    "https://api.openai.com/v1/images/generations".into()
}
fn default_image_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_diagramming_api_url() -> String {
    "https://api.lucidchart.com".into()
}
fn default_diagramming_key_env() -> String {
    "LUCIDCHART_API_KEY".into()
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP API binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.topiclens/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| TopicLensError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.topiclens/topiclens.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TopicLensError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TopicLensError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TopicLensError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TopicLensError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TopicLensError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read an API key from the named env var. Empty values count as unset.
pub fn api_key_from_env(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

/// Check that the env var `var_name` is set and non-empty.
///
/// `provider` names the service in the error message.
pub fn validate_api_key(var_name: &str, provider: &str) -> Result<String> {
    api_key_from_env(var_name).ok_or_else(|| {
        TopicLensError::config(format!(
            "{provider} API key not found. Set the {var_name} environment variable."
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("db_path"));
        assert!(toml_str.contains("SERPAPI_API_KEY"));
        assert!(toml_str.contains("OPENROUTER_API_KEY"));
        assert!(!toml_str.contains("timeline_render_url"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.extract.content_min_chars, 100);
        assert_eq!(parsed.extract.research_min_chars, 200);
        assert_eq!(parsed.search.num_results, 10);
        assert_eq!(parsed.defaults.research_mode, ResearchMode::Permissive);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[defaults]
research_mode = "strict"

[extract]
concurrency = 8

[diagram]
timeline_render_url = "http://localhost:3001/render"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.research_mode, ResearchMode::Strict);
        assert_eq!(config.defaults.db_path, "var/topiclens.db");
        assert_eq!(config.extract.concurrency, 8);
        assert_eq!(config.extract.timeout_secs, 5);
        assert_eq!(
            config.diagram.timeline_render_url.as_deref(),
            Some("http://localhost:3001/render")
        );
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn api_key_validation() {
        // Unique env var name to avoid interfering with other tests
        let result = validate_api_key("TL_TEST_NONEXISTENT_KEY_12345", "Search");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Search API key not found")
        );
    }
}
