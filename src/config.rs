use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_api_key_env() -> String {
    "GAPR_API_KEY".to_string()
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    /// Reads the API key from the configured variable, then `OPENAI_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Simulated latency of the primary search path.
    #[serde(default = "default_search_delay_ms")]
    pub search_delay_ms: u64,
    #[serde(default = "default_suggest_debounce_ms")]
    pub suggest_debounce_ms: u64,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_delay_ms: default_search_delay_ms(),
            suggest_debounce_ms: default_suggest_debounce_ms(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

fn default_search_delay_ms() -> u64 {
    1500
}
fn default_suggest_debounce_ms() -> u64 {
    500
}
fn default_max_suggestions() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
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
    "127.0.0.1:7341".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Base URL of the hosted auth provider, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: Option<String>,
    /// Where OAuth providers send the user back to.
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default = "default_anon_key_env")]
    pub anon_key_env: String,
}

fn default_anon_key_env() -> String {
    "GAPR_AUTH_ANON_KEY".to_string()
}

impl AuthConfig {
    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    pub fn anon_key(&self) -> Option<String> {
        std::env::var(&self.anon_key_env).ok()
    }
}

/// Loads and validates the TOML config at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the built-in defaults.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    match config.llm.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown llm provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        anyhow::bail!("llm.temperature must be in [0.0, 2.0]");
    }

    if config.llm.max_tokens == 0 {
        anyhow::bail!("llm.max_tokens must be > 0");
    }

    if config.search.max_suggestions == 0 {
        anyhow::bail!("search.max_suggestions must be >= 1");
    }

    if let Some(url) = &config.auth.url {
        url::Url::parse(url).with_context(|| format!("auth.url is not a valid URL: {}", url))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let f = write_config("");
        let cfg = load_config(f.path()).unwrap();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.search.search_delay_ms, 1500);
        assert_eq!(cfg.search.suggest_debounce_ms, 500);
        assert_eq!(cfg.server.bind, "127.0.0.1:7341");
        assert!(!cfg.auth.is_enabled());
    }

    #[test]
    fn test_partial_sections() {
        let f = write_config(
            r#"
[llm]
provider = "disabled"

[search]
search_delay_ms = 0
"#,
        );
        let cfg = load_config(f.path()).unwrap();
        assert!(!cfg.llm.is_enabled());
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.search.search_delay_ms, 0);
        assert_eq!(cfg.search.max_suggestions, 5);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let f = write_config("[llm]\nprovider = \"carrier-pigeon\"\n");
        let err = load_config(f.path()).unwrap_err();
        assert!(err.to_string().contains("Unknown llm provider"));
    }

    #[test]
    fn test_bad_auth_url_rejected() {
        let f = write_config("[auth]\nurl = \"not a url\"\n");
        assert!(load_config(f.path()).is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let cfg = load_config_or_default(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(cfg.search.max_suggestions, 5);
    }
}
