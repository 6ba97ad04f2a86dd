//! Runtime configuration for the audit service.
//!
//! Defaults suit a CLI run; `from_env` overlays values from the environment.
//! The API key is never logged; log individual fields instead of the struct.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; SEO-Auditor/1.0)";
pub const DEFAULT_SEMANTIC_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_SEMANTIC_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Bodies larger than this are truncated before parsing.
    pub max_html_bytes: usize,
    pub cache_ttl_secs: u64,
    pub semantic: SemanticConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_html_bytes: 5 * 1024 * 1024,
            cache_ttl_secs: 300,
            semantic: SemanticConfig::default(),
        }
    }
}

/// Settings for the optional language-model semantic backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Without a key the heuristic estimator is used.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub max_content_chars: usize,
    pub max_tokens: u32,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_SEMANTIC_ENDPOINT.to_string(),
            model: DEFAULT_SEMANTIC_MODEL.to_string(),
            max_content_chars: 3000,
            max_tokens: 1500,
        }
    }
}

impl AuditConfig {
    /// Defaults overlaid with `SEO_AUDIT_*` / `OPENAI_API_KEY` variables.
    /// Unparseable numbers are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(secs) = parse_var(&lookup, "SEO_AUDIT_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout_secs = secs;
        }
        if let Some(agent) = lookup("SEO_AUDIT_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            config.user_agent = agent;
        }
        if let Some(bytes) = parse_var(&lookup, "SEO_AUDIT_MAX_HTML_BYTES") {
            config.max_html_bytes = bytes;
        }
        if let Some(secs) = parse_var(&lookup, "SEO_AUDIT_CACHE_TTL_SECS") {
            config.cache_ttl_secs = secs;
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|v| !v.trim().is_empty()) {
            config.semantic.api_key = Some(key);
        }
        if let Some(model) = lookup("SEO_AUDIT_SEMANTIC_MODEL").filter(|v| !v.trim().is_empty()) {
            config.semantic.model = model;
        }

        config
    }

    pub fn with_fetch_timeout(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_html_bytes(mut self, bytes: usize) -> Self {
        self.max_html_bytes = bytes;
        self
    }

    pub fn with_cache_ttl(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    pub fn with_semantic(mut self, semantic: SemanticConfig) -> Self {
        self.semantic = semantic;
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}
