//! Provider configuration from TOML (`[providers]` section)
//!
//! Every backend table is optional field by field; unset fields resolve to
//! that backend's own defaults in [`FileProvidersConfig::resolve`].

use refract_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Built-in values for one backend.
struct BackendDefaults {
    name: &'static str,
    api_key_env: &'static str,
    base_url: &'static str,
    model: &'static str,
    max_tokens: u32,
}

const GEMINI: BackendDefaults = BackendDefaults {
    name: "gemini",
    api_key_env: "GEMINI_API_KEY",
    base_url: "https://generativelanguage.googleapis.com",
    model: "gemini-2.5-flash",
    max_tokens: 1000,
};

const OPENAI: BackendDefaults = BackendDefaults {
    name: "openai",
    api_key_env: "OPENAI_API_KEY",
    base_url: "https://api.openai.com",
    model: "gpt-4o",
    max_tokens: 1000,
};

const ANTHROPIC: BackendDefaults = BackendDefaults {
    name: "anthropic",
    api_key_env: "ANTHROPIC_API_KEY",
    base_url: "https://api.anthropic.com",
    model: "claude-sonnet-4-20250514",
    max_tokens: 1000,
};

/// Raw `[providers.<backend>]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    pub enabled: Option<bool>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Direct API key (not recommended, use the env var instead)
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Critique model
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

/// A backend's settings with defaults applied and the key resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub name: &'static str,
    pub enabled: bool,
    pub api_key_env: String,
    /// `None` when neither the inline key nor the env var is set
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl BackendSettings {
    /// Whether this backend can be constructed.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Per-request HTTP timeout for every backend
    pub request_timeout_secs: u64,
    pub gemini: FileBackendConfig,
    pub openai: FileBackendConfig,
    pub anthropic: FileBackendConfig,
    /// Anthropic API version header
    pub anthropic_version: String,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            gemini: FileBackendConfig::default(),
            openai: FileBackendConfig::default(),
            anthropic: FileBackendConfig::default(),
            anthropic_version: "2023-06-01".to_string(),
        }
    }
}

impl FileProvidersConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn gemini(&self) -> BackendSettings {
        self.resolve(&self.gemini, &GEMINI)
    }

    pub fn openai(&self) -> BackendSettings {
        self.resolve(&self.openai, &OPENAI)
    }

    pub fn anthropic(&self) -> BackendSettings {
        self.resolve(&self.anthropic, &ANTHROPIC)
    }

    /// All critic backends in invocation order.
    pub fn backends(&self) -> Vec<BackendSettings> {
        vec![self.gemini(), self.openai(), self.anthropic()]
    }

    fn resolve(&self, raw: &FileBackendConfig, defaults: &BackendDefaults) -> BackendSettings {
        let api_key_env = raw
            .api_key_env
            .clone()
            .unwrap_or_else(|| defaults.api_key_env.to_string());
        let api_key = raw
            .api_key
            .clone()
            .or_else(|| std::env::var(&api_key_env).ok())
            .filter(|k| !k.trim().is_empty());

        BackendSettings {
            name: defaults.name,
            enabled: raw.enabled.unwrap_or(true),
            api_key,
            api_key_env,
            base_url: raw
                .base_url
                .clone()
                .unwrap_or_else(|| defaults.base_url.to_string()),
            model: raw
                .model
                .clone()
                .unwrap_or_else(|| defaults.model.to_string()),
            max_tokens: raw.max_tokens.unwrap_or(defaults.max_tokens),
            timeout: self.request_timeout(),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.request_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "providers.request_timeout_secs must be at least 1",
            ));
        }
        issues
    }

    /// Startup check that at least one critic can authenticate.
    ///
    /// Reads the environment, so it is kept out of [`validate`](Self::validate).
    pub fn credential_issues(&self) -> Vec<ConfigIssue> {
        let backends = self.backends();
        if backends.iter().any(BackendSettings::is_usable) {
            return Vec::new();
        }
        let vars: Vec<&str> = backends
            .iter()
            .filter(|b| b.enabled)
            .map(|b| b.api_key_env.as_str())
            .collect();
        vec![ConfigIssue::error(
            ConfigIssueCode::NoCredentials,
            format!(
                "no critic backend has credentials; set at least one of: {}",
                vars.join(", ")
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSET: &str = "REFRACT_TEST_UNSET_VARIABLE";

    fn without_env(mut config: FileProvidersConfig) -> FileProvidersConfig {
        for backend in [&mut config.gemini, &mut config.openai, &mut config.anthropic] {
            if backend.api_key_env.is_none() {
                backend.api_key_env = Some(UNSET.into());
            }
        }
        config
    }

    #[test]
    fn test_partial_table_keeps_backend_defaults() {
        let toml_str = r#"
[providers.openai]
model = "gpt-4.1"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let openai = config.providers.openai();
        assert_eq!(openai.model, "gpt-4.1");
        assert_eq!(openai.api_key_env, "OPENAI_API_KEY");
        assert_eq!(openai.base_url, "https://api.openai.com");
        assert_eq!(openai.timeout, Duration::from_secs(120));
        assert_eq!(config.providers.anthropic().api_key_env, "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_backend_order() {
        let names: Vec<&str> = FileProvidersConfig::default()
            .backends()
            .iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["gemini", "openai", "anthropic"]);
    }

    #[test]
    fn test_inline_key_wins() {
        let mut config = without_env(FileProvidersConfig::default());
        config.openai.api_key = Some("inline".into());
        assert_eq!(config.openai().api_key.as_deref(), Some("inline"));
    }

    #[test]
    fn test_blank_key_is_missing() {
        let mut config = without_env(FileProvidersConfig::default());
        config.gemini.api_key = Some("   ".into());
        assert!(config.gemini().api_key.is_none());
    }

    #[test]
    fn test_no_credentials_reported() {
        let mut config = without_env(FileProvidersConfig::default());
        let issues = config.credential_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::NoCredentials);

        config.anthropic.api_key = Some("sk-test".into());
        assert!(config.credential_issues().is_empty());

        config.anthropic.enabled = Some(false);
        assert_eq!(config.credential_issues().len(), 1);
    }

    #[test]
    fn test_zero_timeout() {
        let config = FileProvidersConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate()[0].code, ConfigIssueCode::ZeroTimeout);
    }
}
