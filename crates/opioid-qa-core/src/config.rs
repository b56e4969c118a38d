use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::corpus::LoadFailurePolicy;
use crate::error::CoreError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // AI / LLM
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub request_timeout: Duration,

    // Reference document
    pub document_path: PathBuf,
    pub on_load_failure: LoadFailurePolicy,

    // Server
    pub host: String,
    pub port: u16,

    // CORS
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CoreError::Config("OPENAI_API_KEY is required".to_string()))?;

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| CoreError::Config(format!("PORT must be a number, got {raw:?}")))?,
            None => 5000,
        };

        let request_timeout_secs: u64 = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                CoreError::Config(format!(
                    "REQUEST_TIMEOUT_SECS must be a number of seconds, got {raw:?}"
                ))
            })?,
            None => 60,
        };
        let request_timeout = Duration::from_secs(request_timeout_secs);

        let on_load_failure: LoadFailurePolicy = match lookup("CORPUS_ON_LOAD_FAILURE") {
            Some(raw) => raw.parse()?,
            None => LoadFailurePolicy::default(),
        };

        Ok(Self {
            openai_api_key,
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            openai_base_url: lookup("OPENAI_BASE_URL").filter(|s| !s.is_empty()),
            request_timeout,
            document_path: lookup("DOCUMENT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("OpioidInfo.pdf")),
            on_load_failure,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.openai_model, "gpt-3.5-turbo");
        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.document_path, PathBuf::from("OpioidInfo.pdf"));
        assert_eq!(config.on_load_failure, LoadFailurePolicy::UseSentinelText);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.openai_base_url.is_none());
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let blank = AppConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "  ")]));
        assert!(blank.is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("PORT", "8080"),
            ("DOCUMENT_PATH", "/data/guide.pdf"),
            ("CORPUS_ON_LOAD_FAILURE", "fail"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example"),
        ]))
        .unwrap();

        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.port, 8080);
        assert_eq!(config.document_path, PathBuf::from("/data/guide.pdf"));
        assert_eq!(config.on_load_failure, LoadFailurePolicy::FailStartup);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn blank_origin_entries_are_dropped() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("ALLOWED_ORIGINS", "https://a.example, ,  ,"),
        ]))
        .unwrap();

        assert_eq!(config.allowed_origins, vec!["https://a.example".to_string()]);
    }

    #[test]
    fn request_timeout_override_is_parsed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_request_timeout_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("REQUEST_TIMEOUT_SECS", "sixty"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("REQUEST_TIMEOUT_SECS"));
    }
}
