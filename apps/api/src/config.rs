use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Both service credentials are optional: the scrape path degrades to sample data,
/// the generative calls fail on first use.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub apify_api_token: Option<String>,
    pub gemini_base_url: String,
    pub apify_base_url: String,
    pub sample_delay_ms: u64,
    pub http_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            gemini_api_key: optional(&lookup, "GEMINI_API_KEY"),
            apify_api_token: optional(&lookup, "APIFY_API_TOKEN"),
            gemini_base_url: optional(&lookup, "GEMINI_BASE_URL")
                .unwrap_or_else(|| crate::llm_client::DEFAULT_BASE_URL.to_string()),
            apify_base_url: optional(&lookup, "APIFY_BASE_URL")
                .unwrap_or_else(|| crate::scraper::DEFAULT_BASE_URL.to_string()),
            sample_delay_ms: parse_or(&lookup, "SAMPLE_DELAY_MS", 2000)?,
            http_timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: optional(&lookup, "RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Blank values are treated the same as unset ones.
fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
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
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert!(config.apify_api_token.is_none());
        assert_eq!(config.sample_delay_ms, 2000);
        assert_eq!(config.http_timeout_secs, 120);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.gemini_base_url, crate::llm_client::DEFAULT_BASE_URL);
        assert_eq!(config.apify_base_url, crate::scraper::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_blank_credentials_are_treated_as_missing() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "   "),
            ("APIFY_API_TOKEN", ""),
        ]))
        .unwrap();
        assert!(config.gemini_api_key.is_none());
        assert!(config.apify_api_token.is_none());
    }

    #[test]
    fn test_credentials_and_overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "gem-key"),
            ("APIFY_API_TOKEN", "apify-token"),
            ("SAMPLE_DELAY_MS", "0"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("gem-key"));
        assert_eq!(config.apify_api_token.as_deref(), Some("apify-token"));
        assert_eq!(config.sample_delay_ms, 0);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_port_names_the_variable() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
