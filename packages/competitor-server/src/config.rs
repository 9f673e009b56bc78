use anyhow::{Context, Result};
use competitor_analysis::PipelineConfig;
use dotenvy::dotenv;
use secrecy::SecretString;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub openai_api_key: SecretString,
    pub openai_base_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub chrome_path: Option<String>,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut pipeline = PipelineConfig::default();

        if let Some(model) = lookup("OPENAI_TEXT_MODEL") {
            pipeline.text_model = model;
        }
        if let Some(model) = lookup("OPENAI_VISION_MODEL") {
            pipeline.vision_model = model;
        }
        if let Some(permits) = parse_var(&lookup, "RENDER_CONCURRENCY")? {
            pipeline = pipeline.with_render_concurrency(permits);
        }
        if let Some(secs) = parse_var(&lookup, "ANALYSIS_TIMEOUT_SECS")? {
            pipeline = pipeline.with_analysis_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var(&lookup, "FETCH_TIMEOUT_SECS")? {
            pipeline = pipeline.with_fetch_timeout(Duration::from_secs(secs));
        }
        if let Some(max) = parse_var(&lookup, "PDF_MAX_CHARS")? {
            pipeline = pipeline.with_pdf_max_chars(max);
        }
        if let Some(allow) = lookup("ALLOW_PRIVATE_HOSTS") {
            pipeline = pipeline.with_private_hosts(matches!(
                allow.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ));
        }

        Ok(Self {
            openai_api_key: lookup("OPENAI_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from)
                .context("OPENAI_API_KEY must be set")?,
            openai_base_url: lookup("OPENAI_BASE_URL"),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, "PORT")?.unwrap_or(8000),
            chrome_path: lookup("CHROME_PATH"),
            pipeline,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{} must be a valid number, got '{}'", name, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.openai_api_key.expose_secret(), "sk-test");
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert!(config.chrome_path.is_none());
    }

    #[test]
    fn test_overrides_map_onto_pipeline() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_TEXT_MODEL", "gpt-4.1-mini"),
            ("PORT", "9090"),
            ("RENDER_CONCURRENCY", "3"),
            ("ANALYSIS_TIMEOUT_SECS", "45"),
            ("FETCH_TIMEOUT_SECS", "10"),
            ("PDF_MAX_CHARS", "8000"),
            ("CHROME_PATH", "/usr/bin/chromium"),
            ("ALLOW_PRIVATE_HOSTS", "true"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.pipeline.text_model, "gpt-4.1-mini");
        assert_eq!(config.pipeline.vision_model, "gpt-4o");
        assert_eq!(config.pipeline.render_permits(), 3);
        assert_eq!(config.pipeline.analysis_timeout_secs, 45);
        assert_eq!(config.pipeline.fetch_timeout_secs, 10);
        assert_eq!(config.pipeline.pdf_max_chars, 8000);
        assert_eq!(config.chrome_path.as_deref(), Some("/usr/bin/chromium"));
        assert!(config.pipeline.allow_private_hosts);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let err = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "k"), ("PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_debug_hides_key() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-very-secret")])).unwrap();
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }
}
