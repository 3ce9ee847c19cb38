//! Gemini connection flags and API key resolution.

use anyhow::{bail, Result};
use clap::Args;
use slidegen_gemini::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Environment variable checked when `API_KEY` is unset.
pub const FALLBACK_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Args, Debug, Clone)]
pub struct GeminiArgs {
    /// Gemini API key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model used for generation
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the Gemini REST API
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

impl GeminiArgs {
    /// Build the client configuration, failing when no key is available.
    pub fn to_config(&self) -> Result<GeminiConfig> {
        let fallback = std::env::var(FALLBACK_KEY_VAR).ok();
        let api_key = resolve_api_key(self.api_key.as_deref(), fallback.as_deref())?;

        Ok(GeminiConfig::new(api_key)
            .with_model(&self.model)
            .with_base_url(&self.base_url))
    }
}

fn resolve_api_key(explicit: Option<&str>, fallback: Option<&str>) -> Result<String> {
    match explicit.or(fallback).map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => bail!(
            "No API key configured; pass --api-key or set API_KEY (or {})",
            FALLBACK_KEY_VAR
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_wins() {
        assert_eq!(resolve_api_key(Some("flag"), Some("env")).unwrap(), "flag");
    }

    #[test]
    fn test_fallback_key_used() {
        assert_eq!(resolve_api_key(None, Some(" env-key\n")).unwrap(), "env-key");
    }

    #[test]
    fn test_missing_or_blank_key_is_error() {
        assert!(resolve_api_key(None, None).is_err());
        assert!(resolve_api_key(Some("  "), None).is_err());
    }

    #[test]
    fn test_config_carries_model_and_base_url() {
        let args = GeminiArgs {
            api_key: Some("key".to_string()),
            model: "gemini-2.5-flash".to_string(),
            base_url: "http://localhost:8080/v1beta/".to_string(),
        };

        let config = args.to_config().unwrap();
        assert_eq!(
            config.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
