use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read settings from the environment.
    ///
    /// Returns `None` when `GEMINI_API_KEY` is missing or blank, which leaves
    /// the client disabled.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("GEMINI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("PROFICIENCY_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("PROFICIENCY_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let timeout = env::var("PROFICIENCY_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);

        Some(Self {
            base_url,
            api_key: api_key.trim().to_string(),
            model,
            timeout,
        })
    }

    pub(crate) fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model.trim()
        )
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_model_without_double_slash() {
        let mut config = GeminiConfig::new("key");
        config.base_url = "http://localhost:9000/models/".into();
        config.model = "test-model".into();
        assert_eq!(
            config.endpoint(),
            "http://localhost:9000/models/test-model:generateContent"
        );
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = GeminiConfig::new("super-secret");
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
