use std::collections::BTreeMap;
use std::time::Duration;

/// Default base URL for assistants API requests.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Transport configuration for assistants API requests.
#[derive(Debug, Clone)]
pub struct AssistantsConfig {
    /// Secret key passed to `Authorization` as a bearer token.
    pub api_key: String,
    /// Base URL for API endpoints.
    pub base_url: String,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional request timeout for non-streaming calls.
    pub timeout: Option<Duration>,
}

impl Default for AssistantsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            extra_headers: BTreeMap::new(),
            timeout: None,
        }
    }
}

impl AssistantsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// Join an endpoint path onto the configured base URL.
    pub fn endpoint(&self, path: &str) -> String {
        let base = if self.base_url.trim().is_empty() {
            DEFAULT_BASE_URL
        } else {
            self.base_url.trim()
        };
        format!("{}{path}", base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::AssistantsConfig;

    #[test]
    fn endpoint_trims_trailing_slash() {
        let config = AssistantsConfig::new("sk-test").with_base_url("https://example.test/v1/");
        assert_eq!(
            config.endpoint("/threads/t_1/runs"),
            "https://example.test/v1/threads/t_1/runs"
        );
    }

    #[test]
    fn endpoint_falls_back_to_default_base() {
        let config = AssistantsConfig::new("sk-test").with_base_url("   ");
        assert_eq!(
            config.endpoint("/assistants"),
            "https://api.openai.com/v1/assistants"
        );
    }
}
