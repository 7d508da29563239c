//! # Provider Configuration
//!
//! Connection settings for the text-generation service.
//!
//! | Type | Description | API Key Required |
//! |------|-------------|-----------------|
//! | `gemini` | Google Gemini API | Yes |
//! | `openai` | OpenAI-compatible APIs | Yes |
//! | `ollama` | Local Ollama server | No |

use serde::Deserialize;

use super::defaults::{DEFAULT_API_KEY_ENV, DEFAULT_GEMINI_ENDPOINT, DEFAULT_PROVIDER_TYPE};

/// Configuration for the model provider.
///
/// # Example
///
/// ```toml
/// [model]
/// type = "gemini"
/// endpoint = "https://generativelanguage.googleapis.com"
/// api_key = "GEMINI_API_KEY"
/// name = "gemini-2.0-flash"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProviderConfig {
    /// Identifier used in logs and errors.
    pub id: String,
    /// The provider type determines API format: "ollama", "gemini", "openai"
    pub provider_type: String,
    /// API endpoint URL
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    pub api_key: Option<String>,
    /// Custom API path override (e.g., "v1beta/models" for Gemini)
    pub api_path: Option<String>,
}

impl ModelProviderConfig {
    pub fn is_ollama(&self) -> bool {
        self.provider_type.eq_ignore_ascii_case("ollama")
    }
}

impl Default for ModelProviderConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_PROVIDER_TYPE.to_string(),
            provider_type: DEFAULT_PROVIDER_TYPE.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            api_key: Some(DEFAULT_API_KEY_ENV.to_string()),
            api_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(super) struct RawModelSection {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub provider_type: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub api_path: Option<String>,
    pub name: Option<String>,
}
