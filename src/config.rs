//! Configuration for a chat session.
//!
//! All session behaviour is controlled through [`ChatConfig`], built via its
//! [`ChatConfigBuilder`]. The defaults reproduce the assistant's fixed
//! request parameters (temperature 0.7, 1024 output tokens); the builder
//! exists so a deployment can point at another provider or model without
//! touching code.

use crate::error::DocChatError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// Provider used together with [`DEFAULT_MODEL`].
pub const DEFAULT_PROVIDER: &str = "anthropic";

/// Configuration for one chat session.
///
/// # Example
/// ```rust
/// use docchat::ChatConfig;
///
/// let config = ChatConfig::builder()
///     .model("claude-sonnet-4-20250514")
///     .api_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 1024);
/// ```
#[derive(Clone)]
pub struct ChatConfig {
    /// LLM model identifier. If None, the provider chain picks one.
    pub model: Option<String>,

    /// LLM provider name (e.g. "anthropic", "openai", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Maximum tokens generated per reply. Default: 1024.
    pub max_tokens: usize,

    /// Per-call timeout in seconds; `0` waits forever. Default: 120.
    ///
    /// A timed-out call is handled like any other failed call: the user's
    /// message stays in history, unanswered.
    pub api_timeout_secs: u64,

    /// Download timeout for URL uploads in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// User password for encrypted PDFs.
    pub pdf_password: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.7,
            max_tokens: 1024,
            api_timeout_secs: 120,
            download_timeout_secs: 120,
            pdf_password: None,
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("pdf_password", &self.pdf_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ChatConfig {
    /// Create a new builder for `ChatConfig`.
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ChatConfig`].
#[derive(Debug)]
pub struct ChatConfigBuilder {
    config: ChatConfig,
}

impl ChatConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn pdf_password(mut self, pwd: impl Into<String>) -> Self {
        self.config.pdf_password = Some(pwd.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ChatConfig, DocChatError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(DocChatError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(DocChatError::InvalidConfig(
                "download timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref model) = c.model {
            if model.trim().is_empty() {
                return Err(DocChatError::InvalidConfig("model must not be empty".into()));
            }
        }
        Ok(self.config)
    }
}
