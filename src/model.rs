//! The model-call collaborator: request blocks in, one completion out.
//!
//! [`ModelClient`] is the seam the session depends on. [`LlmClient`] is the
//! production implementation over any `edgequake_llm` provider; tests plug in
//! a scripted client instead.
//!
//! There is deliberately no retry loop here. A failed call is reported once
//! and the user decides whether to resend.

use crate::assemble::{BlockContent, RequestBlock};
use crate::config::{ChatConfig, DEFAULT_MODEL, DEFAULT_PROVIDER};
use crate::content::PngImage;
use crate::error::{DocChatError, ModelCallError};
use crate::message::Role;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Sampling parameters sent with every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl From<&ChatConfig> for CompletionParams {
    fn from(config: &ChatConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Produce a single, non-streaming text completion.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(
        &self,
        blocks: &[RequestBlock<'_>],
        params: &CompletionParams,
    ) -> Result<String, ModelCallError>;
}

/// [`ModelClient`] backed by an `edgequake_llm` provider.
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn LLMProvider>,
    timeout_secs: u64,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("provider", &"<dyn LLMProvider>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmClient {
    /// Wrap an existing provider. `timeout_secs == 0` disables the timeout.
    pub fn new(provider: Arc<dyn LLMProvider>, timeout_secs: u64) -> Self {
        Self {
            provider,
            timeout_secs,
        }
    }

    /// Resolve the provider from the config and the environment.
    pub fn from_config(config: &ChatConfig) -> Result<Self, DocChatError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config.api_timeout_secs))
    }
}

#[async_trait]
impl ModelClient for LlmClient {
    async fn complete(
        &self,
        blocks: &[RequestBlock<'_>],
        params: &CompletionParams,
    ) -> Result<String, ModelCallError> {
        let start = Instant::now();
        let messages = to_chat_messages(blocks);
        let options = build_options(params);

        let call = self.provider.chat(&messages, Some(&options));
        let result = if self.timeout_secs > 0 {
            timeout(Duration::from_secs(self.timeout_secs), call)
                .await
                .map_err(|_| ModelCallError::Timeout {
                    secs: self.timeout_secs,
                })?
        } else {
            call.await
        };

        let response = result.map_err(|e| {
            warn!("LLM call failed: {}", e);
            ModelCallError::Api {
                message: e.to_string(),
            }
        })?;

        debug!(
            "{} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        non_empty_reply(response.content)
    }
}

/// A blank completion is an error.
fn non_empty_reply(content: String) -> Result<String, ModelCallError> {
    if content.trim().is_empty() {
        return Err(ModelCallError::EmptyResponse);
    }
    Ok(content)
}

/// Map request blocks onto provider chat messages, preserving order.
pub fn to_chat_messages(blocks: &[RequestBlock<'_>]) -> Vec<ChatMessage> {
    blocks
        .iter()
        .map(|block| match (&block.content, block.role) {
            (BlockContent::Text(text), Role::Assistant) => ChatMessage::assistant(text.as_ref()),
            (BlockContent::Text(text), Role::User) => ChatMessage::user(text.as_ref()),
            (BlockContent::ImageWithText { image, text }, _) => {
                ChatMessage::user_with_images(text.as_ref(), vec![image_data(image)])
            }
        })
        .collect()
}

/// Base64-wrap a canonical PNG for the multimodal request body.
pub fn image_data(image: &PngImage) -> ImageData {
    ImageData::new(STANDARD.encode(&image.bytes), PngImage::MEDIA_TYPE)
}

fn build_options(params: &CompletionParams) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(params.temperature),
        max_tokens: Some(params.max_tokens),
        ..Default::default()
    }
}

/// The model to pair with `provider_name`.
fn model_for<'a>(provider_name: &str, config: &'a ChatConfig) -> Result<&'a str, DocChatError> {
    match config.model.as_deref() {
        Some(model) => Ok(model),
        None if provider_name.eq_ignore_ascii_case(DEFAULT_PROVIDER) => Ok(DEFAULT_MODEL),
        None => Err(DocChatError::InvalidConfig(format!(
            "provider '{provider_name}' needs a model; pass --model <MODEL>"
        ))),
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, DocChatError> {
    info!("Using provider '{}' with model '{}'", provider_name, model);
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DocChatError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model`.
///    Only the Anthropic provider falls back to [`DEFAULT_MODEL`]; any other
///    provider needs an explicit model.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    with `config.model` taking precedence over `EDGEQUAKE_MODEL`.
/// 4. **`ANTHROPIC_API_KEY`**: the assistant's home provider, with
///    `config.model` or [`DEFAULT_MODEL`].
/// 5. **Full auto-detection** (`ProviderFactory::from_env`). The detected
///    provider uses its own default model.
pub fn resolve_provider(config: &ChatConfig) -> Result<Arc<dyn LLMProvider>, DocChatError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model_for(name, config)?);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, config.model.as_deref().unwrap_or(&model));
        }
    }

    if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
        if !key.is_empty() {
            return create_provider(DEFAULT_PROVIDER, model_for(DEFAULT_PROVIDER, config)?);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DocChatError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set ANTHROPIC_API_KEY, OPENAI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
