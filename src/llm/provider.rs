use std::time::Duration;

use async_trait::async_trait;

use crate::config::LLMConfig;
use crate::llm::openai::OpenAIAdapter;
use crate::types::{LLMRequest, LLMResponse, LLMResult};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> LLMResult<LLMResponse>;
}

/// Known OpenAI-compatible providers and their chat-completions base URLs.
pub const PROVIDERS: &[(&str, &str)] = &[
    ("openai", "https://api.openai.com/v1"),
    ("openrouter", "https://openrouter.ai/api/v1"),
    ("groq", "https://api.groq.com/openai/v1"),
    ("glm", "https://api.z.ai/api/paas/v4"),
];

pub fn default_api_base(provider: &str) -> Option<&'static str> {
    PROVIDERS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(provider))
        .map(|(_, base)| *base)
}

/// Configuration for the LLM provider
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    pub api_base: Option<String>,
    pub timeout: Duration,
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider_name: String,
    model: String,
    temperature: f32,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig, model: impl Into<String>, temperature: f32) -> anyhow::Result<Self> {
        let api_base = match provider.api_base.as_deref() {
            Some(base) => base.to_string(),
            None => default_api_base(&provider.name)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unsupported provider {:?}: set LLM_API_BASE or use one of openai, openrouter, groq, glm",
                        provider.name
                    )
                })?
                .to_string(),
        };

        let adapter = OpenAIAdapter::new(&provider.api_key, &api_base, provider.timeout)?;
        Ok(Self::with_adapter(Box::new(adapter), provider.name, model, temperature))
    }

    /// Wrap an arbitrary adapter (used for alternative backends and tests).
    pub fn with_adapter(
        adapter: Box<dyn LLMAdapter>,
        provider_name: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            adapter,
            provider_name: provider_name.into(),
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(config: &LLMConfig) -> anyhow::Result<Self> {
        let api_key = config
            .active_api_key()
            .ok_or_else(|| anyhow::anyhow!("LLM_API_KEY is not set"))?;

        Self::new(
            LLMProviderConfig {
                name: config.provider.clone(),
                api_key,
                api_base: config.api_base.clone(),
                timeout: Duration::from_secs(config.timeout_secs),
            },
            config.model.clone(),
            config.temperature,
        )
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> LLMResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}
