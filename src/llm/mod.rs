// LLM abstraction layer

pub mod openai;
pub mod provider;

pub use provider::*;
pub use crate::types::{LLMError, LLMMessage, LLMRequest, LLMResponse, LLMResult, TokenUsage};
