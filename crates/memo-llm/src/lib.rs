//! LLM provider abstraction for equity-memo
//!
//! This crate provides a minimal, provider-agnostic interface for the
//! narrative and estimation stages of the memo pipeline. It includes:
//!
//! - Text-only message types for chat-style completion
//! - Completion request/response types with a builder
//! - A provider trait plus an OpenAI-compatible implementation
//!
//! The OpenAI provider works against any endpoint speaking the
//! `/chat/completions` wire format, including local deployments
//! (Ollama's `/v1` shim, LM Studio, vLLM).

pub mod chat;
pub mod error;
pub mod provider;
pub mod providers;

// Re-export main types
pub use chat::{ChatRequest, ChatResponse, Message, Role, TokenUsage};
pub use error::{LLMError, Result};
pub use provider::LLMProvider;
