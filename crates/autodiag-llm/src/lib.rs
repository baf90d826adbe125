//! Autodiag LLM - Text Generation Provider Abstraction
//!
//! This crate provides the outbound text-generation seam for autodiag:
//! - Provider: the `LlmProvider` trait every backend implements
//! - Gemini: Google Gemini provider (generateContent over reqwest)
//! - Mock: scripted provider for tests
//! - Util: credential masking and error sanitization

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod gemini;
pub mod message;
pub mod mock;
pub mod provider;
pub mod util;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use provider::LlmProvider;

// Re-export provider types
pub use gemini::{GeminiConfig, GeminiProvider};
