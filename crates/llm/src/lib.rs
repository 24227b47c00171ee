//! LLM integration crate for the tourism guide.
//!
//! This crate provides a provider-agnostic abstraction for calling hosted
//! Large Language Models. Providers implement the [`LlmClient`] trait.
//!
//! # Providers
//! - **Gemini**: Google Generative Language API (default)
//! - **Mock**: scripted, offline client for tests and local runs
//!
//! # Example
//! ```no_run
//! use guide_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key")?;
//! let request = LlmRequest::new("Best time to visit Netarhat?", "gemini-2.0-flash");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, MockBehavior, MockClient};
pub use types::ProviderType;
