//! Chat pipeline for the Jharkhand tourism guide.
//!
//! A request passes the domain guard, is classified into an intent, and is
//! answered by exactly one handler:
//!
//! ```text
//! ChatRequest -> DomainGuard -> Intent -> handler -> ChatResponse
//!                    |                        |
//!                 rejected          records / Retriever -> Prompt -> AnswerGenerator
//! ```

pub mod context;
pub mod generator;
pub mod guard;
pub mod handlers;
pub mod intent;
pub mod records;
pub mod response;
pub mod router;
pub mod text;

#[cfg(test)]
mod testing;

pub use context::GuideContext;
pub use generator::AnswerGenerator;
pub use guard::{DomainGuard, GuardDecision};
pub use intent::Intent;
pub use records::Records;
pub use response::{ChatRequest, ChatResponse, ChatTurn, ErrorInfo, Payload, Role};
pub use router::ChatService;
