//! Chat request and response bodies.

use crate::intent::Intent;
use crate::records::{Festival, Helpline, HotelEntry, RouteInfo};
use guide_core::AppError;
use guide_knowledge::SourceRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,

    /// Prior turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
}

impl From<&AppError> for ErrorInfo {
    fn from(err: &AppError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItineraryDay {
    pub day: u32,
    pub places: Vec<String>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttractionList {
    pub location: String,
    pub items: Vec<String>,
}

/// Structured data attached to an answer, flattened into the response body
/// under its own key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Itinerary(Vec<ItineraryDay>),
    Attractions(AttractionList),
    Route(RouteInfo),
    Hotels(Vec<HotelEntry>),
    Helplines(Vec<Helpline>),
    Festivals(Vec<Festival>),
}

/// Exactly one of these is produced per request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub intent: Intent,
    pub rejected: bool,
    pub degraded: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,

    #[serde(flatten)]
    pub payload: Option<Payload>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
}

impl ChatResponse {
    pub fn answer(intent: Intent, answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            intent,
            rejected: false,
            degraded: false,
            error: None,
            payload: None,
            sources: Vec::new(),
        }
    }

    pub fn rejected(answer: impl Into<String>) -> Self {
        Self {
            rejected: true,
            ..Self::answer(Intent::OutOfDomain, answer)
        }
    }

    /// A fallback answer produced because a component failed.
    pub fn degraded(intent: Intent, answer: impl Into<String>, err: &AppError) -> Self {
        Self {
            degraded: true,
            error: Some(ErrorInfo::from(err)),
            ..Self::answer(intent, answer)
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_sources(mut self, sources: Vec<SourceRef>) -> Self {
        self.sources = sources;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_history_is_optional() {
        let request: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(request.history.is_empty());

        let request: ChatRequest = serde_json::from_str(
            r#"{"message": "and hotels?", "history": [{"role": "user", "content": "Ranchi"}]}"#,
        )
        .unwrap();
        assert_eq!(request.history[0].role, Role::User);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let parsed = serde_json::from_str::<ChatRequest>(
            r#"{"message": "x", "history": [{"role": "system", "content": "y"}]}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_payload_is_flattened() {
        let response = ChatResponse::answer(Intent::Attractions, "See these.").with_payload(
            Payload::Attractions(AttractionList {
                location: "Ranchi".to_string(),
                items: vec!["Rock Garden".to_string()],
            }),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["intent"], "attractions");
        assert_eq!(json["attractions"]["location"], "Ranchi");
        assert!(json.get("payload").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("sources").is_none());
    }

    #[test]
    fn test_degraded_carries_error_kind() {
        let err = AppError::RetrievalUnavailable("index offline".to_string());
        let response = ChatResponse::degraded(Intent::Faq, "Try again later.", &err);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["degraded"], true);
        assert_eq!(json["rejected"], false);
        assert_eq!(json["error"]["kind"], "retrieval_unavailable");
    }

    #[test]
    fn test_rejected_response() {
        let response = ChatResponse::rejected("Only Jharkhand, sorry.");
        assert!(response.rejected);
        assert_eq!(response.intent, Intent::OutOfDomain);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["intent"], "out_of_domain");
    }
}
