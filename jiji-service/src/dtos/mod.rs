//! Request and response bodies for the ask endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::middleware::UserId;

pub const MOCK_ANSWER: &str = "This is a mock answer from Jiji.";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, message = "Query cannot be empty"))]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskResponse {
    pub answer: String,
}

impl AskResponse {
    pub fn mock() -> Self {
        Self {
            answer: MOCK_ANSWER.to_string(),
        }
    }
}

/// A request that passed identity and body validation.
///
/// Only [`AskEnvelope::new`] builds one, and it takes already-validated
/// parts, so holding an envelope means both fields are present and non-empty.
#[derive(Debug, Clone)]
pub struct AskEnvelope {
    user_id: UserId,
    query: String,
}

impl AskEnvelope {
    pub fn new(user_id: UserId, request: AskRequest) -> Self {
        Self {
            user_id,
            query: request.query,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id.0
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}
