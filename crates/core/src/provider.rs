//! Provider trait: the abstraction over text-generation backends.
//!
//! A Provider takes the compiled system prompt plus the recent conversation
//! window and returns generated text.
//!
//! Implementations: a placeholder that answers with canned demo text, and the
//! Anthropic Messages API. The session engine never knows which one it holds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::curriculum::{GradeLevel, LearnerRole};
use crate::error::ProviderError;
use crate::message::Turn;

/// The learner-facing selections in effect when a request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonContext {
    pub grade: GradeLevel,
    pub subject: String,
    pub role: LearnerRole,
}

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// The compiled system prompt
    pub system: String,

    /// Recent conversation window, oldest first
    pub messages: Vec<Turn>,

    /// Selections the prompt was compiled from
    pub context: LessonContext,
}

impl GenerationRequest {
    /// Text of the newest user turn in the window.
    pub fn latest_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|t| t.role == crate::message::TurnRole::User)
            .map(|t| t.content.as_str())
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated text
    pub text: String,

    /// Which model actually responded
    pub model: String,

    /// Token usage statistics, when the backend reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// The core Provider trait.
///
/// The turn engine calls `generate()` without knowing whether the reply is
/// canned or comes from the network; swapping one for the other is a
/// configuration change.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "placeholder", "anthropic").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError>;

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
