//! Placeholder provider: canned demo replies, no network.
//!
//! This is the default backend. It echoes the latest question and names the
//! session's grade and subject, then explains how to turn on real generation.

use async_trait::async_trait;
use cbc_tutor_core::error::ProviderError;
use cbc_tutor_core::provider::{GenerationRequest, GenerationResponse, Provider};

/// Answers every request with a fixed templated demo message.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderProvider;

impl PlaceholderProvider {
    pub fn new() -> Self {
        Self
    }

    /// Build the demo reply for a question asked at `grade` in `subject`.
    pub fn render(question: &str, grade: &str, subject: &str) -> String {
        format!(
            concat!(
                "I understand you're asking about: \"{question}\"\n\n",
                "For {grade} {subject}, let me help you.\n\n",
                "**Note:** This is a demo version. To activate full AI capabilities:\n\n",
                "1. Add your Anthropic API key (`api_key` in config.toml or `ANTHROPIC_API_KEY`)\n",
                "2. Set `provider = \"anthropic\"` in config.toml\n",
                "3. Restart `cbc-tutor chat`\n\n",
                "**What I can do when fully activated:**\n",
                "- Generate custom worksheets with questions\n",
                "- Create detailed lesson plans\n",
                "- Explain concepts step-by-step\n",
                "- Provide practice problems with solutions\n",
                "- Make assessments with marking schemes\n",
                "- Help with homework\n",
                "- Create study materials\n\n",
                "**For now, try the example prompts (`/examples`)!**\n\n",
                "Would you like me to create a specific type of material? I can generate:\n",
                "- 📝 Worksheets\n",
                "- 📋 Lesson Plans\n",
                "- ✅ Quizzes/Tests\n",
                "- 🎴 Flashcards\n",
                "- 💡 Explanations\n",
            ),
            question = question,
            grade = grade,
            subject = subject,
        )
    }
}

#[async_trait]
impl Provider for PlaceholderProvider {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError> {
        let question = request.latest_user_text().unwrap_or_default();
        let text = Self::render(
            question,
            &request.context.grade.label(),
            &request.context.subject,
        );

        Ok(GenerationResponse {
            text,
            model: "placeholder".into(),
            usage: None,
        })
    }
}
