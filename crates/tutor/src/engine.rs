//! The turn engine: one user message in, exactly one assistant turn out.

use std::sync::Arc;
use std::time::Duration;

use cbc_tutor_config::TutorConfig;
use cbc_tutor_core::error::{Error, ProviderError};
use cbc_tutor_core::message::DEFAULT_HISTORY_WINDOW;
use cbc_tutor_core::provider::{GenerationRequest, Provider};
use tracing::{debug, info, warn};

use crate::prompt::compile_system_prompt;
use crate::session::SessionState;

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a call to [`Tutor::submit`] did to the session.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The provider answered; the reply was recorded and counted.
    Generated { text: String },
    /// Generation failed; an error turn was recorded, counters untouched.
    Failed { message: String, error: Error },
    /// Blank input; the session is unchanged.
    Ignored,
}

impl TurnOutcome {
    /// Text of the assistant turn that was appended, if any.
    pub fn assistant_text(&self) -> Option<&str> {
        match self {
            Self::Generated { text } => Some(text),
            Self::Failed { message, .. } => Some(message),
            Self::Ignored => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }
}

/// Drives request/response cycles against a provider.
pub struct Tutor {
    /// The text-generation backend
    provider: Arc<dyn Provider>,

    /// The model to request
    model: String,

    /// Max tokens per response
    max_tokens: u32,

    /// Number of recent turns sent as context
    history_window: usize,

    /// Upper bound on one provider call
    request_timeout: Duration,
}

impl Tutor {
    /// Create a tutor with default limits.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            history_window: DEFAULT_HISTORY_WINDOW,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Create a tutor using the model and limits from `config`.
    pub fn from_config(provider: Arc<dyn Provider>, config: &TutorConfig) -> Self {
        Self::new(provider)
            .with_model(&config.model)
            .with_max_tokens(config.max_tokens)
            .with_history_window(config.history_window)
            .with_request_timeout(config.request_timeout())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the outbound request for the session as it stands.
    pub fn build_request(&self, state: &SessionState) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: compile_system_prompt(state.grade(), state.subject(), state.role()),
            messages: state.conversation().recent_window(self.history_window).to_vec(),
            context: state.lesson_context(),
        }
    }

    /// Record `text` as a user turn, generate a reply, and record it.
    ///
    /// Never fails: provider errors, timeouts, and panics inside the provider
    /// all become an assistant error turn.
    pub async fn submit(&self, state: &mut SessionState, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }

        state.push_user(text);
        let request = self.build_request(state);
        debug!(
            session_id = %state.id(),
            provider = self.provider.name(),
            window = request.messages.len(),
            "Requesting generation"
        );

        match self.generate(request).await {
            Ok(reply) => {
                state.push_assistant(reply.clone(), true);
                info!(
                    session_id = %state.id(),
                    grade = state.grade().number(),
                    subject = state.subject(),
                    turns = state.conversation().len(),
                    materials = state.counters().materials_generated,
                    "Turn completed"
                );
                TurnOutcome::Generated { text: reply }
            }
            Err(error) => {
                warn!(session_id = %state.id(), error = %error, "Generation failed");
                let message = error_message(&error);
                state.push_assistant(message.clone(), false);
                TurnOutcome::Failed { message, error }
            }
        }
    }

    /// Run the provider in its own task under the timeout.
    async fn generate(&self, request: GenerationRequest) -> Result<String, Error> {
        let provider = Arc::clone(&self.provider);
        let timeout = self.request_timeout;
        let task = tokio::spawn(async move {
            tokio::time::timeout(timeout, provider.generate(request)).await
        });

        let response = match task.await {
            Ok(Ok(result)) => result?,
            Ok(Err(_elapsed)) => {
                return Err(ProviderError::Timeout(format!(
                    "no response within {}s",
                    timeout.as_secs()
                ))
                .into());
            }
            Err(join_err) => {
                return Err(Error::Unexpected(format!("generation task failed: {join_err}")));
            }
        };

        if response.text.trim().is_empty() {
            return Err(Error::Unexpected("the provider returned an empty response".into()));
        }
        Ok(response.text)
    }
}

/// User-visible text for a failed turn.
pub fn error_message(error: &Error) -> String {
    match error {
        Error::Provider(e) => match e.status_code() {
            Some(status) => format!("Error: Unable to generate response (Status: {status})"),
            None if e.is_transport() => format!("Error connecting to AI: {e}"),
            None => apology(error),
        },
        _ => apology(error),
    }
}

fn apology(error: &Error) -> String {
    format!("Sorry, I encountered an error: {error}\n\nPlease try again or rephrase your question.")
}
