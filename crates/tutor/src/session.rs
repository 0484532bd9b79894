//! Explicit session state and its reducer.
//!
//! A session lives from the start of `cbc-tutor chat` until exit. Selection
//! changes and the clear action are pure transitions through
//! [`SessionState::apply`]; the turn engine is the only other writer, and it
//! appends turns and bumps counters through crate-private methods.

use cbc_tutor_config::SessionDefaults;
use cbc_tutor_core::curriculum::{self, CurriculumTier, GradeLevel, LearnerRole};
use cbc_tutor_core::error::{CurriculumError, Result};
use cbc_tutor_core::message::{Conversation, Turn};
use cbc_tutor_core::provider::LessonContext;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Unique identifier for a tutoring session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-session statistics shown next to the chat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    /// Successful assistant turns since the session started or was cleared.
    pub materials_generated: u64,
}

/// Inbound selection events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SelectGrade(GradeLevel),
    SelectSubject(String),
    SelectRole(LearnerRole),
    Clear,
}

/// Everything one interactive session knows.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: SessionId,
    grade: GradeLevel,
    subject: &'static str,
    role: LearnerRole,
    conversation: Conversation,
    counters: SessionCounters,
    started_at: DateTime<Utc>,
}

/// Resolve `subject` against the tier's list, returning the canonical name.
fn subject_for_tier(subject: &str, tier: CurriculumTier) -> Result<&'static str> {
    curriculum::canonical_subject(subject, tier).ok_or_else(|| {
        CurriculumError::SubjectNotInTier {
            subject: subject.trim().to_string(),
            tier: tier.name().to_string(),
        }
        .into()
    })
}

impl SessionState {
    /// Start a session. The subject must be offered in the grade's tier.
    pub fn new(grade: GradeLevel, subject: &str, role: LearnerRole) -> Result<Self> {
        let subject = subject_for_tier(subject, grade.tier())?;
        Ok(Self {
            id: SessionId::new(),
            grade,
            subject,
            role,
            conversation: Conversation::new(),
            counters: SessionCounters::default(),
            started_at: Utc::now(),
        })
    }

    /// Start a session from the `[session]` config table.
    pub fn from_defaults(defaults: &SessionDefaults) -> Result<Self> {
        let grade = GradeLevel::new(defaults.grade)?;
        let role: LearnerRole = defaults.role.parse()?;
        Self::new(grade, &defaults.subject, role)
    }

    /// Apply one selection event, producing the next state.
    pub fn apply(mut self, event: SessionEvent) -> Result<Self> {
        match event {
            SessionEvent::SelectGrade(grade) => {
                let tier = grade.tier();
                if !curriculum::subject_in_tier(self.subject, tier) {
                    info!(
                        session_id = %self.id,
                        from = self.subject,
                        to = tier.default_subject(),
                        "Subject not offered in new tier, resetting"
                    );
                    self.subject = tier.default_subject();
                }
                self.grade = grade;
            }
            SessionEvent::SelectSubject(subject) => {
                self.subject = subject_for_tier(&subject, self.grade.tier())?;
            }
            SessionEvent::SelectRole(role) => {
                self.role = role;
            }
            SessionEvent::Clear => self.clear(),
        }
        Ok(self)
    }

    /// Drop every turn and zero the counters. Idempotent.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.counters = SessionCounters::default();
        info!(session_id = %self.id, "Session cleared");
    }

    pub(crate) fn push_user(&mut self, text: impl Into<String>) {
        self.conversation.push(Turn::user(text));
    }

    pub(crate) fn push_assistant(&mut self, text: impl Into<String>, succeeded: bool) {
        self.conversation.push(Turn::assistant(text));
        if succeeded {
            self.counters.materials_generated += 1;
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn grade(&self) -> GradeLevel {
        self.grade
    }

    pub fn tier(&self) -> CurriculumTier {
        self.grade.tier()
    }

    pub fn subject(&self) -> &'static str {
        self.subject
    }

    pub fn role(&self) -> LearnerRole {
        self.role
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn counters(&self) -> SessionCounters {
        self.counters
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Completed exchanges, counted as turns / 2.
    pub fn conversations(&self) -> usize {
        self.conversation.len() / 2
    }

    /// Selections as sent alongside a generation request.
    pub fn lesson_context(&self) -> LessonContext {
        LessonContext {
            grade: self.grade,
            subject: self.subject.to_string(),
            role: self.role,
        }
    }

    /// Snapshot for the front end: selections, full history, and stats.
    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            session_id: &self.id.0,
            grade: self.grade.label(),
            tier: self.grade.tier().name(),
            subject: self.subject,
            role: self.role,
            turns: self.conversation.turns(),
            conversations: self.conversations(),
            materials_generated: self.counters.materials_generated,
        }
    }
}

/// The render instruction handed to whatever draws the session.
#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub session_id: &'a str,
    pub grade: String,
    pub tier: &'static str,
    pub subject: &'static str,
    pub role: LearnerRole,
    pub turns: &'a [Turn],
    pub conversations: usize,
    pub materials_generated: u64,
}
