//! # CBC Tutor Core
//!
//! Domain types, traits, and error definitions for the CBC Tutor.
//! This crate has **no I/O**: it defines the domain model that the
//! configuration, provider, and session crates build against.
//!
//! ## Contents
//!
//! - [`curriculum`]: grade levels, curriculum tiers, subject lists, and the
//!   static topic table
//! - [`message`]: conversation turns and the append-only conversation log
//! - [`provider`]: the `Provider` trait behind which text generation sits
//! - [`error`]: one error enum per bounded context

pub mod curriculum;
pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use curriculum::{CurriculumTier, GradeLevel, LearnerRole, Topics};
pub use error::{CurriculumError, Error, ProviderError, Result};
pub use message::{Conversation, Turn, TurnRole, DEFAULT_HISTORY_WINDOW};
pub use provider::{GenerationRequest, GenerationResponse, LessonContext, Provider, Usage};
