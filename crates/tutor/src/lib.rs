//! The tutoring session: prompt compilation, session state, and the turn engine.
//!
//! One turn follows a fixed cycle:
//!
//! 1. **Receive** the user's message and append it to the conversation
//! 2. **Compile** the system prompt from grade, subject, and role
//! 3. **Window** the conversation to the most recent turns
//! 4. **Generate** a reply through the configured provider, bounded by a timeout
//! 5. **Record** exactly one assistant turn, success or failure
//!
//! Selections (grade, subject, role) and the clear action are handled by a
//! pure reducer on [`SessionState`]; only step 4 touches the outside world.

pub mod engine;
pub mod guidance;
pub mod prompt;
pub mod session;
pub mod typing;

pub use engine::{Tutor, TurnOutcome};
pub use prompt::{compile_from_labels, compile_system_prompt};
pub use session::{SessionCounters, SessionEvent, SessionId, SessionState, SessionView};
pub use typing::TypingEffect;
