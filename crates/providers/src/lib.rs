//! Text-generation provider implementations for the CBC Tutor.
//!
//! All providers implement the `cbc_tutor_core::Provider` trait.
//! The router selects the correct provider based on configuration.

pub mod anthropic;
pub mod placeholder;
pub mod router;

pub use anthropic::AnthropicProvider;
pub use placeholder::PlaceholderProvider;
pub use router::build_from_config;
