//! Configuration loading, validation, and management for the CBC Tutor.
//!
//! Loads configuration from `~/.cbc-tutor/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use cbc_tutor_core::curriculum::{self, GradeLevel, LearnerRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Providers `build_from_config` knows how to construct.
pub const KNOWN_PROVIDERS: &[&str] = &["placeholder", "anthropic"];

/// The root configuration structure.
///
/// Maps directly to `~/.cbc-tutor/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Which generation backend answers: "placeholder" or "anthropic"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model requested from the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Max tokens per generated response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on a single generation call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How many recent turns are sent along with each request
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Initial selections for a new session
    #[serde(default)]
    pub session: SessionDefaults,

    /// Chunked reveal of responses in the terminal
    #[serde(default)]
    pub typing: TypingConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "placeholder".into()
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_max_tokens() -> u32 {
    4000
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_history_window() -> usize {
    cbc_tutor_core::DEFAULT_HISTORY_WINDOW
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for TutorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("history_window", &self.history_window)
            .field("session", &self.session)
            .field("typing", &self.typing)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Grade, subject, and role a session starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default = "default_grade")]
    pub grade: u8,

    #[serde(default = "default_subject")]
    pub subject: String,

    #[serde(default = "default_role")]
    pub role: String,
}

fn default_grade() -> u8 {
    4
}
fn default_subject() -> String {
    "Mathematics".into()
}
fn default_role() -> String {
    "teacher".into()
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            grade: default_grade(),
            subject: default_subject(),
            role: default_role(),
        }
    }
}

impl SessionDefaults {
    /// Parsed grade; fails if outside 1..=9.
    pub fn grade_level(&self) -> Result<GradeLevel, ConfigError> {
        GradeLevel::new(self.grade).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Parsed role; fails unless "teacher" or "student".
    pub fn learner_role(&self) -> Result<LearnerRole, ConfigError> {
        self.role
            .parse()
            .map_err(|e: cbc_tutor_core::CurriculumError| ConfigError::ValidationError(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_words_per_chunk")]
    pub words_per_chunk: usize,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_words_per_chunk() -> usize {
    5
}
fn default_interval_ms() -> u64 {
    50
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            words_per_chunk: default_words_per_chunk(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl TypingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl TutorConfig {
    /// Load configuration from the default path (~/.cbc-tutor/config.toml),
    /// or from `path` when given.
    ///
    /// Environment overrides:
    /// - `CBC_TUTOR_API_KEY`, then `ANTHROPIC_API_KEY` (only when no key is configured)
    /// - `CBC_TUTOR_PROVIDER`
    /// - `CBC_TUTOR_MODEL`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path(),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), provider = %config.provider, "Loaded config");
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("CBC_TUTOR_API_KEY").or_else(|| lookup("ANTHROPIC_API_KEY"));
        }

        if let Some(provider) = lookup("CBC_TUTOR_PROVIDER") {
            self.provider = provider;
        }

        if let Some(model) = lookup("CBC_TUTOR_MODEL") {
            self.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cbc-tutor")
    }

    /// Default location of the config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown provider '{}' (expected one of: {})",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError("max_tokens must be > 0".into()));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if self.history_window == 0 {
            return Err(ConfigError::ValidationError("history_window must be > 0".into()));
        }

        if self.typing.words_per_chunk == 0 {
            return Err(ConfigError::ValidationError(
                "typing.words_per_chunk must be > 0".into(),
            ));
        }

        let grade = self.session.grade_level()?;
        self.session.learner_role()?;
        if curriculum::canonical_subject(&self.session.subject, grade.tier()).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "session.subject '{}' is not offered in {}",
                self.session.subject,
                grade.tier()
            )));
        }

        Ok(())
    }

    /// Upper bound on a single generation call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// API key for `provider`: the provider's own key, else the global one.
    pub fn api_key_for(&self, provider: &str) -> Option<String> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_key.clone())
            .or_else(|| self.api_key.clone())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key_for(&self.provider).is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Write the default config to `path`, creating parent directories.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, Self::default_toml()).map_err(write_err)
    }
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            history_window: default_history_window(),
            session: SessionDefaults::default(),
            typing: TypingConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to write config file at {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TutorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider, "placeholder");
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.history_window, 10);
        assert_eq!(config.session.grade, 4);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = TutorConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: TutorConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider, config.provider);
        assert_eq!(parsed.typing.words_per_chunk, config.typing.words_per_chunk);
    }

    #[test]
    fn unknown_provider_rejected() {
        let config = TutorConfig {
            provider: "openrouter".into(),
            ..TutorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_limits_rejected() {
        let cases = [
            TutorConfig { max_tokens: 0, ..TutorConfig::default() },
            TutorConfig { request_timeout_secs: 0, ..TutorConfig::default() },
            TutorConfig { history_window: 0, ..TutorConfig::default() },
        ];
        for config in cases {
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn session_subject_must_match_grade_tier() {
        let mut config = TutorConfig::default();
        config.session.grade = 2;
        config.session.subject = "Agriculture".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Agriculture"));

        config.session.grade = 8;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn session_subject_case_is_ignored() {
        let mut config = TutorConfig::default();
        config.session.subject = "mathematics".into();
        assert!(config.validate().is_ok());

        config.session.grade = 6;
        config.session.subject = "science AND technology".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_session_grade_and_role_rejected() {
        let mut config = TutorConfig::default();
        config.session.grade = 12;
        assert!(config.validate().is_err());

        let mut config = TutorConfig::default();
        config.session.role = "headteacher".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = TutorConfig::load_from(Path::new("/nonexistent/config.toml"));
        let config = result.unwrap();
        assert_eq!(config.provider, "placeholder");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
provider = "anthropic"
max_tokens = 2000

[session]
grade = 7
subject = "Integrated Science"
role = "student"

[typing]
enabled = false

[providers.anthropic]
api_url = "http://localhost:9999"
api_key = "sk-ant-local"
"#,
        )
        .unwrap();

        let config = TutorConfig::load_from(&path).unwrap();
        assert_eq!(config.provider, "anthropic");
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.model, "claude-sonnet-4-20250514");
        assert_eq!(config.session.learner_role().unwrap(), LearnerRole::Student);
        assert!(!config.typing.enabled);
        assert_eq!(config.typing.interval_ms, 50);
        assert_eq!(config.api_key_for("anthropic").as_deref(), Some("sk-ant-local"));
        assert!(config.has_api_key());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_tokens = \"lots\"").unwrap();
        assert!(matches!(
            TutorConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides() {
        let mut config = TutorConfig::default();
        config.apply_env_overrides(|key| match key {
            "ANTHROPIC_API_KEY" => Some("sk-ant-env".into()),
            "CBC_TUTOR_PROVIDER" => Some("anthropic".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("sk-ant-env"));
        assert_eq!(config.provider, "anthropic");
        assert_eq!(config.model, "claude-sonnet-4-20250514");
    }

    #[test]
    fn configured_key_wins_over_env() {
        let mut config = TutorConfig {
            api_key: Some("from-file".into()),
            ..TutorConfig::default()
        };
        config.apply_env_overrides(|key| match key {
            "CBC_TUTOR_API_KEY" => Some("from-env".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn debug_redacts_keys() {
        let config = TutorConfig {
            api_key: Some("sk-ant-secret".into()),
            ..TutorConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn write_default_creates_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        TutorConfig::write_default(&path).unwrap();
        let config = TutorConfig::load_from(&path).unwrap();
        assert_eq!(config.session.subject, "Mathematics");
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = TutorConfig::default_toml();
        assert!(toml_str.contains("placeholder"));
        assert!(toml_str.contains("words_per_chunk"));
    }
}
