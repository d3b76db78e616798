//! Error types for the localization layer.

use crate::i18n::LocaleId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum I18nError {
    /// A locale tag could not be parsed.
    #[error("Invalid locale identifier: '{0}'")]
    InvalidLocale(String),

    /// `initialize` was given a fallback locale that has no provider.
    #[error("Fallback locale '{0}' is not registered")]
    UnregisteredFallback(LocaleId),

    /// `initialize` was called a second time.
    #[error("Locale registry is already initialized")]
    AlreadyInitialized,

    /// An operation needing the active locale ran before `initialize`.
    #[error("Locale registry is not initialized")]
    NotInitialized,
}

/// Errors produced while resolving a locale's translation tree.
///
/// Cached per locale once a producer fails, so it has to be `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// The catalog content is not a valid translation tree.
    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    /// A custom producer reported a failure.
    #[error("Producer failed: {0}")]
    Producer(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse(err.to_string())
    }
}

/// Reportable lookup failures, returned by `try_lookup`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No locale in the chain defines the key path.
    #[error("Translation key not found: '{0}'")]
    NotFound(String),

    /// The registry has no active locale yet.
    #[error("Locale registry is not initialized")]
    NotInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_locale_display() {
        let err = I18nError::InvalidLocale("x!".to_string());
        assert_eq!(err.to_string(), "Invalid locale identifier: 'x!'");
    }

    #[test]
    fn test_unregistered_fallback_display() {
        let err = I18nError::UnregisteredFallback(LocaleId::ENGLISH);
        assert!(err.to_string().contains("'en'"));
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = LoadError::Io {
            path: PathBuf::from("/tmp/de.json"),
            message: "permission denied".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("/tmp/de.json"));
        assert!(text.contains("permission denied"));
    }

    #[test]
    fn test_serde_error_converts_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let load: LoadError = err.into();
        assert!(matches!(load, LoadError::Parse(_)));
    }

    #[test]
    fn test_not_found_display() {
        let err = LookupError::NotFound("missing.key".to_string());
        assert_eq!(err.to_string(), "Translation key not found: 'missing.key'");
    }
}
