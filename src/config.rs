use crate::i18n::{LocaleId, MissingKeyPolicy};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Locales
    pub fallback_locale: LocaleId,
    pub locale: Option<LocaleId>,

    // Extra catalogs
    pub locales_dir: Option<PathBuf>,

    // Lookup behavior
    pub missing_key: MissingKeyPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_locale: LocaleId::ENGLISH,
            locale: None,
            locales_dir: None,
            missing_key: MissingKeyPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Locales
            fallback_locale: match non_empty_var("GAMEHUB_FALLBACK_LOCALE") {
                Some(value) => LocaleId::parse(&value)
                    .context("GAMEHUB_FALLBACK_LOCALE is not a valid locale")?,
                None => LocaleId::ENGLISH,
            },
            locale: non_empty_var("GAMEHUB_LOCALE")
                .map(|value| LocaleId::parse(&value))
                .transpose()
                .context("GAMEHUB_LOCALE is not a valid locale")?,

            // Extra catalogs
            locales_dir: non_empty_var("GAMEHUB_LOCALES_DIR").map(PathBuf::from),

            // Lookup behavior
            missing_key: match non_empty_var("GAMEHUB_MISSING_KEY") {
                Some(value) => value
                    .parse()
                    .map_err(|err: String| anyhow!(err))
                    .context("GAMEHUB_MISSING_KEY must be 'key' or 'empty'")?,
                None => MissingKeyPolicy::default(),
            },
        })
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
