//! Locale identifiers and negotiation.
//!
//! `LocaleId` is an open, validated language tag (`en`, `fr`, `fr-CA`,
//! `zh-Hant-TW`). Tags coming from the OS often use POSIX spelling
//! (`fr_FR.UTF-8`), so parsing normalizes them before validation.

use crate::i18n::I18nError;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// A validated, normalized locale identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocaleId(Cow<'static, str>);

impl LocaleId {
    /// English, the launcher's default fallback locale.
    pub const ENGLISH: LocaleId = LocaleId(Cow::Borrowed("en"));

    /// French.
    pub const FRENCH: LocaleId = LocaleId(Cow::Borrowed("fr"));

    /// Parse and normalize a locale tag.
    ///
    /// Accepts `-` or `_` as separator and strips POSIX codeset and modifier
    /// suffixes (`.UTF-8`, `@euro`). The language subtag is lowercased, region
    /// subtags uppercased and script subtags titlecased.
    ///
    /// # Example
    /// ```
    /// use gamehub_i18n::i18n::LocaleId;
    ///
    /// let id = LocaleId::parse("fr_ca.UTF-8").unwrap();
    /// assert_eq!(id.as_str(), "fr-CA");
    /// ```
    pub fn parse(tag: &str) -> Result<LocaleId, I18nError> {
        let trimmed = tag.trim();
        let bare = trimmed
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .replace('_', "-");

        let regex = TAG_REGEX
            .get_or_init(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{1,8})*$").unwrap());
        if !regex.is_match(&bare) {
            return Err(I18nError::InvalidLocale(tag.to_string()));
        }

        let normalized = bare
            .split('-')
            .enumerate()
            .map(|(index, subtag)| normalize_subtag(index, subtag))
            .collect::<Vec<_>>()
            .join("-");

        Ok(LocaleId(Cow::Owned(normalized)))
    }

    /// The full tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary language subtag (`fr` for `fr-CA`).
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// The tag with its last subtag removed, or `None` for a bare language.
    pub fn parent(&self) -> Option<LocaleId> {
        self.0
            .rsplit_once('-')
            .map(|(parent, _)| LocaleId(Cow::Owned(parent.to_string())))
    }

    /// This locale followed by each of its ancestors (`fr-CA`, `fr`).
    pub fn lineage(&self) -> Vec<LocaleId> {
        let mut lineage = vec![self.clone()];
        while let Some(parent) = lineage.last().and_then(LocaleId::parent) {
            lineage.push(parent);
        }
        lineage
    }
}

fn normalize_subtag(index: usize, subtag: &str) -> String {
    if index == 0 {
        return subtag.to_ascii_lowercase();
    }
    let alphabetic = subtag.chars().all(|c| c.is_ascii_alphabetic());
    match subtag.len() {
        2 if alphabetic => subtag.to_ascii_uppercase(),
        4 if alphabetic => {
            let lower = subtag.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => lower,
            }
        }
        _ => subtag.to_ascii_lowercase(),
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocaleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for LocaleId {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocaleId::parse(s)
    }
}

/// Pick the best registered locale for an ordered preference list.
///
/// For each preference, in order: an exact match, then a registered ancestor
/// (`fr-CA` -> `fr`), then any registered locale with the same language.
/// Preferences that fail to parse are skipped.
pub fn negotiate<S: AsRef<str>>(preferences: &[S], available: &[LocaleId]) -> Option<LocaleId> {
    for preference in preferences {
        let Ok(wanted) = LocaleId::parse(preference.as_ref()) else {
            continue;
        };

        if let Some(found) = wanted
            .lineage()
            .into_iter()
            .find(|candidate| available.contains(candidate))
        {
            return Some(found);
        }

        if let Some(sibling) = available
            .iter()
            .find(|candidate| candidate.language() == wanted.language())
        {
            return Some(sibling.clone());
        }
    }
    None
}

/// The OS language preference list, most preferred first.
pub fn system_preferences() -> Vec<String> {
    sys_locale::get_locales().collect()
}
