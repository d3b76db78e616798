//! Built-in launcher catalogs and catalog directories.
//!
//! English and French ship inside the binary. Additional locales can be
//! dropped into a directory as `<locale>.json`; those files are only read when
//! a lookup first needs them.

use crate::i18n::{LoadError, LocaleId, LocaleRegistry, TranslationTree};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// English catalog (canonical, used as fallback)
pub const ENGLISH_CATALOG: &str = include_str!("../../locales/en.json");

/// French catalog
pub const FRENCH_CATALOG: &str = include_str!("../../locales/fr.json");

/// Locales compiled into the binary.
pub fn builtin_locales() -> Vec<LocaleId> {
    vec![LocaleId::ENGLISH, LocaleId::FRENCH]
}

/// Register the built-in catalogs. Parsing is deferred to first use.
pub fn register_builtin(registry: &LocaleRegistry) {
    registry.register(LocaleId::ENGLISH, || async {
        TranslationTree::from_json(ENGLISH_CATALOG)
    });
    registry.register(LocaleId::FRENCH, || async {
        TranslationTree::from_json(FRENCH_CATALOG)
    });
}

/// Register every `<locale>.json` file in `dir`.
///
/// Files whose stem is not a valid locale identifier are skipped. A locale
/// that is already registered (e.g. a built-in) is replaced by the file.
/// Returns the locales registered, sorted.
pub async fn register_directory(
    registry: &LocaleRegistry,
    dir: &Path,
) -> Result<Vec<LocaleId>, LoadError> {
    let io_error = |err: std::io::Error| LoadError::Io {
        path: dir.to_path_buf(),
        message: err.to_string(),
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
    let mut registered = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let locale = match LocaleId::parse(stem) {
            Ok(locale) => locale,
            Err(err) => {
                warn!("Skipping catalog {}: {}", path.display(), err);
                continue;
            }
        };

        debug!("Found catalog {} for locale {}", path.display(), locale);
        registry.register(locale.clone(), move || load_file(path));
        registered.push(locale);
    }

    registered.sort();
    Ok(registered)
}

async fn load_file(path: PathBuf) -> Result<TranslationTree, LoadError> {
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|err| LoadError::Io {
            path: path.clone(),
            message: err.to_string(),
        })?;
    TranslationTree::from_json(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{InitOptions, KeyPath, LocaleState};
    use tempfile::TempDir;

    fn parse(catalog: &str) -> TranslationTree {
        TranslationTree::from_json(catalog).expect("Built-in catalog should parse")
    }

    fn text<'a>(tree: &'a TranslationTree, path: &str) -> Option<&'a str> {
        tree.get(&KeyPath::parse(path).unwrap())
    }

    // ==================== Built-in Catalog Tests ====================

    #[test]
    fn test_builtin_catalogs_parse() {
        assert!(!parse(ENGLISH_CATALOG).is_empty());
        assert!(!parse(FRENCH_CATALOG).is_empty());
    }

    #[test]
    fn test_builtin_catalogs_share_key_paths() {
        let english = parse(ENGLISH_CATALOG);
        let french = parse(FRENCH_CATALOG);
        assert_eq!(english.key_paths(), french.key_paths());
    }

    #[test]
    fn test_english_error_text() {
        let english = parse(ENGLISH_CATALOG);
        assert_eq!(text(&english, "error"), Some("Error"));
        assert_eq!(text(&english, "settings.general.drives_title"), Some("Drives to scan"));
        assert_eq!(text(&english, "details.hltb_title"), Some("Time to Beat"));
    }

    #[test]
    fn test_french_error_text() {
        let french = parse(FRENCH_CATALOG);
        assert_eq!(text(&french, "error"), Some("Erreur"));
        assert_eq!(text(&french, "autostart_popup.title"), Some("Lancer au démarrage ?"));
        assert_eq!(text(&french, "settings.tabs.about"), Some("À Propos"));
    }

    #[test]
    fn test_builtin_locales() {
        assert_eq!(builtin_locales(), vec![LocaleId::ENGLISH, LocaleId::FRENCH]);
    }

    #[tokio::test]
    async fn test_register_builtin_is_lazy() {
        let registry = LocaleRegistry::new();
        register_builtin(&registry);
        assert_eq!(registry.state(&LocaleId::ENGLISH), Some(LocaleState::Unresolved));
        assert_eq!(registry.state(&LocaleId::FRENCH), Some(LocaleState::Unresolved));

        registry
            .initialize(InitOptions::new(LocaleId::ENGLISH).with_initial_locale(LocaleId::FRENCH))
            .unwrap();
        assert_eq!(registry.lookup("game_card.play").await, "JOUER");
        assert_eq!(registry.state(&LocaleId::ENGLISH), Some(LocaleState::Unresolved));
    }

    // ==================== Directory Tests ====================

    #[tokio::test]
    async fn test_register_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("de.json"), r#"{ "error": "Fehler" }"#).unwrap();
        std::fs::write(dir.path().join("es_MX.json"), r#"{ "error": "Error (MX)" }"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("x.json"), "{}").unwrap();

        let registry = LocaleRegistry::new();
        let registered = register_directory(&registry, dir.path()).await.unwrap();
        let names: Vec<String> = registered.iter().map(|l| l.to_string()).collect();
        assert_eq!(names, vec!["de", "es-MX"]);
        assert_eq!(registry.state(&registered[0]), Some(LocaleState::Unresolved));

        registry
            .initialize(
                InitOptions::new(registered[0].clone()).with_initial_locale(registered[0].clone()),
            )
            .unwrap();
        assert_eq!(registry.lookup("error").await, "Fehler");
    }

    #[tokio::test]
    async fn test_directory_overrides_builtin() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("fr.json"), r#"{ "error": "Erreur !" }"#).unwrap();

        let registry = LocaleRegistry::new();
        register_builtin(&registry);
        register_directory(&registry, dir.path()).await.unwrap();
        registry
            .initialize(InitOptions::new(LocaleId::ENGLISH).with_initial_locale(LocaleId::FRENCH))
            .unwrap();

        assert_eq!(registry.lookup("error").await, "Erreur !");
        // Keys absent from the override come from the fallback
        assert_eq!(registry.lookup("tabs.all").await, "All");
    }

    #[tokio::test]
    async fn test_file_removed_before_first_use_fails_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("de.json");
        std::fs::write(&path, r#"{ "error": "Fehler" }"#).unwrap();

        let registry = LocaleRegistry::new();
        register_builtin(&registry);
        register_directory(&registry, dir.path()).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let de = LocaleId::parse("de").unwrap();
        registry
            .initialize(InitOptions::new(LocaleId::ENGLISH).with_initial_locale(de.clone()))
            .unwrap();

        assert_eq!(registry.lookup("error").await, "Error");
        assert!(matches!(
            registry.state(&de),
            Some(LocaleState::Failed(LoadError::Io { .. }))
        ));
    }

    #[tokio::test]
    async fn test_register_directory_missing_dir() {
        let registry = LocaleRegistry::new();
        let result = register_directory(&registry, Path::new("/nonexistent/catalogs")).await;
        assert!(matches!(result, Err(LoadError::Io { .. })));
        assert!(registry.locales().is_empty());
    }
}
