//! Localization and theme tokens for the GameHub launcher.
//!
//! - `i18n`: locale registry, catalogs and lookup with fallback
//! - `theme`: colour palette and font stack
//! - `config`: environment configuration for the binary

pub mod config;
pub mod i18n;
pub mod theme;

use anyhow::{Context, Result};
use config::Config;
use i18n::{catalog, InitOptions, LocaleRegistry};
use tracing::info;

/// Build an initialized registry from configuration.
///
/// Registers the built-in catalogs, then any catalog directory (which may
/// replace a built-in), then initializes with the configured locale or the
/// OS preferences.
pub async fn bootstrap(config: &Config) -> Result<LocaleRegistry> {
    let registry = LocaleRegistry::with_missing_key_policy(config.missing_key);
    catalog::register_builtin(&registry);

    if let Some(dir) = &config.locales_dir {
        let added = catalog::register_directory(&registry, dir)
            .await
            .with_context(|| format!("Failed to read catalog directory {}", dir.display()))?;
        info!("Registered {} catalog(s) from {}", added.len(), dir.display());
    }

    let mut options = InitOptions::new(config.fallback_locale.clone());
    if let Some(locale) = &config.locale {
        options = options.with_initial_locale(locale.clone());
    }
    registry
        .initialize(options)
        .context("Failed to initialize locale registry")?;

    Ok(registry)
}
