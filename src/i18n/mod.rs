//! Internationalization (i18n) module for the launcher's UI strings.
//!
//! # Architecture
//!
//! - `registry`: Locale registry with lazy, memoized catalog producers and fallback lookup
//! - `locale`: Validated locale identifiers and preference negotiation
//! - `tree`: Translation trees, key paths and placeholder interpolation
//! - `catalog`: Built-in English/French catalogs and catalog directories
//! - `validator`: Catalog coverage validation against the fallback locale
//! - `metrics`: Lookup and resolution counters
//!
//! # Example
//!
//! ```rust,ignore
//! use gamehub_i18n::i18n::{catalog, InitOptions, LocaleId, LocaleRegistry};
//!
//! let registry = LocaleRegistry::new();
//! catalog::register_builtin(&registry);
//! registry.initialize(InitOptions::new(LocaleId::ENGLISH))?;
//!
//! let title = registry.lookup("settings.title").await;
//! ```

pub mod catalog;
mod error;
mod locale;
mod metrics;
mod registry;
mod tree;
mod validator;

pub use error::{I18nError, LoadError, LookupError};
pub use locale::{negotiate, system_preferences, LocaleId};
pub use metrics::{LookupMetrics, MetricsReport};
pub use registry::{InitOptions, LocaleRegistry, LocaleState, MissingKeyPolicy};
pub use tree::{interpolate, placeholders, KeyPath, Node, TranslationTree};
pub use validator::{CoverageValidator, ValidationReport};
