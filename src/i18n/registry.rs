//! Locale registry: lazily resolved catalogs with fallback lookup.
//!
//! The registry is an owned context object. Share it behind an `Arc` with
//! whatever renders text; independent registries never interfere.
//!
//! # Resolution
//!
//! Each registered locale has a slot moving through
//! `Unresolved -> Resolving -> Resolved | Failed`. The producer runs at most
//! once: concurrent lookups during `Resolving` await the same shared future,
//! and a failure is cached so the producer is never retried.
//!
//! # Lookup
//!
//! A key path is looked up along the locale chain: the active locale, its
//! registered parents (`fr-CA` -> `fr`), then the fallback locale. Locales that
//! are unregistered or failed to resolve are skipped. When nothing matches, the
//! missing-key policy decides what to display; lookups never fail.

use crate::i18n::locale::{negotiate, system_preferences};
use crate::i18n::tree::{interpolate, KeyPath, TranslationTree};
use crate::i18n::validator::{CoverageValidator, ValidationReport};
use crate::i18n::{I18nError, LoadError, LocaleId, LookupError, LookupMetrics};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info, warn};

type Producer = Box<dyn FnOnce() -> BoxFuture<'static, Result<TranslationTree, LoadError>> + Send>;
type PendingTree = Shared<BoxFuture<'static, Result<Arc<TranslationTree>, LoadError>>>;

/// What to display when no locale in the chain has a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKeyPolicy {
    /// Display the key path itself (`missing.key`)
    #[default]
    KeyPath,
    /// Display nothing
    Empty,
}

impl MissingKeyPolicy {
    fn render(&self, key: &str) -> String {
        match self {
            MissingKeyPolicy::KeyPath => key.to_string(),
            MissingKeyPolicy::Empty => String::new(),
        }
    }
}

impl FromStr for MissingKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "key" | "key_path" | "keypath" => Ok(MissingKeyPolicy::KeyPath),
            "empty" => Ok(MissingKeyPolicy::Empty),
            other => Err(format!(
                "Unknown missing-key policy '{}'. Expected 'key' or 'empty'",
                other
            )),
        }
    }
}

/// Observable resolution state of a registered locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleState {
    Unresolved,
    Resolving,
    Resolved,
    Failed(LoadError),
}

/// Options accepted by [`LocaleRegistry::initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOptions {
    /// Locale used whenever the active chain lacks a key. Must be registered.
    pub fallback_locale: LocaleId,

    /// Starting locale. `None` negotiates from the OS preference list.
    pub initial_locale: Option<LocaleId>,
}

impl InitOptions {
    pub fn new(fallback_locale: LocaleId) -> Self {
        Self {
            fallback_locale,
            initial_locale: None,
        }
    }

    pub fn with_initial_locale(mut self, locale: LocaleId) -> Self {
        self.initial_locale = Some(locale);
        self
    }
}

enum SlotState {
    Unresolved(Producer),
    Resolving(PendingTree),
    Resolved(Arc<TranslationTree>),
    Failed(LoadError),
}

enum Step {
    Done(Result<Arc<TranslationTree>, LoadError>),
    Wait(PendingTree),
}

struct LocaleSlot {
    state: Mutex<SlotState>,
}

impl LocaleSlot {
    fn new(producer: Producer) -> Self {
        Self {
            state: Mutex::new(SlotState::Unresolved(producer)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> LocaleState {
        match &*self.lock() {
            SlotState::Unresolved(_) => LocaleState::Unresolved,
            SlotState::Resolving(_) => LocaleState::Resolving,
            SlotState::Resolved(_) => LocaleState::Resolved,
            SlotState::Failed(err) => LocaleState::Failed(err.clone()),
        }
    }

    fn resolved(&self) -> Option<Arc<TranslationTree>> {
        match &*self.lock() {
            SlotState::Resolved(tree) => Some(Arc::clone(tree)),
            _ => None,
        }
    }

    /// Start the producer if nobody has, or join the resolution in flight.
    fn begin(&self, locale: &LocaleId) -> Step {
        let mut state = self.lock();
        let placeholder = SlotState::Failed(LoadError::Producer("resolution interrupted".into()));
        let (next, step) = match std::mem::replace(&mut *state, placeholder) {
            SlotState::Unresolved(producer) => {
                debug!("Resolving catalog for locale {}", locale);
                let pending: PendingTree = AssertUnwindSafe(producer())
                    .catch_unwind()
                    .map(|outcome| match outcome {
                        Ok(result) => result.map(Arc::new),
                        Err(_) => Err(LoadError::Producer("producer panicked".to_string())),
                    })
                    .boxed()
                    .shared();
                (SlotState::Resolving(pending.clone()), Step::Wait(pending))
            }
            SlotState::Resolving(pending) => {
                (SlotState::Resolving(pending.clone()), Step::Wait(pending))
            }
            SlotState::Resolved(tree) => {
                (SlotState::Resolved(Arc::clone(&tree)), Step::Done(Ok(tree)))
            }
            SlotState::Failed(err) => (SlotState::Failed(err.clone()), Step::Done(Err(err))),
        };
        *state = next;
        step
    }

    /// Store the outcome of a resolution. Only the first finisher records it.
    fn finish(
        &self,
        locale: &LocaleId,
        outcome: &Result<Arc<TranslationTree>, LoadError>,
        metrics: &LookupMetrics,
    ) {
        let mut state = self.lock();
        if !matches!(&*state, SlotState::Resolving(_)) {
            return;
        }
        match outcome {
            Ok(tree) => {
                debug!("Resolved locale {} ({} strings)", locale, tree.len());
                metrics.record_resolution();
                *state = SlotState::Resolved(Arc::clone(tree));
            }
            Err(err) => {
                warn!(
                    "Catalog for locale {} failed to load, using fallback: {}",
                    locale, err
                );
                metrics.record_resolution_failure();
                *state = SlotState::Failed(err.clone());
            }
        }
    }

    async fn resolve(
        &self,
        locale: &LocaleId,
        metrics: &LookupMetrics,
    ) -> Result<Arc<TranslationTree>, LoadError> {
        match self.begin(locale) {
            Step::Done(outcome) => outcome,
            Step::Wait(pending) => {
                let outcome = pending.await;
                self.finish(locale, &outcome, metrics);
                outcome
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Selection {
    active: LocaleId,
    fallback: LocaleId,
}

/// Registry of locale providers with an active locale and fallback lookup.
pub struct LocaleRegistry {
    slots: RwLock<HashMap<LocaleId, Arc<LocaleSlot>>>,
    selection: RwLock<Option<Selection>>,
    missing_key: MissingKeyPolicy,
    metrics: LookupMetrics,
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LocaleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleRegistry")
            .field("locales", &self.locales())
            .field("selection", &self.selection())
            .field("missing_key", &self.missing_key)
            .finish()
    }
}

impl LocaleRegistry {
    /// Create an empty registry displaying the key path for missing keys.
    pub fn new() -> Self {
        Self::with_missing_key_policy(MissingKeyPolicy::default())
    }

    pub fn with_missing_key_policy(missing_key: MissingKeyPolicy) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            selection: RwLock::new(None),
            missing_key,
            metrics: LookupMetrics::new(),
        }
    }

    // ==================== Registration ====================

    /// Register an asynchronous producer for `locale`.
    ///
    /// The producer is not invoked until a lookup needs this locale.
    /// Registering an identifier again replaces its producer and drops any
    /// tree already resolved for it.
    pub fn register<F, Fut>(&self, locale: LocaleId, producer: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<TranslationTree, LoadError>> + Send + 'static,
    {
        // The producer body runs on first poll so a panic in it is caught there
        let producer: Producer = Box::new(move || async move { producer().await }.boxed());
        let replaced = self
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(locale.clone(), Arc::new(LocaleSlot::new(producer)))
            .is_some();

        if replaced {
            debug!("Replaced provider for locale {}", locale);
        } else {
            debug!("Registered provider for locale {}", locale);
        }
    }

    /// Register a synchronous producer. It runs on first use, like `register`.
    pub fn register_sync<F>(&self, locale: LocaleId, producer: F)
    where
        F: FnOnce() -> Result<TranslationTree, LoadError> + Send + 'static,
    {
        self.register(locale, move || async move { producer() });
    }

    /// Register a tree that is already built.
    pub fn register_tree(&self, locale: LocaleId, tree: TranslationTree) {
        self.register(locale, move || async move { Ok(tree) });
    }

    /// Registered locales, sorted.
    pub fn locales(&self) -> Vec<LocaleId> {
        let mut locales: Vec<LocaleId> = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        locales.sort();
        locales
    }

    pub fn is_registered(&self, locale: &LocaleId) -> bool {
        self.slot(locale).is_some()
    }

    /// Resolution state of a locale, or `None` if it is not registered.
    pub fn state(&self, locale: &LocaleId) -> Option<LocaleState> {
        self.slot(locale).map(|slot| slot.state())
    }

    fn slot(&self, locale: &LocaleId) -> Option<Arc<LocaleSlot>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(locale)
            .cloned()
    }

    // ==================== Active locale ====================

    /// Set the fallback and the active locale. Resolves nothing.
    ///
    /// Without an explicit initial locale, the OS preference list is
    /// negotiated against the registered locales, and the fallback is used if
    /// nothing matches. An explicit initial locale is kept even when it is not
    /// registered; lookups then go to the fallback.
    ///
    /// Returns the active locale.
    pub fn initialize(&self, options: InitOptions) -> Result<LocaleId, I18nError> {
        self.initialize_with_preferences(options, &system_preferences())
    }

    /// `initialize` with an explicit preference list instead of the OS probe.
    pub fn initialize_with_preferences<S: AsRef<str>>(
        &self,
        options: InitOptions,
        preferences: &[S],
    ) -> Result<LocaleId, I18nError> {
        let mut selection = self
            .selection
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if selection.is_some() {
            return Err(I18nError::AlreadyInitialized);
        }

        let fallback = options.fallback_locale;
        if !self.is_registered(&fallback) {
            return Err(I18nError::UnregisteredFallback(fallback));
        }

        let active = match options.initial_locale {
            Some(locale) => locale,
            None => negotiate(preferences, &self.locales()).unwrap_or_else(|| fallback.clone()),
        };

        info!(
            "Locale registry initialized (active: {}, fallback: {})",
            active, fallback
        );
        *selection = Some(Selection {
            active: active.clone(),
            fallback,
        });
        Ok(active)
    }

    /// Change the active locale after initialization.
    pub fn set_locale(&self, locale: LocaleId) -> Result<(), I18nError> {
        let mut selection = self
            .selection
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match selection.as_mut() {
            Some(current) => {
                info!("Active locale changed from {} to {}", current.active, locale);
                current.active = locale;
                Ok(())
            }
            None => Err(I18nError::NotInitialized),
        }
    }

    pub fn active_locale(&self) -> Option<LocaleId> {
        self.selection().map(|s| s.active)
    }

    pub fn fallback_locale(&self) -> Option<LocaleId> {
        self.selection().map(|s| s.fallback)
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Locales consulted for a lookup, in order, without duplicates.
    pub fn chain(&self) -> Option<Vec<LocaleId>> {
        let selection = self.selection()?;
        let mut chain = selection.active.lineage();
        if !chain.contains(&selection.fallback) {
            chain.push(selection.fallback);
        }
        Some(chain)
    }

    // ==================== Resolution ====================

    /// The tree of `locale`, running its producer if needed.
    ///
    /// `None` if the locale is unregistered or its producer failed.
    pub async fn tree(&self, locale: &LocaleId) -> Option<Arc<TranslationTree>> {
        let slot = self.slot(locale)?;
        slot.resolve(locale, &self.metrics).await.ok()
    }

    /// Resolve every registered locale of the active chain ahead of time.
    pub async fn preload(&self) -> Result<(), I18nError> {
        let chain = self.chain().ok_or(I18nError::NotInitialized)?;
        for locale in &chain {
            let _ = self.tree(locale).await;
        }
        Ok(())
    }

    // ==================== Lookup ====================

    /// Look up a dot-delimited key path along the locale chain.
    ///
    /// Always returns a displayable string; see [`MissingKeyPolicy`].
    pub async fn lookup(&self, key: &str) -> String {
        match self.try_lookup(key).await {
            Ok(text) => text,
            Err(err) => self.degrade(key, err),
        }
    }

    /// Look up an already-segmented key path.
    pub async fn lookup_path(&self, path: &KeyPath) -> String {
        match self.try_lookup_path(path).await {
            Ok(text) => text,
            Err(err) => self.degrade(&path.to_string(), err),
        }
    }

    /// Look up a key and fill its `{name}` placeholders.
    pub async fn lookup_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        match self.try_lookup(key).await {
            Ok(text) => interpolate(&text, args),
            Err(err) => self.degrade(key, err),
        }
    }

    /// Like `lookup`, but reports an unresolved key instead of degrading.
    pub async fn try_lookup(&self, key: &str) -> Result<String, LookupError> {
        match KeyPath::parse(key) {
            Some(path) => self.try_lookup_path(&path).await,
            None => {
                self.metrics.record_miss();
                Err(LookupError::NotFound(key.to_string()))
            }
        }
    }

    pub async fn try_lookup_path(&self, path: &KeyPath) -> Result<String, LookupError> {
        let chain = self.chain().ok_or(LookupError::NotInitialized)?;
        for (position, locale) in chain.iter().enumerate() {
            let Some(tree) = self.tree(locale).await else {
                continue;
            };
            if let Some(text) = tree.get(path) {
                self.record_hit(position);
                return Ok(text.to_string());
            }
        }
        self.metrics.record_miss();
        Err(LookupError::NotFound(path.to_string()))
    }

    /// Synchronous lookup against trees that are already resolved.
    ///
    /// Never runs a producer. Intended for render paths after `preload`.
    pub fn lookup_cached(&self, key: &str) -> String {
        let Some(chain) = self.chain() else {
            return self.degrade(key, LookupError::NotInitialized);
        };
        let Some(path) = KeyPath::parse(key) else {
            self.metrics.record_miss();
            return self.missing_key.render(key);
        };

        for (position, locale) in chain.iter().enumerate() {
            let Some(tree) = self.slot(locale).and_then(|slot| slot.resolved()) else {
                continue;
            };
            if let Some(text) = tree.get(&path) {
                self.record_hit(position);
                return text.to_string();
            }
        }
        self.metrics.record_miss();
        self.missing_key.render(key)
    }

    fn record_hit(&self, position: usize) {
        if position == 0 {
            self.metrics.record_direct_hit();
        } else {
            self.metrics.record_fallback_hit();
        }
    }

    fn degrade(&self, key: &str, err: LookupError) -> String {
        match err {
            LookupError::NotInitialized => {
                warn!("Lookup of '{}' before the locale registry was initialized", key)
            }
            LookupError::NotFound(_) => debug!("No translation for '{}'", key),
        }
        self.missing_key.render(key)
    }

    // ==================== Reporting ====================

    /// Validate every registered locale against the fallback locale.
    ///
    /// A locale whose producer failed is reported with a single error.
    pub async fn coverage(&self) -> Result<Vec<(LocaleId, ValidationReport)>, I18nError> {
        let fallback = self.fallback_locale().ok_or(I18nError::NotInitialized)?;
        let reference = match self.slot(&fallback) {
            Some(slot) => slot.resolve(&fallback, &self.metrics).await.ok(),
            None => None,
        };

        let mut reports = Vec::new();
        for locale in self.locales() {
            let Some(slot) = self.slot(&locale) else {
                continue;
            };
            let report = match (slot.resolve(&locale, &self.metrics).await, &reference) {
                (Ok(tree), Some(reference)) => CoverageValidator::validate(reference, &tree),
                (Ok(_), None) => ValidationReport {
                    errors: vec![format!("Fallback locale {} failed to load", fallback)],
                    warnings: Vec::new(),
                },
                (Err(err), _) => ValidationReport {
                    errors: vec![format!("Catalog failed to load: {}", err)],
                    warnings: Vec::new(),
                },
            };
            reports.push((locale, report));
        }
        Ok(reports)
    }

    pub fn metrics(&self) -> &LookupMetrics {
        &self.metrics
    }
}
