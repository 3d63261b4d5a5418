//! Theme model.
//!
//! A trivial persisted toggle kept here because it shares the lifecycle
//! base with the viewer model. The storage backend is injected so the model
//! stays free of any platform assumption.

use std::sync::{Arc, Mutex};

use cellview_core::{Observable, ReactiveModel, SubscriptionScope};

/// UI color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Returns the other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Storage backend for the theme preference.
pub trait ThemeStore: Send + Sync {
    /// Loads the persisted theme, if any.
    fn load(&self) -> Option<Theme>;

    /// Persists the theme.
    fn save(&self, theme: Theme);
}

/// In-memory theme storage for tests and headless sessions.
#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    slot: Mutex<Option<Theme>>,
}

impl MemoryThemeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> Option<Theme> {
        *self.slot.lock().expect("theme store lock poisoned")
    }

    fn save(&self, theme: Theme) {
        *self.slot.lock().expect("theme store lock poisoned") = Some(theme);
    }
}

/// Observable theme state backed by a [`ThemeStore`].
pub struct ThemeManager {
    store: Arc<dyn ThemeStore>,
    pub theme: Observable<Theme>,
    scope: Mutex<SubscriptionScope>,
}

impl ThemeManager {
    /// Creates a manager seeded from the store (default: light).
    pub fn new(store: Arc<dyn ThemeStore>) -> Self {
        let initial = store.load().unwrap_or_default();
        Self {
            store,
            theme: Observable::new(initial),
            scope: Mutex::new(SubscriptionScope::new()),
        }
    }

    /// Flips between light and dark.
    pub fn toggle(&self) {
        self.theme.set(self.theme.get().toggled());
    }
}

impl ReactiveModel for ThemeManager {
    /// Persists the theme on every change.
    ///
    /// The observable only publishes distinct values, so setting the
    /// current theme again does not rewrite the store.
    fn mount(&self) {
        let store = Arc::clone(&self.store);
        let mut scope = self.scope.lock().expect("scope lock poisoned");
        scope.subscribe(&self.theme, move |theme| store.save(*theme));
    }

    fn dispose(&self) {
        self.scope.lock().expect("scope lock poisoned").dispose();
    }
}
