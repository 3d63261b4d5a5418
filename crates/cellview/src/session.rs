//! Session aggregate.
//!
//! One [`Session`] per viewing session: it explicitly owns the viewer model
//! (and through it the single engine context), the theme model, and the
//! view collection. Consumers receive the session by reference instead of
//! reaching for ambient globals, which keeps every model testable in
//! isolation.

use std::sync::Arc;

use cellview_core::{ReactiveModel, View};

use crate::collection::ViewCollection;
use crate::engine::SceneEngine;
use crate::theme::{ThemeManager, ThemeStore};
use crate::viewer::ViewerModel;

/// Root model wiring the per-session state together.
pub struct Session {
    pub viewer: Arc<ViewerModel>,
    pub theme: ThemeManager,
    pub views: ViewCollection,
}

impl Session {
    /// Creates a session with an empty view collection.
    pub fn new(engine: Arc<dyn SceneEngine>, theme_store: Arc<dyn ThemeStore>) -> Self {
        Self::with_views(engine, theme_store, Vec::new())
    }

    /// Creates a session seeded with `initial` views.
    pub fn with_views(
        engine: Arc<dyn SceneEngine>,
        theme_store: Arc<dyn ThemeStore>,
        initial: Vec<View>,
    ) -> Self {
        let viewer = Arc::new(ViewerModel::new(engine));
        let views = ViewCollection::with_views(Arc::clone(&viewer), initial);
        Self {
            viewer,
            theme: ThemeManager::new(theme_store),
            views,
        }
    }
}

impl ReactiveModel for Session {
    fn mount(&self) {
        self.viewer.mount();
        self.theme.mount();
    }

    fn dispose(&self) {
        self.viewer.dispose();
        self.theme.dispose();
    }
}
