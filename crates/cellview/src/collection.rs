//! The view collection coordinator.
//!
//! [`ViewCollection`] maintains the ordered list of [`View`] records for a
//! session plus a derived screenshot cache, and coordinates capture work
//! through the [`ViewerModel`]'s public primitives only - it never reaches
//! into engine internals. The collection is the in-session source of truth
//! for ordering; persistence happens through UI-layer collaborators.
//!
//! Invariants:
//! - no two records share an id;
//! - order changes only through [`ViewCollection::reorder_views`];
//! - a cache entry never outlives its record and is never keyed by an id
//!   absent from the collection.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use cellview_core::{CellviewError, Result, Snapshot, View, ViewPatch};

use crate::viewer::{ApplyOutcome, ViewerModel};

/// How screenshot capture went during a view mutation.
///
/// Capture is best-effort: it never blocks record creation, so callers get
/// an explicit marker instead of a logged side channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The capture succeeded; the URL is already in the cache.
    Captured(String),
    /// The capture was skipped, with the reason.
    Skipped(String),
}

impl CaptureOutcome {
    /// Returns the captured URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Captured(url) => Some(url),
            Self::Skipped(_) => None,
        }
    }
}

/// Parameters for [`ViewCollection::create_view`].
///
/// Unset fields fall back to generated values: a v4 UUID id, a positional
/// `View N` name, and a placeholder description.
#[derive(Debug, Clone, Default)]
pub struct NewView {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub snapshot: Option<Snapshot>,
}

impl NewView {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies an explicit id (e.g. a server-assigned one).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the view name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the view description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the snapshot payload to save with the view.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}

/// A freshly created record together with its capture outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewCreated {
    pub view: View,
    pub capture: CaptureOutcome,
}

/// Ordered collection of views with a derived screenshot cache.
pub struct ViewCollection {
    viewer: Arc<ViewerModel>,
    views: Vec<View>,
    screenshots: HashMap<String, String>,
    current_view_id: Option<String>,
}

impl ViewCollection {
    /// Creates an empty collection driving `viewer` for capture work.
    pub fn new(viewer: Arc<ViewerModel>) -> Self {
        Self {
            viewer,
            views: Vec::new(),
            screenshots: HashMap::new(),
            current_view_id: None,
        }
    }

    /// Creates a collection seeded with `initial` views (e.g. examples or
    /// records loaded from the backend).
    ///
    /// Later records reusing an earlier id are dropped with a warning so
    /// the id-uniqueness invariant holds from the start.
    pub fn with_views(viewer: Arc<ViewerModel>, initial: Vec<View>) -> Self {
        let mut collection = Self::new(viewer);
        for view in initial {
            if collection.index_of(&view.id).is_some() {
                log::warn!("dropping seed view with duplicate id '{}'", view.id);
                continue;
            }
            collection.views.push(view);
        }
        collection
    }

    /// The ordered records, as render input for UI consumers.
    #[must_use]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Number of views in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Returns true if the collection holds no views.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// The cached screenshot URL for a view, if one was captured.
    ///
    /// Absence means "not yet captured", not "no screenshot".
    #[must_use]
    pub fn screenshot_url(&self, id: &str) -> Option<&str> {
        self.screenshots.get(id).map(String::as_str)
    }

    /// The whole screenshot cache, keyed by view id.
    #[must_use]
    pub fn screenshots(&self) -> &HashMap<String, String> {
        &self.screenshots
    }

    /// The currently active view marker.
    #[must_use]
    pub fn current_view_id(&self) -> Option<&str> {
        self.current_view_id.as_deref()
    }

    /// Sets (or clears) the currently active view marker.
    pub fn set_current_view(&mut self, id: Option<String>) {
        self.current_view_id = id;
    }

    /// Looks up a view by id. Returns `None` when absent.
    #[must_use]
    pub fn get_view_by_id(&self, id: &str) -> Option<&View> {
        self.views.iter().find(|view| view.id == id)
    }

    /// Creates a view and appends it to the end of the collection.
    ///
    /// A screenshot of the current canvas is attempted first; a capture
    /// failure is reported in the returned [`CaptureOutcome`] and never
    /// blocks the creation. `created_at` and `updated_at` are stamped with
    /// the same instant.
    ///
    /// # Errors
    ///
    /// Returns [`CellviewError::ViewExists`] when a supplied id is already
    /// present.
    pub async fn create_view(&mut self, new: NewView) -> Result<ViewCreated> {
        if let Some(id) = &new.id {
            if self.index_of(id).is_some() {
                return Err(CellviewError::ViewExists(id.clone()));
            }
        }

        let capture = match self.viewer.screenshot().await {
            Ok(url) => CaptureOutcome::Captured(url),
            Err(err) => {
                log::warn!("screenshot capture failed, creating view without one: {err}");
                CaptureOutcome::Skipped(err.to_string())
            }
        };

        let id = new.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let name = new
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("View {}", self.views.len() + 1));
        let description = new
            .description
            .filter(|description| !description.is_empty())
            .unwrap_or_else(|| "No description provided".to_string());

        let now = Utc::now();
        let mut view = View::new(id, name, description, new.snapshot);
        view.created_at = Some(now);
        view.updated_at = Some(now);

        if let CaptureOutcome::Captured(url) = &capture {
            self.screenshots.insert(view.id.clone(), url.clone());
        }
        self.views.push(view.clone());

        Ok(ViewCreated { view, capture })
    }

    /// Merges `patch` into the view with `id`, preserving its position and
    /// refreshing `updated_at`.
    ///
    /// A screenshot value in the patch is routed to the cache rather than
    /// stored on the record.
    ///
    /// # Errors
    ///
    /// Returns [`CellviewError::ViewNotFound`] when `id` is absent.
    pub fn update_view(&mut self, id: &str, patch: ViewPatch) -> Result<&View> {
        let Some(index) = self.index_of(id) else {
            return Err(CellviewError::ViewNotFound(id.to_string()));
        };

        if let Some(url) = patch.screenshot {
            self.screenshots.insert(id.to_string(), url);
        }

        let view = &mut self.views[index];
        if let Some(name) = patch.name {
            view.name = name;
        }
        if let Some(description) = patch.description {
            view.description = description;
        }
        if let Some(snapshot) = patch.snapshot {
            view.snapshot = Some(snapshot);
        }
        view.updated_at = Some(Utc::now());

        Ok(&self.views[index])
    }

    /// Removes the view with `id`, along with its cache entry; clears the
    /// current-view marker if it pointed at the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`CellviewError::ViewNotFound`] when `id` is absent.
    pub fn delete_view(&mut self, id: &str) -> Result<View> {
        let Some(index) = self.index_of(id) else {
            return Err(CellviewError::ViewNotFound(id.to_string()));
        };

        let view = self.views.remove(index);
        self.screenshots.remove(id);
        if self.current_view_id.as_deref() == Some(id) {
            self.current_view_id = None;
        }
        Ok(view)
    }

    /// Moves the view at `source` to `destination`, preserving the relative
    /// order of every other record. Equal indices are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CellviewError::IndexOutOfRange`] when either index is
    /// outside the collection, leaving the order untouched.
    pub fn reorder_views(&mut self, source: usize, destination: usize) -> Result<()> {
        let len = self.views.len();
        for index in [source, destination] {
            if index >= len {
                return Err(CellviewError::IndexOutOfRange { index, len });
            }
        }
        if source == destination {
            return Ok(());
        }

        let view = self.views.remove(source);
        self.views.insert(destination, view);
        Ok(())
    }

    /// Captures screenshots for every view that has a snapshot but no cache
    /// entry yet. Returns the number of screenshots captured.
    ///
    /// Views run strictly one after another: the viewer's busy gate drops
    /// concurrent applies, so firing them together would silently lose all
    /// but the first. Existing cache entries are never overwritten, and a
    /// failure on one view is logged and skipped without aborting the rest.
    pub async fn generate_missing_screenshots(&mut self) -> usize {
        let targets: Vec<(String, Snapshot)> = self
            .views
            .iter()
            .filter(|view| !self.screenshots.contains_key(&view.id))
            .filter_map(|view| view.snapshot.clone().map(|snapshot| (view.id.clone(), snapshot)))
            .collect();

        let mut captured = 0;
        for (id, snapshot) in targets {
            match self.viewer.apply_state(snapshot).await {
                Ok(ApplyOutcome::Applied) => {}
                Ok(ApplyOutcome::DroppedBusy) => {
                    log::warn!("skipping screenshot for view '{id}': viewer busy");
                    continue;
                }
                Err(err) => {
                    log::warn!("skipping screenshot for view '{id}': apply failed: {err}");
                    continue;
                }
            }
            match self.viewer.screenshot().await {
                Ok(url) => {
                    self.screenshots.insert(id, url);
                    captured += 1;
                }
                Err(err) => {
                    log::warn!("skipping screenshot for view '{id}': capture failed: {err}");
                }
            }
        }
        captured
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.views.iter().position(|view| view.id == id)
    }
}
