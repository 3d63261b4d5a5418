//! The viewer state model.
//!
//! [`ViewerModel`] owns the single engine context for a session and exposes
//! its readiness and busy status as observable state. All engine-facing
//! failures are caught at this boundary: bootstrap errors become the
//! terminal [`InitState::Error`], capture errors surface as typed results,
//! and a snapshot apply issued while one is in flight is dropped by the
//! busy gate rather than queued.

use std::sync::{Arc, Mutex};

use cellview_core::{
    CellviewError, Observable, ReactiveModel, Result, Snapshot, SubscriptionScope,
};

use crate::engine::SceneEngine;

/// Initialization lifecycle of a viewer instance.
///
/// `Pending -> Initializing -> {Success | Error}`. The two final states are
/// terminal: there is no re-initialization path, callers that need a fresh
/// engine construct a new model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitState {
    #[default]
    Pending,
    Initializing,
    Success,
    Error,
}

/// Outcome of [`ViewerModel::apply_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The snapshot was handed to the engine and the apply resolved.
    Applied,
    /// A prior apply was still in flight; this request was dropped, not
    /// queued. Re-issue after the busy flag clears if delivery matters.
    DroppedBusy,
}

/// Observable flags published by the viewer model.
pub struct ViewerState {
    /// Where the engine bootstrap stands.
    pub is_initialized: Observable<InitState>,
    /// True exactly while a snapshot apply is in flight (the busy gate).
    pub is_loading: Observable<bool>,
    /// Mirror of the engine's control-panel visibility.
    pub show_controls: Observable<bool>,
    /// Mirror of the engine's expanded-viewport flag.
    pub is_expanded: Observable<bool>,
}

/// Wraps the engine context and drives its asynchronous lifecycle.
///
/// Created once per viewing session; the owner calls
/// [`ReactiveModel::mount`] after construction and must pair it with
/// [`ReactiveModel::dispose`]. Disposal tears down the layout subscription
/// only - it does not cancel in-flight engine tasks, whose continuations
/// then write into observables that simply have no subscribers left.
pub struct ViewerModel {
    engine: Arc<dyn SceneEngine>,
    pub state: ViewerState,
    scope: Mutex<SubscriptionScope>,
}

impl ViewerModel {
    /// Creates a model wrapping `engine`.
    pub fn new(engine: Arc<dyn SceneEngine>) -> Self {
        Self {
            engine,
            state: ViewerState {
                is_initialized: Observable::new(InitState::Pending),
                is_loading: Observable::new(false),
                show_controls: Observable::new(false),
                is_expanded: Observable::new(false),
            },
            scope: Mutex::new(SubscriptionScope::new()),
        }
    }

    /// Bootstraps the engine.
    ///
    /// A no-op unless the state is still [`InitState::Pending`], so repeated
    /// mount effects trigger the engine bootstrap exactly once. A bootstrap
    /// failure is logged and mapped to the terminal [`InitState::Error`],
    /// never rethrown; there is no automatic retry.
    pub async fn init(&self) {
        if self.state.is_initialized.get() != InitState::Pending {
            return;
        }

        self.state.is_initialized.set(InitState::Initializing);
        match self.engine.init().await {
            Ok(()) => {
                self.state.is_initialized.set(InitState::Success);
                log::info!("viewer engine initialized");
            }
            Err(err) => {
                log::error!("viewer engine bootstrap failed: {err}");
                self.state.is_initialized.set(InitState::Error);
            }
        }
    }

    /// Rasterizes the current canvas and returns a URL for the image bytes.
    ///
    /// Fails with [`CellviewError::NoImage`] when the engine produced
    /// nothing and [`CellviewError::NoBackingFile`] when the returned asset
    /// cannot be materialized.
    pub async fn screenshot(&self) -> Result<String> {
        let asset = self
            .engine
            .capture_canvas_image()
            .await?
            .ok_or(CellviewError::NoImage)?;
        let file = asset.into_file().ok_or(CellviewError::NoBackingFile)?;
        Ok(file.into_url())
    }

    /// Reads the engine's full current scene configuration.
    ///
    /// Calling this before [`ViewerModel::init`] has reached
    /// [`InitState::Success`] is a programmer error and returns
    /// [`CellviewError::NotInitialized`].
    pub fn state_snapshot(&self) -> Result<Snapshot> {
        if self.state.is_initialized.get() != InitState::Success {
            return Err(CellviewError::NotInitialized);
        }
        Ok(self.engine.snapshot())
    }

    /// Applies a snapshot to the engine, guarded by the busy gate.
    ///
    /// If an apply is already in flight the request is dropped and
    /// [`ApplyOutcome::DroppedBusy`] is returned without touching the
    /// engine. Otherwise the busy flag is raised, the engine apply is
    /// awaited, and the flag is cleared again whether or not the apply
    /// succeeded - a wedged busy flag would silently drop every later
    /// request.
    pub async fn apply_state(&self, snapshot: Snapshot) -> Result<ApplyOutcome> {
        if self.state.is_loading.replace(true) {
            log::debug!("snapshot apply dropped: a prior apply is still in flight");
            return Ok(ApplyOutcome::DroppedBusy);
        }

        let result = self.engine.apply_snapshot(snapshot).await;
        self.state.is_loading.set(false);

        result.map(|()| ApplyOutcome::Applied)
    }

    /// Resets the engine scene to its empty state.
    pub async fn clear(&self) -> Result<()> {
        self.engine.clear().await
    }

    /// Returns the engine handle shared by this model.
    #[must_use]
    pub fn engine(&self) -> Arc<dyn SceneEngine> {
        Arc::clone(&self.engine)
    }
}

impl ReactiveModel for ViewerModel {
    /// Mirrors the engine's layout flags into local observable state.
    fn mount(&self) {
        let layout = self.engine.layout_events();
        let show_controls = self.state.show_controls.clone();
        let is_expanded = self.state.is_expanded.clone();

        let mut scope = self.scope.lock().expect("scope lock poisoned");
        scope.subscribe(&layout, move |state| {
            show_controls.set(state.show_controls);
            is_expanded.set(state.is_expanded);
        });
    }

    fn dispose(&self) {
        self.scope.lock().expect("scope lock poisoned").dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LayoutState;
    use crate::headless::HeadlessEngine;
    use pollster::block_on;
    use serde_json::json;

    fn viewer() -> (Arc<HeadlessEngine>, ViewerModel) {
        let engine = Arc::new(HeadlessEngine::new());
        let model = ViewerModel::new(engine.clone());
        (engine, model)
    }

    #[test]
    fn test_init_reaches_success() {
        let (engine, model) = viewer();
        assert_eq!(model.state.is_initialized.get(), InitState::Pending);

        block_on(model.init());
        assert_eq!(model.state.is_initialized.get(), InitState::Success);
        assert_eq!(engine.init_calls(), 1);
    }

    #[test]
    fn test_init_twice_bootstraps_once() {
        let (engine, model) = viewer();
        block_on(model.init());
        block_on(model.init());
        assert_eq!(engine.init_calls(), 1);
    }

    #[test]
    fn test_init_failure_is_terminal() {
        let (engine, model) = viewer();
        engine.fail_init(true);

        block_on(model.init());
        assert_eq!(model.state.is_initialized.get(), InitState::Error);

        // error is terminal: a later init must not re-enter the engine
        engine.fail_init(false);
        block_on(model.init());
        assert_eq!(model.state.is_initialized.get(), InitState::Error);
        assert_eq!(engine.init_calls(), 1);
    }

    #[test]
    fn test_state_snapshot_requires_success() {
        let (engine, model) = viewer();
        assert!(matches!(
            model.state_snapshot(),
            Err(CellviewError::NotInitialized)
        ));

        engine.set_scene(json!({"camera": "front"}));
        block_on(model.init());
        assert_eq!(model.state_snapshot().unwrap(), json!({"camera": "front"}));
    }

    #[test]
    fn test_apply_clears_busy_flag_on_failure() {
        let (engine, model) = viewer();
        block_on(model.init());
        engine.fail_apply(true);

        let result = block_on(model.apply_state(json!({"x": 1})));
        assert!(result.is_err());
        assert!(!model.state.is_loading.get());

        // the model is not wedged: the next apply goes through
        engine.fail_apply(false);
        let outcome = block_on(model.apply_state(json!({"x": 2}))).unwrap();
        assert_eq!(outcome, ApplyOutcome::Applied);
    }

    #[test]
    fn test_screenshot_error_taxonomy() {
        let (engine, model) = viewer();

        engine.capture_returns_none(true);
        assert!(matches!(
            block_on(model.screenshot()),
            Err(CellviewError::NoImage)
        ));

        engine.capture_returns_none(false);
        engine.capture_without_file(true);
        assert!(matches!(
            block_on(model.screenshot()),
            Err(CellviewError::NoBackingFile)
        ));

        engine.capture_without_file(false);
        let url = block_on(model.screenshot()).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_mount_mirrors_layout_flags() {
        let (engine, model) = viewer();
        model.mount();

        engine.emit_layout(LayoutState {
            show_controls: true,
            is_expanded: false,
        });
        assert!(model.state.show_controls.get());
        assert!(!model.state.is_expanded.get());

        model.dispose();
        engine.emit_layout(LayoutState {
            show_controls: false,
            is_expanded: true,
        });
        // disposed: mirrors no longer track the engine
        assert!(model.state.show_controls.get());
        assert!(!model.state.is_expanded.get());
    }
}
