//! The scene engine interface boundary.
//!
//! The visualization engine is an external collaborator: cellview drives
//! its asynchronous lifecycle and hands snapshots back and forth, but never
//! looks inside them. One engine context is owned by exactly one
//! [`ViewerModel`](crate::ViewerModel) per session.

use async_trait::async_trait;
use base64::Engine as _;
use cellview_core::{Observable, Result, Snapshot};

/// Layout flags published by the engine's UI shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutState {
    /// Whether the engine's control panels are visible.
    pub show_controls: bool,
    /// Whether the viewport is expanded to fill its container.
    pub is_expanded: bool,
}

/// A rasterized canvas image returned by the engine.
///
/// The asset may lack a backing file when the engine could not materialize
/// the capture (e.g. the canvas was never drawn to).
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Engine-side asset name, e.g. `screenshot.png`.
    pub name: String,
    file: Option<ImageFile>,
}

impl ImageAsset {
    /// Creates an asset with a backing file.
    pub fn new(name: impl Into<String>, file: ImageFile) -> Self {
        Self {
            name: name.into(),
            file: Some(file),
        }
    }

    /// Creates an asset that could not be materialized.
    pub fn without_file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
        }
    }

    /// Consumes the asset, returning its backing file if present.
    #[must_use]
    pub fn into_file(self) -> Option<ImageFile> {
        self.file
    }
}

/// Encoded image bytes backing an [`ImageAsset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// MIME type of the encoded bytes, e.g. `image/png`.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Creates a PNG-typed image file.
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            mime: "image/png".to_string(),
            bytes,
        }
    }

    /// Materializes the file as a `data:` URL.
    ///
    /// Data URLs carry their bytes inline, so unlike browser object URLs
    /// they need no explicit release.
    #[must_use]
    pub fn into_url(self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{encoded}", self.mime)
    }
}

/// Asynchronous interface to the external visualization engine.
///
/// cellview treats the engine as opaque: snapshots pass through verbatim
/// and rendering stays entirely on the engine's side of this boundary.
#[async_trait]
pub trait SceneEngine: Send + Sync {
    /// Bootstraps the engine. Called at most once per context.
    async fn init(&self) -> Result<()>;

    /// Reads the full current scene configuration.
    ///
    /// Synchronous by contract; valid only after [`SceneEngine::init`]
    /// resolved successfully.
    fn snapshot(&self) -> Snapshot;

    /// Applies an externally supplied snapshot to the scene.
    async fn apply_snapshot(&self, snapshot: Snapshot) -> Result<()>;

    /// Rasterizes the current canvas into an image asset.
    ///
    /// Returns `Ok(None)` when the engine produced no image.
    async fn capture_canvas_image(&self) -> Result<Option<ImageAsset>>;

    /// Resets the scene to its empty state.
    async fn clear(&self) -> Result<()>;

    /// The engine's layout-change notification stream.
    fn layout_events(&self) -> Observable<LayoutState>;
}
