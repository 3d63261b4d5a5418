//! cellview-rs: viewer lifecycle and view collection coordination for an
//! embedded 3D scene engine.
//!
//! cellview wraps an externally-owned visualization engine behind the
//! [`SceneEngine`] boundary and layers two stateful models on top:
//!
//! - [`ViewerModel`] drives the engine's asynchronous lifecycle (an
//!   idempotent `pending -> initializing -> success | error` bootstrap),
//!   mirrors its layout flags, and guards snapshot applies with a
//!   single-writer busy gate.
//! - [`ViewCollection`] keeps the ordered list of saved [`View`]s together
//!   with a lazily-populated screenshot cache that stays consistent across
//!   create, update, delete, and reorder.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use cellview::*;
//!
//! pollster::block_on(async {
//!     let engine = Arc::new(HeadlessEngine::new());
//!     let viewer = Arc::new(ViewerModel::new(engine));
//!     viewer.init().await;
//!
//!     let mut views = ViewCollection::new(Arc::clone(&viewer));
//!     let created = views
//!         .create_view(NewView::new().with_name("Overview"))
//!         .await
//!         .unwrap();
//!     assert!(views.screenshot_url(&created.view.id).is_some());
//! });
//! ```
//!
//! Snapshots are opaque: the engine-defined `mvsj` payload passes through
//! the models verbatim and is never parsed.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

pub mod collection;
pub mod engine;
pub mod headless;
pub mod session;
pub mod store;
pub mod theme;
pub mod viewer;

// Re-export core types
pub use cellview_core::{
    CellviewError, Observable, ReactiveModel, Result, Snapshot, Subscription, SubscriptionScope,
    View, ViewPatch,
};

pub use collection::{CaptureOutcome, NewView, ViewCollection, ViewCreated};
pub use engine::{ImageAsset, ImageFile, LayoutState, SceneEngine};
pub use headless::HeadlessEngine;
pub use session::Session;
pub use store::{MemoryViewStore, ViewStore};
pub use theme::{MemoryThemeStore, Theme, ThemeManager, ThemeStore};
pub use viewer::{ApplyOutcome, InitState, ViewerModel, ViewerState};
