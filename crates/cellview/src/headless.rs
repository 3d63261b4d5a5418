//! Headless in-process engine for cellview-rs.
//!
//! Provides a [`SceneEngine`] implementation with no rendering backend.
//! Useful for integration tests, batch processing, and driving the models
//! without a real viewer. The engine records every applied snapshot,
//! synthesizes placeholder image assets, and exposes failure-injection
//! knobs so callers can exercise both sides of every contract.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use async_trait::async_trait;
use cellview_core::{CellviewError, Observable, Result, Snapshot};

use crate::engine::{ImageAsset, ImageFile, LayoutState, SceneEngine};

/// Placeholder capture payload. The bytes are opaque to every caller; only
/// the data-URL shape matters outside the engine.
const PLACEHOLDER_PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Default)]
struct GateShared {
    hold: bool,
    wakers: Vec<Waker>,
}

/// Future that resolves once the apply gate is open.
struct GateWait {
    shared: Arc<Mutex<GateShared>>,
}

impl Future for GateWait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut shared = self.shared.lock().expect("gate lock poisoned");
        if shared.hold {
            shared.wakers.push(cx.waker().clone());
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }
}

/// An engine that renders nothing.
///
/// The scene is whatever snapshot was last applied (or set directly with
/// [`HeadlessEngine::set_scene`]); captures return a placeholder PNG asset.
#[derive(Default)]
pub struct HeadlessEngine {
    scene: Mutex<Snapshot>,
    applied: Mutex<Vec<Snapshot>>,
    layout: Observable<LayoutState>,

    init_calls: AtomicUsize,
    apply_calls: AtomicUsize,

    fail_init: AtomicBool,
    fail_apply: AtomicBool,
    fail_capture: AtomicBool,
    capture_returns_none: AtomicBool,
    capture_without_file: AtomicBool,

    gate: Arc<Mutex<GateShared>>,
}

impl HeadlessEngine {
    /// Creates a headless engine with an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Primes the scene state returned by [`SceneEngine::snapshot`].
    pub fn set_scene(&self, snapshot: Snapshot) {
        *self.scene.lock().expect("scene lock poisoned") = snapshot;
    }

    /// Returns every snapshot applied so far, in order.
    #[must_use]
    pub fn applied_snapshots(&self) -> Vec<Snapshot> {
        self.applied.lock().expect("applied lock poisoned").clone()
    }

    /// Number of times [`SceneEngine::init`] was invoked.
    #[must_use]
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    /// Number of times [`SceneEngine::apply_snapshot`] was invoked.
    #[must_use]
    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    /// Makes subsequent `init` calls fail.
    pub fn fail_init(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `apply_snapshot` calls fail (after passing the gate).
    pub fn fail_apply(&self, fail: bool) {
        self.fail_apply.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `capture_canvas_image` calls fail.
    pub fn fail_capture(&self, fail: bool) {
        self.fail_capture.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent captures return no image at all.
    pub fn capture_returns_none(&self, none: bool) {
        self.capture_returns_none.store(none, Ordering::SeqCst);
    }

    /// Makes subsequent captures return an asset with no backing file.
    pub fn capture_without_file(&self, without: bool) {
        self.capture_without_file.store(without, Ordering::SeqCst);
    }

    /// Holds subsequent applies in flight until [`HeadlessEngine::release_applies`].
    pub fn hold_applies(&self) {
        self.gate.lock().expect("gate lock poisoned").hold = true;
    }

    /// Opens the apply gate, resuming every held apply.
    pub fn release_applies(&self) {
        let wakers = {
            let mut shared = self.gate.lock().expect("gate lock poisoned");
            shared.hold = false;
            std::mem::take(&mut shared.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
    }

    /// Publishes a layout change, as the real engine's UI shell would.
    pub fn emit_layout(&self, layout: LayoutState) {
        self.layout.set(layout);
    }
}

#[async_trait]
impl SceneEngine for HeadlessEngine {
    async fn init(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(CellviewError::Engine("headless bootstrap failed".into()));
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        self.scene.lock().expect("scene lock poisoned").clone()
    }

    async fn apply_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        GateWait {
            shared: Arc::clone(&self.gate),
        }
        .await;
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(CellviewError::Engine("headless apply failed".into()));
        }
        *self.scene.lock().expect("scene lock poisoned") = snapshot.clone();
        self.applied.lock().expect("applied lock poisoned").push(snapshot);
        Ok(())
    }

    async fn capture_canvas_image(&self) -> Result<Option<ImageAsset>> {
        if self.fail_capture.load(Ordering::SeqCst) {
            return Err(CellviewError::Engine("headless capture failed".into()));
        }
        if self.capture_returns_none.load(Ordering::SeqCst) {
            return Ok(None);
        }
        if self.capture_without_file.load(Ordering::SeqCst) {
            return Ok(Some(ImageAsset::without_file("screenshot.png")));
        }
        Ok(Some(ImageAsset::new(
            "screenshot.png",
            ImageFile::png(PLACEHOLDER_PNG.to_vec()),
        )))
    }

    async fn clear(&self) -> Result<()> {
        *self.scene.lock().expect("scene lock poisoned") = Snapshot::Null;
        Ok(())
    }

    fn layout_events(&self) -> Observable<LayoutState> {
        self.layout.clone()
    }
}
