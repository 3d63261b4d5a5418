//! Core abstractions for cellview-rs.
//!
//! This crate provides the foundation used throughout cellview-rs:
//! - [`Observable`] state containers with publish-on-change semantics
//! - [`SubscriptionScope`] and the [`ReactiveModel`] lifecycle base
//! - The [`View`] data model and the opaque [`Snapshot`] payload
//! - The shared error taxonomy

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod model;
pub mod observable;
pub mod view;

pub use error::{CellviewError, Result};
pub use model::{ReactiveModel, SubscriptionScope};
pub use observable::{Observable, Subscription};
pub use view::{Snapshot, View, ViewPatch};
