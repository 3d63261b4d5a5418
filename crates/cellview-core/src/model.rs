//! Subscription-scoped lifecycle base for stateful models.
//!
//! Every stateful model owns a [`SubscriptionScope`] that retains the
//! subscriptions it registers and releases them on disposal. This gives all
//! models a uniform acquire/release discipline: wire derived effects in
//! `mount`, tear them down in `dispose`, never leak a handler.

use crate::observable::{Observable, Subscription};

/// Retains observable subscriptions and releases them together.
#[derive(Debug, Default)]
pub struct SubscriptionScope {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionScope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Retains an already-created subscription for later disposal.
    pub fn track(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Subscribes `handler` to `source` and retains the subscription.
    pub fn subscribe<T>(&mut self, source: &Observable<T>, handler: impl FnMut(&T) + Send + 'static)
    where
        T: Clone + PartialEq + Send + 'static,
    {
        self.track(source.subscribe(handler));
    }

    /// Releases every retained subscription exactly once, then clears the
    /// list. Safe to call repeatedly; a second call releases nothing.
    pub fn dispose(&mut self) {
        for subscription in &mut self.subscriptions {
            subscription.unsubscribe();
        }
        self.subscriptions.clear();
    }

    /// Returns the number of retained subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if no subscriptions are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

/// Lifecycle hooks shared by all stateful models.
///
/// `mount` is invoked once by the owner after construction to wire derived
/// reactive effects; `dispose` must be paired with it to release them.
/// Models that are shared behind `Arc` keep their scope behind a mutex so
/// both hooks take `&self`.
pub trait ReactiveModel {
    /// Wires derived reactive effects. Default no-op.
    fn mount(&self) {}

    /// Releases all subscriptions registered by this model.
    fn dispose(&self);
}
