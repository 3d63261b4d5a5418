//! Observable state containers with publish-on-change semantics.
//!
//! An [`Observable`] holds a single value and notifies subscribers
//! synchronously when the value changes. Setting an equal value does not
//! notify (distinct-until-changed), which keeps derived effects such as
//! theme persistence from firing redundantly.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

type Handler<T> = Box<dyn FnMut(&T) + Send>;

struct Inner<T> {
    value: T,
    subscribers: Vec<(u64, Handler<T>)>,
    /// Ids unsubscribed while a notification pass is running.
    removed: HashSet<u64>,
    next_id: u64,
    notifying: bool,
}

/// A shareable observable value.
///
/// Clones share the same underlying value and subscriber list. Delivery is
/// synchronous: `set` returns only after every current subscriber has run.
///
/// Handlers may subscribe or unsubscribe re-entrantly; a handler registered
/// during a notification does not observe that notification. A handler must
/// not `set` the observable it is subscribed to - such a write updates the
/// value but does not start a nested notification pass.
pub struct Observable<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default + Clone + PartialEq + Send + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + Send + 'static> Observable<T> {
    /// Creates a new observable holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                subscribers: Vec::new(),
                removed: HashSet::new(),
                next_id: 0,
                notifying: false,
            })),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Sets the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        let _ = self.replace(value);
    }

    /// Sets the value and returns the previous one.
    ///
    /// Notifies subscribers only when the new value differs from the old.
    pub fn replace(&self, value: T) -> T {
        let mut inner = self.lock();
        if inner.value == value {
            return std::mem::replace(&mut inner.value, value);
        }
        let previous = std::mem::replace(&mut inner.value, value.clone());

        // Take the subscriber list out so handlers run without the lock held;
        // re-entrant subscribe/unsubscribe calls then cannot deadlock.
        let mut active = std::mem::take(&mut inner.subscribers);
        inner.notifying = true;
        drop(inner);

        for (id, handler) in &mut active {
            let skip = self.lock().removed.contains(id);
            if !skip {
                handler(&value);
            }
        }

        let mut inner = self.lock();
        // Handlers registered during the pass were pushed onto the (empty)
        // inner list; they come after the surviving originals.
        let added = std::mem::take(&mut inner.subscribers);
        let removed = std::mem::take(&mut inner.removed);
        active.retain(|(id, _)| !removed.contains(id));
        active.extend(added);
        inner.subscribers = active;
        inner.notifying = false;
        previous
    }

    /// Registers a handler invoked on every subsequent change.
    ///
    /// The handler is not called with the current value at subscription
    /// time. The returned [`Subscription`] must be unsubscribed (directly or
    /// through a `SubscriptionScope`) to release the handler.
    pub fn subscribe(&self, handler: impl FnMut(&T) + Send + 'static) -> Subscription {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Box::new(handler)));
            id
        };

        let weak = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    if let Ok(mut inner) = inner.lock() {
                        inner.subscribers.retain(|(sid, _)| *sid != id);
                        if inner.notifying {
                            inner.removed.insert(id);
                        }
                    }
                }
            })),
        }
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.inner.lock().expect("observable lock poisoned")
    }
}

/// Handle to a registered observable subscription.
///
/// Dropping the handle does not cancel the subscription; call
/// [`Subscription::unsubscribe`] (or dispose the owning scope).
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Cancels the subscription. Subsequent calls are no-ops.
    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Returns true if the subscription has not been cancelled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
