//! Replay-latest value broadcaster.
//!
//! [`Published`] holds the most recent value of some piece of state and hands
//! it to observers. A new observer is called immediately with the cached
//! value, then again on every subsequent publish. Each publish bumps a
//! version counter so owners that cannot hold callbacks (because they need
//! `&mut self` access) can poll for changes instead.
//!
//! Everything runs on the plugin's single event thread, so observers are
//! plain `FnMut` closures without `Send` bounds.
//!
//! # Example
//!
//! ```rust
//! use booksearch::published::Published;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let seen = Rc::new(Cell::new(0));
//! let mut value = Published::new(1);
//!
//! let sink = Rc::clone(&seen);
//! value.subscribe(move |v| sink.set(*v));
//! assert_eq!(seen.get(), 1);
//!
//! value.publish(7);
//! assert_eq!(seen.get(), 7);
//! ```

use std::fmt;

/// Handle returned by [`Published::subscribe`], used to detach an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer<T> = Box<dyn FnMut(&T)>;

/// A last-value-cached observable.
pub struct Published<T> {
    value: T,
    version: u64,
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer<T>)>,
}

impl<T> Published<T> {
    /// Creates a broadcaster seeded with `initial`. The version starts at 0.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            version: 0,
            next_id: 0,
            observers: Vec::new(),
        }
    }

    /// Latest published value.
    #[must_use]
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// Number of publishes since construction.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Number of attached observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Attaches an observer and replays the current value to it.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let mut observer: Observer<T> = Box::new(observer);
        observer(&self.value);
        self.observers.push((id, observer));

        tracing::trace!(subscription = id.0, observers = self.observers.len(), "observer attached");
        id
    }

    /// Detaches an observer. Returns `false` if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        before != self.observers.len()
    }

    /// Replaces the value and notifies every observer in subscription order.
    pub fn publish(&mut self, value: T) {
        self.value = value;
        self.version = self.version.wrapping_add(1);
        for (_, observer) in &mut self.observers {
            observer(&self.value);
        }
    }
}

impl<T: PartialEq> Published<T> {
    /// Publishes only when `value` differs from the cached one.
    ///
    /// Returns whether a publish happened.
    pub fn publish_if_changed(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.publish(value);
        true
    }
}

impl<T: Default> Default for Published<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Published<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Published")
            .field("value", &self.value)
            .field("version", &self.version)
            .field("observers", &self.observers.len())
            .finish()
    }
}
