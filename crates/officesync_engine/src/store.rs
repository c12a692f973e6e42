//! Reactive store holding the office state.
//!
//! The store:
//! - Replaces its state wholesale on every update
//! - Notifies listeners synchronously with `(next, prev)` after the swap
//! - Supports multiple listeners
//! - Is thread-safe

use officesync_model::{OfficeState, PartialState};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};

/// A store listener, called with `(next, prev)` after every update.
pub type StateListener = Arc<dyn Fn(&OfficeState, &OfficeState) + Send + Sync>;

/// Anything that holds an [`OfficeState`] and reports replacements.
pub trait StateSource: Send + Sync + 'static {
    /// Registers a listener. It stays registered until the returned
    /// subscription is dropped or unsubscribed.
    fn subscribe(&self, listener: StateListener) -> Subscription;

    /// Returns the current state.
    fn get_state(&self) -> Arc<OfficeState>;
}

#[derive(Default)]
struct Registry {
    next_id: Mutex<u64>,
    listeners: RwLock<Vec<(u64, StateListener)>>,
}

impl Registry {
    fn add(&self, listener: StateListener) -> u64 {
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            *next
        };
        self.listeners.write().push((id, listener));
        id
    }

    fn remove(&self, id: u64) {
        self.listeners.write().retain(|(i, _)| *i != id);
    }

    fn notify(&self, next: &OfficeState, prev: &OfficeState) {
        // Snapshot so a listener may unsubscribe while being called.
        let listeners: Vec<StateListener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(next, prev);
        }
    }
}

/// Handle to a registered listener.
///
/// Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes the listener"]
pub struct Subscription {
    registry: Option<Weak<Registry>>,
    id: u64,
}

impl Subscription {
    /// A subscription that is not attached to anything.
    pub fn noop() -> Self {
        Self {
            registry: None,
            id: 0,
        }
    }

    /// Removes the listener now.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(registry) = self.registry.take().and_then(|w| w.upgrade()) {
            registry.remove(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.registry.is_some())
            .finish()
    }
}

/// The application store.
pub struct Store {
    state: RwLock<Arc<OfficeState>>,
    registry: Arc<Registry>,
    commit: Mutex<()>,
}

impl Store {
    /// Creates a store holding `state`.
    pub fn new(state: OfficeState) -> Self {
        Self {
            state: RwLock::new(Arc::new(state)),
            registry: Arc::new(Registry::default()),
            commit: Mutex::new(()),
        }
    }

    /// Applies `f` to a copy of the current state, installs the copy and
    /// notifies listeners.
    ///
    /// Updates are serialized. Listeners run while the update is being
    /// committed and must not update the store themselves.
    pub fn update<R>(&self, f: impl FnOnce(&mut OfficeState) -> R) -> R {
        let _commit = self.commit.lock();
        let prev = Arc::clone(&self.state.read());
        let mut next = (*prev).clone();
        let result = f(&mut next);
        let next = Arc::new(next);
        *self.state.write() = Arc::clone(&next);
        self.registry.notify(&next, &prev);
        result
    }

    /// Replaces every slice present in `partial`.
    pub fn hydrate(&self, partial: PartialState) {
        self.update(|state| state.apply_partial(partial));
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.listeners.read().len()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(OfficeState::default())
    }
}

impl StateSource for Store {
    fn subscribe(&self, listener: StateListener) -> Subscription {
        let id = self.registry.add(listener);
        Subscription {
            registry: Some(Arc::downgrade(&self.registry)),
            id,
        }
    }

    fn get_state(&self) -> Arc<OfficeState> {
        Arc::clone(&self.state.read())
    }
}
