//! Load handles
//!
//! A [`LoadHandle`] observes one asynchronous load. It starts `Pending` and
//! moves to `Ready` or `Failed` exactly once; the producing side holds the
//! single [`LoadCompleter`].

use crate::LoadError;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Observable state of a load.
pub enum LoadState<T> {
    Pending,
    Ready(Arc<T>),
    Failed(LoadError),
}

impl<T> LoadState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }
}

// Manual impls: cloning a state never needs `T: Clone`.
impl<T> Clone for LoadState<T> {
    fn clone(&self) -> Self {
        match self {
            LoadState::Pending => LoadState::Pending,
            LoadState::Ready(value) => LoadState::Ready(Arc::clone(value)),
            LoadState::Failed(err) => LoadState::Failed(err.clone()),
        }
    }
}

impl<T> fmt::Debug for LoadState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Pending => f.write_str("Pending"),
            LoadState::Ready(_) => f.write_str("Ready"),
            LoadState::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}

/// Read side of a load.
pub struct LoadHandle<T> {
    rx: watch::Receiver<LoadState<T>>,
}

impl<T> Clone for LoadHandle<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T> fmt::Debug for LoadHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LoadHandle").field(&*self.rx.borrow()).finish()
    }
}

impl<T> LoadHandle<T> {
    /// Create a pending handle together with the completer that resolves it.
    pub fn pending() -> (LoadCompleter<T>, LoadHandle<T>) {
        let (tx, rx) = watch::channel(LoadState::Pending);
        (LoadCompleter { tx }, LoadHandle { rx })
    }

    /// Handle that is already `Ready`.
    pub fn ready(value: T) -> Self {
        Self::resolved(LoadState::Ready(Arc::new(value)))
    }

    /// Handle that is already `Failed`.
    pub fn failed(error: LoadError) -> Self {
        Self::resolved(LoadState::Failed(error))
    }

    fn resolved(state: LoadState<T>) -> Self {
        let (_tx, rx) = watch::channel(state);
        Self { rx }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoadState<T> {
        self.rx.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.rx.borrow().is_pending()
    }

    pub fn is_done(&self) -> bool {
        !self.is_pending()
    }

    /// The loaded value if the handle is `Ready`, without waiting.
    pub fn get_now(&self) -> Option<Arc<T>> {
        match &*self.rx.borrow() {
            LoadState::Ready(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Wait until the handle leaves `Pending` and return the terminal state.
    pub async fn settled(&self) -> LoadState<T> {
        let mut rx = self.rx.clone();
        let state = match rx.wait_for(|state| !state.is_pending()).await {
            Ok(state) => state.clone(),
            // Completer dropping always publishes a terminal state first,
            // so a closed channel here means it never existed.
            Err(_) => LoadState::Failed(LoadError::Abandoned),
        };
        state
    }
}

/// Write side of a load. Dropping it unresolved fails the handle.
pub struct LoadCompleter<T> {
    tx: watch::Sender<LoadState<T>>,
}

impl<T> LoadCompleter<T> {
    pub fn complete(self, result: Result<T, LoadError>) {
        let state = match result {
            Ok(value) => LoadState::Ready(Arc::new(value)),
            Err(err) => LoadState::Failed(err),
        };
        self.publish(state);
    }

    fn publish(&self, state: LoadState<T>) {
        self.tx.send_if_modified(|current| {
            if current.is_pending() {
                *current = state;
                true
            } else {
                false
            }
        });
    }
}

impl<T> Drop for LoadCompleter<T> {
    fn drop(&mut self) {
        self.publish(LoadState::Failed(LoadError::Abandoned));
    }
}
