use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Last-value-wins cell observed by the UI.
///
/// Reducers write to it from their driver only; any number of receivers can
/// watch it. Dropping a receiver unsubscribes it.
pub struct Published<T> {
    sender: Arc<watch::Sender<T>>,
}

impl<T> Clone for Published<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Published<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Published")
            .field("value", &*self.sender.borrow())
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

impl<T: Default> Default for Published<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Published<T> {
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(value);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn borrow(&self) -> watch::Ref<'_, T> {
        self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Replace the value and notify every receiver.
    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        self.sender.send_modify(f);
    }

    /// Like [`modify`](Self::modify), but receivers are only notified when
    /// `f` returns `true`.
    pub fn modify_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.sender.send_if_modified(f)
    }
}

impl<T: Clone> Published<T> {
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

impl<T: Clone + Send + Sync + 'static> Published<T> {
    /// Current value followed by every later change.
    pub fn stream(&self) -> WatchStream<T> {
        WatchStream::new(self.subscribe())
    }
}
