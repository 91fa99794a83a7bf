use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Latest-value broadcast. Subscribers see only the most recent value;
/// anything set while they were not looking is skipped.
#[derive(Debug)]
pub struct Signal<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Signal<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub fn stream(&self) -> WatchStream<T> {
        WatchStream::new(self.tx.subscribe())
    }
}

/// IP address currently being pinged, empty when idle.
pub type FilterStatus = Signal<String>;

/// True while a save is in flight.
pub type LoadingFlag = Signal<bool>;

impl Signal<String> {
    pub fn clear(&self) {
        self.set(String::new());
    }
}

impl Default for Signal<String> {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl Default for Signal<bool> {
    fn default() -> Self {
        Self::new(false)
    }
}
