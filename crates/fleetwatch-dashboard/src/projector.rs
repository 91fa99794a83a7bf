use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio_stream::wrappers::WatchStream;

use fleetwatch_client::{ServerApi, TransportError};
use fleetwatch_common::{ResponseEnvelope, ServerDraft, ServerRecord, StatusFilter};

use crate::cache::LocalCache;
use crate::notify::{NotificationLevel, Notifier};
use crate::signals::{FilterStatus, LoadingFlag};
use crate::state::{AppState, Projection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Load,
    Ping,
    Save,
    Filter,
    Delete,
}

/// Handle to one dispatched action.
#[derive(Debug)]
pub struct Action {
    kind: ActionKind,
    handle: JoinHandle<Option<AppState>>,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Terminal state of this action, or `None` if a newer action replaced
    /// it before it settled.
    pub async fn settled(self) -> Option<AppState> {
        match self.handle.await {
            Ok(state) => state,
            Err(err) if err.is_cancelled() => None,
            Err(err) => {
                tracing::error!(kind = ?self.kind, error = %err, "action task failed");
                None
            }
        }
    }
}

struct InFlight {
    kind: ActionKind,
    handle: AbortHandle,
}

#[derive(Default)]
struct Inner {
    cache: LocalCache,
    /// Bumped by every dispatch; a task only settles if it still owns it.
    generation: u64,
}

#[derive(Clone)]
struct Shared {
    inner: Arc<Mutex<Inner>>,
    state: Arc<watch::Sender<AppState>>,
    filter_status: FilterStatus,
    loading: LoadingFlag,
    notifier: Arc<dyn Notifier>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn publish(&self, projection: Projection) -> AppState {
        let state = AppState::from(projection);
        self.state.send_replace(state.clone());
        state
    }

    /// Reset the side signal an action of `kind` raised when it started.
    fn release(&self, kind: ActionKind) {
        match kind {
            ActionKind::Ping => self.filter_status.clear(),
            ActionKind::Save => self.loading.set(false),
            ActionKind::Load | ActionKind::Filter | ActionKind::Delete => {}
        }
    }

    fn settle<F>(&self, generation: u64, kind: ActionKind, apply: F) -> Option<AppState>
    where
        F: FnOnce(&mut LocalCache, &dyn Notifier) -> Result<ResponseEnvelope, TransportError>,
    {
        let mut inner = lock(&self.inner);
        if inner.generation != generation {
            tracing::debug!(?kind, generation, "discarding superseded result");
            return None;
        }

        let outcome = apply(&mut inner.cache, self.notifier.as_ref());
        self.release(kind);
        match &outcome {
            Ok(env) => tracing::debug!(?kind, servers = env.servers().len(), "action settled"),
            Err(err) => {
                tracing::warn!(?kind, code = err.code, "action failed");
                self.notifier.notify(NotificationLevel::Error, &err.message);
            }
        }
        Some(self.publish(Projection::Settled(outcome)))
    }
}

/// Turns server API calls into [`AppState`] updates over a local cache.
///
/// Every action publishes a pending state right away and one terminal state
/// once its call settles. Dispatching a new action aborts the one in flight,
/// whose result is then never applied. Must be driven from a Tokio runtime.
pub struct StateProjector {
    api: Arc<dyn ServerApi>,
    shared: Shared,
    inflight: Mutex<Option<InFlight>>,
}

impl std::fmt::Debug for StateProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateProjector")
            .field("state", &*self.shared.state.borrow())
            .finish()
    }
}

impl StateProjector {
    pub fn new(api: Arc<dyn ServerApi>, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _rx) = watch::channel(AppState::Loading);
        Self {
            api,
            shared: Shared {
                inner: Arc::new(Mutex::new(Inner::default())),
                state: Arc::new(state),
                filter_status: FilterStatus::default(),
                loading: LoadingFlag::default(),
                notifier,
            },
            inflight: Mutex::new(None),
        }
    }

    pub fn state(&self) -> AppState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.shared.state.subscribe()
    }

    pub fn states(&self) -> WatchStream<AppState> {
        WatchStream::new(self.shared.state.subscribe())
    }

    pub fn filter_status(&self) -> &FilterStatus {
        &self.shared.filter_status
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.shared.loading
    }

    /// Cached list as last patched, `None` before the first load.
    pub fn snapshot(&self) -> Option<ResponseEnvelope> {
        lock(&self.shared.inner).cache.snapshot()
    }

    pub fn servers(&self) -> Vec<ServerRecord> {
        lock(&self.shared.inner).cache.servers().to_vec()
    }

    /// Rows of the current view: the filtered list after a filter, the
    /// cached list when nothing is loaded on screen.
    pub fn visible_servers(&self) -> Vec<ServerRecord> {
        match self.state().envelope() {
            Some(env) => env.servers().to_vec(),
            None => self.servers(),
        }
    }

    pub fn load(&self) -> Action {
        let api = Arc::clone(&self.api);
        self.launch(ActionKind::Load, |_| {}, move |shared, generation, _| async move {
            let result = api.list().await;
            shared.settle(generation, ActionKind::Load, |cache, _| {
                result.map(|resp| cache.apply_list(&resp))
            })
        })
    }

    pub fn ping(&self, ip_address: impl Into<String>) -> Action {
        let ip = ip_address.into();
        let api = Arc::clone(&self.api);
        let marker = ip.clone();
        self.launch(
            ActionKind::Ping,
            move |shared| shared.filter_status.set(marker),
            move |shared, generation, _| async move {
                let result = api.ping(&ip).await;
                shared.settle(generation, ActionKind::Ping, |cache, notifier| {
                    let resp = result?;
                    notifier.notify(NotificationLevel::Default, &resp.message);
                    Ok(cache.apply_ping(&resp).unwrap_or_else(|err| {
                        tracing::warn!(ip = %ip, error = %err, "ping result left cache unchanged");
                        cache.snapshot().unwrap_or_default()
                    }))
                })
            },
        )
    }

    pub fn save(&self, draft: ServerDraft) -> Action {
        let api = Arc::clone(&self.api);
        self.launch(
            ActionKind::Save,
            |shared| shared.loading.set(true),
            move |shared, generation, _| async move {
                let result = api.save(&draft).await;
                shared.settle(generation, ActionKind::Save, |cache, notifier| {
                    let resp = result?;
                    notifier.notify(NotificationLevel::Success, &resp.message);
                    Ok(cache.apply_save(&resp).unwrap_or_else(|err| {
                        tracing::warn!(name = %draft.name, error = %err, "save result left cache unchanged");
                        cache.snapshot().unwrap_or_default()
                    }))
                })
            },
        )
    }

    /// Project the cached list through `status`; the cache itself is kept.
    pub fn filter(&self, status: StatusFilter) -> Action {
        let api = Arc::clone(&self.api);
        self.launch(ActionKind::Filter, |_| {}, move |shared, generation, snapshot| async move {
            let result = api.filter(status, &snapshot.unwrap_or_default());
            shared.settle(generation, ActionKind::Filter, |_, notifier| {
                let resp = result?;
                notifier.notify(NotificationLevel::Default, &resp.message);
                Ok(resp)
            })
        })
    }

    pub fn delete(&self, id: i64) -> Action {
        let api = Arc::clone(&self.api);
        self.launch(ActionKind::Delete, |_| {}, move |shared, generation, _| async move {
            let result = api.delete(id).await;
            shared.settle(generation, ActionKind::Delete, |cache, notifier| {
                let resp = result?;
                notifier.notify(NotificationLevel::Success, &resp.message);
                Ok(cache.apply_delete(id, &resp))
            })
        })
    }

    fn launch<S, F, Fut>(&self, kind: ActionKind, on_start: S, task: F) -> Action
    where
        S: FnOnce(&Shared),
        F: FnOnce(Shared, u64, Option<ResponseEnvelope>) -> Fut,
        Fut: Future<Output = Option<AppState>> + Send + 'static,
    {
        let mut slot = lock(&self.inflight);
        let previous = slot.take();
        if let Some(prev) = &previous {
            prev.handle.abort();
            tracing::debug!(superseded = ?prev.kind, by = ?kind, "aborting in-flight action");
        }

        let (generation, snapshot) = {
            let mut inner = lock(&self.shared.inner);
            inner.generation += 1;
            if let Some(prev) = previous {
                self.shared.release(prev.kind);
            }
            on_start(&self.shared);

            let snapshot = inner.cache.snapshot();
            let pending = match kind {
                ActionKind::Load => None,
                _ => snapshot.clone(),
            };
            self.shared.publish(Projection::Pending(pending));
            (inner.generation, snapshot)
        };

        let handle = tokio::spawn(task(self.shared.clone(), generation, snapshot));
        *slot = Some(InFlight {
            kind,
            handle: handle.abort_handle(),
        });
        Action { kind, handle }
    }
}
