//! Auto-expiring notification queue.
//!
//! Toasts live in the store's `toasts` list. Each one gets a removal timer on
//! the tokio runtime; dismissing a toast early aborts its timer first so a
//! stale timer can never remove anything later.

use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::hunt::state::{GameAction, SharedStore};
use crate::hunt::types::{Toast, ToastKind};
use crate::logutil::escape_log;

pub const DEFAULT_TOAST_DURATION_MS: u64 = 3000;

type TimerRegistry = Mutex<HashMap<String, JoinHandle<()>>>;

/// Lock the timer registry, recovering it if a previous holder panicked.
fn lock_timers(timers: &TimerRegistry) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
    match timers.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Clone)]
pub struct ToastNotifier {
    store: SharedStore,
    default_duration: Duration,
    timers: Arc<TimerRegistry>,
}

impl ToastNotifier {
    pub fn new(store: SharedStore) -> Self {
        Self::with_default_duration(store, Duration::from_millis(DEFAULT_TOAST_DURATION_MS))
    }

    pub fn with_default_duration(store: SharedStore, default_duration: Duration) -> Self {
        Self {
            store,
            default_duration,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Queue a toast and schedule its removal. Returns the new toast id.
    ///
    /// Must be called within a tokio runtime.
    pub fn add(&self, kind: ToastKind, message: &str, duration: Option<Duration>) -> String {
        let id = Uuid::new_v4().to_string();
        let lifetime = duration.unwrap_or(self.default_duration);
        let toast = Toast {
            id: id.clone(),
            kind,
            message: message.to_string(),
            duration_ms: duration.map(|d| d.as_millis() as u64),
        };
        debug!("toast {:?} {}: {}", kind, id, escape_log(message));
        self.store.dispatch(GameAction::AddToast(toast));

        let store = self.store.clone();
        let timers = Arc::clone(&self.timers);
        let timer_id = id.clone();
        // Registration happens under the lock so the timer cannot finish before it is tracked
        let mut registry = lock_timers(&self.timers);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            lock_timers(&timers).remove(&timer_id);
            store.dispatch(GameAction::RemoveToast(timer_id));
        });
        registry.insert(id.clone(), handle);
        id
    }

    pub fn success(&self, message: &str) -> String {
        self.add(ToastKind::Success, message, None)
    }

    pub fn error(&self, message: &str) -> String {
        self.add(ToastKind::Error, message, None)
    }

    pub fn info(&self, message: &str) -> String {
        self.add(ToastKind::Info, message, None)
    }

    /// Remove a toast now. Unknown or already-expired ids are ignored.
    pub fn dismiss(&self, id: &str) {
        let pending = lock_timers(&self.timers).remove(id);
        if let Some(handle) = pending {
            handle.abort();
        }
        self.store.dispatch(GameAction::RemoveToast(id.to_string()));
    }

    /// Number of removal timers still pending
    pub fn pending_timers(&self) -> usize {
        lock_timers(&self.timers).len()
    }
}
