//! # Navigation State Persistence
//!
//! Debounced, validated saving and defensive loading of navigation state.
//!
//! ## Save path
//!
//! ```text
//! save(tree) ──→ pending slot for key ──(debounce)──→ validate ──invalid──→ dropped
//!      ↑               │                                  │ valid
//!      └── new save aborts the sleeping task              ↓
//!                                   clean → PersistenceRecord → JSON → store.set
//! ```
//!
//! Once the timer fires the task takes its slot, so a later save can no
//! longer abort a write that is already running.
//!
//! Every key also has a write lock. A firing task takes its slot and writes
//! while holding it, and `flush`, `clear` and `clear_all` take it before
//! touching the key, so a write that is already running always finishes
//! before the key is removed.
//!
//! ## Load path
//!
//! | Stored value | Result |
//! |--------------|--------|
//! | absent | `None` |
//! | unparsable | key removed, `None` |
//! | active leaf is a sensitive route | key removed, `None` |
//! | fails validation | key removed, `None` |
//! | incompatible major version | key removed, `None` |
//! | otherwise | cleaned tree |
//!
//! Storage failures are logged and swallowed; callers never see them.

use crate::config::PersistenceConfig;
use crate::domain::{
    storage_key, user_scope_or_guest, NavigationMode, PersistenceRecord, StateTree,
    StateValidator, StoredPayload, CURRENT_STATE_VERSION,
};
use crate::error::NavigationError;
use crate::metrics;
use crate::ports::outbound::{KeyValueStore, SystemTimeSource, TimeSource};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex as WriteLock, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A save waiting out its debounce period.
struct ScheduledWrite {
    state: StateTree,
    mode: NavigationMode,
    user_scope: String,
}

struct PendingWrite {
    generation: u64,
    write: ScheduledWrite,
    handle: JoinHandle<()>,
}

struct PersistenceInner<S> {
    store: Arc<S>,
    validator: StateValidator,
    config: PersistenceConfig,
    time_source: Arc<dyn TimeSource>,
    pending: Mutex<HashMap<String, PendingWrite>>,
    write_locks: Mutex<HashMap<String, Arc<WriteLock<()>>>>,
    generations: AtomicU64,
}

/// Saves and restores navigation state through a [`KeyValueStore`].
///
/// Cheap to clone; clones share pending writes.
pub struct PersistenceManager<S> {
    inner: Arc<PersistenceInner<S>>,
}

impl<S> Clone for PersistenceManager<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: KeyValueStore + 'static> PersistenceManager<S> {
    pub fn new(store: Arc<S>, config: PersistenceConfig, validator: StateValidator) -> Self {
        Self::with_time_source(store, config, validator, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(
        store: Arc<S>,
        config: PersistenceConfig,
        validator: StateValidator,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            inner: Arc::new(PersistenceInner {
                store,
                validator,
                config,
                time_source,
                pending: Mutex::new(HashMap::new()),
                write_locks: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.inner.store
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.inner.config
    }

    pub fn validator(&self) -> &StateValidator {
        &self.inner.validator
    }

    /// Storage key for a mode and user scope on the configured platform.
    pub fn key_for(&self, mode: NavigationMode, user_scope: Option<&str>) -> String {
        storage_key(
            &self.inner.config.key_prefix,
            mode,
            user_scope,
            &self.inner.config.platform,
        )
    }

    /// Number of saves still waiting for their debounce period.
    pub fn pending_writes(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Schedules a debounced save. A later save for the same key within
    /// the debounce period replaces this one.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn save(&self, state: StateTree, mode: NavigationMode, user_scope: Option<&str>) {
        let key = self.key_for(mode, user_scope);
        let write = ScheduledWrite {
            state,
            mode,
            user_scope: user_scope_or_guest(user_scope).to_string(),
        };
        let generation = self.inner.generations.fetch_add(1, Ordering::SeqCst);
        let delay = self.inner.config.debounce();

        let mut pending = self.inner.pending.lock();
        let inner = self.inner.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _guard = inner.lock_key(&task_key).await;
            if let Some(write) = inner.take_if_current(&task_key, generation) {
                inner.write(&task_key, write).await;
            }
        });

        if let Some(previous) = pending.insert(
            key.clone(),
            PendingWrite {
                generation,
                write,
                handle,
            },
        ) {
            previous.handle.abort();
            debug!(%key, "Superseded pending navigation state save");
        }
    }

    /// Writes every pending save now instead of waiting for its timer.
    pub async fn flush(&self) {
        let drained: Vec<(String, PendingWrite)> = self.inner.pending.lock().drain().collect();
        for (key, pending) in drained {
            pending.handle.abort();
            let _guard = self.inner.lock_key(&key).await;
            self.inner.write(&key, pending.write).await;
        }
    }

    /// Loads the state saved for a mode and user scope.
    pub async fn load(&self, mode: NavigationMode, user_scope: Option<&str>) -> Option<StateTree> {
        let inner = &self.inner;
        let key = self.key_for(mode, user_scope);

        let raw = match inner.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(%key, "No saved navigation state");
                return None;
            }
            Err(err) => {
                error!(%key, error = %err, "Failed to load navigation state");
                return None;
            }
        };

        let payload = match StoredPayload::parse(&raw) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%key, error = %err, "Saved navigation state is unreadable");
                inner.discard(&key, "unparsable").await;
                return None;
            }
        };
        let version = payload.version();
        let state = payload.into_state();

        if let Some(leaf) = state.active_leaf() {
            if inner.config.is_sensitive(&leaf.name) {
                info!(%key, route = %leaf.name, "Not restoring navigation state ending on a transient route");
                inner.discard(&key, "stale_leaf").await;
                return None;
            }
        }

        let validation = inner.validator.validate(Some(&state));
        if !validation.valid {
            let err = NavigationError::ValidationError {
                errors: validation.errors,
            };
            warn!(%key, error = %err, "Saved navigation state is invalid");
            inner.discard(&key, "invalid").await;
            return None;
        }

        let compatible = match version {
            Some(version) => version.is_compatible_with(&CURRENT_STATE_VERSION),
            None => inner.validator.is_version_compatible(Some(&state)).compatible,
        };
        if !compatible {
            warn!(
                %key,
                saved = ?version.map(|v| v.to_string()),
                current = %CURRENT_STATE_VERSION,
                "Saved navigation state has an incompatible version"
            );
            inner.discard(&key, "version").await;
            return None;
        }

        let restored = inner.validator.clean(Some(&state));
        if restored.is_some() {
            debug!(%key, legacy = version.is_none(), "Navigation state restored");
        }
        restored
    }

    /// Cancels any pending save for the scope and removes its record.
    pub async fn clear(&self, mode: NavigationMode, user_scope: Option<&str>) {
        let key = self.key_for(mode, user_scope);
        let _guard = self.inner.lock_key(&key).await;
        if let Some(pending) = self.inner.pending.lock().remove(&key) {
            pending.handle.abort();
        }
        self.inner.remove(&key).await;
    }

    /// Removes every navigation state record, whatever its scope.
    pub async fn clear_all(&self) {
        let prefix = &self.inner.config.key_prefix;
        let mut locked: Vec<String> = self
            .inner
            .write_locks
            .lock()
            .keys()
            .filter(|key| key.starts_with(prefix.as_str()))
            .cloned()
            .collect();
        locked.sort();
        // Held until the records are removed.
        let mut guards = Vec::with_capacity(locked.len());
        for key in &locked {
            guards.push(self.inner.lock_key(key).await);
        }

        self.inner.pending.lock().retain(|key, pending| {
            let ours = key.starts_with(prefix.as_str());
            if ours {
                pending.handle.abort();
            }
            !ours
        });

        let keys = match self.inner.store.keys().await {
            Ok(keys) => keys,
            Err(err) => {
                error!(error = %err, "Failed to list navigation state keys");
                return;
            }
        };
        let ours: Vec<String> = keys
            .into_iter()
            .filter(|key| key.starts_with(prefix.as_str()))
            .collect();
        if ours.is_empty() {
            return;
        }
        match self.inner.store.multi_remove(&ours).await {
            Ok(()) => info!(count = ours.len(), "Cleared all navigation state"),
            Err(err) => error!(error = %err, "Failed to clear navigation state"),
        }
    }
}

impl<S: KeyValueStore> PersistenceInner<S> {
    /// Waits for the write lock of `key`.
    async fn lock_key(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .write_locks
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    /// Takes the slot for `key` if it still belongs to `generation`.
    fn take_if_current(&self, key: &str, generation: u64) -> Option<ScheduledWrite> {
        let mut pending = self.pending.lock();
        match pending.get(key) {
            Some(slot) if slot.generation == generation => {
                pending.remove(key).map(|slot| slot.write)
            }
            _ => None,
        }
    }

    async fn write(&self, key: &str, write: ScheduledWrite) {
        let validation = self.validator.validate(Some(&write.state));
        if !validation.valid {
            let err = NavigationError::ValidationError {
                errors: validation.errors,
            };
            warn!(%key, error = %err, "Not saving invalid navigation state");
            metrics::record_state_write_dropped();
            return;
        }
        let Some(state) = self.validator.clean(Some(&write.state)) else {
            metrics::record_state_write_dropped();
            return;
        };

        let record = PersistenceRecord {
            state,
            version: CURRENT_STATE_VERSION,
            saved_at: self.time_source.now(),
            mode: write.mode,
            user_scope: write.user_scope,
        };
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(err) => {
                error!(%key, error = %err, "Failed to serialize navigation state");
                return;
            }
        };

        match self.store.set(key, json).await {
            Ok(()) => {
                metrics::record_state_written();
                debug!(%key, saved_at = record.saved_at, "Navigation state saved");
            }
            Err(err) => error!(%key, error = %err, "Failed to save navigation state"),
        }
    }

    async fn discard(&self, key: &str, reason: &'static str) {
        metrics::record_state_load_discarded(reason);
        self.remove(key).await;
    }

    async fn remove(&self, key: &str) {
        match self.store.remove(key).await {
            Ok(()) => debug!(%key, "Navigation state cleared"),
            Err(err) => error!(%key, error = %err, "Failed to clear navigation state"),
        }
    }
}
