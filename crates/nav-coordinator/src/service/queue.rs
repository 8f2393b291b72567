//! # Navigation Command Queue
//!
//! Serialises navigation commands so the host controller only ever sees one
//! at a time.
//!
//! ```text
//! enqueue ──insert by priority──→ [pending] ──drain task──→ settle delay
//!                                                             │
//!                       controller attached & ready? ──no──→ QueueNotReady
//!                                                             │ yes
//!                                                        dispatch ──→ completion
//! ```
//!
//! The pending list and the `is_processing` flag share one mutex, so the
//! drain task deciding "empty, stop" and an enqueue deciding "idle, start"
//! can never both miss each other.

use crate::config::QueueConfig;
use crate::domain::{
    Command, Completion, Params, PendingQueue, Priority, QueueItem, QueueStatus, RouteSpec,
};
use crate::error::{NavResult, NavigationError};
use crate::metrics;
use crate::ports::inbound::NavigationApi;
use crate::ports::outbound::{NavigationController, SystemTimeSource, TimeSource};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Default)]
struct QueueState {
    pending: PendingQueue,
    is_processing: bool,
}

struct QueueShared {
    state: Mutex<QueueState>,
    controller: RwLock<Option<Arc<dyn NavigationController>>>,
    settle_delay: Duration,
    time_source: Arc<dyn TimeSource>,
}

/// Priority command queue with a single drain task.
///
/// Cheap to clone; clones share one queue.
#[derive(Clone)]
pub struct NavigationQueue {
    shared: Arc<QueueShared>,
}

impl Default for NavigationQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

impl NavigationQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(config: QueueConfig, time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            shared: Arc::new(QueueShared {
                state: Mutex::new(QueueState::default()),
                controller: RwLock::new(None),
                settle_delay: config.settle_delay(),
                time_source,
            }),
        }
    }

    /// Registers the host controller (navigator mounted).
    pub fn attach_controller(&self, controller: Arc<dyn NavigationController>) {
        *self.shared.controller.write() = Some(controller);
        info!("Navigation controller attached");
    }

    /// Forgets the host controller (navigator unmounted). Commands reaching
    /// the head afterwards fail with `QueueNotReady`.
    pub fn detach_controller(&self) {
        if self.shared.controller.write().take().is_some() {
            info!("Navigation controller detached");
        }
    }

    pub fn has_controller(&self) -> bool {
        self.shared.controller.read().is_some()
    }

    pub fn navigate(&self, route_name: impl Into<String>, params: Option<Params>) -> Completion {
        self.submit(Command::navigate(route_name, params))
    }

    pub fn reset(&self, index: usize, routes: Vec<RouteSpec>) -> Completion {
        self.submit(Command::reset(index, routes))
    }

    pub fn replace(&self, route_name: impl Into<String>, params: Option<Params>) -> Completion {
        self.submit(Command::replace(route_name, params))
    }

    pub fn go_back(&self) -> Completion {
        self.submit(Command::go_back())
    }

    pub fn set_params(&self, params: Params) -> Completion {
        self.submit(Command::set_params(params))
    }

    pub fn navigate_with_priority(
        &self,
        route_name: impl Into<String>,
        params: Option<Params>,
        priority: Priority,
    ) -> Completion {
        self.enqueue(Command::navigate(route_name, params), priority)
    }

    pub fn reset_with_priority(
        &self,
        index: usize,
        routes: Vec<RouteSpec>,
        priority: Priority,
    ) -> Completion {
        self.enqueue(Command::reset(index, routes), priority)
    }

    pub fn replace_with_priority(
        &self,
        route_name: impl Into<String>,
        params: Option<Params>,
        priority: Priority,
    ) -> Completion {
        self.enqueue(Command::replace(route_name, params), priority)
    }

    pub fn go_back_with_priority(&self, priority: Priority) -> Completion {
        self.enqueue(Command::go_back(), priority)
    }

    pub fn set_params_with_priority(&self, params: Params, priority: Priority) -> Completion {
        self.enqueue(Command::set_params(params), priority)
    }
}

impl NavigationApi for NavigationQueue {
    fn enqueue(&self, command: Command, priority: Priority) -> Completion {
        let kind = command.kind();
        let (item, completion) = QueueItem::new(command, priority, self.shared.time_source.now());
        let id = item.id;

        let start_drain = {
            let mut state = self.shared.state.lock();
            state.pending.insert(item);
            metrics::set_queue_depth(state.pending.len());
            debug!(
                %id,
                kind = kind.as_str(),
                priority,
                queue_length = state.pending.len(),
                "Navigation command enqueued"
            );
            !std::mem::replace(&mut state.is_processing, true)
        };
        metrics::record_command_enqueued(kind.as_str());

        if start_drain {
            tokio::spawn(drain(self.shared.clone()));
        }
        completion
    }

    fn clear(&self) {
        let cleared = {
            let mut state = self.shared.state.lock();
            let items = state.pending.drain_all();
            metrics::set_queue_depth(0);
            items
        };
        if cleared.is_empty() {
            return;
        }
        info!(count = cleared.len(), "Navigation queue cleared");
        for item in cleared {
            metrics::record_command_failed(NavigationError::QueueCleared.label());
            item.complete(Err(NavigationError::QueueCleared));
        }
    }

    fn status(&self) -> QueueStatus {
        let (queue_length, is_processing) = {
            let state = self.shared.state.lock();
            (state.pending.len(), state.is_processing)
        };
        QueueStatus {
            queue_length,
            is_processing,
            has_controller: self.has_controller(),
        }
    }
}

/// Drains the queue one command at a time until it is empty.
async fn drain(shared: Arc<QueueShared>) {
    loop {
        let item = {
            let mut state = shared.state.lock();
            match state.pending.pop_front() {
                Some(item) => {
                    metrics::set_queue_depth(state.pending.len());
                    item
                }
                None => {
                    state.is_processing = false;
                    return;
                }
            }
        };

        tokio::time::sleep(shared.settle_delay).await;

        let controller = shared.controller.read().clone();
        let command = item.command.clone();
        // A panicking controller only fails its own command.
        let outcome = match tokio::spawn(dispatch(controller, command)).await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(NavigationError::Dispatch {
                reason: format!("controller task failed: {}", join_err),
            }),
        };

        let kind = item.command.kind();
        match &outcome {
            Ok(()) => {
                metrics::record_command_dispatched(kind.as_str());
                debug!(id = %item.id, kind = kind.as_str(), "Navigation command dispatched");
            }
            Err(err) => {
                metrics::record_command_failed(err.label());
                warn!(
                    id = %item.id,
                    kind = kind.as_str(),
                    reason = err.label(),
                    error = %err,
                    "Navigation command failed"
                );
            }
        }
        item.complete(outcome);
    }
}

fn into_dispatch(err: NavigationError) -> NavigationError {
    match err {
        NavigationError::Dispatch { .. } => err,
        other => NavigationError::Dispatch {
            reason: other.to_string(),
        },
    }
}

/// Applies one command to the controller.
async fn dispatch(
    controller: Option<Arc<dyn NavigationController>>,
    command: Command,
) -> NavResult<()> {
    let controller = controller.ok_or(NavigationError::QueueNotReady)?;
    if !controller.is_ready().await {
        return Err(NavigationError::QueueNotReady);
    }

    match command {
        Command::Navigate { route_name, params } => controller
            .navigate(&route_name, params.as_ref())
            .await
            .map_err(into_dispatch),
        Command::Reset { index, routes } => {
            if routes.is_empty() {
                return Err(NavigationError::invalid(
                    "reset requires at least one route",
                ));
            }
            if index >= routes.len() {
                return Err(NavigationError::invalid(format!(
                    "reset index {} is out of bounds for {} routes",
                    index,
                    routes.len()
                )));
            }
            controller
                .reset(index, &routes)
                .await
                .map_err(into_dispatch)
        }
        Command::Replace { route_name, params } => controller
            .replace(&route_name, params.as_ref())
            .await
            .map_err(into_dispatch),
        Command::GoBack => controller.go_back().await.map_err(into_dispatch),
        Command::SetParams { params } => {
            let root = controller
                .root_state()
                .await
                .ok_or_else(|| NavigationError::invalid("no navigation state to set params on"))?;
            let leaf = root
                .active_leaf()
                .ok_or_else(|| NavigationError::invalid("no active route to set params on"))?;
            let mut merged = leaf.params.clone().unwrap_or_default();
            merged.extend(params);
            controller
                .set_params(&leaf.name, merged)
                .await
                .map_err(into_dispatch)
        }
    }
}
