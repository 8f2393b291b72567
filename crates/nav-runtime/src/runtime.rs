//! Host wiring: coordinator, controller, store and the persistence feed.

use crate::config::{RuntimeConfig, Session};
use crate::protocol::{parse_request, Request, Response};
use anyhow::{Context, Result};
use nav_coordinator::{
    FileStore, GuardContext, NavigationApi, NavigationCoordinator, StackController, StateNode,
    StateTree,
};
use nav_telemetry::{log_event, log_nav_event};
use parking_lot::RwLock;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Running navigation host.
pub struct NavRuntime {
    coordinator: Arc<NavigationCoordinator<FileStore>>,
    controller: Arc<StackController>,
    session: Arc<RwLock<Session>>,
    shutdown_tx: watch::Sender<bool>,
    feed: JoinHandle<()>,
}

impl NavRuntime {
    /// Opens the store, restores the saved state and starts the persistence feed.
    ///
    /// ## Startup Sequence
    ///
    /// 1. Open the state directory
    /// 2. Restore the session's saved tree, or start at the initial route
    /// 3. Attach the controller
    /// 4. Forward every controller state change to persistence
    pub async fn start(config: RuntimeConfig) -> Result<Self> {
        let store = FileStore::open(&config.state_dir)
            .await
            .with_context(|| format!("Failed to open state directory {}", config.state_dir.display()))?;
        let coordinator = Arc::new(NavigationCoordinator::new(
            config.coordinator.clone(),
            Arc::new(store),
        ));

        let session = config.session.clone();
        let initial = match coordinator
            .restore(session.mode, session.user_scope())
            .await
        {
            Some(tree) => {
                log_event!(
                    info,
                    "runtime",
                    "Restored navigation state",
                    route = tree.active_leaf().map(|leaf| leaf.name.as_str())
                );
                tree
            }
            None => {
                log_event!(
                    info,
                    "runtime",
                    "Starting at initial route",
                    route = %config.initial_route
                );
                StateTree::single(StateNode::leaf(config.initial_route.as_str()))
            }
        };

        let controller = Arc::new(StackController::new(initial));
        coordinator.attach_controller(controller.clone());

        let session = Arc::new(RwLock::new(session));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let feed = spawn_persistence_feed(
            coordinator.clone(),
            controller.clone(),
            session.clone(),
            shutdown_rx,
        );

        Ok(Self {
            coordinator,
            controller,
            session,
            shutdown_tx,
            feed,
        })
    }

    pub fn coordinator(&self) -> &NavigationCoordinator<FileStore> {
        &self.coordinator
    }

    pub fn controller(&self) -> &StackController {
        &self.controller
    }

    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    /// Handles one protocol line.
    pub async fn handle_line(&self, line: &str) -> Response {
        match parse_request(line) {
            Ok(request) => self.handle(request).await,
            Err(response) => response,
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Command { command, priority } => {
                let context = self.guard_context();
                let kind = command.kind();
                let priority = priority.unwrap_or_else(|| command.default_priority());
                let completion = match self
                    .coordinator
                    .request_with_priority(command, priority, &context)
                    .await
                {
                    Ok(completion) => completion,
                    Err(err) => return err.into(),
                };
                match completion.await {
                    Ok(()) => {
                        let route = self.controller.current_route();
                        log_nav_event!(
                            debug,
                            "runtime",
                            "Navigation command completed",
                            kind,
                            route.as_deref(),
                            priority
                        );
                        Response::with_data(json!({ "route": route }))
                    }
                    Err(err) => err.into(),
                }
            }
            Request::Session {
                is_authenticated,
                is_guest_mode,
                is_admin,
                mode,
                user,
            } => {
                let mut session = self.session.write();
                if let Some(mode) = mode {
                    session.mode = mode;
                }
                if user.is_some() {
                    session.user = user;
                }
                session.context =
                    GuardContext::new(is_authenticated, is_guest_mode, is_admin, session.mode);
                log_event!(
                    info,
                    "runtime",
                    "Session updated",
                    mode = %session.mode,
                    user = session.user_scope(),
                    authenticated = is_authenticated,
                    guest = is_guest_mode,
                    admin = is_admin
                );
                Response::ok()
            }
            Request::Status => {
                let status = self.coordinator.queue().status();
                match serde_json::to_value(status) {
                    Ok(value) => Response::with_data(value),
                    Err(err) => Response::from(nav_coordinator::NavigationError::from(err)),
                }
            }
            Request::State => match serde_json::to_value(self.controller.snapshot()) {
                Ok(value) => Response::with_data(value),
                Err(err) => Response::from(nav_coordinator::NavigationError::from(err)),
            },
            Request::Flush => {
                self.coordinator.persistence().flush().await;
                Response::ok()
            }
            Request::EndSession => {
                let session = self.session();
                self.coordinator
                    .end_session(session.mode, session.user_scope())
                    .await;
                Response::ok()
            }
        }
    }

    /// Guard context for the current session, tagged with the current route.
    fn guard_context(&self) -> GuardContext {
        let context = self.session.read().context.clone();
        match self.controller.current_route() {
            Some(route) => context.with_current_route(route),
            None => context,
        }
    }

    /// Stops the persistence feed and writes pending saves.
    pub async fn shutdown(self) {
        log_event!(info, "runtime", "Initiating graceful shutdown");
        if self.shutdown_tx.send(true).is_err() {
            log_event!(warn, "runtime", "Persistence feed already stopped");
        }
        if let Err(err) = self.feed.await {
            log_event!(error, "runtime", "Persistence feed failed", error = %err);
        }
        self.coordinator.shutdown().await;
        log_event!(info, "runtime", "Shutdown complete");
    }
}

/// Saves every tree the controller publishes under the current session.
fn spawn_persistence_feed(
    coordinator: Arc<NavigationCoordinator<FileStore>>,
    controller: Arc<StackController>,
    session: Arc<RwLock<Session>>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let mut changes = controller.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                change = changes.recv() => {
                    let Some(tree) = change else { break };
                    let (mode, user) = {
                        let session = session.read();
                        (session.mode, session.user.clone())
                    };
                    coordinator.state_changed(tree, mode, user.as_deref());
                }
                _ = shutdown.changed() => {
                    log_event!(debug, "runtime", "Persistence feed stopping");
                    break;
                }
            }
        }
    })
}
