//! Application-facing facade over queue, guards and persistence.

use super::guard_chain::GuardChain;
use super::persistence::PersistenceManager;
use super::queue::NavigationQueue;
use crate::config::CoordinatorConfig;
use crate::domain::{
    Command, Completion, GuardContext, NavigationMode, Priority, RouteCatalogue, StateTree,
    StateValidator,
};
use crate::error::NavResult;
use crate::ports::inbound::NavigationApi;
use crate::ports::outbound::{KeyValueStore, NavigationController};
use std::sync::Arc;
use tracing::info;

/// Navigation service constructed once at startup and passed to whoever
/// needs to navigate.
pub struct NavigationCoordinator<S> {
    queue: NavigationQueue,
    guards: GuardChain,
    persistence: PersistenceManager<S>,
}

impl<S: KeyValueStore + 'static> NavigationCoordinator<S> {
    /// Coordinator with the standard guards and route catalogue.
    pub fn new(config: CoordinatorConfig, store: Arc<S>) -> Self {
        let validator = StateValidator::new(config.validation.clone(), RouteCatalogue::standard());
        Self {
            queue: NavigationQueue::new(config.queue.clone()),
            guards: GuardChain::standard(),
            persistence: PersistenceManager::new(store, config.persistence, validator),
        }
    }

    /// Assembles a coordinator from already configured parts.
    pub fn from_parts(
        queue: NavigationQueue,
        guards: GuardChain,
        persistence: PersistenceManager<S>,
    ) -> Self {
        Self {
            queue,
            guards,
            persistence,
        }
    }

    pub fn queue(&self) -> &NavigationQueue {
        &self.queue
    }

    pub fn guards(&self) -> &GuardChain {
        &self.guards
    }

    pub fn persistence(&self) -> &PersistenceManager<S> {
        &self.persistence
    }

    pub fn attach_controller(&self, controller: Arc<dyn NavigationController>) {
        self.queue.attach_controller(controller);
    }

    pub fn detach_controller(&self) {
        self.queue.detach_controller();
    }

    /// Runs the guard chain, then enqueues at the command's default
    /// priority. A denial is returned as `GuardDenied`; the redirect is a
    /// suggestion left to the caller.
    pub async fn request(&self, command: Command, context: &GuardContext) -> NavResult<Completion> {
        let priority = command.default_priority();
        self.request_with_priority(command, priority, context).await
    }

    pub async fn request_with_priority(
        &self,
        command: Command,
        priority: Priority,
        context: &GuardContext,
    ) -> NavResult<Completion> {
        self.guards.authorize(&command, context).await?;
        Ok(self.queue.enqueue(command, priority))
    }

    /// Host callback for every state change; schedules a debounced save.
    pub fn state_changed(&self, state: StateTree, mode: NavigationMode, user_scope: Option<&str>) {
        self.persistence.save(state, mode, user_scope);
    }

    /// State to show on startup, if a usable one was saved.
    pub async fn restore(&self, mode: NavigationMode, user_scope: Option<&str>) -> Option<StateTree> {
        self.persistence.load(mode, user_scope).await
    }

    /// Forced logout: drops pending commands and the session's saved state.
    pub async fn end_session(&self, mode: NavigationMode, user_scope: Option<&str>) {
        self.queue.clear();
        self.persistence.clear(mode, user_scope).await;
        info!(%mode, "Navigation session ended");
    }

    /// Writes pending saves immediately.
    pub async fn shutdown(&self) {
        self.persistence.flush().await;
        self.queue.detach_controller();
    }
}
