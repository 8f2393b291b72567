//! In-memory host controller.
//!
//! Applies commands to a [`StateTree`] and publishes every resulting tree
//! on a broadcast channel. Used by the headless runtime and in tests; UI
//! hosts implement [`NavigationController`] over their own navigator.

use crate::domain::{Params, RouteSpec, StateNode, StateTree, ACTIVE_BRANCH_LIMIT};
use crate::error::{NavResult, NavigationError};
use crate::ports::outbound::NavigationController;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Default capacity of the state-change channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Stack navigator held entirely in memory.
pub struct StackController {
    state: RwLock<StateTree>,
    ready: AtomicBool,
    sender: broadcast::Sender<StateTree>,
    commands_applied: AtomicU64,
}

impl StackController {
    /// Creates a ready controller showing `initial`.
    pub fn new(initial: StateTree) -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(initial),
            ready: AtomicBool::new(true),
            sender,
            commands_applied: AtomicU64::new(0),
        }
    }

    /// Controller whose root stack holds a single route.
    pub fn with_root(route_name: &str) -> Self {
        Self::new(StateTree::single(StateNode::leaf(route_name)))
    }

    /// Simulates mounting (`true`) or unmounting (`false`) the navigator.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Subscribe to trees produced by subsequent commands.
    pub fn subscribe(&self) -> StateChanges {
        StateChanges {
            receiver: self.sender.subscribe(),
        }
    }

    /// Current tree.
    pub fn snapshot(&self) -> StateTree {
        self.state.read().clone()
    }

    /// Name of the innermost active route.
    pub fn current_route(&self) -> Option<String> {
        self.state.read().active_leaf().map(|leaf| leaf.name.clone())
    }

    /// Number of commands applied successfully.
    pub fn commands_applied(&self) -> u64 {
        self.commands_applied.load(Ordering::SeqCst)
    }

    /// Applies `change` under the write lock and publishes the new tree.
    fn apply<F>(&self, action: &'static str, change: F) -> NavResult<()>
    where
        F: FnOnce(&mut StateTree) -> NavResult<()>,
    {
        let updated = {
            let mut state = self.state.write();
            change(&mut *state)?;
            state.clone()
        };
        self.commands_applied.fetch_add(1, Ordering::SeqCst);
        debug!(
            action,
            route = updated.active_leaf().map(|leaf| leaf.name.as_str()),
            "Controller state changed"
        );
        // No subscribers is fine.
        let _ = self.sender.send(updated);
        Ok(())
    }
}

fn node_from_spec(spec: &RouteSpec) -> StateNode {
    StateNode {
        name: spec.name.clone(),
        params: spec.params.clone(),
        state: None,
    }
}

/// Pops the deepest stack on the active branch that has something to pop.
fn pop_deepest(tree: &mut StateTree, depth: usize) -> bool {
    if depth > ACTIVE_BRANCH_LIMIT {
        return false;
    }
    let index = tree.index;
    if let Some(nested) = tree.routes.get_mut(index).and_then(|r| r.state.as_mut()) {
        if pop_deepest(nested, depth + 1) {
            return true;
        }
    }
    if tree.index == 0 {
        return false;
    }
    tree.routes.truncate(tree.index);
    tree.index -= 1;
    true
}

#[async_trait]
impl NavigationController for StackController {
    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn navigate(&self, route_name: &str, params: Option<&Params>) -> NavResult<()> {
        self.apply("navigate", |tree| {
            match tree.routes.iter().position(|r| r.name == route_name) {
                Some(existing) => {
                    tree.index = existing;
                    if let Some(params) = params {
                        tree.routes[existing].params = Some(params.clone());
                    }
                }
                None => {
                    let mut node = StateNode::leaf(route_name);
                    node.params = params.cloned();
                    tree.routes.push(node);
                    tree.index = tree.routes.len() - 1;
                }
            }
            Ok(())
        })
    }

    async fn reset(&self, index: usize, routes: &[RouteSpec]) -> NavResult<()> {
        if index >= routes.len() {
            return Err(NavigationError::Dispatch {
                reason: format!("reset index {} out of bounds ({})", index, routes.len()),
            });
        }
        self.apply("reset", |tree| {
            *tree = StateTree::new(routes.iter().map(node_from_spec).collect(), index);
            Ok(())
        })
    }

    async fn replace(&self, route_name: &str, params: Option<&Params>) -> NavResult<()> {
        self.apply("replace", |tree| {
            let index = tree.index;
            let slot = tree.routes.get_mut(index).ok_or_else(|| NavigationError::Dispatch {
                reason: "no active route to replace".to_string(),
            })?;
            let mut node = StateNode::leaf(route_name);
            node.params = params.cloned();
            *slot = node;
            Ok(())
        })
    }

    async fn go_back(&self) -> NavResult<()> {
        self.apply("goBack", |tree| {
            if pop_deepest(tree, 0) {
                Ok(())
            } else {
                Err(NavigationError::Dispatch {
                    reason: "cannot go back from the first route".to_string(),
                })
            }
        })
    }

    async fn set_params(&self, route_name: &str, params: Params) -> NavResult<()> {
        self.apply("setParams", |tree| {
            let leaf = tree.active_leaf_mut().ok_or_else(|| NavigationError::Dispatch {
                reason: "no active route".to_string(),
            })?;
            if leaf.name != route_name {
                return Err(NavigationError::Dispatch {
                    reason: format!("route '{}' is not active", route_name),
                });
            }
            leaf.params = Some(params);
            Ok(())
        })
    }

    async fn root_state(&self) -> Option<StateTree> {
        Some(self.snapshot())
    }
}

/// Receiver of trees published by a [`StackController`].
pub struct StateChanges {
    receiver: broadcast::Receiver<StateTree>,
}

impl StateChanges {
    /// Next published tree, or `None` once the controller is dropped.
    pub async fn recv(&mut self) -> Option<StateTree> {
        loop {
            match self.receiver.recv().await {
                Ok(tree) => return Some(tree),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "State subscriber lagged, older trees dropped");
                    continue;
                }
            }
        }
    }
}
