//! # Guard Chain
//!
//! Ordered evaluation of navigation guards. Guards run highest priority
//! first (registration order among ties) and the first denial wins.

use crate::domain::guards::{standard_guards, Guard, GuardContext, GuardKind, GuardResult};
use crate::domain::Command;
use crate::error::{NavResult, NavigationError};
use crate::metrics;
use parking_lot::RwLock;
use tracing::{debug, error, info};

/// Priority-ordered set of guards.
#[derive(Debug, Default)]
pub struct GuardChain {
    guards: RwLock<Vec<Guard>>,
}

impl GuardChain {
    /// Builds a chain from guards in registration order.
    pub fn new(guards: Vec<Guard>) -> Self {
        let chain = Self::default();
        for guard in guards {
            chain.register(guard);
        }
        chain
    }

    /// Chain holding the shipped guard catalogue.
    pub fn standard() -> Self {
        Self::new(standard_guards())
    }

    /// Adds a guard after every guard of equal or higher priority.
    pub fn register(&self, guard: Guard) {
        let mut guards = self.guards.write();
        let position = guards
            .iter()
            .position(|existing| existing.priority < guard.priority)
            .unwrap_or(guards.len());
        debug!(guard = %guard.name, priority = guard.priority, "Guard registered");
        guards.insert(position, guard);
    }

    /// Removes every guard with `name`. Returns whether one was removed.
    pub fn remove(&self, name: &str) -> bool {
        let mut guards = self.guards.write();
        let before = guards.len();
        guards.retain(|guard| guard.name != name);
        guards.len() != before
    }

    /// Guard names in evaluation order.
    pub fn names(&self) -> Vec<String> {
        self.guards.read().iter().map(|g| g.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.guards.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.read().is_empty()
    }

    /// Evaluates guards in order and returns the first denial, or `Allow`.
    ///
    /// A host guard that errors or panics is logged and treated as allowing.
    pub async fn check_guards(&self, command: &Command, context: &GuardContext) -> GuardResult {
        // Snapshot so no lock is held across host guard awaits.
        let guards = self.guards.read().clone();

        for guard in &guards {
            let result = match &guard.kind {
                GuardKind::External(check) => {
                    let check = check.clone();
                    let (command, context) = (command.clone(), context.clone());
                    // A panicking host guard fails open like an erroring one.
                    match tokio::spawn(async move { check.check(&command, &context).await }).await
                    {
                        Ok(Ok(result)) => result,
                        Ok(Err(err)) => {
                            error!(guard = %guard.name, error = %err, "Guard failed, allowing navigation");
                            continue;
                        }
                        Err(join_err) => {
                            error!(guard = %guard.name, error = %join_err, "Guard panicked, allowing navigation");
                            continue;
                        }
                    }
                }
                _ => match guard.evaluate_builtin(command, context) {
                    Some(result) => result,
                    None => continue,
                },
            };

            if let GuardResult::Deny {
                reason,
                redirect_to,
            } = &result
            {
                metrics::record_guard_denial(&guard.name);
                info!(
                    guard = %guard.name,
                    kind = command.kind().as_str(),
                    route = command.target_route(),
                    %reason,
                    redirect_to = redirect_to.as_deref(),
                    "Navigation denied by guard"
                );
                return result;
            }
        }

        GuardResult::Allow
    }

    /// Like [`check_guards`](Self::check_guards) but maps a denial to
    /// [`NavigationError::GuardDenied`].
    pub async fn authorize(&self, command: &Command, context: &GuardContext) -> NavResult<()> {
        match self.check_guards(command, context).await {
            GuardResult::Allow => Ok(()),
            GuardResult::Deny {
                reason,
                redirect_to,
            } => Err(NavigationError::GuardDenied {
                reason,
                redirect_to,
            }),
        }
    }
}
