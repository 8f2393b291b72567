//! # Inbound Port - NavigationApi
//!
//! Driving port through which UI code submits navigation commands.
//!
//! | Method | Effect |
//! |--------|--------|
//! | `enqueue` | Insert by priority, start draining if idle |
//! | `clear` | Reject every pending command with `QueueCleared` |
//! | `status` | Queue length, drain state, controller presence |

use crate::domain::{Command, Completion, Priority, QueueStatus};

/// Primary API of the command queue.
///
/// `enqueue` never blocks on navigation; it returns a [`Completion`] the
/// caller may await or drop.
///
/// # Example
///
/// ```rust,ignore
/// use nav_coordinator::ports::NavigationApi;
/// use nav_coordinator::domain::Command;
///
/// async fn open_settings(queue: &impl NavigationApi) {
///     let done = queue.enqueue(Command::navigate("SettingsScreen", None), 0);
///     if let Err(err) = done.await {
///         tracing::warn!(%err, "settings navigation failed");
///     }
/// }
/// ```
pub trait NavigationApi: Send + Sync {
    /// Enqueues a command at an explicit priority.
    ///
    /// Must be called from within a Tokio runtime.
    fn enqueue(&self, command: Command, priority: Priority) -> Completion;

    /// Enqueues a command at its default priority.
    fn submit(&self, command: Command) -> Completion {
        let priority = command.default_priority();
        self.enqueue(command, priority)
    }

    /// Drops every pending command. The command currently dispatching is
    /// unaffected.
    fn clear(&self);

    fn status(&self) -> QueueStatus;
}
