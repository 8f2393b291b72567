//! Domain layer: commands, state trees, guards, validation and records.
//!
//! Everything here is pure apart from logging; async work and I/O live in
//! `service` and `adapters`.

pub mod command;
pub mod guards;
pub mod queue;
pub mod record;
pub mod routes;
pub mod state;
pub mod validator;

pub use command::{Command, CommandKind, Params, Priority, RouteSpec};
pub use guards::{
    standard_guards, AccessRule, Guard, GuardCheck, GuardContext, GuardKind, GuardResult,
};
pub use queue::{Completion, PendingQueue, QueueItem, QueueStatus};
pub use record::{
    storage_key, user_scope_or_guest, PersistenceRecord, StateVersion, StoredPayload, Timestamp,
    CURRENT_STATE_VERSION, GUEST_SCOPE,
};
pub use routes::{RouteCatalogue, ROOT_STACK};
pub use state::{NavigationMode, StateNode, StateTree, ACTIVE_BRANCH_LIMIT};
pub use validator::{StateValidator, ValidationResult, VersionCheck};
