//! # Navigation Command Coordination
//!
//! Mediates between UI code that asks to change screens and the host
//! navigation controller that actually changes them.
//!
//! ## Components
//!
//! | Component | Type | Role |
//! |-----------|------|------|
//! | Command Queue | `NavigationQueue` | Priority ordering, one dispatch at a time |
//! | Guard Chain | `GuardChain` | Allow / deny / redirect before enqueueing |
//! | State Validator | `StateValidator` | Structural checks on state trees |
//! | Persistence Manager | `PersistenceManager` | Debounced saves, defensive loads |
//! | Coordinator | `NavigationCoordinator` | Facade wiring the four together |
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Dispatch order is priority descending, FIFO among ties | `domain/queue.rs` - `PendingQueue::insert()` |
//! | At most one command is being dispatched | `service/queue.rs` - `is_processing` under the queue mutex |
//! | Every enqueued command gets exactly one outcome | `domain/queue.rs` - `QueueItem::complete()` consumes the item |
//! | Guards run by priority, first denial wins | `service/guard_chain.rs` - `check_guards()` |
//! | Nesting depth never exceeds the configured maximum | `domain/validator.rs` - depth counter |
//! | Invalid trees are never written | `service/persistence.rs` - validate before `store.set` |
//! | At most one pending save per storage key | `service/persistence.rs` - pending-write slots |
//!
//! ## Command Lifecycle
//!
//! ```text
//! request ──guards──deny──→ GuardDenied (returned to caller)
//!    │
//!    └─allow──→ [pending] ──head──→ settle delay ──→ controller ──→ completion
//!                   │
//!                   └── clear() ──→ QueueCleared
//! ```
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - InMemoryStore, FileStore, StackController          │
//! │  service/  - NavigationQueue, GuardChain, PersistenceManager,   │
//! │              NavigationCoordinator                              │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements / uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - NavigationApi trait                        │
//! │  ports/outbound.rs - NavigationController, KeyValueStore,       │
//! │                      TimeSource traits                          │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/command.rs   - Command, RouteSpec                       │
//! │  domain/state.rs     - StateTree, StateNode, NavigationMode     │
//! │  domain/guards.rs    - Guard, GuardKind, standard catalogue     │
//! │  domain/validator.rs - StateValidator                           │
//! │  domain/record.rs    - PersistenceRecord, storage keys          │
//! │  domain/queue.rs     - PendingQueue, Completion                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use nav_coordinator::{
//!     CoordinatorConfig, GuardContext, InMemoryStore, NavigationCoordinator, NavigationMode,
//!     StackController, Command,
//! };
//! use std::sync::Arc;
//!
//! let coordinator = NavigationCoordinator::new(CoordinatorConfig::from_env(), Arc::new(InMemoryStore::new()));
//! coordinator.attach_controller(Arc::new(StackController::with_root("HomeStack")));
//!
//! let ctx = GuardContext::new(true, false, false, NavigationMode::App);
//! let done = coordinator.request(Command::navigate("SettingsScreen", None), &ctx).await?;
//! done.await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{FileStore, InMemoryStore, StackController, StateChanges};
pub use config::{CoordinatorConfig, PersistenceConfig, QueueConfig, ValidationConfig};
pub use domain::{
    Command, CommandKind, Completion, Guard, GuardContext, GuardKind, GuardResult,
    NavigationMode, Params, PersistenceRecord, Priority, QueueStatus, RouteCatalogue, RouteSpec,
    StateNode, StateTree, StateValidator, StateVersion, ValidationResult,
};
pub use error::{NavResult, NavigationError};
pub use ports::{KeyValueStore, NavigationApi, NavigationController, TimeSource};
pub use service::{GuardChain, NavigationCoordinator, NavigationQueue, PersistenceManager};
