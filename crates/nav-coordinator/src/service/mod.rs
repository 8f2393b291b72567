//! Service layer: the async components built on the domain types.

pub mod coordinator;
pub mod guard_chain;
pub mod persistence;
pub mod queue;

pub use coordinator::NavigationCoordinator;
pub use guard_chain::GuardChain;
pub use persistence::PersistenceManager;
pub use queue::NavigationQueue;
