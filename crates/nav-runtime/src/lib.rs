//! # Navigation Runtime
//!
//! Headless host for the navigation coordinator.
//!
//! ## Modular Structure
//!
//! - `config` - Environment-driven runtime and session configuration
//! - `protocol` - JSON line requests and responses
//! - `runtime` - Wiring of coordinator, controller, store and persistence feed
//!
//! ## Data Flow
//!
//! ```text
//! stdin ──Request──→ guards ──→ queue ──→ StackController ──state──→ persistence feed
//!   ↑                                          │                           │
//!   └────────────── Response ←─────────────────┘                  debounced FileStore
//! ```

pub mod config;
pub mod protocol;
pub mod runtime;

pub use config::{RuntimeConfig, Session};
pub use protocol::{parse_request, Request, Response};
pub use runtime::NavRuntime;
