//! Ports layer for the navigation coordinator.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) ports: API exposed to UI code
//! - Outbound (Driven) ports: host controller, storage, clock

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
