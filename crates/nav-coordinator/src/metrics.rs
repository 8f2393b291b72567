//! # Navigation Metrics
//!
//! Prometheus metrics for the command queue, guard chain and persistence.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! nav-coordinator = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `nav_commands_enqueued_total` - Commands enqueued (by kind)
//! - `nav_commands_dispatched_total` - Commands the controller accepted (by kind)
//! - `nav_commands_failed_total` - Commands that failed (by reason)
//! - `nav_queue_depth` - Pending commands
//! - `nav_guard_denials_total` - Denials (by guard)
//! - `nav_state_writes_total` - Records written to storage
//! - `nav_state_writes_dropped_total` - Saves dropped because the tree was invalid
//! - `nav_state_loads_discarded_total` - Stored states discarded on load (by reason)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref COMMANDS_ENQUEUED: IntCounterVec = register_int_counter_vec!(
        "nav_commands_enqueued_total",
        "Total number of navigation commands enqueued",
        &["kind"]
    )
    .expect("Failed to create COMMANDS_ENQUEUED metric");

    pub static ref COMMANDS_DISPATCHED: IntCounterVec = register_int_counter_vec!(
        "nav_commands_dispatched_total",
        "Total number of navigation commands dispatched to the controller",
        &["kind"]
    )
    .expect("Failed to create COMMANDS_DISPATCHED metric");

    /// Failed commands, labeled by error label
    pub static ref COMMANDS_FAILED: IntCounterVec = register_int_counter_vec!(
        "nav_commands_failed_total",
        "Total number of navigation commands that failed",
        &["reason"]
    )
    .expect("Failed to create COMMANDS_FAILED metric");

    pub static ref QUEUE_DEPTH: IntGauge = register_int_gauge!(
        "nav_queue_depth",
        "Number of navigation commands waiting for dispatch"
    )
    .expect("Failed to create QUEUE_DEPTH metric");

    pub static ref GUARD_DENIALS: IntCounterVec = register_int_counter_vec!(
        "nav_guard_denials_total",
        "Total number of navigation attempts denied",
        &["guard"]
    )
    .expect("Failed to create GUARD_DENIALS metric");

    pub static ref STATE_WRITES: IntCounter = register_int_counter!(
        "nav_state_writes_total",
        "Total number of navigation state records written"
    )
    .expect("Failed to create STATE_WRITES metric");

    pub static ref STATE_WRITES_DROPPED: IntCounter = register_int_counter!(
        "nav_state_writes_dropped_total",
        "Total number of saves dropped because the state was invalid"
    )
    .expect("Failed to create STATE_WRITES_DROPPED metric");

    /// Discarded loads, labeled by reason
    pub static ref STATE_LOADS_DISCARDED: IntCounterVec = register_int_counter_vec!(
        "nav_state_loads_discarded_total",
        "Total number of stored navigation states discarded on load",
        &["reason"]
    )
    .expect("Failed to create STATE_LOADS_DISCARDED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_command_enqueued(kind: &str) {
    COMMANDS_ENQUEUED.with_label_values(&[kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_command_dispatched(kind: &str) {
    COMMANDS_DISPATCHED.with_label_values(&[kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_command_failed(reason: &str) {
    COMMANDS_FAILED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn set_queue_depth(depth: usize) {
    QUEUE_DEPTH.set(depth as i64);
}

#[cfg(feature = "metrics")]
pub fn record_guard_denial(guard: &str) {
    GUARD_DENIALS.with_label_values(&[guard]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_state_written() {
    STATE_WRITES.inc();
}

#[cfg(feature = "metrics")]
pub fn record_state_write_dropped() {
    STATE_WRITES_DROPPED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_state_load_discarded(reason: &str) {
    STATE_LOADS_DISCARDED.with_label_values(&[reason]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_command_enqueued(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_command_dispatched(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_command_failed(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn set_queue_depth(_depth: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_guard_denial(_guard: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_state_written() {}

#[cfg(not(feature = "metrics"))]
pub fn record_state_write_dropped() {}

#[cfg(not(feature = "metrics"))]
pub fn record_state_load_discarded(_reason: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_callable_in_any_build() {
        record_command_enqueued("navigate");
        record_command_dispatched("navigate");
        record_command_failed("not_ready");
        set_queue_depth(3);
        record_guard_denial("adminTab");
        record_state_written();
        record_state_write_dropped();
        record_state_load_discarded("stale_leaf");
    }
}
