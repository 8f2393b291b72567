//! Outbound (Driven) ports for the navigation coordinator.
//!
//! These traits define what the coordinator needs from its host: something
//! that actually moves between screens, somewhere to keep strings, and a
//! clock.

use crate::domain::{Params, RouteSpec, StateTree, Timestamp};
use crate::error::NavResult;
use async_trait::async_trait;

/// Host navigation controller.
///
/// The queue only calls it from its single drain task, so implementations
/// never see concurrent commands from one queue. Any `Err` is reported to
/// the submitter as a dispatch failure.
#[async_trait]
pub trait NavigationController: Send + Sync {
    /// Whether the controller is mounted and can accept commands.
    async fn is_ready(&self) -> bool;

    async fn navigate(&self, route_name: &str, params: Option<&Params>) -> NavResult<()>;

    /// Replaces the whole root stack.
    async fn reset(&self, index: usize, routes: &[RouteSpec]) -> NavResult<()>;

    async fn replace(&self, route_name: &str, params: Option<&Params>) -> NavResult<()>;

    async fn go_back(&self) -> NavResult<()>;

    /// Sets the complete params object of the named route.
    async fn set_params(&self, route_name: &str, params: Params) -> NavResult<()>;

    /// Current root state, if the controller has one.
    async fn root_state(&self) -> Option<StateTree>;
}

/// String key-value storage (device storage, web storage, files).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    async fn get(&self, key: &str) -> NavResult<Option<String>>;

    /// Insert or overwrite a value.
    async fn set(&self, key: &str, value: String) -> NavResult<()>;

    /// Remove a key. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> NavResult<()>;

    /// Every key currently stored.
    async fn keys(&self) -> NavResult<Vec<String>>;

    /// Remove several keys.
    async fn multi_remove(&self, keys: &[String]) -> NavResult<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Fixed, manually advanced time source.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: std::sync::atomic::AtomicU64,
}

impl ManualTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: std::sync::atomic::AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, std::sync::atomic::Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(std::sync::atomic::Ordering::SeqCst)
    }
}
