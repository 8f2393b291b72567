//! Coordinator configuration.
//!
//! Every value has a default matching the shipped app behaviour and can be
//! overridden from the environment with [`CoordinatorConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Command queue settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Pause before each dispatch so the host can settle (milliseconds).
    pub settle_delay_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 10,
        }
    }
}

impl QueueConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// State validator limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum nested levels below the root stack.
    pub max_depth: usize,
    /// Serialised size above which a warning is recorded.
    pub max_state_bytes: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_state_bytes: 100 * 1024,
        }
    }
}

/// Persistence manager settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Quiet period before a requested save is written (milliseconds).
    pub debounce_ms: u64,
    /// Prefix shared by every navigation state key.
    pub key_prefix: String,
    /// Platform component of storage keys.
    pub platform: String,
    /// Leaf routes that must never be restored from storage.
    pub sensitive_routes: Vec<String>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            key_prefix: "nav_state_".to_string(),
            platform: env::consts::OS.to_string(),
            sensitive_routes: vec!["UserProfileScreen".to_string()],
        }
    }
}

impl PersistenceConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn is_sensitive(&self, route: &str) -> bool {
        self.sensitive_routes.iter().any(|r| r == route)
    }
}

/// Top-level configuration for a [`NavigationCoordinator`](crate::NavigationCoordinator).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub queue: QueueConfig,
    pub validation: ValidationConfig,
    pub persistence: PersistenceConfig,
}

impl CoordinatorConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NAV_SETTLE_DELAY_MS`: Queue settle delay (default: 10)
    /// - `NAV_SAVE_DEBOUNCE_MS`: Persistence debounce (default: 300)
    /// - `NAV_PLATFORM`: Platform used in storage keys (default: OS name)
    /// - `NAV_SENSITIVE_ROUTES`: Comma separated leaf routes never restored
    ///   (default: UserProfileScreen)
    /// - `NAV_MAX_DEPTH`: Maximum nesting depth (default: 10)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = parse_var("NAV_SETTLE_DELAY_MS") {
            config.queue.settle_delay_ms = ms;
        }
        if let Some(ms) = parse_var("NAV_SAVE_DEBOUNCE_MS") {
            config.persistence.debounce_ms = ms;
        }
        if let Some(depth) = parse_var("NAV_MAX_DEPTH") {
            config.validation.max_depth = depth;
        }
        if let Ok(platform) = env::var("NAV_PLATFORM") {
            if !platform.trim().is_empty() {
                config.persistence.platform = platform.trim().to_string();
            }
        }
        if let Ok(routes) = env::var("NAV_SENSITIVE_ROUTES") {
            config.persistence.sensitive_routes = split_list(&routes);
        }

        config
    }

    /// Short delays for tests.
    pub fn for_testing() -> Self {
        Self {
            queue: QueueConfig { settle_delay_ms: 1 },
            persistence: PersistenceConfig {
                debounce_ms: 20,
                platform: "test".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
