//! Runtime configuration.

use nav_coordinator::{CoordinatorConfig, GuardContext, NavigationMode};
use nav_telemetry::parse_flag;
use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Everything the headless host needs to start.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Coordinator settings.
    pub coordinator: CoordinatorConfig,
    /// Directory holding one file per saved navigation state.
    pub state_dir: PathBuf,
    /// Root route shown when nothing can be restored.
    pub initial_route: String,
    /// Session the host starts in.
    pub session: Session,
}

/// Who is navigating and in which mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub mode: NavigationMode,
    pub user: Option<String>,
    pub context: GuardContext,
}

impl Session {
    pub fn user_scope(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            coordinator: CoordinatorConfig::default(),
            state_dir: PathBuf::from("./nav-state"),
            initial_route: "HomeStack".to_string(),
            session: Session::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment.
    ///
    /// # Environment Variables
    ///
    /// - `NAV_STATE_DIR`: State directory (default: ./nav-state)
    /// - `NAV_INITIAL_ROUTE`: Root route when nothing is restored (default: HomeStack)
    /// - `NAV_MODE`: `app` or `site` (default: app)
    /// - `NAV_USER`: User scope for storage keys (default: guest)
    /// - `NAV_AUTHENTICATED`, `NAV_GUEST`, `NAV_ADMIN`: Guard context flags
    /// - plus everything read by [`CoordinatorConfig::from_env`]
    pub fn from_env() -> Self {
        let mut config = Self {
            coordinator: CoordinatorConfig::from_env(),
            ..Default::default()
        };

        if let Ok(dir) = env::var("NAV_STATE_DIR") {
            config.state_dir = PathBuf::from(dir);
        }
        if let Ok(route) = env::var("NAV_INITIAL_ROUTE") {
            if !route.trim().is_empty() {
                config.initial_route = route.trim().to_string();
            }
        }
        if let Ok(mode) = env::var("NAV_MODE") {
            match mode.parse() {
                Ok(mode) => config.session.mode = mode,
                Err(err) => warn!(%err, "Ignoring NAV_MODE"),
            }
        }
        config.session.user = env::var("NAV_USER").ok().filter(|u| !u.trim().is_empty());

        let flag = |name: &str| env::var(name).ok().and_then(|v| parse_flag(&v)).unwrap_or(false);
        config.session.context = GuardContext::new(
            flag("NAV_AUTHENTICATED"),
            flag("NAV_GUEST"),
            flag("NAV_ADMIN"),
            config.session.mode,
        );

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.initial_route, "HomeStack");
        assert_eq!(config.session.mode, NavigationMode::App);
        assert_eq!(config.session.user_scope(), None);
        assert!(!config.session.context.is_authenticated);
    }
}
