//! # Navigation Guards
//!
//! A guard is a named, prioritised rule that may allow, deny, or deny with
//! a redirect suggestion. Guards are plain tagged records: built-in rules
//! are evaluated with a `match`, and hosts that need something custom wrap
//! it in [`GuardKind::External`].
//!
//! ## Standard Catalogue
//!
//! | Guard | Priority | Denies | Redirect |
//! |-------|---------:|--------|----------|
//! | `routeExists` | 100 | blank route names | - |
//! | `resetAction` | 90 | empty / out-of-bounds / unnamed reset | - |
//! | `profileScreen` | 50 | profile routes in guest mode | `HomeScreen` |
//! | `adminTab` | 50 | admin routes for non-admins | `HomeScreen` |
//! | `authenticatedRoute` | 40 | account routes for guests or signed-out users | `LoginScreen` |
//! | `loginScreen` | 30 | login for signed-in users | `HomeStack` |
//! | `landingSiteScreen` | 30 | landing page for signed-in or guest users | `HomeStack` |

use super::command::Command;
use super::state::NavigationMode;
use crate::error::NavResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Authorization-relevant session flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardContext {
    pub is_authenticated: bool,
    pub is_guest_mode: bool,
    pub is_admin: bool,
    #[serde(default)]
    pub current_mode: NavigationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_route: Option<String>,
}

impl GuardContext {
    pub fn new(
        is_authenticated: bool,
        is_guest_mode: bool,
        is_admin: bool,
        current_mode: NavigationMode,
    ) -> Self {
        Self {
            is_authenticated,
            is_guest_mode,
            is_admin,
            current_mode,
            current_route: None,
        }
    }

    pub fn with_current_route(mut self, route: impl Into<String>) -> Self {
        self.current_route = Some(route.into());
        self
    }

    /// Signed in with a real account.
    pub fn is_signed_in(&self) -> bool {
        self.is_authenticated && !self.is_guest_mode
    }
}

/// Decision of a single guard or of the whole chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum GuardResult {
    Allow,
    #[serde(rename_all = "camelCase")]
    Deny {
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        redirect_to: Option<String>,
    },
}

impl GuardResult {
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
            redirect_to: None,
        }
    }

    pub fn deny_with_redirect(reason: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
            redirect_to: Some(redirect_to.into()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn redirect_to(&self) -> Option<&str> {
        match self {
            Self::Deny { redirect_to, .. } => redirect_to.as_deref(),
            Self::Allow => None,
        }
    }
}

/// Host-provided guard logic.
///
/// Implementations must be side-effect free apart from logging and return
/// within a bounded time; every navigation attempt waits on them. An `Err`
/// or a panic is logged and treated as `Allow`.
#[async_trait]
pub trait GuardCheck: Send + Sync {
    async fn check(&self, command: &Command, context: &GuardContext) -> NavResult<GuardResult>;
}

/// Session condition under which an [`GuardKind::RouteAccess`] rule denies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessRule {
    /// Deny in guest mode.
    DenyGuest,
    /// Deny unless the user is an administrator.
    RequireAdmin,
    /// Deny unless signed in with a real account.
    RequireSignedIn,
    /// Deny once signed in with a real account.
    DenySignedIn,
    /// Deny once signed in or browsing as a guest.
    DenySignedInOrGuest,
}

impl AccessRule {
    pub fn denies(&self, context: &GuardContext) -> bool {
        match self {
            Self::DenyGuest => context.is_guest_mode,
            Self::RequireAdmin => !context.is_admin,
            Self::RequireSignedIn => !context.is_signed_in(),
            Self::DenySignedIn => context.is_signed_in(),
            Self::DenySignedInOrGuest => context.is_authenticated || context.is_guest_mode,
        }
    }
}

/// What a guard checks.
#[derive(Clone)]
pub enum GuardKind {
    /// Navigate/Replace must name a non-blank route.
    WellFormedRoute,
    /// Reset must carry at least one route, an in-bounds index and named routes.
    WellFormedReset,
    /// Navigate/Replace to one of `routes` is denied when `rule` matches.
    RouteAccess {
        routes: Vec<String>,
        rule: AccessRule,
        reason: String,
        redirect_to: Option<String>,
    },
    /// Host-provided check.
    External(Arc<dyn GuardCheck>),
}

impl fmt::Debug for GuardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WellFormedRoute => f.write_str("WellFormedRoute"),
            Self::WellFormedReset => f.write_str("WellFormedReset"),
            Self::RouteAccess { routes, rule, .. } => f
                .debug_struct("RouteAccess")
                .field("routes", routes)
                .field("rule", rule)
                .finish(),
            Self::External(_) => f.write_str("External"),
        }
    }
}

/// Named, prioritised guard record. Higher priority is evaluated first.
#[derive(Clone, Debug)]
pub struct Guard {
    pub name: String,
    pub priority: i32,
    pub kind: GuardKind,
}

impl Guard {
    pub fn new(name: impl Into<String>, priority: i32, kind: GuardKind) -> Self {
        Self {
            name: name.into(),
            priority,
            kind,
        }
    }

    pub fn route_access(
        name: impl Into<String>,
        priority: i32,
        routes: &[&str],
        rule: AccessRule,
        reason: impl Into<String>,
        redirect_to: Option<&str>,
    ) -> Self {
        Self::new(
            name,
            priority,
            GuardKind::RouteAccess {
                routes: routes.iter().map(|r| r.to_string()).collect(),
                rule,
                reason: reason.into(),
                redirect_to: redirect_to.map(str::to_string),
            },
        )
    }

    pub fn external(name: impl Into<String>, priority: i32, check: Arc<dyn GuardCheck>) -> Self {
        Self::new(name, priority, GuardKind::External(check))
    }

    /// Evaluates a built-in rule synchronously. Returns `None` for
    /// [`GuardKind::External`], which must be awaited by the chain.
    pub fn evaluate_builtin(&self, command: &Command, context: &GuardContext) -> Option<GuardResult> {
        let result = match &self.kind {
            GuardKind::WellFormedRoute => check_route_name(command),
            GuardKind::WellFormedReset => check_reset(command),
            GuardKind::RouteAccess {
                routes,
                rule,
                reason,
                redirect_to,
            } => match command.target_route() {
                Some(target) if routes.iter().any(|r| r == target) && rule.denies(context) => {
                    GuardResult::Deny {
                        reason: reason.clone(),
                        redirect_to: redirect_to.clone(),
                    }
                }
                _ => GuardResult::Allow,
            },
            GuardKind::External(_) => return None,
        };
        Some(result)
    }
}

fn check_route_name(command: &Command) -> GuardResult {
    match command.target_route() {
        Some(route) if route.trim().is_empty() => GuardResult::deny("Route name cannot be empty"),
        _ => GuardResult::Allow,
    }
}

fn check_reset(command: &Command) -> GuardResult {
    let Command::Reset { index, routes } = command else {
        return GuardResult::Allow;
    };
    if routes.is_empty() {
        return GuardResult::deny("Reset action must have at least one route");
    }
    if *index >= routes.len() {
        return GuardResult::deny("Reset action index is out of bounds");
    }
    if routes.iter().any(|route| route.name.trim().is_empty()) {
        return GuardResult::deny("Reset action routes must have valid names");
    }
    GuardResult::Allow
}

/// Guards shipped with the coordinator, in registration order.
pub fn standard_guards() -> Vec<Guard> {
    vec![
        Guard::new("resetAction", 90, GuardKind::WellFormedReset),
        Guard::new("routeExists", 100, GuardKind::WellFormedRoute),
        Guard::route_access(
            "profileScreen",
            50,
            &["ProfileScreen", "ProfileTab"],
            AccessRule::DenyGuest,
            "Profile screen is not available in guest mode",
            Some("HomeScreen"),
        ),
        Guard::route_access(
            "adminTab",
            50,
            &["AdminTab", "AdminDashboard"],
            AccessRule::RequireAdmin,
            "Admin screens are only available to administrators",
            Some("HomeScreen"),
        ),
        Guard::route_access(
            "authenticatedRoute",
            40,
            &["EditProfileScreen", "OrgOnboardingScreen", "OrgDashboardScreen"],
            AccessRule::RequireSignedIn,
            "This screen requires authentication",
            Some("LoginScreen"),
        ),
        Guard::route_access(
            "loginScreen",
            30,
            &["LoginScreen"],
            AccessRule::DenySignedIn,
            "User is already authenticated",
            Some("HomeStack"),
        ),
        Guard::route_access(
            "landingSiteScreen",
            30,
            &["LandingSiteScreen"],
            AccessRule::DenySignedInOrGuest,
            "User is already authenticated or in guest mode",
            Some("HomeStack"),
        ),
    ]
}
