//! Navigation commands
//!
//! One discrete requested transition. Commands only carry route names,
//! parameters and stack shape; screen content is never inspected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Route parameters, an arbitrary JSON object.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Queue priority. Higher values dispatch first.
pub type Priority = i32;

/// A route entry inside a `Reset` command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl RouteSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
        }
    }

    pub fn with_params(name: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            params: Some(params),
        }
    }
}

/// Requested navigation transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Navigate to a route, pushing it if it is not already on the stack.
    #[serde(rename_all = "camelCase")]
    Navigate {
        route_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<Params>,
    },
    /// Replace the whole stack.
    Reset { index: usize, routes: Vec<RouteSpec> },
    /// Replace the active route.
    #[serde(rename_all = "camelCase")]
    Replace {
        route_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<Params>,
    },
    /// Pop the active route.
    GoBack,
    /// Merge params into the active leaf route.
    SetParams { params: Params },
}

/// Discriminant of a [`Command`], used for logging and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Navigate,
    Reset,
    Replace,
    GoBack,
    SetParams,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::Reset => "reset",
            Self::Replace => "replace",
            Self::GoBack => "goBack",
            Self::SetParams => "setParams",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Command {
    pub fn navigate(route_name: impl Into<String>, params: Option<Params>) -> Self {
        Self::Navigate {
            route_name: route_name.into(),
            params,
        }
    }

    pub fn reset(index: usize, routes: Vec<RouteSpec>) -> Self {
        Self::Reset { index, routes }
    }

    pub fn replace(route_name: impl Into<String>, params: Option<Params>) -> Self {
        Self::Replace {
            route_name: route_name.into(),
            params,
        }
    }

    pub fn go_back() -> Self {
        Self::GoBack
    }

    pub fn set_params(params: Params) -> Self {
        Self::SetParams { params }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Navigate { .. } => CommandKind::Navigate,
            Self::Reset { .. } => CommandKind::Reset,
            Self::Replace { .. } => CommandKind::Replace,
            Self::GoBack => CommandKind::GoBack,
            Self::SetParams { .. } => CommandKind::SetParams,
        }
    }

    /// Priority used when a caller does not choose one.
    ///
    /// Stack-rewriting commands (`Reset`, `Replace`) jump ahead of plain
    /// navigation.
    pub fn default_priority(&self) -> Priority {
        match self {
            Self::Reset { .. } | Self::Replace { .. } => 1,
            Self::Navigate { .. } | Self::GoBack | Self::SetParams { .. } => 0,
        }
    }

    /// Route a `Navigate` or `Replace` command targets.
    pub fn target_route(&self) -> Option<&str> {
        match self {
            Self::Navigate { route_name, .. } | Self::Replace { route_name, .. } => {
                Some(route_name.as_str())
            }
            _ => None,
        }
    }
}
