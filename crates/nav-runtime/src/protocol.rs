//! Line protocol spoken on stdin/stdout.
//!
//! ```text
//! {"op":"command","command":{"type":"navigate","routeName":"SettingsScreen"}}
//! {"op":"command","command":{"type":"goBack"},"priority":3}
//! {"op":"session","isAuthenticated":true,"isGuestMode":false,"isAdmin":false,"user":"u1"}
//! {"op":"status"} | {"op":"state"} | {"op":"flush"} | {"op":"endSession"}
//! ```

use nav_coordinator::{Command, NavigationError, NavigationMode, Priority};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One request line.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Request {
    /// Run the guard chain and enqueue.
    Command {
        command: Command,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority: Option<Priority>,
    },
    /// Replace the session flags.
    #[serde(rename_all = "camelCase")]
    Session {
        #[serde(default)]
        is_authenticated: bool,
        #[serde(default)]
        is_guest_mode: bool,
        #[serde(default)]
        is_admin: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<NavigationMode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<String>,
    },
    /// Queue status.
    Status,
    /// Current controller state.
    State,
    /// Write pending saves now.
    Flush,
    /// Forced logout.
    EndSession,
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Response {
    Ok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    Denied {
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        redirect_to: Option<String>,
    },
    Error {
        kind: String,
        message: String,
    },
}

impl Response {
    pub fn ok() -> Self {
        Self::Ok { data: None }
    }

    pub fn with_data(data: Value) -> Self {
        Self::Ok { data: Some(data) }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Error {
            kind: "bad_request".to_string(),
            message: message.into(),
        }
    }
}

impl From<NavigationError> for Response {
    fn from(err: NavigationError) -> Self {
        match err {
            NavigationError::GuardDenied {
                reason,
                redirect_to,
            } => Self::Denied {
                reason,
                redirect_to,
            },
            other => Self::Error {
                kind: other.label().to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Parses one input line.
pub fn parse_request(line: &str) -> Result<Request, Response> {
    serde_json::from_str(line).map_err(|e| Response::bad_request(e.to_string()))
}
