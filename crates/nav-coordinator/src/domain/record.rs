//! Persisted navigation records and their storage keys.

use super::state::{NavigationMode, StateTree};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp in milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Scope used when no user is signed in.
pub const GUEST_SCOPE: &str = "guest";

/// Schema version of persisted navigation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Version written by this build.
pub const CURRENT_STATE_VERSION: StateVersion = StateVersion::new(1, 0, 0);

impl StateVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Records are readable across minor and patch releases only.
    pub fn is_compatible_with(&self, current: &StateVersion) -> bool {
        self.major == current.major
    }
}

impl fmt::Display for StateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Versioned envelope around a cleaned state tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceRecord {
    pub state: StateTree,
    pub version: StateVersion,
    pub saved_at: Timestamp,
    pub mode: NavigationMode,
    pub user_scope: String,
}

/// What a stored payload turned out to contain.
#[derive(Clone, Debug, PartialEq)]
pub enum StoredPayload {
    /// Current envelope format.
    Record(PersistenceRecord),
    /// Bare tree written before records carried version metadata.
    Legacy(StateTree),
}

impl StoredPayload {
    /// Parses a stored string, preferring the versioned envelope.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str::<PersistenceRecord>(raw) {
            Ok(record) => Ok(Self::Record(record)),
            Err(record_err) => serde_json::from_str::<StateTree>(raw)
                .map(Self::Legacy)
                .map_err(|_| record_err),
        }
    }

    pub fn version(&self) -> Option<StateVersion> {
        match self {
            Self::Record(record) => Some(record.version),
            Self::Legacy(_) => None,
        }
    }

    /// Strips version metadata, leaving the tree.
    pub fn into_state(self) -> StateTree {
        match self {
            Self::Record(record) => record.state,
            Self::Legacy(state) => state,
        }
    }
}

/// Normalises a user scope; missing or empty scopes map to [`GUEST_SCOPE`].
pub fn user_scope_or_guest(user_scope: Option<&str>) -> &str {
    match user_scope {
        Some(scope) if !scope.is_empty() => scope,
        _ => GUEST_SCOPE,
    }
}

/// Builds `{prefix}{mode}_{user|guest}_{platform}`.
pub fn storage_key(
    prefix: &str,
    mode: NavigationMode,
    user_scope: Option<&str>,
    platform: &str,
) -> String {
    format!(
        "{}{}_{}_{}",
        prefix,
        mode,
        user_scope_or_guest(user_scope),
        platform
    )
}
