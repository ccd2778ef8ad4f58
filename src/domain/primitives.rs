//! Domain primitives: MemberId, NominationId, TimeMs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved id of the system account (the single forest root).
pub const SYSTEM_ID: &str = "system";

/// Opaque member identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl MemberId {
    /// Create a MemberId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        MemberId(id.into())
    }

    /// The id of the system account.
    pub fn system() -> Self {
        MemberId(SYSTEM_ID.to_string())
    }

    /// Generate a fresh random id.
    pub fn random() -> Self {
        MemberId(Uuid::new_v4().simple().to_string())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the system account id.
    pub fn is_system(&self) -> bool {
        self.0 == SYSTEM_ID
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a pending successor nomination.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NominationId(pub String);

impl NominationId {
    /// Create a NominationId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        NominationId(id.into())
    }

    /// Generate a fresh random id.
    pub fn random() -> Self {
        NominationId(Uuid::new_v4().simple().to_string())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NominationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time in milliseconds since Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }
}
