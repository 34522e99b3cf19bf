//! Audit event records
//!
//! Two record shapes, one per stream. Each is written as a single JSON object
//! per line so the logs can be reconstructed without the writer running.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event type recorded when the policy denies a request
pub const EVENT_UNAUTHORIZED_ACCESS: &str = "unauthorized_access";
pub const EVENT_LOGIN_SUCCESS: &str = "login_success";
pub const EVENT_LOGIN_FAILED: &str = "login_failed";

/// Severity of a security event
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Data-access event for the GDPR trail
///
/// Records what happened, whether or not it was authorized.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessEvent {
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub details: Option<String>,
}

impl AccessEvent {
    /// Create an event stamped with the current time
    pub fn new(
        user_id: impl Into<String>,
        action: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: user_id.into(),
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Option<impl Into<String>>) -> Self {
        self.details = details.map(Into::into);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Security event for the NIS2 trail
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub severity: Severity,
    pub description: String,
    pub user_id: Option<String>,
}

impl SecurityEvent {
    /// Create an event stamped with the current time
    pub fn new(
        event_type: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: event_type.into(),
            severity,
            description: description.into(),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: Option<impl Into<String>>) -> Self {
        self.user_id = user_id.map(Into::into);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Denial record produced by the enforcement point
    pub fn unauthorized_access(
        role: &str,
        resource_type: &str,
        action: &str,
        user_id: Option<&str>,
    ) -> Self {
        Self::new(
            EVENT_UNAUTHORIZED_ACCESS,
            Severity::Medium,
            format!(
                "User with role '{}' attempted '{}' on '{}'",
                role, action, resource_type
            ),
        )
        .with_user(user_id)
    }
}

/// Either kind of audit record
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditEvent {
    Access(AccessEvent),
    Security(SecurityEvent),
}

impl AuditEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            AuditEvent::Access(e) => e.timestamp,
            AuditEvent::Security(e) => e.timestamp,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            AuditEvent::Access(e) => Some(e.user_id.as_str()),
            AuditEvent::Security(e) => e.user_id.as_deref(),
        }
    }
}

impl From<AccessEvent> for AuditEvent {
    fn from(event: AccessEvent) -> Self {
        AuditEvent::Access(event)
    }
}

impl From<SecurityEvent> for AuditEvent {
    fn from(event: SecurityEvent) -> Self {
        AuditEvent::Security(event)
    }
}

/// Encode a record as one newline-terminated JSON line
pub(crate) fn to_line<T: Serialize>(record: &T) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    Ok(line)
}
