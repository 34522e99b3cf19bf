//! Health Access - role-based access control with an append-only audit trail
//!
//! Decision and audit core for an electronic health record:
//! - Role-based access policy over a permission table (deny by default)
//! - Two append-only JSON-lines audit streams (data access / security)
//! - Enforcement point that records every denial
//! - Offline log reader, pseudonymization and consent tracking
//!
//! # Example
//!
//! ```rust,no_run
//! use health_access::{AccessPolicy, AuditConfig, FileAuditSink, PolicyEnforcementPoint, Role};
//! use health_access::AuditSink;
//!
//! # fn main() -> health_access::Result<()> {
//! let sink = FileAuditSink::open(&AuditConfig::in_dir("/var/lib/ehr/logs"))?;
//! let pep = PolicyEnforcementPoint::new(AccessPolicy::new(), sink);
//!
//! if pep.authorize(Role::Doctor, "soap_note", "read", Some("u-17")) {
//!     pep.sink().record_access("u-17", "read", "soap_note", "note-3", None)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod consent;
pub mod enforcement;
pub mod error;
pub mod event;
pub mod policy;
pub mod privacy;
pub mod reader;
pub mod role;
pub mod sink;

// Re-export commonly used types for convenience
pub use config::AuditConfig;
pub use consent::{ConsentRecord, ConsentRegistry, ConsentStatus};
pub use enforcement::{Decision, PolicyEnforcementPoint};
pub use error::{AuditError, Result, Stream};
pub use event::{AccessEvent, AuditEvent, SecurityEvent, Severity, EVENT_UNAUTHORIZED_ACCESS};
pub use policy::{AccessPolicy, PermissionTable};
pub use privacy::{digest, pseudonymize, Pseudonymizer};
pub use reader::{read_access_log, read_security_log};
pub use role::{Principal, Role, UnknownRole};
pub use sink::{AuditSink, FileAuditSink, MemoryAuditSink};
