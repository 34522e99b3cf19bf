//! Policy enforcement point
//!
//! Single call-site for access checks: consults the policy and writes a
//! security event for every denial. The audit write can fail without changing
//! the decision; such failures go to the diagnostic log and to [`Decision`].

use crate::error::AuditError;
use crate::event::SecurityEvent;
use crate::policy::AccessPolicy;
use crate::role::{Principal, Role};
use crate::sink::AuditSink;
use tracing::{debug, error};

/// Outcome of one enforcement call
#[derive(Debug)]
pub struct Decision {
    /// Whether the request is permitted
    pub allowed: bool,
    /// Set when a denial could not be written to the security stream
    pub audit_failure: Option<AuditError>,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}

/// Combines an [`AccessPolicy`] with an injected [`AuditSink`]
///
/// Stateless between calls: no caching, rate limiting or lockout.
#[derive(Debug)]
pub struct PolicyEnforcementPoint<S> {
    policy: AccessPolicy,
    sink: S,
}

impl<S: AuditSink> PolicyEnforcementPoint<S> {
    pub fn new(policy: AccessPolicy, sink: S) -> Self {
        Self { policy, sink }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut AccessPolicy {
        &mut self.policy
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Check a request and log a denial
    ///
    /// Returns the policy's answer even when the denial could not be logged.
    pub fn authorize(
        &self,
        role: Role,
        resource_type: &str,
        action: &str,
        acting_user_id: Option<&str>,
    ) -> bool {
        self.evaluate(role, resource_type, action, acting_user_id).allowed
    }

    /// Like [`authorize`](Self::authorize) but also hands back any audit failure
    pub fn evaluate(
        &self,
        role: Role,
        resource_type: &str,
        action: &str,
        acting_user_id: Option<&str>,
    ) -> Decision {
        let allowed = self.policy.is_allowed(role, resource_type, action);
        self.conclude(role.as_str(), resource_type, action, acting_user_id, allowed)
    }

    /// Check a request for a role given as a string; unknown roles are denied
    pub fn authorize_named(
        &self,
        role: &str,
        resource_type: &str,
        action: &str,
        acting_user_id: Option<&str>,
    ) -> bool {
        let allowed = self.policy.is_allowed_named(role, resource_type, action);
        self.conclude(role, resource_type, action, acting_user_id, allowed)
            .allowed
    }

    /// Check a request on behalf of an authenticated principal
    pub fn authorize_principal(&self, principal: &Principal, resource_type: &str, action: &str) -> bool {
        self.authorize(principal.role, resource_type, action, Some(principal.id.as_str()))
    }

    fn conclude(
        &self,
        role: &str,
        resource_type: &str,
        action: &str,
        acting_user_id: Option<&str>,
        allowed: bool,
    ) -> Decision {
        if allowed {
            debug!(role, resource_type, action, "access granted");
            return Decision {
                allowed,
                audit_failure: None,
            };
        }

        debug!(role, resource_type, action, user_id = ?acting_user_id, "access denied");
        let event = SecurityEvent::unauthorized_access(role, resource_type, action, acting_user_id);
        let audit_failure = match self.sink.append_security(&event) {
            Ok(()) => None,
            Err(e) => {
                error!(
                    role,
                    resource_type,
                    action,
                    user_id = ?acting_user_id,
                    error = %e,
                    "failed to record denied access"
                );
                Some(e)
            }
        };

        Decision {
            allowed,
            audit_failure,
        }
    }
}
