//! Access Control Tests
//!
//! Tests for role-based access control enforcement:
//! - Permission matrix fidelity for every role/resource/action
//! - Deny-by-default for anything outside the matrix
//! - Denials recorded on the security stream, grants not recorded

use health_access::{
    read_security_log, AccessPolicy, AuditConfig, AuditSink, FileAuditSink, MemoryAuditSink,
    PolicyEnforcementPoint, Role, Severity, EVENT_UNAUTHORIZED_ACCESS,
};
use proptest::prelude::*;

const RESOURCES: [&str; 3] = ["patient", "soap_note", "schedule"];
const ACTIONS: [&str; 3] = ["read", "write", "delete"];

/// Expected matrix, written out independently of the policy's own seeding
fn expected(role: Role, resource: &str, action: &str) -> bool {
    match (role, resource, action) {
        (Role::Admin, _, _) => true,
        (Role::Nurse, _, "read" | "write") => true,
        (Role::Doctor, _, "read" | "write") => true,
        (Role::Doctor, "soap_note", "delete") => true,
        (Role::Patient, "patient" | "soap_note", "read") => true,
        _ => false,
    }
}

// =============================================================================
// Permission matrix
// =============================================================================

mod permission_matrix {
    use super::*;

    #[test]
    fn test_every_cell_matches_table() {
        let policy = AccessPolicy::new();
        for role in Role::ALL {
            for resource in RESOURCES {
                for action in ACTIONS {
                    assert_eq!(
                        policy.is_allowed(role, resource, action),
                        expected(role, resource, action),
                        "{} / {} / {}",
                        role,
                        resource,
                        action
                    );
                }
            }
        }
    }

    #[test]
    fn test_reference_cells() {
        let policy = AccessPolicy::new();
        assert!(!policy.is_allowed_named("patient", "schedule", "read"));
        assert!(policy.is_allowed_named("doctor", "soap_note", "delete"));
        assert!(policy.is_allowed_named("doctor", "patient", "read"));
        assert!(policy.is_allowed_named("doctor", "soap_note", "write"));
        assert!(!policy.is_allowed_named("patient", "soap_note", "write"));
        assert!(!policy.is_allowed_named("nurse", "patient", "delete"));
    }

    #[test]
    fn test_decision_has_no_side_effects() {
        let policy = AccessPolicy::new();
        let before = policy.clone();
        for _ in 0..3 {
            policy.is_allowed(Role::Nurse, "patient", "delete");
            policy.is_allowed_named("ghost", "x", "y");
        }
        assert_eq!(policy, before);
    }
}

// =============================================================================
// Deny by default
// =============================================================================

proptest! {
    /// Anything not in the matrix is denied, including unknown roles
    #[test]
    fn prop_unknown_triples_denied(
        role in "[a-z_]{0,12}",
        resource in "[a-z_]{0,12}",
        action in "[a-z_]{0,12}",
    ) {
        let policy = AccessPolicy::new();
        let allowed = policy.is_allowed_named(&role, &resource, &action);

        let in_table = role.parse::<Role>()
            .map(|r| RESOURCES.contains(&resource.as_str())
                && ACTIONS.contains(&action.as_str())
                && expected(r, &resource, &action))
            .unwrap_or(false);

        prop_assert_eq!(allowed, in_table);
    }

    /// Each denial through the enforcement point adds exactly one record
    #[test]
    fn prop_denials_logged_exactly_once(
        role_idx in 0usize..4,
        resource in prop::sample::select(vec!["patient", "soap_note", "schedule", "billing"]),
        action in prop::sample::select(vec!["read", "write", "delete", "export"]),
    ) {
        let role = Role::ALL[role_idx];
        let pep = PolicyEnforcementPoint::new(AccessPolicy::new(), MemoryAuditSink::new());

        let allowed = pep.authorize(role, resource, action, Some("prop-user"));
        let logged = pep.sink().security_events();

        if allowed {
            prop_assert!(logged.is_empty());
        } else {
            prop_assert_eq!(logged.len(), 1);
            prop_assert_eq!(logged[0].event_type.as_str(), EVENT_UNAUTHORIZED_ACCESS);
            prop_assert_eq!(logged[0].severity, Severity::Medium);
        }
    }
}

// =============================================================================
// End-to-end enforcement scenarios
// =============================================================================

mod access_control_scenarios {
    use super::*;

    fn file_pep(dir: &std::path::Path) -> PolicyEnforcementPoint<FileAuditSink> {
        let sink = FileAuditSink::open(&AuditConfig::in_dir(dir)).unwrap();
        PolicyEnforcementPoint::new(AccessPolicy::new(), sink)
    }

    /// Scenario: Nurse attempting to delete a patient is denied and recorded
    #[test]
    fn scenario_nurse_delete_patient_denied() {
        let dir = tempfile::tempdir().unwrap();
        let pep = file_pep(dir.path());

        assert!(!pep.authorize(Role::Nurse, "patient", "delete", Some("u1")));

        let events = read_security_log(pep.sink().security_log_path()).unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.event_type, "unauthorized_access");
        assert_eq!(event.severity, Severity::Medium);
        assert_eq!(event.user_id.as_deref(), Some("u1"));
        assert!(event.description.contains("nurse"));
        assert!(event.description.contains("delete"));
        assert!(event.description.contains("patient"));
    }

    /// Scenario: Doctor reading a patient is allowed and leaves no security record
    #[test]
    fn scenario_doctor_read_patient_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let pep = file_pep(dir.path());

        assert!(pep.authorize(Role::Doctor, "patient", "read", Some("u2")));

        let events = read_security_log(pep.sink().security_log_path()).unwrap();
        assert!(events.is_empty());
    }

    /// Scenario: Completed access is logged regardless of the decision
    #[test]
    fn scenario_access_logged_after_use() {
        let dir = tempfile::tempdir().unwrap();
        let pep = file_pep(dir.path());

        if pep.authorize(Role::Nurse, "patient", "read", Some("n-7")) {
            pep.sink()
                .record_access("n-7", "list", "patient", "all", None)
                .unwrap();
        }
        // A caller reporting an action it was never cleared for is still logged
        pep.sink()
            .record_access("n-7", "delete", "patient", "p-3", Some("bypassed UI"))
            .unwrap();

        let access = health_access::read_access_log(pep.sink().access_log_path()).unwrap();
        assert_eq!(access.len(), 2);
        assert_eq!(access[0].action, "list");
        assert_eq!(access[1].details.as_deref(), Some("bypassed UI"));
    }

    /// Scenario: Repeated denials are each recorded; nothing is cached
    #[test]
    fn scenario_repeated_denials_not_suppressed() {
        let pep = PolicyEnforcementPoint::new(AccessPolicy::new(), MemoryAuditSink::new());
        for _ in 0..5 {
            assert!(!pep.authorize(Role::Patient, "schedule", "write", Some("p-1")));
        }
        assert_eq!(pep.sink().security_count(), 5);
    }

    /// Scenario: A shared sink serves several enforcement points
    #[test]
    fn scenario_shared_sink() {
        let sink = std::sync::Arc::new(MemoryAuditSink::new());
        let ward = PolicyEnforcementPoint::new(AccessPolicy::new(), sink.clone());
        let mut restricted = AccessPolicy::new();
        restricted.revoke(Role::Doctor, "patient", "write");
        let records = PolicyEnforcementPoint::new(restricted, sink.clone());

        assert!(ward.authorize(Role::Doctor, "patient", "write", Some("d-1")));
        assert!(!records.authorize(Role::Doctor, "patient", "write", Some("d-1")));
        assert_eq!(sink.security_count(), 1);
    }
}
