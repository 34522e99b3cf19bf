//! Role-based access policy
//!
//! Answers "may this role perform this action on this resource type?" from a
//! permission table. Resource types and actions are open strings; anything the
//! table does not list is denied.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Resource type for patient demographics and records
pub const RESOURCE_PATIENT: &str = "patient";
/// Resource type for SOAP clinical notes
pub const RESOURCE_SOAP_NOTE: &str = "soap_note";
/// Resource type for staff work schedules
pub const RESOURCE_SCHEDULE: &str = "schedule";

pub const ACTION_READ: &str = "read";
pub const ACTION_WRITE: &str = "write";
pub const ACTION_DELETE: &str = "delete";

/// Role -> resource type -> allowed actions
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTable {
    rules: HashMap<Role, HashMap<String, BTreeSet<String>>>,
}

impl PermissionTable {
    /// Create a table with no rules
    pub fn new() -> Self {
        Self::default()
    }

    /// The clinical permission matrix
    ///
    /// | Role    | patient             | soap_note           | schedule            |
    /// |---------|---------------------|---------------------|---------------------|
    /// | nurse   | read, write         | read, write         | read, write         |
    /// | doctor  | read, write         | read, write, delete | read, write         |
    /// | admin   | read, write, delete | read, write, delete | read, write, delete |
    /// | patient | read                | read                |                     |
    pub fn clinical() -> Self {
        let mut table = Self::new();

        let rw: &[&str] = &[ACTION_READ, ACTION_WRITE];
        let rwd: &[&str] = &[ACTION_READ, ACTION_WRITE, ACTION_DELETE];

        table.extend(Role::Nurse, RESOURCE_PATIENT, rw);
        table.extend(Role::Nurse, RESOURCE_SOAP_NOTE, rw);
        table.extend(Role::Nurse, RESOURCE_SCHEDULE, rw);

        table.extend(Role::Doctor, RESOURCE_PATIENT, rw);
        table.extend(Role::Doctor, RESOURCE_SOAP_NOTE, rwd);
        table.extend(Role::Doctor, RESOURCE_SCHEDULE, rw);

        table.extend(Role::Admin, RESOURCE_PATIENT, rwd);
        table.extend(Role::Admin, RESOURCE_SOAP_NOTE, rwd);
        table.extend(Role::Admin, RESOURCE_SCHEDULE, rwd);

        // Patients only see their own record and notes; ownership is checked upstream
        table.extend(Role::Patient, RESOURCE_PATIENT, &[ACTION_READ]);
        table.extend(Role::Patient, RESOURCE_SOAP_NOTE, &[ACTION_READ]);

        table
    }

    fn extend(&mut self, role: Role, resource_type: &str, actions: &[&str]) {
        for action in actions {
            self.insert(role, resource_type, action);
        }
    }

    /// Add one rule; returns false if it was already present
    pub fn insert(&mut self, role: Role, resource_type: &str, action: &str) -> bool {
        self.rules
            .entry(role)
            .or_default()
            .entry(resource_type.to_string())
            .or_default()
            .insert(action.to_string())
    }

    /// Remove one rule; returns false if it was not present
    pub fn remove(&mut self, role: Role, resource_type: &str, action: &str) -> bool {
        let Some(resources) = self.rules.get_mut(&role) else {
            return false;
        };
        let Some(actions) = resources.get_mut(resource_type) else {
            return false;
        };
        let removed = actions.remove(action);
        if actions.is_empty() {
            resources.remove(resource_type);
        }
        removed
    }

    pub fn contains(&self, role: Role, resource_type: &str, action: &str) -> bool {
        self.rules
            .get(&role)
            .and_then(|resources| resources.get(resource_type))
            .map(|actions| actions.contains(action))
            .unwrap_or(false)
    }

    /// Allowed actions for a role on a resource type, sorted
    pub fn actions(&self, role: Role, resource_type: &str) -> Vec<&str> {
        self.rules
            .get(&role)
            .and_then(|resources| resources.get(resource_type))
            .map(|actions| actions.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Resource types a role has at least one rule for, sorted
    pub fn resources(&self, role: Role) -> Vec<&str> {
        let mut resources: Vec<&str> = self
            .rules
            .get(&role)
            .map(|r| r.keys().map(String::as_str).collect())
            .unwrap_or_default();
        resources.sort_unstable();
        resources
    }
}

/// Access decision point backed by an owned permission table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    table: PermissionTable,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessPolicy {
    /// Create a policy seeded with the clinical permission matrix
    pub fn new() -> Self {
        Self::with_table(PermissionTable::clinical())
    }

    /// Create a policy that denies everything until rules are granted
    pub fn empty() -> Self {
        Self::with_table(PermissionTable::new())
    }

    pub fn with_table(table: PermissionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// Check whether `role` may perform `action` on `resource_type`
    ///
    /// Never fails: unknown resource types and actions are simply absent from
    /// the table and therefore denied.
    pub fn is_allowed(&self, role: Role, resource_type: &str, action: &str) -> bool {
        self.table.contains(role, resource_type, action)
    }

    /// Same as [`is_allowed`](Self::is_allowed) for a role given as a string
    ///
    /// Strings that do not name a known role are denied.
    pub fn is_allowed_named(&self, role: &str, resource_type: &str, action: &str) -> bool {
        role.parse::<Role>()
            .map(|role| self.is_allowed(role, resource_type, action))
            .unwrap_or(false)
    }

    pub fn permissions(&self, role: Role, resource_type: &str) -> Vec<&str> {
        self.table.actions(role, resource_type)
    }

    pub fn resources(&self, role: Role) -> Vec<&str> {
        self.table.resources(role)
    }

    /// Allow an additional action at runtime
    pub fn grant(&mut self, role: Role, resource_type: &str, action: &str) -> bool {
        self.table.insert(role, resource_type, action)
    }

    /// Withdraw an action at runtime
    pub fn revoke(&mut self, role: Role, resource_type: &str, action: &str) -> bool {
        self.table.remove(role, resource_type, action)
    }
}
