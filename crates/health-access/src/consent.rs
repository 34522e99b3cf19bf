//! Patient consent for data processing
//!
//! In-memory only. Patients without a record have not consented.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConsentStatus {
    Active,
    Revoked,
}

/// Latest consent state for one patient
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsentRecord {
    pub patient_id: String,
    pub status: ConsentStatus,
    pub granted_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct ConsentRegistry {
    records: HashMap<String, ConsentRecord>,
}

impl ConsentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record consent given at `at`; replaces any earlier record
    pub fn grant(&mut self, patient_id: &str, at: DateTime<Utc>) {
        self.records.insert(
            patient_id.to_string(),
            ConsentRecord {
                patient_id: patient_id.to_string(),
                status: ConsentStatus::Active,
                granted_at: at,
                revoked_at: None,
            },
        );
    }

    /// Withdraw consent; returns false if there was no active consent
    pub fn withdraw(&mut self, patient_id: &str, at: DateTime<Utc>) -> bool {
        match self.records.get_mut(patient_id) {
            Some(record) if record.status == ConsentStatus::Active => {
                record.status = ConsentStatus::Revoked;
                record.revoked_at = Some(at);
                true
            }
            _ => false,
        }
    }

    pub fn has_consent(&self, patient_id: &str) -> bool {
        self.records
            .get(patient_id)
            .map(|r| r.status == ConsentStatus::Active)
            .unwrap_or(false)
    }

    /// When the current consent was given, if active
    pub fn consent_date(&self, patient_id: &str) -> Option<DateTime<Utc>> {
        self.records
            .get(patient_id)
            .filter(|r| r.status == ConsentStatus::Active)
            .map(|r| r.granted_at)
    }

    pub fn record(&self, patient_id: &str) -> Option<&ConsentRecord> {
        self.records.get(patient_id)
    }
}
