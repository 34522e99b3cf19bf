//! Audit stream destinations

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ACCESS_LOG_FILE: &str = "audit.log";
pub const SECURITY_LOG_FILE: &str = "security.log";
const DEFAULT_DATA_DIR: &str = "data";

/// Where the two audit streams are written
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Data-access (GDPR) stream
    pub access_log_path: PathBuf,
    /// Security (NIS2) stream
    pub security_log_path: PathBuf,
    /// Call `sync_data` after each record instead of only flushing
    pub sync_on_write: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

impl AuditConfig {
    pub fn new(access_log_path: impl Into<PathBuf>, security_log_path: impl Into<PathBuf>) -> Self {
        Self {
            access_log_path: access_log_path.into(),
            security_log_path: security_log_path.into(),
            sync_on_write: false,
        }
    }

    /// Both streams under one directory with the standard file names
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(ACCESS_LOG_FILE), dir.join(SECURITY_LOG_FILE))
    }

    pub fn with_sync_on_write(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }

    /// Load from a JSON file; missing keys fall back to defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AuditError::config(path, format!("cannot read config: {}", e)))?;
        let config: AuditConfig = serde_json::from_str(&content)
            .map_err(|e| AuditError::config(path, format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject destinations that can never work
    pub fn validate(&self) -> Result<()> {
        if self.access_log_path.as_os_str().is_empty() {
            return Err(AuditError::config(&self.access_log_path, "access log path is empty"));
        }
        if self.security_log_path.as_os_str().is_empty() {
            return Err(AuditError::config(&self.security_log_path, "security log path is empty"));
        }
        if self.access_log_path == self.security_log_path {
            return Err(AuditError::config(
                &self.access_log_path,
                "access and security streams must use different destinations",
            ));
        }
        Ok(())
    }
}
