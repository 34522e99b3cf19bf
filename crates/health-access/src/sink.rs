//! Append-only audit sinks
//!
//! Every record is written before the recording call returns, and a failed
//! write is returned to the caller. Recorded lines are never rewritten or
//! removed; a data-subject erasure is itself a new access record. Only the
//! bytes of a record whose own write failed are cut back off.

use crate::config::AuditConfig;
use crate::error::{AuditError, Result, Stream};
use crate::event::{to_line, AccessEvent, AuditEvent, SecurityEvent, Severity};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, trace, warn};

pub const ACTION_LOGIN: &str = "login";
pub const ACTION_LOGOUT: &str = "logout";
pub const ACTION_DELETE_ALL: &str = "delete_all";
pub const ERASURE_DETAILS: &str = "Right to be forgotten - all patient data deleted";

/// Destination for audit records
///
/// Implementations must be safe to share between threads and must never
/// interleave two records.
pub trait AuditSink: Send + Sync {
    /// Append one record to the access stream
    fn append_access(&self, event: &AccessEvent) -> Result<()>;

    /// Append one record to the security stream
    fn append_security(&self, event: &SecurityEvent) -> Result<()>;

    /// Record a completed data access
    fn record_access(
        &self,
        user_id: &str,
        action: &str,
        resource_type: &str,
        resource_id: &str,
        details: Option<&str>,
    ) -> Result<()> {
        let event = AccessEvent::new(user_id, action, resource_type, resource_id).with_details(details);
        self.append_access(&event)
    }

    /// Record a security incident or notable security action
    fn record_security_event(
        &self,
        event_type: &str,
        severity: Severity,
        description: &str,
        user_id: Option<&str>,
    ) -> Result<()> {
        let event = SecurityEvent::new(event_type, severity, description).with_user(user_id);
        self.append_security(&event)
    }

    /// Route a prebuilt record to its stream
    fn record_event(&self, event: &AuditEvent) -> Result<()> {
        match event {
            AuditEvent::Access(e) => self.append_access(e),
            AuditEvent::Security(e) => self.append_security(e),
        }
    }

    fn record_login(&self, user_id: &str) -> Result<()> {
        self.record_access(user_id, ACTION_LOGIN, "system", "main", None)
    }

    fn record_logout(&self, user_id: &str) -> Result<()> {
        self.record_access(user_id, ACTION_LOGOUT, "system", "main", None)
    }

    /// Right to be forgotten: appended as a new record, prior lines stay intact
    fn record_erasure_request(&self, patient_id: &str, requested_by: &str) -> Result<()> {
        self.record_access(
            requested_by,
            ACTION_DELETE_ALL,
            "patient",
            patient_id,
            Some(ERASURE_DETAILS),
        )
    }
}

impl<S: AuditSink + ?Sized> AuditSink for Arc<S> {
    fn append_access(&self, event: &AccessEvent) -> Result<()> {
        (**self).append_access(event)
    }

    fn append_security(&self, event: &SecurityEvent) -> Result<()> {
        (**self).append_security(event)
    }
}

impl<S: AuditSink + ?Sized> AuditSink for &S {
    fn append_access(&self, event: &AccessEvent) -> Result<()> {
        (**self).append_access(event)
    }

    fn append_security(&self, event: &SecurityEvent) -> Result<()> {
        (**self).append_security(event)
    }
}

/// Storage behind one stream
///
/// Must be able to report its end offset and cut back to it, so a record that
/// fails halfway can be removed again.
trait AppendTarget: Write {
    fn end_offset(&self) -> std::io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()>;
    fn sync(&mut self) -> std::io::Result<()>;
}

impl AppendTarget for File {
    fn end_offset(&self) -> std::io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> std::io::Result<()> {
        self.sync_data()
    }
}

/// Target plus whether it may end in a partial record
#[derive(Debug)]
struct Tail<W> {
    target: W,
    /// A failed record could not be cut back; next record starts on a fresh line
    dirty: bool,
}

/// One append-mode target guarded by its own lock
#[derive(Debug)]
struct LogStream<W = File> {
    stream: Stream,
    path: PathBuf,
    tail: Mutex<Tail<W>>,
}

impl LogStream<File> {
    fn open(stream: Stream, path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AuditError::config(parent, format!("cannot create {} log directory: {}", stream, e))
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| AuditError::config(path, format!("cannot open {} log: {}", stream, e)))?;

        Ok(Self::new(stream, path, file))
    }

    fn same_target(&self, other: &LogStream<File>) -> std::io::Result<bool> {
        let a = self.tail.lock().target.metadata()?;
        let b = other.tail.lock().target.metadata()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Ok(a.dev() == b.dev() && a.ino() == b.ino())
        }
        #[cfg(not(unix))]
        {
            let _ = (a, b);
            Ok(std::fs::canonicalize(&self.path)? == std::fs::canonicalize(&other.path)?)
        }
    }
}

impl<W: AppendTarget> LogStream<W> {
    fn new(stream: Stream, path: &Path, target: W) -> Self {
        Self {
            stream,
            path: path.to_path_buf(),
            tail: Mutex::new(Tail {
                target,
                dirty: false,
            }),
        }
    }

    fn append(&self, line: &str, sync: bool) -> Result<()> {
        let mut tail = self.tail.lock();
        let start = tail
            .target
            .end_offset()
            .map_err(|e| AuditError::io(self.stream, &self.path, e))?;

        let written = if tail.dirty {
            tail.target.write_all(b"\n")
        } else {
            Ok(())
        }
        .and_then(|_| tail.target.write_all(line.as_bytes()))
        .and_then(|_| tail.target.flush());

        if let Err(e) = written {
            if let Err(rollback) = tail.target.truncate_to(start) {
                warn!(
                    stream = %self.stream,
                    path = %self.path.display(),
                    error = %rollback,
                    "could not remove partial record"
                );
                tail.dirty = true;
            }
            return Err(AuditError::io(self.stream, &self.path, e));
        }
        tail.dirty = false;

        if sync {
            tail.target
                .sync()
                .map_err(|e| AuditError::io(self.stream, &self.path, e))?;
        }
        Ok(())
    }
}

/// JSON-lines sink writing each stream to its own file
#[derive(Debug)]
pub struct FileAuditSink {
    access: LogStream,
    security: LogStream,
    sync_on_write: bool,
}

impl FileAuditSink {
    /// Open both streams, creating missing directories
    ///
    /// Unusable destinations fail here rather than on the first write.
    pub fn open(config: &AuditConfig) -> Result<Self> {
        config.validate()?;

        let access = LogStream::open(Stream::Access, &config.access_log_path)?;
        let security = LogStream::open(Stream::Security, &config.security_log_path)?;

        let shared = access
            .same_target(&security)
            .map_err(|e| AuditError::config(&config.access_log_path, format!("cannot inspect log files: {}", e)))?;
        if shared {
            return Err(AuditError::config(
                &config.access_log_path,
                format!(
                    "access and security streams resolve to the same file as {}",
                    config.security_log_path.display()
                ),
            ));
        }

        info!(
            access_log = %access.path.display(),
            security_log = %security.path.display(),
            sync_on_write = config.sync_on_write,
            "audit sink opened"
        );

        Ok(Self {
            access,
            security,
            sync_on_write: config.sync_on_write,
        })
    }

    pub fn access_log_path(&self) -> &Path {
        &self.access.path
    }

    pub fn security_log_path(&self) -> &Path {
        &self.security.path
    }
}

impl AuditSink for FileAuditSink {
    fn append_access(&self, event: &AccessEvent) -> Result<()> {
        let line = to_line(event)?;
        self.access.append(&line, self.sync_on_write)?;
        trace!(user_id = %event.user_id, action = %event.action, "access event recorded");
        Ok(())
    }

    fn append_security(&self, event: &SecurityEvent) -> Result<()> {
        let line = to_line(event)?;
        self.security.append(&line, self.sync_on_write)?;
        trace!(event_type = %event.event_type, severity = %event.severity, "security event recorded");
        Ok(())
    }
}

/// In-process sink keeping records in memory
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    access: Mutex<Vec<AccessEvent>>,
    security: Mutex<Vec<SecurityEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access_events(&self) -> Vec<AccessEvent> {
        self.access.lock().clone()
    }

    pub fn security_events(&self) -> Vec<SecurityEvent> {
        self.security.lock().clone()
    }

    pub fn access_count(&self) -> usize {
        self.access.lock().len()
    }

    pub fn security_count(&self) -> usize {
        self.security.lock().len()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append_access(&self, event: &AccessEvent) -> Result<()> {
        self.access.lock().push(event.clone());
        Ok(())
    }

    fn append_security(&self, event: &SecurityEvent) -> Result<()> {
        self.security.lock().push(event.clone());
        Ok(())
    }
}
