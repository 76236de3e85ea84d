//! Application audit log.
//!
//! Services record one entry per audited operation (success or failure).
//! Entries are kept in memory, bounded by capacity, and mirrored to `tracing`.

use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditLevel {
    Info,
    Error,
}

impl AuditLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditLevel::Info => "INFO",
            AuditLevel::Error => "ERROR",
        }
    }
}

impl core::fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub level: AuditLevel,
    pub message: String,
    /// Service that wrote the entry, e.g. `enrollments`.
    pub component: String,
    pub method: String,
    /// Email of the acting principal; `system` for bootstrap writes.
    pub user: String,
    /// Stable operation code, e.g. `enrollment.create.error`.
    pub operation: String,
    pub metadata: JsonValue,
}

/// Write side of the audit log.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Query side of the audit log. Results are ordered oldest first.
pub trait AuditLog: AuditSink {
    fn all(&self) -> Vec<AuditEntry>;

    fn by_level(&self, level: AuditLevel) -> Vec<AuditEntry> {
        self.all().into_iter().filter(|e| e.level == level).collect()
    }

    fn by_user(&self, user: &str) -> Vec<AuditEntry> {
        self.all().into_iter().filter(|e| e.user == user).collect()
    }

    /// Entries with `timestamp >= from`.
    fn since(&self, from: DateTime<Utc>) -> Vec<AuditEntry> {
        self.all()
            .into_iter()
            .filter(|e| e.timestamp >= from)
            .collect()
    }
}

/// Bounded in-memory audit log; the oldest entry is evicted when full.
#[derive(Debug)]
pub struct InMemoryAuditLog {
    capacity: usize,
    entries: RwLock<VecDeque<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, entry: AuditEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}

impl AuditLog for InMemoryAuditLog {
    fn all(&self) -> Vec<AuditEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().cloned().collect()
    }
}

/// Per-service audit writer.
///
/// Stamps entries with the component name and current time and emits the
/// matching `tracing` event before handing the entry to the sink.
#[derive(Clone)]
pub struct Auditor {
    component: &'static str,
    sink: Arc<dyn AuditSink>,
}

impl Auditor {
    pub fn new(component: &'static str, sink: Arc<dyn AuditSink>) -> Self {
        Self { component, sink }
    }

    pub fn info(
        &self,
        method: &str,
        user: &str,
        operation: &str,
        message: impl Into<String>,
        metadata: JsonValue,
    ) {
        self.write(AuditLevel::Info, method, user, operation, message.into(), metadata);
    }

    pub fn error(
        &self,
        method: &str,
        user: &str,
        operation: &str,
        message: impl Into<String>,
        metadata: JsonValue,
    ) {
        self.write(AuditLevel::Error, method, user, operation, message.into(), metadata);
    }

    fn write(
        &self,
        level: AuditLevel,
        method: &str,
        user: &str,
        operation: &str,
        message: String,
        metadata: JsonValue,
    ) {
        match level {
            AuditLevel::Info => tracing::info!(
                component = self.component,
                method,
                user,
                operation,
                "{message}"
            ),
            AuditLevel::Error => tracing::error!(
                component = self.component,
                method,
                user,
                operation,
                "{message}"
            ),
        }

        self.sink.record(AuditEntry {
            timestamp: Utc::now(),
            level,
            message,
            component: self.component.to_string(),
            method: method.to_string(),
            user: user.to_string(),
            operation: operation.to_string(),
            metadata,
        });
    }
}

impl core::fmt::Debug for Auditor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Auditor")
            .field("component", &self.component)
            .finish_non_exhaustive()
    }
}
