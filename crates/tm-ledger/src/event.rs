//! Ledger event and applied-marker types.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use tm_core::{ShortName, Version};

/// Lifecycle phase of a single migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditPhase {
    /// About to read and split the migration
    Start,
    /// About to execute the statement at this zero-based position
    Chunk(usize),
    /// Every statement executed, or the operator marked it applied
    Success,
}

impl fmt::Display for AuditPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditPhase::Start => f.write_str("start"),
            AuditPhase::Chunk(i) => write!(f, "chunk[{i}]"),
            AuditPhase::Success => f.write_str("success"),
        }
    }
}

/// One append-only ledger event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub short_name: ShortName,
    pub phase: AuditPhase,
    pub message: String,
}

impl AuditEvent {
    pub fn start(short_name: &ShortName) -> Self {
        Self::new(short_name, AuditPhase::Start, "start")
    }

    pub fn chunk(short_name: &ShortName, index: usize) -> Self {
        Self::new(
            short_name,
            AuditPhase::Chunk(index),
            format!("writing chunk {index}"),
        )
    }

    pub fn success(short_name: &ShortName) -> Self {
        Self::new(short_name, AuditPhase::Success, "success")
    }

    /// Success recorded without executing anything.
    pub fn marked_applied(short_name: &ShortName) -> Self {
        Self::new(short_name, AuditPhase::Success, "marked as already applied")
    }

    fn new(short_name: &ShortName, phase: AuditPhase, message: impl Into<String>) -> Self {
        Self {
            short_name: short_name.clone(),
            phase,
            message: message.into(),
        }
    }
}

/// Durable marker saying a migration is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRecord {
    pub short_name: ShortName,
    pub target_version: Version,
    /// `None` when the database returned a timestamp format we do not read
    pub applied_at: Option<NaiveDateTime>,
}
