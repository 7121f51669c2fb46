//! Session infrastructure types for the session API.
//!
//! Defines metadata and operation-log types.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Metadata about a stitching session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Pipeline identifier (from [`StitchingSession::PIPELINE`](super::StitchingSession::PIPELINE)).
    pub pipeline: String,

    /// Schema version of the serialized session layout.
    pub schema_version: u32,

    /// Unix timestamp when session was created (seconds since epoch).
    pub created_at: u64,

    /// Unix timestamp when session was last modified (seconds since epoch).
    pub last_modified: u64,

    /// Optional user-provided description.
    pub description: Option<String>,
}

impl SessionMetadata {
    /// Create new metadata for a pipeline.
    pub fn new(pipeline: impl Into<String>, schema_version: u32) -> Self {
        let now = current_timestamp();
        Self {
            pipeline: pipeline.into(),
            schema_version,
            created_at: now,
            last_modified: now,
            description: None,
        }
    }

    /// Create new metadata with a description.
    pub fn with_description(
        pipeline: impl Into<String>,
        schema_version: u32,
        description: impl Into<String>,
    ) -> Self {
        let mut meta = Self::new(pipeline, schema_version);
        meta.description = Some(description.into());
        meta
    }

    /// Update the last_modified timestamp to now.
    pub fn touch(&mut self) {
        self.last_modified = current_timestamp();
    }
}

/// Lightweight operation log entry.
///
/// Captures basic information about operations performed on a session.
/// Intended for debugging and audit trail, not for replay/undo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unix timestamp of the operation (seconds since epoch).
    pub timestamp: u64,

    /// Operation name (e.g., "set_project", "pairwise_shifts").
    pub operation: String,

    /// Whether the operation succeeded.
    pub success: bool,

    /// Optional notes or error message.
    pub notes: Option<String>,
}

impl LogEntry {
    /// Create a success log entry.
    pub fn success(operation: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: true,
            notes: None,
        }
    }

    /// Create a success log entry with notes.
    pub fn success_with_notes(operation: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: true,
            notes: Some(notes.into()),
        }
    }

    /// Create a failure log entry.
    pub fn failure(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: false,
            notes: Some(error.into()),
        }
    }
}

/// Get the current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_new() {
        let meta = SessionMetadata::new("pairwise_shifts", 1);
        assert_eq!(meta.pipeline, "pairwise_shifts");
        assert_eq!(meta.schema_version, 1);
        assert!(meta.created_at > 0);
        assert_eq!(meta.created_at, meta.last_modified);
        assert!(meta.description.is_none());
    }

    #[test]
    fn metadata_with_description() {
        let meta = SessionMetadata::with_description("pairwise_shifts", 2, "Test session");
        assert_eq!(meta.pipeline, "pairwise_shifts");
        assert_eq!(meta.schema_version, 2);
        assert_eq!(meta.description, Some("Test session".to_string()));
    }

    #[test]
    fn metadata_touch() {
        let mut meta = SessionMetadata::new("test", 1);
        let original = meta.last_modified;
        // Note: in fast execution, touch might not change the timestamp
        // since it's in seconds. This test just verifies it doesn't panic.
        meta.touch();
        assert!(meta.last_modified >= original);
    }

    #[test]
    fn log_entry_success() {
        let entry = LogEntry::success("set_project");
        assert_eq!(entry.operation, "set_project");
        assert!(entry.success);
        assert!(entry.notes.is_none());
        assert!(entry.timestamp > 0);
    }

    #[test]
    fn log_entry_success_with_notes() {
        let entry = LogEntry::success_with_notes("pairwise_shifts", "6 pairs registered");
        assert_eq!(entry.operation, "pairwise_shifts");
        assert!(entry.success);
        assert_eq!(entry.notes, Some("6 pairs registered".to_string()));
    }

    #[test]
    fn log_entry_failure() {
        let entry = LogEntry::failure("pairwise_shifts", "no project loaded");
        assert_eq!(entry.operation, "pairwise_shifts");
        assert!(!entry.success);
        assert_eq!(entry.notes, Some("no project loaded".to_string()));
    }
}
