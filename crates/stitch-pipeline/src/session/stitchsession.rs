//! Stitching session container with mutable state.
//!
//! The session wraps a [`StitchingProject`] together with metadata and an
//! operation log. Pipeline step functions mutate the session in-place and
//! record what they did, so a saved session file tells the whole story of a
//! dataset's registration history.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use stitch_core::StitchingProject;

use super::types::{LogEntry, SessionMetadata};

/// A stitching session container with mutable state.
///
/// The session stores the project (view catalog plus pairwise results) and a
/// lightweight audit trail. Step functions such as
/// [`run_pairwise_shifts`](crate::run_pairwise_shifts) mutate the session
/// in-place.
///
/// # Example
///
/// ```
/// use stitch_pipeline::session::StitchingSession;
/// use stitch_core::StitchingProject;
/// use stitch_core::synthetic::tiles::{tile_grid_catalog, TileGridConfig};
/// # fn main() -> anyhow::Result<()> {
/// let catalog = tile_grid_catalog(&TileGridConfig::default())?;
/// let mut session = StitchingSession::with_project(StitchingProject::new(catalog));
///
/// assert!(session.has_project());
/// let json = session.to_json()?;
/// let restored = StitchingSession::from_json(&json)?;
/// assert!(restored.has_project());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StitchingSession {
    /// Session metadata (pipeline, schema version, timestamps, description).
    pub metadata: SessionMetadata,

    /// The project under registration. `None` until set.
    project: Option<StitchingProject>,

    /// Operation log (lightweight audit trail).
    pub log: Vec<LogEntry>,
}

impl StitchingSession {
    /// Pipeline identifier recorded in session metadata.
    pub const PIPELINE: &'static str = "pairwise_shifts";

    /// Serialized session layout version.
    pub const SCHEMA_VERSION: u32 = 1;

    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new empty session.
    pub fn new() -> Self {
        Self {
            metadata: SessionMetadata::new(Self::PIPELINE, Self::SCHEMA_VERSION),
            project: None,
            log: Vec::new(),
        }
    }

    /// Create a new session with a description.
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            metadata: SessionMetadata::with_description(
                Self::PIPELINE,
                Self::SCHEMA_VERSION,
                description,
            ),
            project: None,
            log: Vec::new(),
        }
    }

    /// Create a new session holding a project.
    pub fn with_project(project: StitchingProject) -> Self {
        let mut session = Self::new();
        session.set_project(project);
        session
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Project Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the project, replacing any previous one.
    ///
    /// Project construction already validates the catalog, so this cannot
    /// fail. Previously accumulated results travel with the project.
    pub fn set_project(&mut self, project: StitchingProject) {
        self.project = Some(project);
        self.metadata.touch();
    }

    /// Get a reference to the project, if set.
    pub fn project(&self) -> Option<&StitchingProject> {
        self.project.as_ref()
    }

    /// Get a mutable reference to the project, if set.
    pub fn project_mut(&mut self) -> Option<&mut StitchingProject> {
        self.project.as_mut()
    }

    /// Get a reference to the project, or error if not set.
    ///
    /// # Errors
    ///
    /// Returns an error if no project is set.
    pub fn require_project(&self) -> Result<&StitchingProject> {
        self.project
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("project not set"))
    }

    /// Get a mutable reference to the project, or error if not set.
    ///
    /// # Errors
    ///
    /// Returns an error if no project is set.
    pub fn require_project_mut(&mut self) -> Result<&mut StitchingProject> {
        self.project
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("project not set"))
    }

    /// Check if a project is set.
    pub fn has_project(&self) -> bool {
        self.project.is_some()
    }

    /// Clear the project, keeping metadata and log.
    pub fn clear_project(&mut self) {
        self.project = None;
        self.metadata.touch();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log a successful operation.
    pub fn log_success(&mut self, operation: impl Into<String>) {
        self.log.push(LogEntry::success(operation));
        self.metadata.touch();
    }

    /// Log a successful operation with notes.
    pub fn log_success_with_notes(
        &mut self,
        operation: impl Into<String>,
        notes: impl Into<String>,
    ) {
        self.log
            .push(LogEntry::success_with_notes(operation, notes));
        self.metadata.touch();
    }

    /// Log a failed operation.
    pub fn log_failure(&mut self, operation: impl Into<String>, error: impl Into<String>) {
        self.log.push(LogEntry::failure(operation, error));
        self.metadata.touch();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Serialization
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize session to JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Deserialize session from JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Deserialization fails
    /// - Schema version is newer than supported
    pub fn from_json(json: &str) -> Result<Self> {
        let session: Self = serde_json::from_str(json)?;

        // Verify schema version compatibility
        if session.metadata.schema_version > Self::SCHEMA_VERSION {
            bail!(
                "session schema version {} is newer than supported version {}",
                session.metadata.schema_version,
                Self::SCHEMA_VERSION
            );
        }

        Ok(session)
    }
}

impl Default for StitchingSession {
    fn default() -> Self {
        Self::new()
    }
}
