//! Shared configuration snapshot.
//!
//! One [`SharedConfig`] is built at process startup and shared read-only by
//! every command constructed for a request. The only per-request value is
//! the output sink, which the registry substitutes when it builds command
//! instances; everything here stays immutable for the process lifetime.

use std::io;
use std::path::{Path, PathBuf};

/// File holding the serialized state for a workspace.
pub const STATE_FILENAME: &str = "strata.state.json";

/// Directory under the data dir holding per-workspace state for every
/// workspace other than the default one.
pub const WORKSPACE_STATE_DIR: &str = "strata.state.d";

/// Marker file recording the currently selected workspace name.
pub const WORKSPACE_MARKER: &str = ".strata-workspace";

/// Name of the workspace that always exists and cannot be deleted.
pub const DEFAULT_WORKSPACE: &str = "default";

/// Process-wide settings shared by all commands in one registry build.
///
/// Safe to share across concurrently running commands: all fields are plain
/// read-only data. Workspace selection is persisted in a marker file rather
/// than mutated here, so the snapshot itself never changes after startup.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    /// Root directory for state files and workspace data.
    pub data_dir: PathBuf,
    /// Whether warn/error output is styled with ANSI colors.
    pub color: bool,
    /// Whether request output is mirrored to the server console.
    pub mirror_console: bool,
}

impl SharedConfig {
    /// Build a configuration rooted at the given data directory.
    pub fn from_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            color: true,
            mirror_console: false,
        }
    }

    /// Name of the currently selected workspace.
    ///
    /// Read from the marker file; a missing or unreadable marker means the
    /// default workspace.
    pub fn current_workspace(&self) -> String {
        let marker = self.data_dir.join(WORKSPACE_MARKER);
        match std::fs::read_to_string(&marker) {
            Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => DEFAULT_WORKSPACE.to_string(),
        }
    }

    /// Persist the workspace selection to the marker file.
    pub fn set_current_workspace(&self, name: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::write(self.data_dir.join(WORKSPACE_MARKER), name)
    }

    /// State file path for a named workspace.
    ///
    /// The default workspace lives directly in the data dir; every other
    /// workspace gets its own directory under [`WORKSPACE_STATE_DIR`].
    pub fn workspace_state_path(&self, workspace: &str) -> PathBuf {
        if workspace == DEFAULT_WORKSPACE {
            self.data_dir.join(STATE_FILENAME)
        } else {
            self.data_dir
                .join(WORKSPACE_STATE_DIR)
                .join(workspace)
                .join(STATE_FILENAME)
        }
    }

    /// State file path for the currently selected workspace.
    pub fn state_path(&self) -> PathBuf {
        self.workspace_state_path(&self.current_workspace())
    }

    /// Directory holding non-default workspace state, if it exists.
    pub fn workspace_state_dir(&self) -> PathBuf {
        self.data_dir.join(WORKSPACE_STATE_DIR)
    }

    /// Whether the data dir looks initialized (created by `init`).
    pub fn is_initialized(&self) -> bool {
        Path::new(&self.data_dir).join(STATE_FILENAME).exists()
    }
}
