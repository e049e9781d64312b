//! Durable client-side state shared by independent invocations
//!
//! Exactly two slots: the active session id and the last recommendation
//! payload. They are independent; a stored result may belong to an earlier
//! session and nobody invalidates it.

use crate::error::{AdvisorError, AdvisorResult};
use crate::types::{RecommendationResult, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Key-value store holding the two workflow slots
pub trait SessionStateStore {
    fn session_id(&self) -> AdvisorResult<Option<SessionId>>;

    /// Overwrites any previously stored id
    fn set_session_id(&mut self, id: SessionId) -> AdvisorResult<()>;

    fn recommendation_result(&self) -> AdvisorResult<Option<RecommendationResult>>;

    /// Overwrites any previously stored result
    fn set_recommendation_result(&mut self, result: RecommendationResult) -> AdvisorResult<()>;
}

/// On-disk layout of the state file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_result: Option<RecommendationResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

//==============================================================================
// File-backed store
//==============================================================================

/// JSON file store. A missing file reads as empty state.
///
/// Each write re-reads the file and replaces a single slot, so invocations
/// that run one after another never lose the other slot. The document is
/// swapped in whole through a private temp file; overlapping writers never
/// see a torn file, but the later one wins for both slots.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<data dir>/curricraft/state.json`, e.g. `~/.local/share/curricraft/state.json`
    pub fn default_path() -> AdvisorResult<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| AdvisorError::State("Cannot determine a data directory".to_string()))?;
        Ok(data_dir.join("curricraft").join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole state document
    pub fn load(&self) -> AdvisorResult<PersistedState> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedState::default());
            }
            Err(e) => {
                return Err(AdvisorError::State(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(PersistedState::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            AdvisorError::State(format!("Corrupt state file {}: {}", self.path.display(), e))
        })
    }

    fn update(&self, apply: impl FnOnce(&mut PersistedState)) -> AdvisorResult<()> {
        let mut state = self.load()?;
        apply(&mut state);
        state.updated_at = Some(Utc::now());

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        // Each writer gets its own temp file in the target directory
        let mut tmp = NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), &state)?;
        tmp.as_file_mut().flush()?;
        tmp.persist(&self.path).map_err(|e| {
            AdvisorError::State(format!("Failed to write {}: {}", self.path.display(), e.error))
        })?;

        debug!(path = %self.path.display(), "State file written");
        Ok(())
    }
}

impl SessionStateStore for FileStateStore {
    fn session_id(&self) -> AdvisorResult<Option<SessionId>> {
        Ok(self.load()?.session_id)
    }

    fn set_session_id(&mut self, id: SessionId) -> AdvisorResult<()> {
        self.update(|state| state.session_id = Some(id))
    }

    fn recommendation_result(&self) -> AdvisorResult<Option<RecommendationResult>> {
        Ok(self.load()?.recommendation_result)
    }

    fn set_recommendation_result(&mut self, result: RecommendationResult) -> AdvisorResult<()> {
        self.update(|state| state.recommendation_result = Some(result))
    }
}

//==============================================================================
// In-memory store
//==============================================================================

/// Store that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    state: PersistedState,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(id: SessionId) -> Self {
        Self {
            state: PersistedState {
                session_id: Some(id),
                ..Default::default()
            },
        }
    }
}

impl SessionStateStore for MemoryStateStore {
    fn session_id(&self) -> AdvisorResult<Option<SessionId>> {
        Ok(self.state.session_id.clone())
    }

    fn set_session_id(&mut self, id: SessionId) -> AdvisorResult<()> {
        self.state.session_id = Some(id);
        self.state.updated_at = Some(Utc::now());
        Ok(())
    }

    fn recommendation_result(&self) -> AdvisorResult<Option<RecommendationResult>> {
        Ok(self.state.recommendation_result.clone())
    }

    fn set_recommendation_result(&mut self, result: RecommendationResult) -> AdvisorResult<()> {
        self.state.recommendation_result = Some(result);
        self.state.updated_at = Some(Utc::now());
        Ok(())
    }
}
