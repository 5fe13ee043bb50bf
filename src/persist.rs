//! Snapshot persistence.
//!
//! Game state is persisted as an append-only series of snapshots per session,
//! each keyed to the conversation message that triggered it. Nothing ever
//! mutates a prior snapshot, so the state at any past message remains
//! reconstructable. The engine treats the serialized state as opaque text;
//! stores never look inside it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::world::unix_now;

/// Errors from snapshot store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current snapshot envelope version.
const SNAPSHOT_VERSION: u32 = 1;

/// Unique identifier for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub Uuid);

impl SnapshotId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One immutable, timestamped serialization of a game state, linked to the
/// message that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub session_id: Uuid,
    /// The conversation message whose handling produced this state.
    pub message_id: Uuid,
    /// Unix seconds when the snapshot was appended.
    pub created_at: u64,
    /// Opaque serialized game state.
    pub state_json: String,
}

impl Snapshot {
    fn new(session_id: Uuid, message_id: Uuid, state_json: String) -> Self {
        Self {
            id: SnapshotId::new(),
            session_id,
            message_id,
            created_at: unix_now(),
            state_json,
        }
    }
}

/// On-disk wrapper with a format version for compatibility checking.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    version: u32,
    snapshot: Snapshot,
}

/// Append-only store of per-session snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// The most recent snapshot for a session, if any.
    async fn latest(&self, session_id: Uuid) -> Result<Option<Snapshot>, StoreError>;

    /// Append a snapshot; never mutates a prior one.
    async fn append(
        &self,
        session_id: Uuid,
        message_id: Uuid,
        state_json: String,
    ) -> Result<SnapshotId, StoreError>;

    /// The full snapshot history for a session, oldest first.
    async fn history(&self, session_id: Uuid) -> Result<Vec<Snapshot>, StoreError>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Snapshot store held entirely in memory. The default for tests and for
/// hosts that manage durability elsewhere. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    sessions: Arc<RwLock<HashMap<Uuid, Vec<Snapshot>>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn latest(&self, session_id: Uuid) -> Result<Option<Snapshot>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&session_id)
            .and_then(|snapshots| snapshots.last())
            .cloned())
    }

    async fn append(
        &self,
        session_id: Uuid,
        message_id: Uuid,
        state_json: String,
    ) -> Result<SnapshotId, StoreError> {
        let snapshot = Snapshot::new(session_id, message_id, state_json);
        let id = snapshot.id;
        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id).or_default().push(snapshot);
        Ok(id)
    }

    async fn history(&self, session_id: Uuid) -> Result<Vec<Snapshot>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&session_id).cloned().unwrap_or_default())
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Snapshot store backed by a directory tree: one directory per session, one
/// JSON file per snapshot, named so that lexicographic order is append order.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    base_dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn session_dir(&self, session_id: Uuid) -> PathBuf {
        self.base_dir.join(session_id.to_string())
    }

    /// Snapshot file paths for a session in append order.
    async fn snapshot_paths(&self, session_id: Uuid) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.session_dir(session_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                paths.push(path);
            }
        }

        // File names embed a zero-padded sequence number, so path order is
        // append order.
        paths.sort();
        Ok(paths)
    }

    async fn read_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
        let content = fs::read_to_string(path).await?;
        let envelope: SnapshotEnvelope = serde_json::from_str(&content)?;

        if envelope.version != SNAPSHOT_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: envelope.version,
            });
        }

        Ok(envelope.snapshot)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn latest(&self, session_id: Uuid) -> Result<Option<Snapshot>, StoreError> {
        match self.snapshot_paths(session_id).await?.last() {
            Some(path) => Ok(Some(Self::read_snapshot(path).await?)),
            None => Ok(None),
        }
    }

    async fn append(
        &self,
        session_id: Uuid,
        message_id: Uuid,
        state_json: String,
    ) -> Result<SnapshotId, StoreError> {
        let dir = self.session_dir(session_id);
        fs::create_dir_all(&dir).await?;

        let seq = self.snapshot_paths(session_id).await?.len();
        let snapshot = Snapshot::new(session_id, message_id, state_json);
        let id = snapshot.id;

        let envelope = SnapshotEnvelope {
            version: SNAPSHOT_VERSION,
            snapshot,
        };
        let path = dir.join(format!("{seq:06}-{id}.json"));
        let content = serde_json::to_string_pretty(&envelope)?;
        fs::write(&path, content).await?;

        tracing::debug!(%session_id, %id, seq, "appended snapshot");
        Ok(id)
    }

    async fn history(&self, session_id: Uuid) -> Result<Vec<Snapshot>, StoreError> {
        let mut snapshots = Vec::new();
        for path in self.snapshot_paths(session_id).await? {
            snapshots.push(Self::read_snapshot(&path).await?);
        }
        Ok(snapshots)
    }
}
