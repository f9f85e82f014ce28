//! # Sessions
//!
//! Named snapshots of the whole editor, kept together in one JSON blob in a
//! [`RecordStore`]. Saving under an existing name replaces that session and
//! leaves the others untouched.
//!
//! Records written by older versions may lack fields. Loading such a record
//! only overwrites the fields it carries; everything else keeps its current
//! in-memory value.
//!
//! ## Example
//!
//! ```
//! use bingocard::session::{MemoryStore, SessionSerializer};
//! use bingocard::state::EditorState;
//!
//! let sessions = SessionSerializer::new(MemoryStore::default());
//!
//! let mut state = EditorState::new();
//! state.header.title = "Team offsite".to_string();
//! sessions.save("offsite", &state)?;
//!
//! let mut restored = EditorState::new();
//! sessions.load("offsite")?.apply_to(&mut restored);
//! assert_eq!(restored.header.title, "Team offsite");
//! # Ok::<(), bingocard::BingoError>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

use crate::error::BingoError;
use crate::grid::UploadedImage;
use crate::state::EditorState;
use crate::theme::Theme;

/// Key under which all sessions are stored.
pub const SESSION_NAMESPACE: &str = "bingoSessions";

/// Persisted snapshot of the editor.
///
/// Every field is optional so partial records from older versions load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pseudo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Cell index → text, non-empty cells only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells: Option<BTreeMap<usize, String>>,
    /// Cell index → image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<BTreeMap<usize, String>>,
    /// Absent: keep the current center image. `null`: no center image.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub center_image: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<UploadedImage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl Session {
    /// Capture every field of `state`.
    pub fn capture(state: &EditorState, created_at: DateTime<Utc>) -> Self {
        let cells = state
            .grid
            .cells()
            .iter()
            .filter(|c| !c.is_free() && !c.text.is_empty())
            .map(|c| (c.index, c.text.clone()))
            .collect();
        let images = state
            .grid
            .cells()
            .iter()
            .filter_map(|c| c.image.clone().map(|image| (c.index, image)))
            .collect();

        Self {
            title: Some(state.header.title.clone()),
            pseudo: Some(state.header.pseudo.clone()),
            date: Some(state.header.date.clone()),
            cells: Some(cells),
            images: Some(images),
            center_image: Some(state.center_image.clone()),
            theme: Some(state.theme),
            gallery: Some(state.gallery.clone()),
            created_at: Some(created_at),
        }
    }

    /// Write every field this record carries into `state`.
    ///
    /// A present cell map is authoritative: cells it does not list are
    /// emptied. The free cell never takes text or an image from a record.
    pub fn apply_to(&self, state: &mut EditorState) {
        if let Some(title) = &self.title {
            state.header.title = title.clone();
        }
        if let Some(pseudo) = &self.pseudo {
            state.header.pseudo = pseudo.clone();
        }
        if let Some(date) = &self.date {
            state.header.date = date.clone();
        }
        if let Some(cells) = &self.cells {
            for cell in state.grid.cells_mut() {
                let text = cells.get(&cell.index).map(String::as_str).unwrap_or("");
                cell.assign_text(text);
            }
        }
        if let Some(images) = &self.images {
            for cell in state.grid.cells_mut() {
                cell.assign_image(images.get(&cell.index).cloned());
            }
        }
        if let Some(center_image) = &self.center_image {
            state.center_image = center_image.clone();
        }
        if let Some(theme) = self.theme {
            state.theme = theme;
        }
        if let Some(gallery) = &self.gallery {
            state.gallery = gallery.clone();
        }
    }
}

/// Name and save time of a stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Outcome of [`SessionSerializer::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The name was empty; nothing was written.
    Cancelled,
}

/// Flat namespace → blob storage, read and written wholesale.
pub trait RecordStore: Send + Sync {
    fn read(&self, namespace: &str) -> Result<Option<String>, BingoError>;
    fn write(&self, namespace: &str, blob: &str) -> Result<(), BingoError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
}

impl RecordStore for MemoryStore {
    fn read(&self, namespace: &str) -> Result<Option<String>, BingoError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(namespace).cloned())
    }

    fn write(&self, namespace: &str, blob: &str) -> Result<(), BingoError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(namespace.to_string(), blob.to_string());
        Ok(())
    }
}

/// Store keeping each namespace in `<dir>/<namespace>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }
}

impl RecordStore for FileStore {
    fn read(&self, namespace: &str) -> Result<Option<String>, BingoError> {
        let path = self.path_for(namespace);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temp file and rename so readers never see a partial blob.
    fn write(&self, namespace: &str, blob: &str) -> Result<(), BingoError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(namespace);
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(blob.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Saves, lists and loads sessions in a [`RecordStore`].
pub struct SessionSerializer<S> {
    store: S,
}

impl<S: RecordStore> SessionSerializer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_all(&self) -> Result<BTreeMap<String, Session>, BingoError> {
        match self.store.read(SESSION_NAMESPACE)? {
            None => Ok(BTreeMap::new()),
            Some(blob) if blob.trim().is_empty() => Ok(BTreeMap::new()),
            Some(blob) => serde_json::from_str(&blob)
                .map_err(|e| BingoError::Session(format!("Corrupt session store: {}", e))),
        }
    }

    /// Save `state` under `name` with a fresh timestamp.
    ///
    /// An empty name cancels the save without touching the store.
    pub fn save(&self, name: &str, state: &EditorState) -> Result<SaveOutcome, BingoError> {
        self.save_at(name, state, Utc::now())
    }

    /// [`save`](Self::save) with an explicit timestamp.
    pub fn save_at(
        &self,
        name: &str,
        state: &EditorState,
        created_at: DateTime<Utc>,
    ) -> Result<SaveOutcome, BingoError> {
        if name.trim().is_empty() {
            debug!("session save cancelled: empty name");
            return Ok(SaveOutcome::Cancelled);
        }

        let mut sessions = self.read_all()?;
        let replaced = sessions
            .insert(name.to_string(), Session::capture(state, created_at))
            .is_some();
        let blob = serde_json::to_string(&sessions)?;
        self.store.write(SESSION_NAMESPACE, &blob)?;

        info!(session = name, replaced, total = sessions.len(), "session saved");
        Ok(SaveOutcome::Saved)
    }

    /// Stored sessions, ordered by name.
    pub fn list(&self) -> Result<Vec<SessionSummary>, BingoError> {
        let sessions = self.read_all()?;
        Ok(sessions
            .into_iter()
            .map(|(name, session)| SessionSummary {
                name,
                created_at: session.created_at,
            })
            .collect())
    }

    /// Load the session stored under `name`.
    pub fn load(&self, name: &str) -> Result<Session, BingoError> {
        let mut sessions = self.read_all()?;
        let session = sessions
            .remove(name)
            .ok_or_else(|| BingoError::SessionNotFound(name.to_string()))?;
        info!(session = name, "session loaded");
        Ok(session)
    }
}

impl SessionSerializer<FileStore> {
    /// Serializer backed by a directory on disk.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(FileStore::new(dir.as_ref()))
    }
}
