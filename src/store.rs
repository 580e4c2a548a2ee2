//! The workspace: both event stores plus the backend they commit to.
//!
//! Every mutation is "change the in-memory store, then commit the snapshot".
//! A failed commit restores the store to its state before the change, so
//! memory never runs ahead of the backend. Swapping the JSON file for a real
//! service only needs another [`Backend`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::fines::{Fine, FineAction, FineStore, NewFine};
use crate::remarks::{NewRemark, Remark, RemarkAction, RemarkStore};
use crate::summary::Applied;

pub const DATA_FILE: &str = "hrdesk.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub fines: Vec<Fine>,
    #[serde(default)]
    pub remarks: Vec<Remark>,
}

pub trait Backend {
    fn load(&self) -> Result<Snapshot>;
    fn commit(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// Pretty-printed JSON snapshot on disk. A missing file loads as empty.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(DATA_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for JsonFileBackend {
    fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no data file yet");
            return Ok(Snapshot::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn commit(&mut self, snapshot: &Snapshot) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, format!("{json}\n"))?;
        debug!(
            path = %self.path.display(),
            fines = snapshot.fines.len(),
            remarks = snapshot.remarks.len(),
            "snapshot committed"
        );
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub snapshot: Snapshot,
    pub commits: usize,
}

#[cfg(test)]
impl Backend for MemoryBackend {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.snapshot.clone())
    }

    fn commit(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.snapshot = snapshot.clone();
        self.commits += 1;
        Ok(())
    }
}

/// Owns the fine and remark stores for one process.
pub struct Workspace<B: Backend> {
    backend: B,
    fines: FineStore,
    remarks: RemarkStore,
}

impl<B: Backend> Workspace<B> {
    pub fn open(backend: B) -> Result<Self> {
        let snapshot = backend.load()?;
        info!(
            fines = snapshot.fines.len(),
            remarks = snapshot.remarks.len(),
            "workspace opened"
        );
        Ok(Self {
            backend,
            fines: FineStore::new(snapshot.fines),
            remarks: RemarkStore::new(snapshot.remarks),
        })
    }

    pub fn fines(&self) -> &FineStore {
        &self.fines
    }

    pub fn remarks(&self) -> &RemarkStore {
        &self.remarks
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn add_fine(&mut self, new: NewFine) -> Result<u64> {
        let before = self.fines.clone();
        let id = self.fines.add(new)?.id;
        self.commit_or_restore(|ws| ws.fines = before)?;
        Ok(id)
    }

    pub fn apply_fine(&mut self, action: FineAction) -> Result<Applied> {
        let before = self.fines.clone();
        let applied = self.fines.apply(action)?;
        if applied == Applied::Updated {
            self.commit_or_restore(|ws| ws.fines = before)?;
        }
        Ok(applied)
    }

    pub fn add_remark(&mut self, new: NewRemark) -> Result<u64> {
        let before = self.remarks.clone();
        let id = self.remarks.add(new)?.id;
        self.commit_or_restore(|ws| ws.remarks = before)?;
        Ok(id)
    }

    pub fn apply_remark(&mut self, action: RemarkAction) -> Result<Applied> {
        let before = self.remarks.clone();
        let applied = self.remarks.apply(action)?;
        if applied == Applied::Updated {
            self.commit_or_restore(|ws| ws.remarks = before)?;
        }
        Ok(applied)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            fines: self.fines.all().to_vec(),
            remarks: self.remarks.all().to_vec(),
        }
    }

    fn commit_or_restore(&mut self, restore: impl FnOnce(&mut Self)) -> Result<()> {
        let snapshot = self.snapshot();
        if let Err(err) = self.backend.commit(&snapshot) {
            warn!(error = %err, "commit failed, change rolled back");
            restore(self);
            return Err(err);
        }
        Ok(())
    }
}
