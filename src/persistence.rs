use {
    crate::{
        error::SnapshotError,
        index::{AddressIndex, RefreshMetadata},
    },
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::{
        fs,
        io::{ErrorKind, Write},
        path::{Path, PathBuf},
    },
    tempfile::NamedTempFile,
};

/// On-disk snapshot of the index
///
/// Only the address list is stored; per-address sources are not, so a
/// restored index credits everything to [`crate::index::CACHE_SOURCE`].
/// Only `addresses` is needed to reload; the other fields may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub sources: Vec<String>,
    pub addresses: Vec<String>,
}

/// Snapshot file used as fallback when no source can be fetched
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot, replacing any previous file
    ///
    /// The JSON goes to a temp file in the same directory which is then
    /// renamed over the target, so readers only ever see a complete file.
    pub fn persist(
        &self,
        index: &AddressIndex,
        metadata: &RefreshMetadata,
    ) -> Result<(), SnapshotError> {
        let snapshot = SnapshotFile {
            last_update: metadata.last_update,
            count: index.len(),
            sources: metadata.sources_used.clone(),
            addresses: index.addresses(),
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer(&mut tmp, &snapshot)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        log::debug!("Saved {} addresses to {}", snapshot.count, self.path.display());
        Ok(())
    }

    /// Read the snapshot file
    ///
    /// A missing file is `Ok(None)`; unreadable or corrupt files are errors.
    pub fn read(&self) -> Result<Option<SnapshotFile>, SnapshotError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: SnapshotFile = serde_json::from_str(&json)?;
        Ok(Some(snapshot))
    }

    /// Addresses from the snapshot, or `None` if there is nothing usable
    ///
    /// Corrupt files are logged and treated as absent.
    pub fn load(&self) -> Option<Vec<String>> {
        match self.read() {
            Ok(Some(snapshot)) => {
                log::info!(
                    "Loaded {} addresses from {}",
                    snapshot.addresses.len(),
                    self.path.display()
                );
                Some(snapshot.addresses)
            }
            Ok(None) => {
                log::info!("No existing snapshot file found: {}", self.path.display());
                None
            }
            Err(e) => {
                log::warn!("⚠️  cache load failed for {}: {}", self.path.display(), e);
                None
            }
        }
    }
}
