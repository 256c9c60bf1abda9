//! Durable key-value slot holding the JSON-encoded catalog.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing::debug;

use crate::{error::AppResult, models::Movie};

pub trait CatalogSlot: Send {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> AppResult<Option<Vec<Movie>>>;

    fn save(&mut self, movies: &[Movie]) -> AppResult<()>;
}

impl CatalogSlot for Box<dyn CatalogSlot> {
    fn load(&self) -> AppResult<Option<Vec<Movie>>> {
        (**self).load()
    }

    fn save(&mut self, movies: &[Movie]) -> AppResult<()> {
        (**self).save(movies)
    }
}

/// A named slot stored as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileSlot {
    dir: PathBuf,
    key: String,
}

impl FileSlot {
    pub fn new(dir: impl AsRef<Path>, key: impl Into<String>) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), key: key.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn staging_path(&self) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", self.key))
    }
}

impl CatalogSlot for FileSlot {
    fn load(&self) -> AppResult<Option<Vec<Movie>>> {
        let path = self.path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("reading {}", path.display()))
                    .into());
            },
        };
        let movies = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(movies))
    }

    fn save(&mut self, movies: &[Movie]) -> AppResult<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let encoded = serde_json::to_string(movies)?;
        let staging = self.staging_path();
        let path = self.path();
        fs::write(&staging, encoded).with_context(|| format!("writing {}", staging.display()))?;
        fs::rename(&staging, &path).with_context(|| format!("replacing {}", path.display()))?;

        debug!(path = %path.display(), count = movies.len(), "catalog slot written");
        Ok(())
    }
}

/// In-memory slot holding the raw encoded text.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct MemorySlot {
    raw: Option<String>,
    writes: usize,
    fail_writes: bool,
}

#[cfg(test)]
impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with arbitrary text, which need not be valid JSON.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { raw: Some(raw.into()), ..Self::default() }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Make every following `save` fail.
    pub fn fail_writes(&mut self) {
        self.fail_writes = true;
    }
}

#[cfg(test)]
impl CatalogSlot for MemorySlot {
    fn load(&self) -> AppResult<Option<Vec<Movie>>> {
        let Some(raw) = &self.raw else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(raw)?))
    }

    fn save(&mut self, movies: &[Movie]) -> AppResult<()> {
        if self.fail_writes {
            return Err(anyhow::anyhow!("memory slot is read-only").into());
        }
        self.raw = Some(serde_json::to_string(movies)?);
        self.writes += 1;
        Ok(())
    }
}
