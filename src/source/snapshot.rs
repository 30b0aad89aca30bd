use directories::ProjectDirs;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{decode_array, Source};
use crate::error::{ImportError, Result};
use crate::model::RecordKind;

/// A local copy of the four datasets, one `<table>.json` file per kind
pub struct SnapshotDir {
    dir: PathBuf,
}

impl SnapshotDir {
    /// Open (and create) a snapshot directory. Defaults to the user's
    /// cache directory.
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let dir = match custom_dir {
            Some(dir) => dir,
            None => default_dir()?,
        };

        fs::create_dir_all(&dir).map_err(|source| ImportError::Io {
            path: dir.clone(),
            source,
        })?;

        Ok(Self { dir })
    }

    /// Use an existing directory as-is
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: RecordKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.table()))
    }

    /// All four dataset files are present
    pub fn is_complete(&self) -> bool {
        RecordKind::ALL.iter().all(|kind| self.path_for(*kind).exists())
    }

    /// Write a fetched payload as the dataset for `kind`
    pub fn save(&self, kind: RecordKind, records: &[Value]) -> Result<PathBuf> {
        let path = self.path_for(kind);
        let io_err = |source: std::io::Error| ImportError::Io {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, records)
            .map_err(|e| io_err(std::io::Error::from(e)))?;
        writer.flush().map_err(io_err)?;

        Ok(path)
    }
}

impl Source for SnapshotDir {
    fn fetch(&self, kind: RecordKind) -> Result<Vec<Value>> {
        let path = self.path_for(kind);
        let text = fs::read_to_string(&path).map_err(|source| ImportError::Io {
            path: path.clone(),
            source,
        })?;
        decode_array(&text, &path.display().to_string())
    }
}

fn default_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "ekatte-import").ok_or_else(|| {
        ImportError::InvalidOptions("Could not determine cache directory".to_string())
    })?;
    Ok(proj_dirs.cache_dir().join("snapshot"))
}
