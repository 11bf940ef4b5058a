// JSON file persistence for the stats database.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::model::StatsDatabase;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode stats database: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("{path} is not a valid stats database: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StatsDatabase {
    /// Write the database as pretty-printed JSON, replacing `path`.
    ///
    /// The document is written to a sibling `.tmp` file first and renamed
    /// into place, so `path` is either left untouched or fully replaced.
    pub fn write(&self, path: &Path) -> Result<(), PersistenceError> {
        let tmp_path = temp_path_for(path);
        let write_err = |source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        };

        let result = self
            .write_to(&tmp_path)
            .and_then(|()| fs::rename(&tmp_path, path).map_err(write_err));
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result?;

        info!("Stats database written to {}", path.display());
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<(), PersistenceError> {
        let write_err = |source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        };

        let file = fs::File::create(path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        self.write_json(&mut writer, path)?;
        writer
            .into_inner()
            .map_err(|e| write_err(e.into_error()))?
            .sync_all()
            .map_err(write_err)
    }

    /// Encode into `writer`. I/O failures are reported against `path`.
    fn write_json<W: Write>(&self, writer: &mut W, path: &Path) -> Result<(), PersistenceError> {
        serde_json::to_writer_pretty(&mut *writer, self).map_err(|e| {
            if e.is_io() {
                PersistenceError::Write {
                    path: path.to_path_buf(),
                    source: e.into(),
                }
            } else {
                PersistenceError::Encode(e)
            }
        })?;
        writer.write_all(b"\n").map_err(|source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a database previously written by [`StatsDatabase::write`].
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let text = fs::read_to_string(path).map_err(|source| PersistenceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| PersistenceError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
