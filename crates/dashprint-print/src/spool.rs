//! Per-request spool files for byte-content prints.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::{LOG_TARGET, PrintError};

const SPOOL_DIR_NAME: &str = "dashprint-spool";
const NAME_ATTEMPTS: usize = 8;

/// Directory holding one uniquely named file per byte print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolDirectory {
    root: PathBuf,
}

impl SpoolDirectory {
    /// Uses `root` as the spool directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses `dashprint-spool` under the system temp directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join(SPOOL_DIR_NAME))
    }

    /// Returns the spool directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` to a fresh `print-<hex>.html` file.
    ///
    /// Concurrent writers never share a path: names are random and the file
    /// is created with `create_new`.
    ///
    /// # Errors
    /// Returns [`PrintError::Spool`] when the directory or file cannot be
    /// created or written.
    pub fn write(&self, bytes: &[u8]) -> Result<PathBuf, PrintError> {
        fs::create_dir_all(&self.root).map_err(|source| PrintError::Spool {
            path: self.root.clone(),
            source,
        })?;

        let mut rng = rand::rng();
        let mut last_error = None;
        for _ in 0..NAME_ATTEMPTS {
            let path = self
                .root
                .join(format!("print-{:016x}.html", rng.random::<u64>()));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(bytes)
                        .and_then(|()| file.flush())
                        .map_err(|source| PrintError::Spool {
                            path: path.clone(),
                            source,
                        })?;
                    return Ok(path);
                }
                Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                    last_error = Some((path, error));
                }
                Err(source) => return Err(PrintError::Spool { path, source }),
            }
        }

        let (path, source) = last_error.unwrap_or_else(|| {
            (
                self.root.clone(),
                std::io::Error::new(ErrorKind::AlreadyExists, "no free spool name"),
            )
        });
        Err(PrintError::Spool { path, source })
    }

    /// Removes a spool file, logging failures.
    pub fn remove(&self, path: &Path) {
        if let Err(error) = fs::remove_file(path)
            && error.kind() != ErrorKind::NotFound
        {
            log::warn!(
                target: LOG_TARGET,
                "spool file {} could not be removed: {error}",
                path.display()
            );
        }
    }
}
