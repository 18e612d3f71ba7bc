use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// JSON key holding the next episode.
pub const CURSOR_KEY: &str = "proximo_episodio";

/// Episode used when no valid cursor is stored.
pub const FIRST_EPISODE: u32 = 1;

/// Errors that can occur while persisting the cursor.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("Cursor I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode cursor: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CursorError {
    fn io(path: &Path, source: io::Error) -> Self {
        CursorError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[derive(Serialize)]
struct CursorFile {
    proximo_episodio: u32,
}

/// File-backed cursor store.
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next episode to fetch.
    ///
    /// Returns [`FIRST_EPISODE`] when the file is missing, unreadable, or holds
    /// anything other than a positive integer.
    pub fn load(&self) -> u32 {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    path = %self.path.display(),
                    "Cursor file not found, starting from episode {}",
                    FIRST_EPISODE
                );
                return FIRST_EPISODE;
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Cursor file unreadable, starting from episode {}",
                    FIRST_EPISODE
                );
                return FIRST_EPISODE;
            }
        };

        match parse_cursor(&contents) {
            Ok(episode) => {
                info!(path = %self.path.display(), episode, "Loaded next episode");
                episode
            }
            Err(reason) => {
                warn!(
                    path = %self.path.display(),
                    reason = %reason,
                    "Cursor file invalid or corrupted, starting from episode {}",
                    FIRST_EPISODE
                );
                FIRST_EPISODE
            }
        }
    }

    /// Persist `next` as the next episode to fetch.
    ///
    /// Writes a temp file in the destination directory, fsyncs it and renames
    /// it over the cursor file. The temp file is removed if the rename fails.
    pub fn save(&self, next: u32) -> Result<(), CursorError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| CursorError::io(dir, e))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".episodio_")
            .suffix(".json")
            .tempfile_in(dir)
            .map_err(|e| CursorError::io(dir, e))?;

        serde_json::to_writer(
            &mut tmp,
            &CursorFile {
                proximo_episodio: next,
            },
        )?;
        tmp.flush().map_err(|e| CursorError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| CursorError::io(tmp.path(), e))?;

        // On failure the returned temp file handle is dropped, which deletes it.
        tmp.persist(&self.path)
            .map_err(|e| CursorError::io(&self.path, e.error))?;

        sync_dir(dir);
        debug!(path = %self.path.display(), next, "Cursor saved");
        Ok(())
    }
}

/// Parse the cursor file body into a positive episode number.
fn parse_cursor(contents: &str) -> Result<u32, String> {
    let value: Value = serde_json::from_str(contents).map_err(|e| e.to_string())?;
    let object = value
        .as_object()
        .ok_or_else(|| "expected a JSON object".to_string())?;

    let raw = match object.get(CURSOR_KEY) {
        Some(raw) => raw,
        None => return Ok(FIRST_EPISODE),
    };

    let n = match raw {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("{} is not an integer", n))?,
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("{:?} is not an integer", s))?,
        other => return Err(format!("unexpected value {}", other)),
    };

    if n < FIRST_EPISODE as i64 {
        return Err(format!("{} is below {}", n, FIRST_EPISODE));
    }
    u32::try_from(n).map_err(|_| format!("{} is out of range", n))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        debug!(dir = %dir.display(), error = %e, "Directory fsync failed");
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
