//! Persistent prompt → response cache.
//!
//! One JSONL file per (model, experiment). The whole file is loaded on open;
//! every new entry is appended and flushed before [`ResponseCache::put`]
//! returns, so an interrupted run resumes without paying for answered prompts.

mod key;

pub use key::cache_file_name;

use crate::errors::CacheError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One persisted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub prompt: String,
    pub response: String,
}

#[derive(Debug)]
pub struct ResponseCache {
    path: PathBuf,
    entries: HashMap<String, String>,
    file: File,
}

impl ResponseCache {
    /// Open the cache for `(model, experiment)` under `dir`, creating the
    /// directory if needed.
    pub fn open(
        dir: &Path,
        model: &str,
        experiment: &str,
        overwrite: bool,
    ) -> Result<Self, CacheError> {
        fs::create_dir_all(dir).map_err(|source| CacheError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Self::open_path(dir.join(cache_file_name(model, experiment)), overwrite)
    }

    /// With `overwrite` the file is truncated; otherwise existing records
    /// are loaded. A later record for the same prompt replaces an earlier one.
    ///
    /// A final record cut off mid-write (no trailing newline, not valid JSON)
    /// is dropped with a warning and the file is shortened to the last
    /// complete record.
    pub fn open_path(path: impl Into<PathBuf>, overwrite: bool) -> Result<Self, CacheError> {
        let path = path.into();
        let io_err = |source: std::io::Error| CacheError::Io {
            path: path.clone(),
            source,
        };

        let (entries, tail) = if overwrite || !path.exists() {
            (HashMap::new(), Tail::Clean)
        } else {
            load_records(&path)?
        };

        let mut options = OpenOptions::new();
        options.create(true);
        if overwrite {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        let mut file = options.open(&path).map_err(io_err)?;

        match tail {
            Tail::Clean => {}
            Tail::MissingNewline => file.write_all(b"\n").map_err(io_err)?,
            Tail::Torn { valid_len } => file.set_len(valid_len).map_err(io_err)?,
        }

        debug!(
            cache_path = %path.display(),
            entries = entries.len(),
            overwrite,
            "response cache opened"
        );

        Ok(Self {
            path,
            entries,
            file,
        })
    }

    pub fn get(&self, prompt: &str) -> Option<&str> {
        self.entries.get(prompt).map(String::as_str)
    }

    /// Record a response and append it to the file.
    ///
    /// Returns `false` without writing when the prompt is already cached; the
    /// first stored response is kept.
    pub fn put(&mut self, prompt: &str, response: &str) -> Result<bool, CacheError> {
        if self.entries.contains_key(prompt) {
            return Ok(false);
        }

        let record = CacheRecord {
            prompt: prompt.to_string(),
            response: response.to_string(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|source| CacheError::Io {
                path: self.path.clone(),
                source,
            })?;

        self.entries.insert(record.prompt, record.response);
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// State of the end of an existing cache file.
enum Tail {
    Clean,
    /// Last record is complete but has no trailing newline.
    MissingNewline,
    /// Last record was cut off; `valid_len` bytes precede it.
    Torn { valid_len: u64 },
}

fn load_records(path: &Path) -> Result<(HashMap<String, String>, Tail), CacheError> {
    let raw = fs::read(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries = HashMap::new();
    let mut tail = Tail::Clean;
    let mut offset = 0;
    for (idx, line) in raw.split_inclusive(|b| *b == b'\n').enumerate() {
        let start = offset;
        offset += line.len();
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let terminated = line.ends_with(b"\n");
        match serde_json::from_slice::<CacheRecord>(line) {
            Ok(record) => {
                if !terminated {
                    tail = Tail::MissingNewline;
                }
                entries.insert(record.prompt, record.response);
            }
            Err(source) if !terminated => {
                warn!(
                    cache_path = %path.display(),
                    line = idx + 1,
                    error = %source,
                    "dropping truncated cache record"
                );
                tail = Tail::Torn {
                    valid_len: start as u64,
                };
            }
            Err(source) => {
                return Err(CacheError::Malformed {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                });
            }
        }
    }
    Ok((entries, tail))
}
