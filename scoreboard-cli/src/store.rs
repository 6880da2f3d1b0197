/// Append-only JSONL store mirroring engine mutations.
///
/// Each line is one operation: a submission or a removal by name. Replaying
/// the log in order rebuilds the insertion-ordered entry list, which
/// `Leaderboard::from_entries()` turns back into the live board. Ranking is
/// never persisted; it is always recomputed in memory.
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use scoreboard_core::Entry;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record on line {line} of {path}: {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Record {
    Submit {
        name: String,
        score: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<String>,
    },
    Remove {
        name: String,
    },
}

pub struct JsonlStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlStore {
    /// Open (or create) the log for appending.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;
        Ok(JsonlStore { path, file: Mutex::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_submit(&self, entry: &Entry) -> Result<(), StoreError> {
        self.append(&Record::Submit {
            name: entry.name.clone(),
            score: entry.score,
            time: entry.submitted_at.clone(),
        })
    }

    pub fn append_remove(&self, name: &str) -> Result<(), StoreError> {
        self.append(&Record::Remove { name: name.to_string() })
    }

    fn append(&self, record: &Record) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)?;
        let mut f = self.file.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(f, "{line}")
            .and_then(|_| f.flush())
            .map_err(|source| StoreError::Io { path: self.path.clone(), source })
    }

    /// Replay the log into insertion-ordered entries.
    ///
    /// A missing file is an empty board. Blank lines are skipped.
    pub fn load(path: &Path) -> Result<Vec<Entry>, StoreError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
        };

        let mut entries = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(&line).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
            match record {
                Record::Submit { name, score, time } => entries.push(Entry::new(name, score, time)),
                Record::Remove { name } => entries.retain(|e| e.name != name),
            }
        }
        Ok(entries)
    }
}
