//! Short-term and long-term interaction memory
//!
//! Short-term memory is a single slot on the caller's [`Session`],
//! overwritten every run. Long-term memory is a JSON array of
//! [`InteractionRecord`]s in one file, read in full and rewritten in full
//! on every append.
//!
//! The long-term file is not locked. Two processes appending at once can
//! lose one of the appends (last writer wins on the whole array).

use kiln_core::{InteractionRecord, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Session-scoped state owned by the caller.
///
/// Dropping the session discards its short-term memory.
#[derive(Debug, Clone, Default)]
pub struct Session {
    last_interaction: Option<InteractionRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record from the most recent successful run in this session
    pub fn last_interaction(&self) -> Option<&InteractionRecord> {
        self.last_interaction.as_ref()
    }

    pub fn set_last_interaction(&mut self, record: InteractionRecord) {
        self.last_interaction = Some(record);
    }

    pub fn clear(&mut self) {
        self.last_interaction = None;
    }
}

/// Append-only history of interactions in a single JSON file
#[derive(Debug, Clone)]
pub struct LongTermStore {
    path: PathBuf,
}

impl LongTermStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole history.
    ///
    /// A missing, unreadable or unparsable file reads as an empty history.
    pub fn load(&self) -> Vec<InteractionRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(file = %self.path.display(), error = %e, "Could not read memory file, starting empty");
                }
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!(file = %self.path.display(), error = %e, "Memory file is not a valid record list, starting empty");
                Vec::new()
            }
        }
    }

    /// Read, append `record`, and rewrite the whole file
    pub fn append(&self, record: InteractionRecord) -> Result<usize> {
        let mut records = self.load();
        records.push(record);
        self.write_all(&records)?;
        Ok(records.len())
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_all(&self, records: &[InteractionRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Records each run into both memory tiers
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    long_term: LongTermStore,
}

impl MemoryLedger {
    pub fn new(long_term: LongTermStore) -> Self {
        Self { long_term }
    }

    /// Ledger backed by the JSON file at `path`
    pub fn at<P: AsRef<Path>>(path: P) -> Self {
        Self::new(LongTermStore::new(path))
    }

    pub fn long_term(&self) -> &LongTermStore {
        &self.long_term
    }

    /// Overwrite the session slot, then append to long-term history
    pub fn record(&self, session: &mut Session, entry: InteractionRecord) -> Result<()> {
        session.set_last_interaction(entry.clone());
        let total = self.long_term.append(entry)?;
        info!(file = %self.long_term.path().display(), total, "Appended interaction to memory");
        Ok(())
    }

    /// The full long-term history, oldest first
    pub fn history(&self) -> Vec<InteractionRecord> {
        self.long_term.load()
    }

    /// Past interactions whose original prompt contains `query` (case-insensitive)
    pub fn recall(&self, query: &str) -> Vec<InteractionRecord> {
        let needle = query.to_lowercase();
        self.history()
            .into_iter()
            .filter(|r| r.prompt.to_lowercase().contains(&needle))
            .collect()
    }
}
