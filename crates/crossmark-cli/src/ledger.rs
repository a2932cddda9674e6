//! Append-only JSONL record of accepted matches.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crossmark_core::{DecisionPath, MatchDecision, Result};

/// One persisted match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub left_key: String,
    pub right_key: String,
    pub left_event: String,
    pub right_event: String,
    pub left_source: String,
    pub right_source: String,
    pub confidence: f32,
    pub reason: String,
    pub path: DecisionPath,
    pub run_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    fn from_decision(run_id: Uuid, decision: &MatchDecision) -> Self {
        Self {
            left_key: decision.left.key().to_string(),
            right_key: decision.right.key().to_string(),
            left_event: decision.left.event.clone(),
            right_event: decision.right.event.clone(),
            left_source: decision.left.source.clone(),
            right_source: decision.right.source.clone(),
            confidence: decision.confidence,
            reason: decision.reason.clone(),
            path: decision.path,
            run_id,
            recorded_at: Utc::now(),
        }
    }
}

/// Match ledger deduplicated by `(left key, right key)`.
#[derive(Debug)]
pub struct MatchLedger {
    path: PathBuf,
    seen: HashSet<(String, String)>,
}

impl MatchLedger {
    /// Open the ledger at `path`, loading the pairs already recorded.
    ///
    /// A missing file is created empty. Unparseable lines are skipped. Fails
    /// when the file cannot be opened for appending.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut seen = HashSet::new();
        append_handle(&path)?;

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<LedgerEntry>(&line) {
                    Ok(entry) => {
                        seen.insert((entry.left_key, entry.right_key));
                    }
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            line = line_no + 1,
                            error = %e,
                            "Skipping ledger line"
                        );
                    }
                }
            }
        }

        debug!(path = %path.display(), entries = seen.len(), "Ledger opened");
        Ok(Self { path, seen })
    }

    /// Number of recorded pairs.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Persist `decision` unless its pair is already recorded. Returns true
    /// when the decision was new.
    pub fn record(&mut self, run_id: Uuid, decision: &MatchDecision) -> Result<bool> {
        let key = pair_key(decision);
        if self.seen.contains(&key) {
            return Ok(false);
        }

        let mut line = serde_json::to_string(&LedgerEntry::from_decision(run_id, decision))?;
        line.push('\n');
        let mut file = append_handle(&self.path)?;
        file.write_all(line.as_bytes())?;

        self.seen.insert(key);
        Ok(true)
    }
}

fn append_handle(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

fn pair_key(decision: &MatchDecision) -> (String, String) {
    (
        decision.left.key().to_string(),
        decision.right.key().to_string(),
    )
}
