//! Heuristic pre-filter for candidate pairs.
//!
//! The guard only vetoes. It rejects pairs that name different years, or
//! different members of a mutually-exclusive entity cluster, before any
//! verification tier spends time on them.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crossmark_core::text::{extract_years, normalize_tokens, years_conflict};
use crossmark_core::MarketRecord;

/// Entity clusters whose members can never describe the same market.
pub const DEFAULT_CLUSTERS: &[&[&str]] = &[
    &["bitcoin", "ethereum", "solana"],
    &["trump", "harris", "biden"],
    &["republican", "democrat"],
    &["nfl", "nba", "mlb"],
];

/// Why the guard rejected a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Veto {
    /// Both sides name years and share none.
    YearMismatch {
        left: BTreeSet<u16>,
        right: BTreeSet<u16>,
    },
    /// Both sides name members of one cluster and share none.
    EntityConflict {
        left: BTreeSet<String>,
        right: BTreeSet<String>,
    },
}

impl fmt::Display for Veto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: ToString>(set: &BTreeSet<T>) -> String {
            set.iter().map(T::to_string).collect::<Vec<_>>().join(",")
        }
        match self {
            Self::YearMismatch { left, right } => {
                write!(f, "year mismatch ({} vs {})", join(left), join(right))
            }
            Self::EntityConflict { left, right } => {
                write!(f, "entity conflict ({} vs {})", join(left), join(right))
            }
        }
    }
}

/// Deterministic year and entity veto.
#[derive(Debug, Clone)]
pub struct HeuristicGuard {
    clusters: Vec<HashSet<String>>,
}

impl Default for HeuristicGuard {
    fn default() -> Self {
        Self::with_clusters(DEFAULT_CLUSTERS.iter().map(|c| c.iter().copied()))
    }
}

impl HeuristicGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a guard over custom clusters. Members are compared after alias
    /// normalization, so they should be canonical lowercase tokens.
    pub fn with_clusters<C, I, S>(clusters: C) -> Self
    where
        C: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            clusters: clusters
                .into_iter()
                .map(|c| c.into_iter().map(Into::into).collect())
                .filter(|c: &HashSet<String>| !c.is_empty())
                .collect(),
        }
    }

    /// Return the reason `left` and `right` cannot match, if any.
    pub fn check(&self, left: &MarketRecord, right: &MarketRecord) -> Option<Veto> {
        let left_text = left.text();
        let right_text = right.text();

        let left_years = extract_years(&left_text);
        let right_years = extract_years(&right_text);
        if years_conflict(&left_years, &right_years) {
            return Some(Veto::YearMismatch {
                left: left_years,
                right: right_years,
            });
        }

        let left_tokens = normalize_tokens(&left_text);
        let right_tokens = normalize_tokens(&right_text);
        for cluster in &self.clusters {
            let l: BTreeSet<String> = cluster.intersection(&left_tokens).cloned().collect();
            let r: BTreeSet<String> = cluster.intersection(&right_tokens).cloned().collect();
            if !l.is_empty() && !r.is_empty() && l.is_disjoint(&r) {
                return Some(Veto::EntityConflict { left: l, right: r });
            }
        }

        None
    }

    /// True when the pair survives the guard.
    pub fn allows(&self, left: &MarketRecord, right: &MarketRecord) -> bool {
        self.check(left, right).is_none()
    }
}
