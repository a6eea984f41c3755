use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Commit identifier
///
/// Totally ordered by `(major, minor)`; a larger id means the commit was
/// allocated later. Ids produced by [`CommitIdFactory`](crate::commit::CommitIdFactory)
/// always have `minor == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitId {
    major: u64,
    minor: u32,
}

impl CommitId {
    pub fn new(major: u64, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Who committed, when, with which tags
///
/// Shared (behind an `Arc`) by every snapshot produced in the same commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMetadata {
    author: String,
    properties: BTreeMap<String, String>,
    commit_date: DateTime<Utc>,
    id: CommitId,
}

impl CommitMetadata {
    pub fn new(
        author: impl Into<String>,
        properties: BTreeMap<String, String>,
        commit_date: DateTime<Utc>,
        id: CommitId,
    ) -> Self {
        Self {
            author: author.into(),
            properties,
            commit_date,
            id,
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Caller-supplied free-form tags
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn commit_date(&self) -> DateTime<Utc> {
        self.commit_date
    }

    pub fn id(&self) -> CommitId {
        self.id
    }
}
