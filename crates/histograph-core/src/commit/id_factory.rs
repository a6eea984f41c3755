use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::{HistographError, Result};
use crate::model::CommitId;

/// Allocates unique, increasing commit ids
///
/// One instance is shared by every concurrent commit. Allocation order is the
/// only ordering guarantee; an id taken by a commit that later fails is never
/// handed out again.
#[derive(Debug, Default)]
pub struct CommitIdFactory {
    last_major: AtomicU64,
}

impl CommitIdFactory {
    /// Continue numbering after `start_after` (typically the repository head)
    pub fn new(start_after: Option<CommitId>) -> Self {
        Self {
            last_major: AtomicU64::new(start_after.map_or(0, |id| id.major())),
        }
    }

    /// # Errors
    ///
    /// `CommitIdExhausted` once the id space is used up.
    pub fn next_id(&self) -> Result<CommitId> {
        let previous = self
            .last_major
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map_err(|_| HistographError::CommitIdExhausted)?;
        Ok(CommitId::new(previous + 1, 0))
    }

    /// Most recently allocated id, if any
    pub fn last_id(&self) -> Option<CommitId> {
        match self.last_major.load(Ordering::SeqCst) {
            0 => None,
            major => Some(CommitId::new(major, 0)),
        }
    }
}
