//! List and array appenders.
//!
//! The common prefix and suffix are trimmed first. The remaining window is
//! aligned by longest common subsequence, unless the configured algorithm is
//! [`ListCompareAlgorithm::Simple`] or the window exceeds the cell limit, in
//! which case elements are compared index by index.
//!
//! Inside every gap between two aligned elements, the k-th removed element is
//! paired with the k-th inserted one and reported as an in-place
//! `ElementValueChange`; unpaired elements become `ValueRemoved` (old index)
//! or `ValueAdded` (new index). Walking the LCS table prefers a removal over
//! an insertion when both keep the alignment optimal.

use crate::config::{CoreConfiguration, ListCompareAlgorithm, DEFAULT_LCS_CELL_LIMIT};
use crate::diff::model::{Change, ContainerElementChange};
use crate::model::{Element, GlobalId};

/// Alignment settings shared by the list and array appenders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListDiffPolicy {
    pub algorithm: ListCompareAlgorithm,
    pub lcs_cell_limit: usize,
}

impl Default for ListDiffPolicy {
    fn default() -> Self {
        Self {
            algorithm: ListCompareAlgorithm::Levenshtein,
            lcs_cell_limit: DEFAULT_LCS_CELL_LIMIT,
        }
    }
}

impl From<&CoreConfiguration> for ListDiffPolicy {
    fn from(config: &CoreConfiguration) -> Self {
        Self {
            algorithm: config.list_compare_algorithm,
            lcs_cell_limit: config.lcs_cell_limit,
        }
    }
}

pub fn detect_list(
    global_id: &GlobalId,
    property: &str,
    previous: &[Element],
    current: &[Element],
    policy: &ListDiffPolicy,
) -> Option<Change> {
    let changes = diff_sequences(previous, current, policy);
    if changes.is_empty() {
        return None;
    }
    Some(Change::ListChange {
        global_id: global_id.clone(),
        property: property.to_string(),
        changes,
    })
}

pub fn detect_array(
    global_id: &GlobalId,
    property: &str,
    previous: &[Element],
    current: &[Element],
    policy: &ListDiffPolicy,
) -> Option<Change> {
    let changes = diff_sequences(previous, current, policy);
    if changes.is_empty() {
        return None;
    }
    Some(Change::ArrayChange {
        global_id: global_id.clone(),
        property: property.to_string(),
        changes,
    })
}

/// Element-level edit script turning `old` into `new`
pub fn diff_sequences(
    old: &[Element],
    new: &[Element],
    policy: &ListDiffPolicy,
) -> Vec<ContainerElementChange> {
    if policy.algorithm == ListCompareAlgorithm::Simple {
        return positional(old, new);
    }

    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let old_window = &old[prefix..old.len() - suffix];
    let new_window = &new[prefix..new.len() - suffix];

    if old_window.is_empty() && new_window.is_empty() {
        return Vec::new();
    }
    if old_window.len().saturating_mul(new_window.len()) > policy.lcs_cell_limit {
        tracing::debug!(
            old_len = old.len(),
            new_len = new.len(),
            "List too large for LCS alignment, comparing positionally"
        );
        return positional(old, new);
    }

    lcs_script(old_window, new_window, prefix)
}

/// Index-by-index comparison
fn positional(old: &[Element], new: &[Element]) -> Vec<ContainerElementChange> {
    let mut changes = Vec::new();
    for index in 0..old.len().max(new.len()) {
        match (old.get(index), new.get(index)) {
            (Some(left), Some(right)) if left != right => {
                changes.push(ContainerElementChange::ElementValueChange {
                    index,
                    left: left.clone(),
                    right: right.clone(),
                });
            }
            (Some(value), None) => changes.push(ContainerElementChange::ValueRemoved {
                index: Some(index),
                value: value.clone(),
            }),
            (None, Some(value)) => changes.push(ContainerElementChange::ValueAdded {
                index: Some(index),
                value: value.clone(),
            }),
            _ => {}
        }
    }
    changes
}

/// LCS alignment of two windows that start at `offset` in both sequences
fn lcs_script(old: &[Element], new: &[Element], offset: usize) -> Vec<ContainerElementChange> {
    let (n, m) = (old.len(), new.len());
    let width = m + 1;

    // table[i * width + j] = LCS length of old[i..] and new[j..]
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if old[i] == new[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut gap = Gap::default();
    let mut changes = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            gap.flush(old, new, offset, &mut changes);
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            gap.removed.push(i);
            i += 1;
        } else {
            gap.inserted.push(j);
            j += 1;
        }
    }
    gap.removed.extend(i..n);
    gap.inserted.extend(j..m);
    gap.flush(old, new, offset, &mut changes);
    changes
}

/// Unaligned window positions between two aligned elements
#[derive(Default)]
struct Gap {
    removed: Vec<usize>,
    inserted: Vec<usize>,
}

impl Gap {
    fn flush(
        &mut self,
        old: &[Element],
        new: &[Element],
        offset: usize,
        changes: &mut Vec<ContainerElementChange>,
    ) {
        let paired = self.removed.len().min(self.inserted.len());
        for (&r, &a) in self.removed.iter().zip(&self.inserted) {
            changes.push(ContainerElementChange::ElementValueChange {
                index: offset + a,
                left: old[r].clone(),
                right: new[a].clone(),
            });
        }
        for &r in &self.removed[paired..] {
            changes.push(ContainerElementChange::ValueRemoved {
                index: Some(offset + r),
                value: old[r].clone(),
            });
        }
        for &a in &self.inserted[paired..] {
            changes.push(ContainerElementChange::ValueAdded {
                index: Some(offset + a),
                value: new[a].clone(),
            });
        }
        self.removed.clear();
        self.inserted.clear();
    }
}
