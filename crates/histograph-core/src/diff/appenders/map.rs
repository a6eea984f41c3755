use std::collections::BTreeMap;

use crate::diff::model::{Change, EntryChange};
use crate::model::{Element, GlobalId};

/// Key-wise comparison, walking the union of keys in key order
pub fn detect(
    global_id: &GlobalId,
    property: &str,
    previous: &BTreeMap<Element, Element>,
    current: &BTreeMap<Element, Element>,
) -> Option<Change> {
    let mut prev = previous.iter().peekable();
    let mut cur = current.iter().peekable();
    let mut changes = Vec::new();

    loop {
        let order = match (prev.peek(), cur.peek()) {
            (None, None) => break,
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (Some((pk, _)), Some((ck, _))) => pk.cmp(ck),
        };
        match order {
            std::cmp::Ordering::Less => {
                if let Some((key, value)) = prev.next() {
                    changes.push(EntryChange::EntryRemoved {
                        key: key.clone(),
                        value: value.clone(),
                    });
                }
            }
            std::cmp::Ordering::Greater => {
                if let Some((key, value)) = cur.next() {
                    changes.push(EntryChange::EntryAdded {
                        key: key.clone(),
                        value: value.clone(),
                    });
                }
            }
            std::cmp::Ordering::Equal => {
                if let (Some((key, left)), Some((_, right))) = (prev.next(), cur.next()) {
                    if left != right {
                        changes.push(EntryChange::EntryValueChange {
                            key: key.clone(),
                            left: left.clone(),
                            right: right.clone(),
                        });
                    }
                }
            }
        }
    }

    if changes.is_empty() {
        return None;
    }
    Some(Change::MapChange {
        global_id: global_id.clone(),
        property: property.to_string(),
        changes,
    })
}
