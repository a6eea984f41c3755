use serde::{Deserialize, Serialize};

/// Global identity of a tracked domain object
///
/// A `GlobalId` is the pair (entity type, local id). It is independent of
/// memory address and is the only join key between live objects, stored
/// snapshots and diff entries. Two ids are equal iff both parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId {
    entity_type: String,
    local_id: String,
}

impl GlobalId {
    /// Create a new GlobalId from an entity type name and a local id
    pub fn new(entity_type: impl Into<String>, local_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            local_id: local_id.into(),
        }
    }

    /// Name of the entity type
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Identifier unique within the entity type
    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Canonical `Type/localId` rendering, used in errors and log fields
    pub fn value(&self) -> String {
        format!("{}/{}", self.entity_type, self.local_id)
    }
}

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.entity_type, self.local_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_requires_type_and_local_id() {
        assert_eq!(GlobalId::new("Person", "1"), GlobalId::new("Person", "1"));
        assert_ne!(GlobalId::new("Person", "1"), GlobalId::new("Company", "1"));
        assert_ne!(GlobalId::new("Person", "1"), GlobalId::new("Person", "2"));
    }

    #[test]
    fn test_value_rendering() {
        let id = GlobalId::new("Person", "bob");
        assert_eq!(id.value(), "Person/bob");
        assert_eq!(id.to_string(), id.value());
    }

    #[test]
    fn test_ordering_is_type_then_local_id() {
        let mut ids = vec![
            GlobalId::new("Person", "2"),
            GlobalId::new("Company", "9"),
            GlobalId::new("Person", "1"),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                GlobalId::new("Company", "9"),
                GlobalId::new("Person", "1"),
                GlobalId::new("Person", "2"),
            ]
        );
    }
}
