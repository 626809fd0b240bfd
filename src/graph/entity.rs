use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An entity (theme, keyword, concept) extracted from the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for the entity
    pub id: Uuid,
    /// Display name as the model produced it
    pub name: String,
    /// Optional category label (e.g. "Theme", "Technology")
    pub category: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: None,
        }
    }

    pub fn with_category(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: Some(category.into()),
        }
    }

    /// Key used for deduplication: case-insensitive, whitespace-trimmed.
    pub fn dedup_key(&self) -> String {
        normalize_name(&self.name)
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let entity = Entity::new("Data Centers");
        assert_eq!(entity.name, "Data Centers");
        assert!(entity.category.is_none());

        let entity = Entity::with_category("Water", "Resource");
        assert_eq!(entity.category.as_deref(), Some("Resource"));
    }

    #[test]
    fn test_dedup_key_is_case_insensitive() {
        let a = Entity::new("  Data Centers ");
        let b = Entity::new("data centers");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }
}
