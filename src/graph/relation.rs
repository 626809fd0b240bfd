use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A directed relationship between two entities, labeled with the verb the
/// model extracted (e.g. "consumes", "impacts").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Source entity ID
    pub from: Uuid,
    /// Target entity ID
    pub to: Uuid,
    /// Relationship label
    pub verb: String,
}

impl Relation {
    pub fn new(from: Uuid, to: Uuid, verb: impl Into<String>) -> Self {
        Self {
            from,
            to,
            verb: verb.into(),
        }
    }

    /// Relationship type suitable for Cypher: uppercased, non-alphanumerics
    /// collapsed to underscores.
    pub fn cypher_type(&self) -> String {
        let mut out = String::with_capacity(self.verb.len());
        let mut last_underscore = false;
        for c in self.verb.trim().chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_uppercase());
                last_underscore = false;
            } else if !last_underscore && !out.is_empty() {
                out.push('_');
                last_underscore = true;
            }
        }
        let out = out.trim_end_matches('_').to_string();
        if out.is_empty() {
            "RELATED_TO".to_string()
        } else {
            out
        }
    }
}
