use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Instruction roles the pipeline needs from the instruction file.
///
/// The file is a flat JSON object; the historical key names are kept so
/// existing instruction files keep working.
pub const EXTRACTION_KEY: &str = "system_instruct_0";
pub const CYPHER_DRAFT_KEY: &str = "system_instruct_1";
pub const CYPHER_REPAIR_KEY: &str = "system_instruct_2";

/// System instructions loaded from a JSON file, one entry per LLM role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionSet {
    #[serde(flatten)]
    entries: HashMap<String, String>,
}

impl InstructionSet {
    /// Load instructions from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("instructions file not found: {} ({})", path.display(), e))?;
        let set: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow!("error decoding instructions from {}: {}", path.display(), e))?;
        Ok(set)
    }

    fn get(&self, key: &str) -> Result<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("missing instruction key: {}", key))
    }

    /// Instruction for the theme/relationship extraction pass (instruct model).
    pub fn extraction(&self) -> Result<&str> {
        self.get(EXTRACTION_KEY)
    }

    /// Instruction for drafting the Cypher statement (code model).
    pub fn cypher_draft(&self) -> Result<&str> {
        self.get(CYPHER_DRAFT_KEY)
    }

    /// Instruction for repairing a drafted Cypher statement (code model).
    pub fn cypher_repair(&self) -> Result<&str> {
        self.get(CYPHER_REPAIR_KEY)
    }
}
