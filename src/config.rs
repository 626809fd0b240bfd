use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::external::{GraniteConfig, GraphDbConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub max_chunk_tokens: usize,
    pub query_retries: usize,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub granite: GraniteConfig,
    pub graph_db: GraphDbConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
    /// IBM session token. Checked lazily so offline runs (--dry-run) work
    /// without credentials.
    pub watsonx_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let granite = GraniteConfig {
            endpoint: env::var("WATSONX_ENDPOINT")
                .unwrap_or_else(|_| "https://us-south.ml.cloud.ibm.com".to_string()),
            api_version: env::var("WATSONX_API_VERSION")
                .unwrap_or_else(|_| "2023-05-29".to_string()),
            project_id: env::var("WATSONX_PROJECT_ID").unwrap_or_default(),
            instruct_model: env::var("GRANITE_INSTRUCT_MODEL")
                .unwrap_or_else(|_| "ibm/granite-3-8b-instruct".to_string()),
            code_model: env::var("GRANITE_CODE_MODEL")
                .unwrap_or_else(|_| "ibm/granite-34b-code-instruct".to_string()),
            max_new_tokens: env::var("GRANITE_MAX_NEW_TOKENS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .unwrap_or(900),
        };

        let graph_db = GraphDbConfig {
            uri: env::var("NEO4J_URI").unwrap_or_else(|_| "bolt://localhost:7687".to_string()),
            user: env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string()),
            password: env::var("NEO4J_PASSWORD").unwrap_or_default(),
            database: env::var("NEO4J_DATABASE").unwrap_or_else(|_| "neo4j".to_string()),
        };

        let processing = ProcessingConfig {
            max_chunk_tokens: env::var("MAX_CHUNK_TOKENS")
                .unwrap_or_else(|_| "32000".to_string())
                .parse()
                .unwrap_or(32000),
            query_retries: env::var("QUERY_RETRIES")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let output = OutputConfig {
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "./output".to_string()),
        };

        let watsonx_token = env::var("WATSONX_TOKEN").ok().filter(|t| !t.trim().is_empty());

        Ok(Self {
            granite,
            graph_db,
            processing,
            output,
            watsonx_token,
        })
    }

    /// Token required for any run that talks to watsonx.
    pub fn require_token(&self) -> Result<&str> {
        self.watsonx_token
            .as_deref()
            .ok_or_else(|| anyhow!("WATSONX_TOKEN not found in environment variables"))
    }
}
