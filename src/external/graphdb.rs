use anyhow::Result;
use neo4rs::{query, ConfigBuilder, Graph};
use serde::{Deserialize, Serialize};

use crate::external::error::ExternalError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDbConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for GraphDbConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
        }
    }
}

/// Neo4j client the pipeline submits generated Cypher through.
///
/// Works against both a local instance (`bolt://...`) and AuraDB
/// (`neo4j+s://...`).
pub struct GraphDbClient {
    graph: Graph,
    uri: String,
}

impl GraphDbClient {
    pub async fn connect(config: &GraphDbConfig) -> Result<Self> {
        tracing::info!(uri = %config.uri, "Connecting to Neo4j");

        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .fetch_size(500)
            .max_connections(10)
            .build()
            .map_err(|e| ExternalError::GraphDbError(format!("invalid Neo4j config: {}", e)))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| ExternalError::GraphDbError(format!("connection failed: {}", e)))?;

        // Round-trip a trivial statement so a bad URI or credentials fail
        // here rather than mid-pipeline.
        let mut result = graph
            .execute(query("RETURN 1 as ok"))
            .await
            .map_err(|e| ExternalError::GraphDbError(format!("connection test failed: {}", e)))?;
        result
            .next()
            .await
            .map_err(|e| ExternalError::GraphDbError(e.to_string()))?;

        tracing::info!("Neo4j connection established");

        Ok(Self {
            graph,
            uri: config.uri.clone(),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Execute a write statement and collect any `count` values it returns.
    pub async fn run_cypher(&self, cypher: &str) -> Result<Vec<i64>> {
        if cypher.trim().is_empty() {
            return Err(
                ExternalError::GraphDbError("refusing to run an empty statement".to_string())
                    .into(),
            );
        }

        let mut result = self
            .graph
            .execute(query(cypher))
            .await
            .map_err(|e| ExternalError::GraphDbError(e.to_string()))?;

        let mut counts = Vec::new();
        while let Some(row) = result
            .next()
            .await
            .map_err(|e| ExternalError::GraphDbError(e.to_string()))?
        {
            if let Ok(count) = row.get::<i64>("count") {
                counts.push(count);
            }
        }

        Ok(counts)
    }
}
