use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::cypher::{delimit_triples, strip_code_fences, truncate_query};
use crate::external::{GraniteClient, GraphDbClient};
use crate::graph::{parse_triples, KnowledgeGraph};
use crate::instructions::InstructionSet;

/// Seam for the two Granite models so the pipeline can be exercised without
/// a live watsonx endpoint.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Instruct-model pass: extract themes/keywords/relationships.
    async fn generate_text(&self, system_instruct: &str, input_text: &str) -> Result<String>;
    /// Code-model pass: draft or repair a Cypher statement.
    async fn generate_code(&self, input_text: &str, system_instruct: &str) -> Result<String>;
}

#[async_trait]
impl TextGenerator for GraniteClient {
    async fn generate_text(&self, system_instruct: &str, input_text: &str) -> Result<String> {
        GraniteClient::generate_text(self, system_instruct, input_text).await
    }

    async fn generate_code(&self, input_text: &str, system_instruct: &str) -> Result<String> {
        GraniteClient::generate_code(self, input_text, system_instruct).await
    }
}

/// Seam for the graph database.
#[async_trait]
pub trait CypherSink: Send + Sync {
    async fn run_cypher(&self, cypher: &str) -> Result<Vec<i64>>;
}

#[async_trait]
impl CypherSink for GraphDbClient {
    async fn run_cypher(&self, cypher: &str) -> Result<Vec<i64>> {
        GraphDbClient::run_cypher(self, cypher).await
    }
}

/// How the final Cypher reached (or did not reach) the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A repaired query ran on the given 1-based attempt.
    Submitted { attempt: usize },
    /// Every repaired query failed; the truncated draft ran.
    TruncatedDraft,
    /// LLM-generated queries all failed; the deterministic render of the
    /// parsed graph ran.
    GraphRender,
    /// Submission was skipped (--skip-submit).
    Skipped,
}

/// Result of a full pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    pub extraction: String,
    pub delimited: String,
    pub final_cypher: String,
    pub entity_count: usize,
    pub relation_count: usize,
    pub outcome: SubmitOutcome,
    pub counts: Vec<i64>,
}

/// Orchestrates extract -> delimit -> parse -> draft -> repair -> submit.
pub struct GraphPipeline {
    generator: Box<dyn TextGenerator>,
    sink: Option<Box<dyn CypherSink>>,
    instructions: InstructionSet,
    retries: usize,
}

impl GraphPipeline {
    pub fn new(
        generator: Box<dyn TextGenerator>,
        sink: Option<Box<dyn CypherSink>>,
        instructions: InstructionSet,
        retries: usize,
    ) -> Self {
        Self {
            generator,
            sink,
            instructions,
            retries: retries.max(1),
        }
    }

    pub async fn run(&self, input_text: &str) -> Result<PipelineReport> {
        // Theme/keyword/relationship extraction with the instruct model.
        tracing::info!("Extracting themes and relationships");
        let extraction = self
            .generator
            .generate_text(self.instructions.extraction()?, input_text)
            .await?;
        tracing::debug!(output = %extraction, "Extraction output");

        let delimited = delimit_triples(&extraction);
        if delimited.is_empty() {
            return Err(anyhow!("instruct model produced no output to delimit"));
        }

        // Parse for reporting and for the deterministic fallback. A model
        // that ignored the output format is not fatal here; the code model
        // may still cope with the raw lines.
        let graph = match parse_triples(&delimited) {
            Ok(graph) => {
                tracing::info!(
                    entities = graph.entity_count(),
                    relations = graph.relation_count(),
                    "Parsed knowledge graph"
                );
                Some(graph)
            }
            Err(e) => {
                tracing::warn!("Could not parse triples from extraction: {}", e);
                None
            }
        };

        // Draft the Cypher with the code model.
        tracing::info!("Drafting Cypher query");
        let draft = strip_code_fences(
            &self
                .generator
                .generate_code(&delimited, self.instructions.cypher_draft()?)
                .await?,
        );
        tracing::debug!(query = %draft, "Cypher draft");

        let (final_cypher, outcome, counts) = match &self.sink {
            Some(sink) => self.submit(sink.as_ref(), &draft, graph.as_ref()).await?,
            None => {
                // Still run one repair pass so the saved artifact is the
                // best query we can produce.
                let repaired = strip_code_fences(
                    &self
                        .generator
                        .generate_code(&draft, self.instructions.cypher_repair()?)
                        .await?,
                );
                (repaired, SubmitOutcome::Skipped, Vec::new())
            }
        };

        Ok(PipelineReport {
            extraction,
            delimited,
            final_cypher,
            entity_count: graph.as_ref().map(KnowledgeGraph::entity_count).unwrap_or(0),
            relation_count: graph.as_ref().map(KnowledgeGraph::relation_count).unwrap_or(0),
            outcome,
            counts,
        })
    }

    /// Repair-and-submit loop, then the fallback chain: truncated draft,
    /// then the deterministic graph render.
    async fn submit(
        &self,
        sink: &dyn CypherSink,
        draft: &str,
        graph: Option<&KnowledgeGraph>,
    ) -> Result<(String, SubmitOutcome, Vec<i64>)> {
        for attempt in 1..=self.retries {
            let repaired = match self
                .generator
                .generate_code(draft, self.instructions.cypher_repair()?)
                .await
            {
                Ok(text) => strip_code_fences(&text),
                Err(e) => {
                    tracing::warn!(attempt, retries = self.retries, "Repair generation failed: {}", e);
                    continue;
                }
            };

            match sink.run_cypher(&repaired).await {
                Ok(counts) => {
                    tracing::info!(attempt, "Query executed successfully");
                    return Ok((repaired, SubmitOutcome::Submitted { attempt }, counts));
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        retries = self.retries,
                        "Query failed, regenerating: {}",
                        e
                    );
                }
            }
        }

        tracing::warn!("Max retries reached, attempting truncated draft");
        let truncated = truncate_query(draft);
        if !truncated.is_empty() {
            match sink.run_cypher(&truncated).await {
                Ok(counts) => return Ok((truncated, SubmitOutcome::TruncatedDraft, counts)),
                Err(e) => tracing::warn!("Truncated draft failed: {}", e),
            }
        }

        if let Some(graph) = graph {
            tracing::warn!("Falling back to deterministic graph render");
            let rendered = graph.to_cypher();
            let counts = sink.run_cypher(&rendered).await?;
            return Ok((rendered, SubmitOutcome::GraphRender, counts));
        }

        Err(anyhow!(
            "query failed after {} attempts and no fallback was available",
            self.retries
        ))
    }
}
