use anyhow::{anyhow, Result};
use async_trait::async_trait;
use mockall::mock;
use mockall::predicate;
use std::fs;

use llm_graph_builder::chunker;
use llm_graph_builder::instructions::InstructionSet;
use llm_graph_builder::pipeline::{CypherSink, GraphPipeline, SubmitOutcome, TextGenerator};

mock! {
    pub Generator {}

    #[async_trait]
    impl TextGenerator for Generator {
        async fn generate_text(&self, system_instruct: &str, input_text: &str) -> Result<String>;
        async fn generate_code(&self, input_text: &str, system_instruct: &str) -> Result<String>;
    }
}

mock! {
    pub Sink {}

    #[async_trait]
    impl CypherSink for Sink {
        async fn run_cypher(&self, cypher: &str) -> Result<Vec<i64>>;
    }
}

fn test_instructions() -> InstructionSet {
    serde_json::from_str(
        r#"{
            "system_instruct_0": "Extract node|edge|node triples.",
            "system_instruct_1": "Write a Cypher MERGE statement for the triples.",
            "system_instruct_2": "Fix any syntax errors in the Cypher statement."
        }"#,
    )
    .unwrap()
}

const DOC: &str = "# Environmental impact of data centers\n\n\
                   Data centers consume water for evaporative cooling.\n\n\
                   ## Power\n\nRegional grids supply the power.\n";

const EXTRACTION: &str =
    "Data Centers|consume|Water\nWater|enables|Evaporative Cooling\nGrids|supply|Power";

const QUERY: &str = "MERGE (a:Entity {name: 'Data Centers'})\n\
                     MERGE (b:Entity {name: 'Water'})\n\
                     MERGE (a)-[:CONSUME]->(b)\n\
                     RETURN count(*) as count";

/// Full path from a document on disk to a submitted query, with the models
/// and the database mocked out.
#[tokio::test]
async fn test_document_to_submitted_query() {
    let temp_dir = tempfile::tempdir().unwrap();
    let doc_path = temp_dir.path().join("doc.md");
    fs::write(&doc_path, DOC).unwrap();

    let input_text = chunker::process_document(&doc_path, 32000).unwrap();
    assert!(input_text.contains("evaporative cooling"));

    let mut generator = MockGenerator::new();
    generator
        .expect_generate_text()
        .with(
            predicate::eq("Extract node|edge|node triples."),
            predicate::function(|input: &str| input.contains("Regional grids")),
        )
        .times(1)
        .returning(|_, _| Ok(EXTRACTION.to_string()));
    generator
        .expect_generate_code()
        .with(
            // The code model sees the delimited triples, not the raw output.
            predicate::function(|input: &str| input.contains("|<special-end-tok>|")),
            predicate::eq("Write a Cypher MERGE statement for the triples."),
        )
        .times(1)
        .returning(|_, _| Ok(QUERY.to_string()));
    generator
        .expect_generate_code()
        .with(
            predicate::always(),
            predicate::eq("Fix any syntax errors in the Cypher statement."),
        )
        .times(1)
        .returning(|_, _| Ok(QUERY.to_string()));

    let mut sink = MockSink::new();
    sink.expect_run_cypher()
        .with(predicate::eq(QUERY))
        .times(1)
        .returning(|_| Ok(vec![3]));

    let pipeline = GraphPipeline::new(
        Box::new(generator),
        Some(Box::new(sink)),
        test_instructions(),
        4,
    );

    let report = pipeline.run(&input_text).await.unwrap();

    assert_eq!(report.outcome, SubmitOutcome::Submitted { attempt: 1 });
    assert_eq!(report.entity_count, 5);
    assert_eq!(report.relation_count, 3);
    assert_eq!(report.counts, vec![3]);
    assert_eq!(report.extraction, EXTRACTION);
    assert_eq!(
        report.delimited.lines().count(),
        EXTRACTION.lines().count()
    );
}

/// The retry loop gives up after the configured number of attempts and
/// falls back rather than looping forever.
#[tokio::test]
async fn test_retries_are_bounded() {
    let mut generator = MockGenerator::new();
    generator
        .expect_generate_text()
        .returning(|_, _| Ok(EXTRACTION.to_string()));
    generator
        .expect_generate_code()
        .with(
            predicate::always(),
            predicate::eq("Write a Cypher MERGE statement for the triples."),
        )
        .times(1)
        .returning(|_, _| Ok(QUERY.to_string()));
    generator
        .expect_generate_code()
        .with(
            predicate::always(),
            predicate::eq("Fix any syntax errors in the Cypher statement."),
        )
        .times(3)
        .returning(|_, _| Ok(QUERY.to_string()));

    let mut sink = MockSink::new();
    // 3 repaired attempts + 1 truncated draft, all rejected; the
    // deterministic render is accepted.
    sink.expect_run_cypher()
        .with(predicate::function(|q: &str| !q.starts_with("MERGE (e0")))
        .times(4)
        .returning(|_| Err(anyhow!("syntax error")));
    sink.expect_run_cypher()
        .with(predicate::function(|q: &str| q.starts_with("MERGE (e0")))
        .times(1)
        .returning(|_| Ok(vec![5]));

    let pipeline = GraphPipeline::new(
        Box::new(generator),
        Some(Box::new(sink)),
        test_instructions(),
        3,
    );

    let report = pipeline.run("doc text").await.unwrap();
    assert_eq!(report.outcome, SubmitOutcome::GraphRender);
}

/// A generator error propagates out of the pipeline.
#[tokio::test]
async fn test_extraction_error_propagates() {
    let mut generator = MockGenerator::new();
    generator
        .expect_generate_text()
        .times(1)
        .returning(|_, _| Err(anyhow!("API Error")));

    let pipeline = GraphPipeline::new(Box::new(generator), None, test_instructions(), 4);
    assert!(pipeline.run("doc text").await.is_err());
}
