use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use llm_graph_builder::chunker;
use llm_graph_builder::config::Config;
use llm_graph_builder::external::{GraniteClient, GraphDbClient};
use llm_graph_builder::instructions::InstructionSet;
use llm_graph_builder::pipeline::{CypherSink, GraphPipeline, SubmitOutcome, TextGenerator};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source document to build the knowledge graph from (markdown or text)
    document: PathBuf,

    /// Path to the system instructions JSON file
    #[arg(short = 'i', long, default_value = "instructions.json")]
    instructions: PathBuf,

    /// Output directory for pipeline artifacts
    #[arg(short = 'd', long)]
    output_dir: Option<String>,

    /// watsonx API endpoint
    #[arg(short = 'e', long)]
    endpoint: Option<String>,

    /// Neo4j connection URI
    #[arg(long)]
    neo4j_uri: Option<String>,

    /// Chunk the document and write the extraction input, without calling
    /// any external service
    #[arg(long)]
    dry_run: bool,

    /// Generate the Cypher query but do not submit it to Neo4j
    #[arg(long)]
    skip_submit: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(output_dir) = &args.output_dir {
        config.output.output_dir = output_dir.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.granite.endpoint = endpoint.clone();
    }
    if let Some(uri) = &args.neo4j_uri {
        config.graph_db.uri = uri.clone();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.processing.log_level.clone())),
        )
        .init();

    let output_dir = PathBuf::from(&config.output.output_dir);
    std::fs::create_dir_all(&output_dir)?;

    println!("Welcome to LLM Graph Builder!");
    println!("Document: {:?}", args.document);

    // Document chunking
    println!("\nProcessing document...");
    let input_text = chunker::process_document(&args.document, config.processing.max_chunk_tokens)?;
    let input_path = output_dir.join("extraction_input.txt");
    std::fs::write(&input_path, &input_text)?;
    println!(
        "Extraction input ready ({} words), saved to {:?}",
        chunker::count_tokens(&input_text),
        input_path
    );

    if args.dry_run {
        println!("\nDry run requested, stopping before model calls.");
        return Ok(());
    }

    let token = config.require_token()?;
    println!("**IBM TOKEN LOADED**");

    let instruction_set = InstructionSet::load(&args.instructions)?;

    let generator: Box<dyn TextGenerator> =
        Box::new(GraniteClient::new(config.granite.clone(), token.to_string())?);

    let sink: Option<Box<dyn CypherSink>> = if args.skip_submit {
        println!("Skipping Neo4j submission (--skip-submit).");
        None
    } else {
        Some(Box::new(GraphDbClient::connect(&config.graph_db).await?))
    };

    let pipeline = GraphPipeline::new(
        generator,
        sink,
        instruction_set,
        config.processing.query_retries,
    );

    println!("\nRunning extraction pipeline...");
    let report = pipeline.run(&input_text).await?;

    // Save artifacts
    std::fs::write(output_dir.join("extraction.txt"), &report.extraction)?;
    std::fs::write(output_dir.join("triples_delimited.txt"), &report.delimited)?;
    std::fs::write(output_dir.join("query.cypher"), &report.final_cypher)?;

    println!("\nKnowledge graph extracted:");
    println!("--------------------------------");
    println!("Entities:  {}", report.entity_count);
    println!("Relations: {}", report.relation_count);
    match &report.outcome {
        SubmitOutcome::Submitted { attempt } => {
            println!("Query executed successfully (attempt {}).", attempt);
        }
        SubmitOutcome::TruncatedDraft => {
            println!("Repaired queries failed; truncated draft executed.");
        }
        SubmitOutcome::GraphRender => {
            println!("Generated queries failed; deterministic render executed.");
        }
        SubmitOutcome::Skipped => {
            println!("Submission skipped.");
        }
    }
    for count in &report.counts {
        println!("{}", count);
    }
    if !matches!(report.outcome, SubmitOutcome::Skipped) {
        println!("Neo4j updated.");
    }
    println!("--------------------------------");
    println!("Artifacts saved to: {:?}", output_dir);

    Ok(())
}
