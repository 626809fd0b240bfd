pub mod chunker;
pub mod config;
pub mod cypher;
pub mod external;
pub mod graph;
pub mod instructions;
pub mod pipeline;

pub use config::Config;
pub use external::{ExternalError, GraniteClient, GraniteConfig, GraphDbClient, GraphDbConfig};
pub use graph::{parse_triples, Entity, GraphError, KnowledgeGraph, Relation};
pub use instructions::InstructionSet;
pub use pipeline::{GraphPipeline, PipelineReport, SubmitOutcome};
