pub mod entity;
pub mod error;
pub mod knowledge_graph;
pub mod relation;
pub mod triples;

pub use entity::Entity;
pub use error::GraphError;
pub use knowledge_graph::KnowledgeGraph;
pub use relation::Relation;
pub use triples::parse_triples;
