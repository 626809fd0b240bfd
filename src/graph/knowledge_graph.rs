use petgraph::{
    graph::{DiGraph, NodeIndex},
    Direction,
};
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::graph::{
    entity::{normalize_name, Entity},
    relation::Relation,
};

/// The extracted knowledge graph: entities as nodes, labeled relationships
/// as directed edges.
pub struct KnowledgeGraph {
    /// The underlying graph structure
    graph: DiGraph<Entity, Relation>,
    /// Mapping from normalized entity name to node index
    name_map: HashMap<String, NodeIndex>,
}

impl Default for KnowledgeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            name_map: HashMap::new(),
        }
    }

    /// Add an entity, deduplicating by normalized name. Returns the node
    /// index of the new or existing entity.
    pub fn add_entity(&mut self, entity: Entity) -> NodeIndex {
        let key = entity.dedup_key();
        if let Some(idx) = self.name_map.get(&key) {
            return *idx;
        }
        let idx = self.graph.add_node(entity);
        self.name_map.insert(key, idx);
        idx
    }

    /// Add a relation between two entities by name, creating either endpoint
    /// if it does not exist yet.
    pub fn add_relation(&mut self, from_name: &str, verb: &str, to_name: &str) {
        let from_idx = self.add_entity(Entity::new(from_name.trim()));
        let to_idx = self.add_entity(Entity::new(to_name.trim()));

        let from_id = self.graph[from_idx].id;
        let to_id = self.graph[to_idx].id;
        self.graph
            .add_edge(from_idx, to_idx, Relation::new(from_id, to_id, verb.trim()));
    }

    pub fn get_entity(&self, name: &str) -> Option<&Entity> {
        self.name_map
            .get(&normalize_name(name))
            .map(|idx| &self.graph[*idx])
    }

    /// Entities this entity points at, with the relation verb.
    pub fn outgoing(&self, name: &str) -> Vec<(&Relation, &Entity)> {
        let Some(idx) = self.name_map.get(&normalize_name(name)) else {
            return Vec::new();
        };

        self.graph
            .neighbors_directed(*idx, Direction::Outgoing)
            .filter_map(|target| {
                let edge = self.graph.find_edge(*idx, target)?;
                Some((&self.graph[edge], &self.graph[target]))
            })
            .collect()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.graph.edge_indices().map(|idx| &self.graph[idx])
    }

    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Render the graph as a parameter-free Cypher statement. Used as the
    /// deterministic fallback when the code model cannot produce a runnable
    /// query.
    pub fn to_cypher(&self) -> String {
        let mut out = String::new();
        let mut vars: HashMap<NodeIndex, String> = HashMap::new();

        for (i, idx) in self.graph.node_indices().enumerate() {
            let entity = &self.graph[idx];
            let var = format!("e{}", i);
            let label = entity
                .category
                .as_deref()
                .map(sanitize_label)
                .unwrap_or_else(|| "Entity".to_string());
            let _ = writeln!(
                out,
                "MERGE ({}:{} {{name: '{}'}})",
                var,
                label,
                escape_string(&entity.name)
            );
            vars.insert(idx, var);
        }

        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                let relation = &self.graph[edge];
                let _ = writeln!(
                    out,
                    "MERGE ({})-[:{}]->({})",
                    vars[&from],
                    relation.cypher_type(),
                    vars[&to]
                );
            }
        }

        out.push_str("RETURN count(*) as count");
        out
    }
}

fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "Entity".to_string()
    } else {
        cleaned
    }
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
