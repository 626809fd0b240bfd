use anyhow::Result;
use regex::Regex;

use crate::cypher::TRIPLE_DELIMITER;
use crate::graph::{error::GraphError, KnowledgeGraph};

/// Parse the instruct model's node/edge/node lines into a knowledge graph.
///
/// The model is asked for pipe-separated triples, but real output drifts:
/// arrows instead of pipes, list markers, stray numbering. Lines that do not
/// yield a triple are skipped.
pub fn parse_triples(text: &str) -> Result<KnowledgeGraph> {
    let list_marker = Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+").expect("valid regex");
    let mut graph = KnowledgeGraph::new();

    for raw_line in text.lines() {
        let line = raw_line.replace(TRIPLE_DELIMITER, "");
        let line = list_marker.replace(&line, "");
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        let parts = split_triple(line);
        match parts {
            Some((from, verb, to)) => graph.add_relation(&from, &verb, &to),
            None => {
                tracing::debug!(line, "Skipping non-triple line");
            }
        }
    }

    if graph.is_empty() {
        return Err(GraphError::EmptyExtraction.into());
    }

    Ok(graph)
}

fn split_triple(line: &str) -> Option<(String, String, String)> {
    for separator in ["|", "->", "—>", ","] {
        let parts: Vec<&str> = line.split(separator).map(str::trim).collect();
        if parts.len() == 3 && parts.iter().all(|p| !p.is_empty()) {
            return Some((
                parts[0].to_string(),
                parts[1].to_string(),
                parts[2].to_string(),
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher::delimit_triples;

    #[test]
    fn test_parse_pipe_triples() {
        let text = "Data Centers|consume|Water\nWater|cools|Servers";
        let graph = parse_triples(text).unwrap();

        assert_eq!(graph.entity_count(), 3);
        assert_eq!(graph.relation_count(), 2);
        assert!(graph.get_entity("Servers").is_some());
    }

    #[test]
    fn test_parse_arrow_triples_with_list_markers() {
        let text = "- Data Centers -> consume -> Water\n2. Water -> cools -> Servers";
        let graph = parse_triples(text).unwrap();

        assert_eq!(graph.relation_count(), 2);
    }

    #[test]
    fn test_parse_delimited_output() {
        let delimited = delimit_triples("Data Centers|consume|Water\nWater|cools|Servers");
        let graph = parse_triples(&delimited).unwrap();

        assert_eq!(graph.relation_count(), 2);
        // Delimiter tokens must not leak into entity names
        assert!(graph.get_entity("Water").is_some());
    }

    #[test]
    fn test_non_triple_lines_are_skipped() {
        let text = "Here are the extracted relationships:\nData Centers|consume|Water\n";
        let graph = parse_triples(text).unwrap();

        assert_eq!(graph.entity_count(), 2);
        assert!(graph.get_entity("Here are the extracted relationships:").is_none());
    }

    #[test]
    fn test_no_triples_is_error() {
        assert!(parse_triples("nothing structured here").is_err());
        assert!(parse_triples("").is_err());
    }

    #[test]
    fn test_duplicate_entities_collapse() {
        let text = "Water|cools|Servers\nwater|powers|Turbines";
        let graph = parse_triples(text).unwrap();

        // "Water" and "water" are the same entity
        assert_eq!(graph.entity_count(), 3);
    }
}
