/// Delimiter appended to every extracted triple line. Code models keep
/// statement boundaries straighter when each node/edge/node entry carries an
/// explicit terminator.
pub const TRIPLE_DELIMITER: &str = "|<special-end-tok>|";

/// Append the delimiter token to every line of the extraction output.
/// Whitespace-only input maps to the empty string.
pub fn delimit_triples(input_text: &str) -> String {
    if input_text.trim().is_empty() {
        return String::new();
    }

    input_text
        .trim()
        .lines()
        .map(|line| format!("{} {}", line, TRIPLE_DELIMITER))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop the last line of a generated query.
///
/// Greedy decoding against a token cap tends to cut the statement off
/// mid-line; removing the final line usually leaves a runnable prefix.
pub fn truncate_query(cypher_query: &str) -> String {
    let lines: Vec<&str> = cypher_query.trim().lines().collect();
    if lines.len() <= 1 {
        return String::new();
    }
    lines[..lines.len() - 1].join("\n")
}

/// Unwrap a fenced code block if the code model added one around the query.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Skip the info string (e.g. "cypher") on the opening fence line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => return trimmed.to_string(),
    };

    body.strip_suffix("```").unwrap_or(body).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimit_appends_token_per_line() {
        let input = "Data centers|consume|Water\nWater|cools|Servers";
        let output = delimit_triples(input);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            assert!(line.ends_with(TRIPLE_DELIMITER));
        }
    }

    #[test]
    fn test_delimit_preserves_line_count() {
        let input = "a|b|c\nd|e|f\ng|h|i";
        assert_eq!(delimit_triples(input).lines().count(), input.lines().count());
    }

    #[test]
    fn test_delimit_blank_input() {
        assert_eq!(delimit_triples(""), "");
        assert_eq!(delimit_triples("   \n  "), "");
    }

    #[test]
    fn test_truncate_drops_exactly_one_line() {
        let query = "MERGE (a:Topic {name: 'Water'})\nMERGE (b:Topic {name: 'Cooling'})\nMERGE (a)-[:RE";
        let truncated = truncate_query(query);
        assert_eq!(truncated.lines().count(), 2);
        assert!(!truncated.contains("[:RE"));
    }

    #[test]
    fn test_truncate_single_line_yields_empty() {
        assert_eq!(truncate_query("MERGE (a:Topic)"), "");
        assert_eq!(truncate_query(""), "");
    }

    #[test]
    fn test_strip_code_fences() {
        let fenced = "```cypher\nMERGE (a:Topic {name: 'Water'})\n```";
        assert_eq!(strip_code_fences(fenced), "MERGE (a:Topic {name: 'Water'})");

        let bare = "MERGE (a:Topic {name: 'Water'})";
        assert_eq!(strip_code_fences(bare), bare);

        let unterminated = "```\nMERGE (n)\nRETURN count(n) as count";
        assert_eq!(
            strip_code_fences(unterminated),
            "MERGE (n)\nRETURN count(n) as count"
        );
    }
}
