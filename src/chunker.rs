use anyhow::{anyhow, Result};
use pulldown_cmark::{Event, Options, Parser, Tag};
use std::path::Path;

pub const DEFAULT_MAX_CHUNK_TOKENS: usize = 32000;

/// Approximate token count. Whitespace-separated words are close enough for
/// budgeting chunks against the model context window.
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Read a source document, rejecting empty input.
pub fn read_document(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read document {}: {}", path.display(), e))?;
    if content.trim().is_empty() {
        return Err(anyhow!("document is empty: {}", path.display()));
    }
    Ok(content)
}

/// Byte offsets where markdown headings start, used as section boundaries.
fn heading_offsets(content: &str) -> Vec<usize> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    Parser::new_ext(content, options)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::Heading(..)) => Some(range.start),
            _ => None,
        })
        .collect()
}

/// Split markdown into sections at heading boundaries. Content before the
/// first heading becomes its own section.
fn split_by_headings(content: &str) -> Vec<String> {
    let offsets = heading_offsets(content);
    if offsets.is_empty() {
        return vec![content.to_string()];
    }

    let mut sections = Vec::new();
    let mut start = 0;
    for &offset in &offsets {
        if offset > start && !content[start..offset].trim().is_empty() {
            sections.push(content[start..offset].to_string());
        }
        start = offset;
    }
    if !content[start..].trim().is_empty() {
        sections.push(content[start..].to_string());
    }
    sections
}

/// Split plain text into paragraphs at runs of blank lines.
fn split_by_paragraphs(content: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut empty_lines = 0;

    for line in content.lines() {
        if line.trim().is_empty() {
            empty_lines += 1;
            if empty_lines >= 1 && !current.trim().is_empty() {
                sections.push(current);
                current = String::new();
                empty_lines = 0;
                continue;
            }
        } else {
            empty_lines = 0;
        }
        current.push_str(line);
        current.push('\n');
    }

    if !current.trim().is_empty() {
        sections.push(current);
    }

    if sections.is_empty() {
        sections.push(content.to_string());
    }

    sections
}

/// Pack sections into chunks under the token budget, merging small
/// neighbors. A single section over budget is re-split by paragraphs first.
pub fn chunk_document(content: &str, max_tokens: usize) -> Result<Vec<String>> {
    if content.trim().is_empty() {
        return Err(anyhow!("nothing to chunk: document is empty"));
    }

    let sections = split_by_headings(content);

    let mut pieces = Vec::new();
    for section in sections {
        if count_tokens(&section) > max_tokens {
            pieces.extend(split_by_paragraphs(&section));
        } else {
            pieces.push(section);
        }
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_tokens = 0;

    for piece in pieces {
        let piece_tokens = count_tokens(&piece);

        if current_tokens + piece_tokens > max_tokens && !current.is_empty() {
            chunks.push(current);
            current = String::new();
            current_tokens = 0;
        }

        current.push_str(&piece);
        if !current.ends_with('\n') {
            current.push('\n');
        }
        current_tokens += piece_tokens;
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }

    tracing::info!(chunks = chunks.len(), "Document chunking complete");
    Ok(chunks)
}

/// Read, chunk, and concatenate a document into the extraction input.
pub fn process_document(path: &Path, max_tokens: usize) -> Result<String> {
    tracing::info!(path = %path.display(), "Starting document processing");
    let content = read_document(path)?;
    let chunks = chunk_document(&content, max_tokens)?;

    let mut input_text = String::new();
    for chunk in &chunks {
        input_text.push_str(chunk);
        if !input_text.ends_with('\n') {
            input_text.push('\n');
        }
    }

    tracing::info!("Document processing completed");
    Ok(input_text)
}
