//! Citation construction from raw search results.
//!
//! Stored files are content-addressed, so the path in a search result's
//! metadata carries a generated id rather than the name the user uploaded.
//! Recovery scans the request's descriptors for a file item that plausibly
//! produced the stored file, using three matching strategies in a fixed
//! priority order. Strategy (iii) matches by substring in the other
//! direction and can false-positive on very short content ids; the order
//! and semantics are kept as-is deliberately.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::entity::{KnowledgeBaseDescriptor, SearchResult};

/// A response-facing citation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based rank, reassigned after the final sort
    pub id: usize,
    #[serde(rename = "type")]
    pub citation_type: String,
    pub title: String,
    pub content: String,
    pub score: f32,
    /// Raw source path from the search result metadata
    pub url: String,
}

const CITATION_TYPE: &str = "knowledge";

/// Build the deduplicated, ranked citation list for a set of search
/// results. Pure; scan order over descriptors and items is exactly the
/// order they were supplied in the request.
pub fn build_citations(
    results: &[SearchResult],
    bases: &[KnowledgeBaseDescriptor],
) -> Vec<Citation> {
    let mut citations: Vec<Citation> = Vec::new();
    // title -> index into `citations`, preserving first-seen group order
    let mut by_title: HashMap<String, usize> = HashMap::new();

    for (position, result) in results.iter().enumerate() {
        let source = result.metadata.source.as_deref().unwrap_or("");
        let title = derive_title(source, bases, position);

        let candidate = Citation {
            id: 0,
            citation_type: CITATION_TYPE.to_string(),
            title: title.clone(),
            content: result.page_content.clone(),
            score: result.score,
            url: source.to_string(),
        };

        match by_title.get(&title) {
            Some(&idx) => {
                // Keep the highest-scoring entry per title; ties keep the
                // earlier one
                if candidate.score > citations[idx].score {
                    citations[idx] = candidate;
                }
            }
            None => {
                by_title.insert(title, citations.len());
                citations.push(candidate);
            }
        }
    }

    citations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    for (i, citation) in citations.iter_mut().enumerate() {
        citation.id = i + 1;
    }

    citations
}

fn derive_title(source: &str, bases: &[KnowledgeBaseDescriptor], position: usize) -> String {
    if source.is_empty() {
        return format!("document {}", position + 1);
    }

    let guid_filename = last_path_segment(source);
    let file_id = guid_filename.split('.').next().unwrap_or(guid_filename);

    recover_filename(file_id, bases).unwrap_or_else(|| guid_filename.to_string())
}

fn last_path_segment(source: &str) -> &str {
    source
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(source)
}

/// Scan all descriptors' file items for a record matching the stored file
/// id. Strategies, in priority order:
///   (i)  the item's content id equals the file id
///   (ii) the item's stored name contains the file id
///   (iii) the item has an origin name and the file id contains the
///         item's content id
/// The first item satisfying any strategy wins.
fn recover_filename(file_id: &str, bases: &[KnowledgeBaseDescriptor]) -> Option<String> {
    if file_id.is_empty() {
        return None;
    }

    for base in bases {
        for item in &base.items {
            let Some(content) = item.file_content() else {
                continue;
            };

            let matched = content.id == file_id
                || content.name.contains(file_id)
                || (content.origin_name.is_some() && file_id.contains(content.id.as_str()));

            if matched {
                return Some(
                    content
                        .origin_name
                        .clone()
                        .unwrap_or_else(|| content.name.clone()),
                );
            }
        }
    }

    None
}
