//! Formatting of retrieved passages into a prompt context block

use super::entity::SearchResult;

const CONTEXT_OPEN: &str = "<knowledge_base_context>";
const CONTEXT_CLOSE: &str = "</knowledge_base_context>";
const CONTEXT_INSTRUCTION: &str =
    "The following passages were retrieved from the configured knowledge bases. \
     Use them as background context when answering the user's question:";

/// Render search results as a delimited context block, or the empty string
/// when there is nothing to inject. The block is prepended to the last user
/// message's text so the model sees it as background rather than as the
/// user's own words.
pub fn format_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let snippets: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, result)| format!("[snippet {}]\n{}\n", i + 1, result.page_content))
        .collect();

    format!(
        "\n\n{}\n{}\n\n{}\n{}\n\n",
        CONTEXT_OPEN,
        CONTEXT_INSTRUCTION,
        snippets.join("\n"),
        CONTEXT_CLOSE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_results_render_nothing() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_block_structure() {
        let results = vec![
            SearchResult::new("first passage", 0.9),
            SearchResult::new("second passage", 0.7),
        ];

        let block = format_context(&results);

        assert!(block.starts_with("\n\n<knowledge_base_context>\n"));
        assert!(block.ends_with("</knowledge_base_context>\n\n"));
        assert!(block.contains("[snippet 1]\nfirst passage\n"));
        assert!(block.contains("[snippet 2]\nsecond passage\n"));

        // Snippets appear in result order
        let first = block.find("[snippet 1]").unwrap();
        let second = block.find("[snippet 2]").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_prepending_keeps_user_text_last() {
        let results = vec![SearchResult::new("context", 0.5)];
        let combined = format!("{}{}", format_context(&results), "what is this?");
        assert!(combined.ends_with("what is this?"));
    }
}
