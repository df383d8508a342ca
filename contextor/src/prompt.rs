//! Prompt builder: fixed system rules + numbered FAQ context + the question.

use rag_store::SearchHit;

/// System instructions sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are a retrieval-augmented assistant using CSV FAQ data.

Rules:
- Use the retrieved CSV context as your primary source.
- Match user intent using semantic meaning, not only exact words.
- If relevant information exists in the context, answer helpfully.
- Do NOT invent facts not in the context.
- If no relevant information exists at all, respond with: I don't know

Be helpful when partial or close matches exist.";

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Chunk texts of `hits` in received order; hits without `chunk_text` are dropped.
pub fn context_chunks(hits: &[SearchHit]) -> Vec<String> {
    hits.iter()
        .filter_map(|h| h.chunk_text())
        .map(str::to_string)
        .collect()
}

/// Joins chunks as `[FAQ n]\n<text>` blocks (1-based) separated by `---`.
///
/// Returns an empty string when there is nothing to show.
///
/// # Example
/// ```
/// use contextor::prompt::build_context;
/// let ctx = build_context(&["a".to_string(), "b".to_string()]);
/// assert_eq!(ctx, "[FAQ 1]\na\n\n---\n\n[FAQ 2]\nb");
/// ```
pub fn build_context(chunks: &[String]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, text)| format!("[FAQ {}]\n{}", i + 1, text))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Full single-turn prompt.
pub fn build_prompt(system: &str, context: &str, question: &str) -> String {
    format!(
        "SYSTEM INSTRUCTIONS:\n{system}\n\n\
         CSV CONTEXT (retrieved rows):\n{context}\n\n\
         USER QUESTION:\n{question}\n\n\
         Answer using only the CSV context above."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_store::SearchResponse;

    fn hits() -> Vec<SearchHit> {
        let resp: SearchResponse = serde_json::from_str(
            r#"{"result":{"hits":[
                {"_id":"faq_2","_score":0.9,"fields":{"chunk_text":"second row"}},
                {"_id":"faq_9","_score":0.5,"fields":{"question":"no chunk"}},
                {"_id":"faq_0","_score":0.4,"fields":{"chunk_text":"first row"}}
            ]}}"#,
        )
        .unwrap();
        resp.result.hits
    }

    #[test]
    fn context_keeps_order_and_skips_textless_hits() {
        let chunks = context_chunks(&hits());
        assert_eq!(chunks, vec!["second row", "first row"]);
        assert_eq!(
            build_context(&chunks),
            "[FAQ 1]\nsecond row\n\n---\n\n[FAQ 2]\nfirst row"
        );
    }

    #[test]
    fn empty_hits_give_empty_context() {
        assert_eq!(build_context(&context_chunks(&[])), "");
    }

    #[test]
    fn prompt_layout() {
        let p = build_prompt("SYS", "CTX", "Where is my order?");
        assert_eq!(
            p,
            "SYSTEM INSTRUCTIONS:\nSYS\n\nCSV CONTEXT (retrieved rows):\nCTX\n\nUSER QUESTION:\nWhere is my order?\n\nAnswer using only the CSV context above."
        );
    }
}
