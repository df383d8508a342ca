//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of the FAQ CSV (`questions`, `answers` columns).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FaqRow {
    #[serde(rename = "questions")]
    pub question: String,
    #[serde(rename = "answers")]
    pub answer: String,
}

/// Record as stored in the index. `chunk_text` is the embedded field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub chunk_text: String,
    pub question: String,
    pub answer: String,
}

impl FaqRecord {
    /// Builds the record for the row at `ordinal` (0-based position in the file).
    pub fn from_row(ordinal: usize, row: &FaqRow) -> Self {
        Self {
            id: record_id(ordinal),
            chunk_text: combined_text(&row.question, &row.answer),
            question: row.question.clone(),
            answer: row.answer.clone(),
        }
    }
}

/// Stable record id for a row ordinal.
pub fn record_id(ordinal: usize) -> String {
    format!("faq_{ordinal}")
}

/// Text embedded and returned to the answer prompt.
pub fn combined_text(question: &str, answer: &str) -> String {
    format!("FAQ Question: {question} | FAQ Answer: {answer} | Type: FAQ | Source: CSV")
}

/// Wire shape of a records search: `{"result": {"hits": [...]}}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub result: SearchResult,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// A single ranked hit. Only `fields.chunk_text` is consumed downstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: f32,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl SearchHit {
    pub fn chunk_text(&self) -> Option<&str> {
        self.fields.get("chunk_text").and_then(Value::as_str)
    }
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            result: SearchResult { hits },
        }
    }

    pub fn hits(&self) -> &[SearchHit] {
        &self.result.hits
    }

    pub fn is_empty(&self) -> bool {
        self.result.hits.is_empty()
    }
}

/// Outcome of one ingestion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records submitted to the index.
    pub records: usize,
    /// Upsert calls made.
    pub batches: usize,
    /// Rows dropped under [`crate::RowPolicy::SkipMalformed`].
    pub skipped: usize,
}

/// Result of `ensure_index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexStatus {
    Existing,
    Created,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_shape_matches_index_fields() {
        let row = FaqRow {
            question: "What is your return policy?".into(),
            answer: "30 days, with receipt.".into(),
        };
        let rec = FaqRecord::from_row(3, &row);
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["_id"], "faq_3");
        assert_eq!(
            v["chunk_text"],
            "FAQ Question: What is your return policy? | FAQ Answer: 30 days, with receipt. | Type: FAQ | Source: CSV"
        );
        assert_eq!(v["question"], "What is your return policy?");
        assert_eq!(v["answer"], "30 days, with receipt.");
    }

    #[test]
    fn search_response_parses_wire_shape() {
        let resp: SearchResponse = serde_json::from_value(json!({
            "result": {"hits": [
                {"_id": "faq_0", "_score": 0.91, "fields": {"chunk_text": "A", "question": "q"}},
                {"_id": "faq_7", "_score": 0.42, "fields": {}}
            ]},
            "usage": {"read_units": 6}
        }))
        .unwrap();
        assert_eq!(resp.hits().len(), 2);
        assert_eq!(resp.hits()[0].chunk_text(), Some("A"));
        assert_eq!(resp.hits()[1].chunk_text(), None);
    }

    #[test]
    fn missing_result_is_empty() {
        let resp: SearchResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.is_empty());
        assert_eq!(resp, SearchResponse::empty());
    }
}
