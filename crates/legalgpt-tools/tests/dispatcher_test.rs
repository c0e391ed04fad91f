use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use legalgpt_tools::{DocumentRecord, DocumentSearch, SearchHit, ToolDispatcher, ToolError};
use serde_json::json;

/// In-memory index with a handful of canned documents.
struct CannedIndex {
    fail: bool,
}

impl CannedIndex {
    fn new() -> Self {
        Self { fail: false }
    }

    fn unavailable() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl DocumentSearch for CannedIndex {
    async fn search(&self, query: &str, _limit: usize) -> Result<Vec<SearchHit>> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        // Always returns 8 hits so truncation is observable.
        Ok((0..8)
            .map(|i| SearchHit {
                id: format!("doc-{}", i),
                content: format!("{} result {}", query, i),
                score: Some(1.0 - i as f64 * 0.1),
            })
            .collect())
    }

    async fn fetch(&self, doc_id: &str) -> Result<Option<DocumentRecord>> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        if doc_id == "ipc-420" {
            Ok(Some(DocumentRecord {
                id: "ipc-420".to_string(),
                content: "Section 420. Cheating and dishonestly inducing delivery of property."
                    .to_string(),
                metadata: json!({"act": "Indian Penal Code"}),
            }))
        } else {
            Ok(None)
        }
    }
}

fn dispatcher() -> ToolDispatcher {
    ToolDispatcher::new(Arc::new(CannedIndex::new()))
}

#[tokio::test]
async fn search_defaults_to_five_results() {
    let result = dispatcher()
        .invoke("search_legal_documents", r#"{"query": "Section 420 IPC"}"#)
        .await
        .unwrap();

    assert_eq!(result["results_count"], json!(5));
    assert_eq!(result["documents"].as_array().unwrap().len(), 5);
    assert_eq!(result["query"], json!("Section 420 IPC"));
}

#[tokio::test]
async fn search_truncates_overshooting_backend() {
    let result = dispatcher()
        .invoke(
            "search_legal_documents",
            r#"{"query": "bail provisions", "max_results": 3}"#,
        )
        .await
        .unwrap();

    assert_eq!(result["documents"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn search_rejects_missing_query_without_backend_call() {
    // The unavailable backend would fail loudly; validation must short-circuit.
    let dispatcher = ToolDispatcher::new(Arc::new(CannedIndex::unavailable()));
    let err = dispatcher
        .invoke("search_legal_documents", r#"{"max_results": 2}"#)
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[tokio::test]
async fn search_rejects_out_of_range_max_results() {
    let err = dispatcher()
        .invoke(
            "search_legal_documents",
            r#"{"query": "x", "max_results": 100}"#,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[tokio::test]
async fn unparseable_arguments_are_invalid_not_a_crash() {
    let err = dispatcher()
        .invoke("search_legal_documents", "{not json")
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[tokio::test]
async fn backend_failure_maps_to_search_unavailable() {
    let dispatcher = ToolDispatcher::new(Arc::new(CannedIndex::unavailable()));
    let err = dispatcher
        .invoke("search_legal_documents", r#"{"query": "anything"}"#)
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::SearchUnavailable(_)));
}

#[tokio::test]
async fn fetch_returns_document_payload() {
    let result = dispatcher()
        .invoke("get_document_by_reference", r#"{"doc_id": "ipc-420"}"#)
        .await
        .unwrap();

    assert_eq!(result["success"], json!(true));
    assert_eq!(result["document"]["id"], json!("ipc-420"));
}

#[tokio::test]
async fn fetch_of_missing_document_is_a_successful_result() {
    let result = dispatcher()
        .invoke("get_document_by_reference", r#"{"doc_id": "no-such-doc"}"#)
        .await
        .unwrap();

    assert_eq!(result["success"], json!(false));
    assert!(result["error"].as_str().unwrap().contains("no-such-doc"));
}

#[tokio::test]
async fn unknown_tool_is_rejected() {
    let err = dispatcher().invoke("delete_everything", "{}").await.unwrap_err();
    assert!(matches!(err, ToolError::UnknownTool(_)));
}
