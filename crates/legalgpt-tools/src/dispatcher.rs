use std::sync::Arc;

use legalgpt_llm::Tool;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::search::DocumentSearch;

const DEFAULT_MAX_RESULTS: usize = 5;
const MAX_RESULTS_CAP: usize = 20;

/// Declarations for every tool this dispatcher can execute, in the wire
/// shape the model expects.
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "search_legal_documents",
            "Search for relevant Indian legal documents, case laws, statutes, and legal \
             precedents based on a query. Use this when you need to find specific legal \
             information, case references, or statutory provisions.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query describing what legal information is needed (e.g., 'Section 420 IPC fraud cases', 'consumer protection act 2019')"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of documents to retrieve",
                        "default": DEFAULT_MAX_RESULTS
                    }
                },
                "required": ["query"]
            }),
        ),
        Tool::new(
            "get_document_by_reference",
            "Retrieve the full text of a specific legal document by its reference ID. Use \
             this when a search result or the user points at one particular document.",
            json!({
                "type": "object",
                "properties": {
                    "doc_id": {
                        "type": "string",
                        "description": "The unique identifier or reference of the legal document"
                    }
                },
                "required": ["doc_id"]
            }),
        ),
    ]
}

/// Validates and executes tool calls against the document index.
///
/// Argument validation happens before any backend call; the backend is
/// never contacted for a request that fails the schema.
pub struct ToolDispatcher {
    search: Arc<dyn DocumentSearch>,
}

impl ToolDispatcher {
    pub fn new(search: Arc<dyn DocumentSearch>) -> Self {
        Self { search }
    }

    /// Run one tool call. `raw_args` is the arguments JSON exactly as the
    /// model produced it.
    pub async fn invoke(&self, name: &str, raw_args: &str) -> Result<Value, ToolError> {
        let args: Value = serde_json::from_str(raw_args)
            .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {}", e)))?;

        debug!(tool = name, "dispatching tool call");

        match name {
            "search_legal_documents" => self.search_legal_documents(&args).await,
            "get_document_by_reference" => self.get_document_by_reference(&args).await,
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    async fn search_legal_documents(&self, args: &Value) -> Result<Value, ToolError> {
        let query = required_str(args, "query")?;
        let max_results = match args.get("max_results") {
            None | Some(Value::Null) => DEFAULT_MAX_RESULTS,
            Some(v) => {
                let n = v.as_u64().ok_or_else(|| {
                    ToolError::InvalidArguments("'max_results' must be a positive integer".to_string())
                })?;
                if n == 0 || n > MAX_RESULTS_CAP as u64 {
                    return Err(ToolError::InvalidArguments(format!(
                        "'max_results' must be between 1 and {}",
                        MAX_RESULTS_CAP
                    )));
                }
                n as usize
            }
        };

        let mut hits = self
            .search
            .search(query, max_results)
            .await
            .map_err(|e| {
                warn!(error = %e, "document search failed");
                ToolError::SearchUnavailable(e.to_string())
            })?;
        // The backend may overshoot; never return more than asked for.
        hits.truncate(max_results);

        Ok(json!({
            "query": query,
            "results_count": hits.len(),
            "documents": hits,
        }))
    }

    async fn get_document_by_reference(&self, args: &Value) -> Result<Value, ToolError> {
        let doc_id = required_str(args, "doc_id")?;

        let document = self.search.fetch(doc_id).await.map_err(|e| {
            warn!(error = %e, "document fetch failed");
            ToolError::SearchUnavailable(e.to_string())
        })?;

        // A missing document is a valid answer, not a dispatch failure.
        match document {
            Some(doc) => Ok(json!({
                "success": true,
                "document": doc,
            })),
            None => Ok(json!({
                "success": false,
                "error": format!("Document with ID '{}' not found", doc_id),
            })),
        }
    }
}

fn required_str<'a>(args: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    args.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            ToolError::InvalidArguments(format!("'{}' is required and must be a non-empty string", field))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_cover_both_tools() {
        let defs = tool_definitions();
        let names: Vec<&str> = defs.iter().map(|t| t.function.name.as_str()).collect();
        assert_eq!(names, vec!["search_legal_documents", "get_document_by_reference"]);
    }

    #[test]
    fn search_schema_requires_query_only() {
        let defs = tool_definitions();
        let schema = &defs[0].function.parameters;
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["max_results"]["default"], json!(5));
    }
}
