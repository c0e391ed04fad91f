//! Legal research tools exposed to the model.
//!
//! Two tools are declared: `search_legal_documents` and
//! `get_document_by_reference`, both backed by a [`DocumentSearch`]
//! capability. The [`ToolDispatcher`] validates arguments before any
//! backend call and always returns a complete JSON value or a typed error.

pub mod dispatcher;
pub mod error;
pub mod search;

pub use dispatcher::{tool_definitions, ToolDispatcher};
pub use error::ToolError;
pub use search::{DocumentRecord, DocumentSearch, HttpSearchClient, SearchHit};
