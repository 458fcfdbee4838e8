//! MCP protocol response helpers.

use rmcp::model::{CallToolResult, Content};

/// Text response envelope for tool calls.
///
/// A single text block, plus an error flag when the underlying operation
/// failed. Error responses are still normal tool results: the caller sees
/// the message instead of a protocol error.
///
/// # Example
///
/// ```ignore
/// TextResponse::success("Results: ...").into()
/// TextResponse::error("Neo4j error: ...").into()
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub text: String,
    pub is_error: bool,
}

impl TextResponse {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl From<TextResponse> for CallToolResult {
    fn from(response: TextResponse) -> Self {
        let content = vec![Content::text(response.text)];
        if response.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

impl From<TextResponse> for Result<CallToolResult, rmcp::model::ErrorData> {
    fn from(response: TextResponse) -> Self {
        Ok(response.into())
    }
}
