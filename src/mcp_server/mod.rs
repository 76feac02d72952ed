//! MCP Server for mcp-pointer
//!
//! Exposes the shared selection to AI assistants as MCP tools over stdio.
//! The server only ever reads the shared state store; writes come from the
//! ingress socket of whichever relay instance is the leader.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde::de::DeserializeOwned;

use crate::shared_state::SharedStateStore;

pub mod formatting;
pub mod types;

pub use formatting::{format_indexed, format_selection, NO_SELECTION_MESSAGE};
pub use types::{
    GetPointedElementRequest, GetPointedElementsByIndexRequest, GET_POINTED_ELEMENT,
    GET_POINTED_ELEMENTS_BY_INDEX,
};

/// MCP Server exposing the pointed DOM elements
#[derive(Clone)]
pub struct PointerServer {
    store: Arc<SharedStateStore>,
    tool_router: ToolRouter<PointerServer>,
}

#[tool_router]
impl PointerServer {
    pub fn new(store: Arc<SharedStateStore>) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    /// Return every element the user is currently pointing at
    #[tool(
        name = "get-pointed-element",
        description = "Get information about the currently pointed/shown DOM elements from the browser extension. Use this tool when the user wants you to analyze specific elements they've selected in their browser, in order to let you see a specific element the user is showing you on their browser."
    )]
    pub async fn get_pointed_element(
        &self,
        Parameters(_request): Parameters<GetPointedElementRequest>,
    ) -> Result<CallToolResult, McpError> {
        let selection = self.store.read().await;
        if selection.is_empty() {
            return Ok(CallToolResult::success(vec![Content::text(
                NO_SELECTION_MESSAGE,
            )]));
        }

        Ok(CallToolResult::success(vec![Content::text(
            format_selection(selection.elements()),
        )]))
    }

    /// Return selected elements by zero-based index
    #[tool(
        name = "get-pointed-elements-by-index",
        description = "Get specific pointed DOM elements by their zero-based position in the user's selection (0 is the first element selected). Out-of-range indices are reported individually; valid indices in the same request are still returned."
    )]
    pub async fn get_pointed_elements_by_index(
        &self,
        Parameters(request): Parameters<GetPointedElementsByIndexRequest>,
    ) -> Result<CallToolResult, McpError> {
        let selection = self.store.read().await;
        if selection.is_empty() {
            return Ok(CallToolResult::success(vec![Content::text(
                NO_SELECTION_MESSAGE,
            )]));
        }

        Ok(CallToolResult::success(vec![Content::text(
            format_indexed(selection.elements(), &request.indices),
        )]))
    }
}

impl PointerServer {
    /// Static metadata of every operation this server offers
    pub fn list_operations(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Dispatch a tool call by name
    ///
    /// Unknown names are a caller bug and fail with `invalid_params` rather
    /// than returning an empty result.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        match name {
            GET_POINTED_ELEMENT => {
                self.get_pointed_element(Parameters(GetPointedElementRequest::default()))
                    .await
            }
            GET_POINTED_ELEMENTS_BY_INDEX => {
                let request = parse_arguments(arguments)?;
                self.get_pointed_elements_by_index(Parameters(request)).await
            }
            _ => Err(McpError::invalid_params(
                format!("Unknown tool: {}", name),
                None,
            )),
        }
    }
}

impl ServerHandler for PointerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-pointer".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("MCP Pointer".to_string()),
                website_url: None,
                icons: None,
            },
            instructions: Some(MCP_INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.list_operations()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!("Tool call: {}", request.name);
        self.invoke(&request.name, request.arguments).await
    }
}

/// Instructions for AI agents using the pointer tools
const MCP_INSTRUCTIONS: &str = r#"MCP Pointer - see the DOM element the user points at

## Tools
- get-pointed-element: every element the user currently has selected, in selection order
- get-pointed-elements-by-index: only the elements at the given zero-based indices

## Notes
- The user selects elements in the browser with Option+Click (Alt+Click) while the extension is active.
- Each element includes its CSS selector, tag, id, classes, text, attributes, position, style data and, when detected, the UI component and its source file.
- If nothing is selected, ask the user to point at the element first."#;

fn parse_arguments<T: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<T, McpError> {
    serde_json::from_value(serde_json::Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| McpError::invalid_params(format!("Invalid arguments: {}", e), None))
}
