//! Request types for the MCP tools

use rmcp::schemars;
use serde::Deserialize;

/// Tool returning every currently pointed element
pub const GET_POINTED_ELEMENT: &str = "get-pointed-element";

/// Tool returning pointed elements picked by zero-based index
pub const GET_POINTED_ELEMENTS_BY_INDEX: &str = "get-pointed-elements-by-index";

/// Request for all current selections (no arguments)
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct GetPointedElementRequest {}

/// Request for selections by index
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetPointedElementsByIndexRequest {
    /// Zero-based positions in the current selection list
    #[schemars(
        description = "Zero-based indices into the list of pointed elements (0 is the first element the user selected)"
    )]
    pub indices: Vec<i64>,
}
