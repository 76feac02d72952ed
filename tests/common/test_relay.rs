//! TestRelay: a store, a query server and (optionally) a live listener
//! sharing one temp state file

use std::sync::Arc;
use std::time::Duration;

use mcp_pointer::{
    IngressConfig, IngressHandle, IngressListener, PointerServer, Role, SharedStateStore,
    TargetedElement,
};
use rmcp::model::CallToolResult;
use tempfile::TempDir;

/// Follower retry interval used by tests
pub const TEST_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Upper bound for anything a test waits on
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestRelay {
    dir: TempDir,
    pub store: Arc<SharedStateStore>,
    pub server: PointerServer,
}

impl TestRelay {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(SharedStateStore::new(
            dir.path().join("mcp-pointer-test-shared-state.json"),
        ));
        let server = PointerServer::new(Arc::clone(&store));
        Self { dir, store, server }
    }

    pub fn state_path(&self) -> std::path::PathBuf {
        self.store.path().to_path_buf()
    }

    /// Ingress config on `port` with a short retry interval
    pub fn ingress_config(port: u16) -> IngressConfig {
        IngressConfig {
            host: "127.0.0.1".to_string(),
            port,
            retry_interval: TEST_RETRY_INTERVAL,
        }
    }

    /// Start a listener writing into this relay's store
    pub fn start_listener(&self, port: u16) -> IngressHandle {
        IngressListener::new(Self::ingress_config(port), Arc::clone(&self.store)).start()
    }

    /// Start a listener on a free port and wait until it leads
    pub async fn start_leader(&self) -> (IngressHandle, u16) {
        let port = free_port();
        let mut handle = self.start_listener(port);
        let leader = tokio::time::timeout(TEST_TIMEOUT, handle.wait_for_role(Role::Leader))
            .await
            .expect("timed out waiting for leadership");
        assert!(leader, "listener exited before becoming leader");
        (handle, port)
    }

    /// Invoke a tool and return its text, panicking on protocol errors
    pub async fn call(&self, name: &str, arguments: serde_json::Value) -> String {
        let result = self
            .server
            .invoke(name, arguments.as_object().cloned())
            .await
            .unwrap_or_else(|e| panic!("tool {} failed: {:?}", name, e));
        text_of(&result)
    }
}

/// Concatenated text content of a tool result
pub fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.clone()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A port that was free a moment ago
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind ephemeral port")
        .local_addr()
        .expect("No local addr")
        .port()
}

/// Element fixture shaped like what the extension sends
pub fn mock_element(selector: &str, idx: u32) -> serde_json::Value {
    serde_json::json!({
        "idx": idx,
        "selector": selector,
        "tagName": "DIV",
        "id": "test-id",
        "classes": ["test-class"],
        "innerText": "Test Element",
        "outerHTML": "<div id=\"test-id\" class=\"test-class\">Test Element</div>",
        "attributes": {"data-test": "true"},
        "position": {"x": 100, "y": 200, "width": 300, "height": 50},
        "cssProperties": {
            "display": "block",
            "position": "relative",
            "fontSize": "16px",
            "color": "rgb(0, 0, 0)",
            "backgroundColor": "rgb(255, 255, 255)"
        },
        "componentInfo": {"name": "Card", "sourceFile": "src/Card.tsx", "framework": "react"},
        "timestamp": 1_700_000_000_000u64,
        "url": "https://example.com",
        "tabId": 123
    })
}

/// Typed version of [`mock_element`]
pub fn mock_targeted(selector: &str, idx: u32) -> TargetedElement {
    serde_json::from_value(mock_element(selector, idx)).expect("fixture must decode")
}
