//! Frames from the extension reaching the shared state

use serde_json::json;

use mcp_pointer::mcp_server::GET_POINTED_ELEMENT;
use mcp_pointer::Selection;

use crate::common::{mock_element, BrowserClient, TestRelay};

// ============================================================================
// Selection
// ============================================================================

#[tokio::test]
async fn test_selected_element_reaches_tools() {
    let relay = TestRelay::new();
    let (mut ingress, port) = relay.start_leader().await;

    let mut client = BrowserClient::connect(port).await;
    client
        .send_raw(
            r#"{"type":"element-selected","data":{"selector":"div.a","idx":1,"tagName":"DIV","url":"https://x","timestamp":1},"timestamp":1000}"#,
        )
        .await;
    client.probe().await;

    let selection = relay.store.read().await;
    assert_eq!(selection.len(), 1);
    assert_eq!(selection.elements()[0].selector, "div.a");

    let text = relay.call(GET_POINTED_ELEMENT, json!({})).await;
    assert!(text.contains("Selected 1 element(s)"), "got: {}", text);
    assert!(text.contains("div.a"));

    client.close().await;
    ingress.stop().await.unwrap();
}

#[tokio::test]
async fn test_multi_select_preserves_order_and_extra_fields() {
    let relay = TestRelay::new();
    let (mut ingress, port) = relay.start_leader().await;

    let mut client = BrowserClient::connect(port).await;
    client
        .select(json!([
            mock_element("#first", 1),
            mock_element("#second", 2),
            mock_element("#third", 3)
        ]))
        .await;
    client.probe().await;

    let selection = relay.store.read().await;
    let selectors: Vec<_> = selection
        .elements()
        .iter()
        .map(|e| e.selector.as_str())
        .collect();
    assert_eq!(selectors, vec!["#first", "#second", "#third"]);

    // Fields the relay does not model survive the trip to disk
    let raw = std::fs::read_to_string(relay.state_path()).unwrap();
    assert!(raw.contains("outerHTML"));

    client.close().await;
    ingress.stop().await.unwrap();
}

#[tokio::test]
async fn test_clear_resets_selection() {
    let relay = TestRelay::new();
    let (mut ingress, port) = relay.start_leader().await;

    let mut client = BrowserClient::connect(port).await;
    client.select(mock_element("div.a", 1)).await;
    client.probe().await;
    assert_eq!(relay.store.read().await.len(), 1);

    client.clear().await;
    client.probe().await;
    assert_eq!(relay.store.read().await, Selection::Cleared);

    client.close().await;
    ingress.stop().await.unwrap();
}

#[tokio::test]
async fn test_selected_with_null_data_clears() {
    let relay = TestRelay::new();
    let (mut ingress, port) = relay.start_leader().await;

    let mut client = BrowserClient::connect(port).await;
    client.select(mock_element("div.a", 1)).await;
    client
        .send_raw(r#"{"type":"element-selected","data":null,"timestamp":2}"#)
        .await;
    client.probe().await;
    assert_eq!(relay.store.read().await, Selection::Cleared);

    client.close().await;
    ingress.stop().await.unwrap();
}

// ============================================================================
// Robustness
// ============================================================================

#[tokio::test]
async fn test_malformed_frames_are_dropped() {
    let relay = TestRelay::new();
    let (mut ingress, port) = relay.start_leader().await;

    let mut client = BrowserClient::connect(port).await;
    client.select(mock_element("div.keep", 1)).await;
    client.send_raw("this is not json").await;
    client.send_raw(r#"{"type":"teleport","timestamp":1}"#).await;
    client
        .send_raw(r#"{"type":"element-selected","data":{"tagName":"DIV"},"timestamp":1}"#)
        .await;

    // Connection is still usable and the earlier selection is untouched
    client.probe().await;
    let selection = relay.store.read().await;
    assert_eq!(selection.len(), 1);
    assert_eq!(selection.elements()[0].selector, "div.keep");

    client.close().await;
    ingress.stop().await.unwrap();
}

#[tokio::test]
async fn test_binary_frames_are_decoded() {
    let relay = TestRelay::new();
    let (mut ingress, port) = relay.start_leader().await;

    let mut client = BrowserClient::connect(port).await;
    let frame = json!({
        "type": "element-selected",
        "data": mock_element("span.binary", 1),
        "timestamp": 1000
    });
    client.send_binary(frame.to_string().into_bytes()).await;
    client.probe().await;

    assert_eq!(
        relay.store.read().await.elements()[0].selector,
        "span.binary"
    );

    client.close().await;
    ingress.stop().await.unwrap();
}

// ============================================================================
// Status replies and multiple connections
// ============================================================================

#[tokio::test]
async fn test_connection_test_reports_status() {
    let relay = TestRelay::new();
    let (mut ingress, port) = relay.start_leader().await;

    let mut client = BrowserClient::connect(port).await;
    client
        .select(json!([mock_element("a", 1), mock_element("b", 2)]))
        .await;
    let status = client.probe().await;

    let data = &status["data"];
    assert_eq!(data["running"], true);
    assert_eq!(data["port"], port);
    assert_eq!(data["connected"], true);
    assert_eq!(data["elementsInspected"], 2);
    assert!(data["uptime"].as_u64().is_some());
    assert_eq!(ingress.stats().connection_count(), 1);

    client.close().await;
    ingress.stop().await.unwrap();
}

#[tokio::test]
async fn test_last_write_wins_across_connections() {
    let relay = TestRelay::new();
    let (mut ingress, port) = relay.start_leader().await;

    let mut tab_a = BrowserClient::connect(port).await;
    let mut tab_b = BrowserClient::connect(port).await;

    tab_a.select(mock_element("#from-a", 1)).await;
    tab_a.probe().await;
    tab_b.select(mock_element("#from-b", 1)).await;
    tab_b.probe().await;

    let selection = relay.store.read().await;
    assert_eq!(selection.len(), 1);
    assert_eq!(selection.elements()[0].selector, "#from-b");

    tab_a.close().await;
    tab_b.close().await;
    ingress.stop().await.unwrap();
}
