use async_trait::async_trait;
use predicates::prelude::*;
use reader_common::Result;
use reader_config::McpConfig;
use reader_core::{DocumentRecord, ListQuery, ListResponse, ReaderApi};
use reader_mcp::{server, McpServer};
use reader_test_helpers::prelude::*;
use std::sync::Arc;
use std::time::Duration;

/// Answers after a delay that depends on the requested location
struct SlowApi;

#[async_trait]
impl ReaderApi for SlowApi {
    async fn fetch_list(&self, query: &ListQuery) -> Result<ListResponse> {
        let location = query.location.map(|l| l.as_str()).unwrap_or("none");
        let delay = if location == "archive" { 200 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        Ok(ListResponse {
            count: 1,
            results: vec![DocumentRecord::from_value(minimal_document(location))?],
            next_page_cursor: None,
        })
    }

    async fn verify_token(&self) -> Result<()> {
        Ok(())
    }
}

async fn run_session(input: &str) -> String {
    let server = Arc::new(McpServer::new(Arc::new(SlowApi), &McpConfig::default()));
    let mut output = Vec::new();
    server::serve(server, input.as_bytes(), &mut output)
        .await
        .unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn test_session_answers_every_request() {
    suppress_logs();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#,
        "\n",
    );

    let out = run_session(input).await;
    let responses = jsonrpc_lines(&out);
    assert_eq!(responses.len(), 3, "unexpected output: {}", out);
    for line in out.lines() {
        assert!(valid_jsonrpc_response().eval(line));
    }

    let init = response_with_id(&responses, 1).unwrap();
    assert_eq!(init["result"]["serverInfo"]["name"], "reader-api");
    let tools = response_with_id(&responses, 2).unwrap();
    assert_eq!(tools["result"]["tools"][0]["name"], "list_documents");
    assert!(response_with_id(&responses, 3).is_some());
}

#[tokio::test]
async fn test_slow_call_does_not_block_fast_call() {
    suppress_logs();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":10,"method":"tools/call","params":{"name":"list_documents","arguments":{"location":"archive"}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":11,"method":"tools/call","params":{"name":"list_documents","arguments":{"location":"new"}}}"#,
        "\n",
    );

    let out = run_session(input).await;
    let responses = jsonrpc_lines(&out);
    assert_eq!(responses.len(), 2);

    // The fast request finishes first
    assert_eq!(responses[0]["id"], 11);
    assert_eq!(responses[1]["id"], 10);

    let archive = response_with_id(&responses, 10).unwrap();
    assert_eq!(archive["result"]["structuredContent"]["results"][0]["id"], "archive");
    let new = response_with_id(&responses, 11).unwrap();
    assert_eq!(new["result"]["structuredContent"]["results"][0]["id"], "new");
}

#[tokio::test]
async fn test_malformed_line_gets_parse_error() {
    suppress_logs();
    let input = "this is not json\n{\"jsonrpc\":\"2.0\",\"id\":5,\"method\":\"ping\"}\n";

    let out = run_session(input).await;
    let responses = jsonrpc_lines(&out);
    assert_eq!(responses.len(), 2);

    let parse_error = responses.iter().find(|r| r["id"].is_null()).unwrap();
    assert_eq!(parse_error["error"]["code"], -32700);
    assert!(response_with_id(&responses, 5).is_some());
}

#[tokio::test]
async fn test_empty_input_ends_cleanly() {
    assert_eq!(run_session("").await, "");
}
