//! End-to-end tests of the `reader_mcp` binary over stdio

use predicates::prelude::*;
use reader_test_helpers::prelude::*;
use reader_test_helpers::upstream::AUTH_PATH;
use serde_json::json;

const SECRET: &str = "binary-test-token-42";

#[test]
fn test_missing_token_is_fatal_at_startup() {
    let empty = assert_fs::TempDir::new().unwrap();
    reader_mcp_command()
        .current_dir(empty.path())
        .write_stdin("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n")
        .assert()
        .code(101)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "READER_ACCESS_TOKEN or ACCESS_TOKEN environment variable is not set",
        ));
}

#[test]
fn test_unknown_output_format_is_config_error() {
    reader_mcp_command()
        .env("ACCESS_TOKEN", SECRET)
        .args(["--output", "yaml"])
        .assert()
        .code(101)
        .stderr(predicate::str::contains("Unknown output format"));
}

#[test]
fn test_handshake_without_upstream_calls() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
    );

    let output = reader_mcp_command()
        .env("READER_ACCESS_TOKEN", SECRET)
        .write_stdin(input)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let responses = jsonrpc_lines(&stdout);
    assert_eq!(responses.len(), 2);
    assert_eq!(
        response_with_id(&responses, 2).unwrap()["result"]["tools"][0]["name"],
        "list_documents"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr_not_contains(&[SECRET]).eval(&stderr));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tool_call_against_stub_upstream() {
    let upstream = StubUpstream::list(StubResponse::json(
        200,
        list_page(vec![sample_document()], Some("page-2")),
    ))
    .await;
    let base_url = upstream.base_url();

    let output = tokio::task::spawn_blocking(move || {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"list_documents","arguments":{"location":"later","updatedAfter":"not-a-date"}}}"#,
            "\n",
        );
        reader_mcp_command()
            .env("ACCESS_TOKEN", SECRET)
            .env("READER_API_BASE_URL", base_url)
            .write_stdin(input)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let responses = jsonrpc_lines(&stdout);
    let result = &response_with_id(&responses, 1).unwrap()["result"];
    assert_eq!(result["structuredContent"]["results"][0]["id"], "01gwfvp9pyaabcdgmx14f6ha0");
    assert_eq!(result["structuredContent"]["nextPageCursor"], "page-2");

    let req = upstream.last_request().unwrap();
    assert_eq!(req.query_pairs(), vec![("location".to_string(), "later".to_string())]);
    assert_eq!(req.header("authorization"), Some(format!("Token {}", SECRET).as_str()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_upstream_404_in_text_mode() {
    let upstream = StubUpstream::list(StubResponse::json(404, json!({"detail": "Not found."}))).await;
    let base_url = upstream.base_url();

    let output = tokio::task::spawn_blocking(move || {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":9,"method":"tools/call","params":{"name":"list_documents","arguments":{}}}"#,
            "\n",
        );
        reader_mcp_command()
            .env("ACCESS_TOKEN", SECRET)
            .env("READER_API_BASE_URL", base_url)
            .args(["--output", "text"])
            .write_stdin(input)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let responses = jsonrpc_lines(&stdout);
    let result = &response_with_id(&responses, 9).unwrap()["result"];
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("Error: Reader API returned HTTP 404"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rejected_token_stops_startup_when_verification_enabled() {
    let upstream = StubUpstream::start(vec![(
        AUTH_PATH,
        StubResponse::json(401, json!({"detail": "Invalid token."})),
    )])
    .await;
    let auth_url = upstream.auth_url();

    let (temp, config_path) = auth_config_file(&auth_url);

    let output = tokio::task::spawn_blocking(move || {
        reader_mcp_command()
            .env("ACCESS_TOKEN", SECRET)
            .arg("--config")
            .arg(&config_path)
            .arg("--verify-token")
            .write_stdin("")
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Access token verification failed"));
    assert!(stderr_not_contains(&[SECRET]).eval(&stderr));
    assert_eq!(upstream.requests().len(), 1);
    drop(temp);
}

/// Run one `list_documents` call from `dir` and return the upstream's view of it
async fn call_from_dir(dir: std::path::PathBuf, env_token: Option<&'static str>) -> RecordedRequest {
    let upstream = StubUpstream::list(StubResponse::json(200, list_page(vec![], None))).await;
    let base_url = upstream.base_url();

    let output = tokio::task::spawn_blocking(move || {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"list_documents","arguments":{}}}"#,
            "\n",
        );
        let mut cmd = reader_mcp_command();
        cmd.current_dir(&dir).env("READER_API_BASE_URL", base_url);
        if let Some(token) = env_token {
            cmd.env("ACCESS_TOKEN", token);
        }
        cmd.write_stdin(input).output().unwrap()
    })
    .await
    .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    upstream.last_request().unwrap()
}

fn dotenv_dir(contents: &str) -> assert_fs::TempDir {
    use assert_fs::prelude::*;

    let temp = assert_fs::TempDir::new().unwrap();
    temp.child(".env").write_str(contents).unwrap();
    temp
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_token_read_from_dotenv_file() {
    let temp = dotenv_dir("ACCESS_TOKEN=dotenv-token-7\n");

    let req = call_from_dir(temp.path().to_path_buf(), None).await;
    assert_eq!(req.header("authorization"), Some("Token dotenv-token-7"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_real_environment_beats_dotenv_file() {
    let temp = dotenv_dir("ACCESS_TOKEN=dotenv-token-7\n");

    let req = call_from_dir(temp.path().to_path_buf(), Some(SECRET)).await;
    assert_eq!(req.header("authorization"), Some(format!("Token {}", SECRET).as_str()));
}

/// Write a config file pointing the auth check at `auth_url`
fn auth_config_file(auth_url: &str) -> (assert_fs::TempDir, std::path::PathBuf) {
    use assert_fs::prelude::*;

    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("reader.toml");
    file.write_str(&format!("[api]\nauth_url = \"{}\"\n", auth_url))
        .unwrap();
    let path = file.path().to_path_buf();
    (temp, path)
}
