use std::time::Duration;

use reqwest::StatusCode;
use sandboxd::config::Config;
use sandboxd::gateway::run_gateway_with_listener;
use serde_json::{Value, json};
use tempfile::TempDir;

struct TestServer {
    port: u16,
    workspace: TempDir,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let workspace = TempDir::new().expect("temp workspace should be created");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral listener should bind");
        let port = listener
            .local_addr()
            .expect("listener should expose local address")
            .port();

        let config = Config {
            host: "127.0.0.1".to_string(),
            port,
            workspace_dir: workspace.path().to_path_buf(),
            command_timeout: Duration::from_secs(10),
        };

        let handle =
            tokio::spawn(async move { run_gateway_with_listener(listener, &config).await });

        wait_until_ready(port).await;

        Self {
            port,
            workspace,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        if let Ok(resp) = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await
        {
            if resp.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("gateway did not become ready on port {port}");
}

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::start().await;
    let body: Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(server.url("/write"))
        .json(&json!({"path": "a/b.txt", "content": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert!(body["message"].as_str().unwrap().contains("Wrote"));

    let resp = client
        .post(server.url("/read"))
        .json(&json!({"path": "a/b.txt"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["path"], "a/b.txt");
    assert_eq!(body["content"], "hello");
}

#[tokio::test]
async fn read_missing_file_is_404() {
    let server = TestServer::start().await;
    let resp = reqwest::Client::new()
        .post(server.url("/read"))
        .json(&json!({"path": "missing.txt"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("missing.txt"));
}

#[tokio::test]
async fn path_traversal_is_403_on_every_operation() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let read = client
        .post(server.url("/read"))
        .json(&json!({"path": "../../etc/passwd"}))
        .send()
        .await
        .unwrap();
    assert_eq!(read.status(), StatusCode::FORBIDDEN);

    let write = client
        .post(server.url("/write"))
        .json(&json!({"path": "../evil.txt", "content": "pwned"}))
        .send()
        .await
        .unwrap();
    assert_eq!(write.status(), StatusCode::FORBIDDEN);

    let list = client
        .get(server.url("/list"))
        .query(&[("path", "../..")])
        .send()
        .await
        .unwrap();
    assert_eq!(list.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_returns_sorted_entries() {
    let server = TestServer::start().await;
    for name in ["b.txt", "a.txt", "10.txt"] {
        std::fs::write(server.workspace.path().join(name), "x").unwrap();
    }

    let resp = reqwest::Client::new()
        .get(server.url("/list"))
        .query(&[("path", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["entries"], json!(["10.txt", "a.txt", "b.txt"]));
}

#[tokio::test]
async fn list_missing_directory_is_404() {
    let server = TestServer::start().await;
    let resp = reqwest::Client::new()
        .get(server.url("/list"))
        .query(&[("path", "no-such-dir")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn run_honors_shell_quoting_for_builtin_verbs() {
    let server = TestServer::start().await;
    let resp = reqwest::Client::new()
        .post(server.url("/run"))
        .json(&json!({"cmd": "echo \"a b\""}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["stdout"].as_str().unwrap().trim(), "a b");
    assert_eq!(body["returncode"], 0);
}

#[tokio::test]
async fn run_reports_nonzero_exit_as_success_with_code() {
    let server = TestServer::start().await;
    let resp = reqwest::Client::new()
        .post(server.url("/run"))
        .json(&json!({"cmd": "cat no-such-file.txt"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_ne!(body["returncode"], 0);
    assert!(!body["stderr"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn run_rejects_disallowed_verbs_with_403() {
    let server = TestServer::start().await;
    let resp = reqwest::Client::new()
        .post(server.url("/run"))
        .json(&json!({"cmd": "rm -rf /"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("rm"));
}

#[tokio::test]
async fn run_rejects_empty_command_with_400() {
    let server = TestServer::start().await;
    let resp = reqwest::Client::new()
        .post(server.url("/run"))
        .json(&json!({"cmd": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_body_is_400_with_error_shape() {
    let server = TestServer::start().await;
    let resp = reqwest::Client::new()
        .post(server.url("/read"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn concurrent_runs_complete_independently() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let mut tasks = Vec::new();
    for i in 0..16 {
        let client = client.clone();
        let url = server.url("/run");
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({"cmd": format!("echo job-{i}")}))
                .send()
                .await
                .unwrap()
                .json::<Value>()
                .await
                .unwrap()
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let body = task.await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(body["stdout"].as_str().unwrap().trim(), format!("job-{i}"));
    }
}

#[tokio::test]
async fn concurrent_writes_to_distinct_paths_all_land() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        let url = server.url("/write");
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({"path": format!("out/{i}.txt"), "content": format!("{i}")}))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    let body: Value = client
        .get(server.url("/list"))
        .query(&[("path", "out")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["entries"].as_array().unwrap().len(), 8);
}
