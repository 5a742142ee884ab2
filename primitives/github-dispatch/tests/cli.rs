#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The binary with a clean environment pointed at `api_url`.
fn github_dispatch(api_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("github-dispatch").unwrap();
    cmd.env_remove("GITHUB_DISPATCH_TOKEN")
        .env_remove("PENUMBRA_VERSION")
        .env_remove("GITHUB_DISPATCH_TIMEOUT")
        .env("GITHUB_DISPATCH_API_URL", api_url);
    cmd
}

async fn server_expecting(status: u16, calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/dispatches"))
        .respond_with(ResponseTemplate::new(status).set_body_string("response body"))
        .expect(calls)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn missing_repo_exits_1_without_request() {
    let server = server_expecting(204, 0).await;

    let assert = github_dispatch(&server.uri())
        .env("GITHUB_DISPATCH_TOKEN", "tok123")
        .assert()
        .code(1);

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("usage"), "stderr was: {stderr}");
}

#[tokio::test]
async fn missing_token_exits_1_without_request() {
    let server = server_expecting(204, 0).await;

    let assert = github_dispatch(&server.uri())
        .arg("acme/widgets")
        .assert()
        .code(1);

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("GITHUB_DISPATCH_TOKEN"), "stderr was: {stderr}");
}

#[tokio::test]
async fn accepted_dispatch_exits_0() {
    let server = server_expecting(204, 1).await;

    github_dispatch(&server.uri())
        .arg("acme/widgets")
        .env("GITHUB_DISPATCH_TOKEN", "tok123")
        .assert()
        .success();
}

#[tokio::test]
async fn rejected_dispatch_exits_1_without_printing_body() {
    let server = server_expecting(401, 1).await;

    let assert = github_dispatch(&server.uri())
        .arg("acme/widgets")
        .env("GITHUB_DISPATCH_TOKEN", "tok123")
        .assert()
        .code(1)
        .stdout("");

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("401"), "stderr was: {stderr}");
    assert!(!stderr.contains("response body"));
    assert!(!stderr.contains("tok123"));
}

#[test]
fn help_exits_0() {
    github_dispatch("http://127.0.0.1:1")
        .arg("--help")
        .assert()
        .success();
}
