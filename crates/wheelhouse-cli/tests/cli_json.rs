//! Integration tests for `wheelhouse --json` output.
//!
//! Index-backed commands run against a mock simple index.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::io::{Cursor, Write};
use std::process::Command;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "wheelhouse-cli", "--bin", "wheelhouse", "--"]);
    cmd.env_remove("WHEELHOUSE_INDEX_URL");
    cmd
}

async fn handle_page(Path(name): Path<String>) -> Response {
    match name.as_str() {
        "foo" => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            concat!(
                "<html><body>",
                "<a href=\"/files/foo-1.0-py3-none-any.whl#sha256=abc\">foo-1.0-py3-none-any.whl</a>",
                "<a href=\"/files/foo-2.0a1.tar.gz\">foo-2.0a1.tar.gz</a>",
                "</body></html>"
            ),
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

async fn handle_file(Path(file): Path<String>) -> Response {
    if file != "foo-1.0-py3-none-any.whl" {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("foo-1.0.dist-info/METADATA", SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(
            concat!(
                "Metadata-Version: 2.1\nName: foo\nVersion: 1.0\n",
                "Requires-Dist: bar>=1.0\n",
                "Requires-Dist: pytest ; extra == \"test\"\n",
            )
            .as_bytes(),
        )
        .unwrap();
    let bytes = writer.finish().unwrap().into_inner();
    (StatusCode::OK, bytes).into_response()
}

/// Start the mock index in a background thread.
/// Returns the index URL.
fn start_mock_index() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let app = Router::new()
                .route("/simple/:name/", get(handle_page))
                .route("/files/:file", get(handle_file));
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    // Give the server time to start
    thread::sleep(Duration::from_millis(100));

    format!("http://127.0.0.1:{port}/simple/")
}

#[test]
fn test_version() {
    let output = cargo_bin()
        .arg("version")
        .output()
        .expect("Failed to run wheelhouse version");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("wheelhouse "), "stdout: {stdout}");
}

#[test]
fn test_releases_json() {
    let index = start_mock_index();
    let cache = tempdir().unwrap();

    let output = cargo_bin()
        .args(["--json", "--index", &index, "--cache-dir"])
        .arg(cache.path())
        .args(["releases", "foo"])
        .output()
        .expect("Failed to run wheelhouse releases");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|_| panic!("stdout should be valid JSON: {stdout}"));

    assert_eq!(json["ok"], true);
    assert_eq!(json["repo"], index.as_str());
    let releases = json["releases"].as_array().unwrap();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0]["version"], "1.0");
    assert_eq!(releases[0]["hashes"][0], "abc");
}

#[test]
fn test_releases_pre_flag() {
    let index = start_mock_index();
    let cache = tempdir().unwrap();

    let output = cargo_bin()
        .args(["--json", "--index", &index, "--cache-dir"])
        .arg(cache.path())
        .args(["releases", "foo", "--pre"])
        .output()
        .expect("Failed to run wheelhouse releases");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let versions: Vec<_> = json["releases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["version"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(versions, ["2.0a1", "1.0"]);
}

fn deps_json(index: &str, extra: Option<&str>) -> serde_json::Value {
    let cache = tempdir().unwrap();
    let mut cmd = cargo_bin();
    cmd.args(["--json", "--index", index, "--cache-dir"])
        .arg(cache.path())
        .args(["deps", "foo", "1.0"]);
    if let Some(extra) = extra {
        cmd.args(["--extra", extra]);
    }

    let output = cmd.output().expect("Failed to run wheelhouse deps");
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|_| panic!("stdout should be valid JSON: {stdout}"))
}

#[test]
fn test_deps_json() {
    let index = start_mock_index();
    let json = deps_json(&index, None);

    assert_eq!(json["ok"], true);
    assert_eq!(json["name"], "foo");
    assert!(json.get("extra").is_none());
    assert_eq!(json["dependencies"], serde_json::json!(["bar>=1.0"]));
}

#[test]
fn test_deps_extra_json() {
    let index = start_mock_index();
    let json = deps_json(&index, Some("test"));

    assert_eq!(json["ok"], true);
    assert_eq!(json["extra"], "test");
    let deps = json["dependencies"].as_array().unwrap();
    assert_eq!(deps.len(), 1);
    assert!(deps[0].as_str().unwrap().starts_with("pytest"));
}

#[test]
fn test_missing_package_exit_code() {
    let index = start_mock_index();
    let cache = tempdir().unwrap();

    let output = cargo_bin()
        .args(["--json", "--index", &index, "--cache-dir"])
        .arg(cache.path())
        .args(["releases", "nope"])
        .output()
        .expect("Failed to run wheelhouse releases");

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "PKG_NOT_FOUND");
    assert_eq!(json["error"]["package"], "nope");
}

#[test]
fn test_search_unsupported() {
    let cache = tempdir().unwrap();

    let output = cargo_bin()
        .args(["--json", "--cache-dir"])
        .arg(cache.path())
        .args(["search", "requests"])
        .output()
        .expect("Failed to run wheelhouse search");

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["error"]["code"], "PKG_SEARCH_UNSUPPORTED");
}

#[test]
fn test_invalid_index_url() {
    let output = cargo_bin()
        .args(["--json", "--index", "not a url", "releases", "foo"])
        .output()
        .expect("Failed to run wheelhouse releases");

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["error"]["code"], "PKG_CONFIG_INVALID");
}
