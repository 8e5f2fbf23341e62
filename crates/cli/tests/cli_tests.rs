//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

const PREDICTION_BODY: &str = r#"{"prediction":1,"prediction_label":"Malignant","probability":0.87,"confidence":"high","model_version":"v3","api_version":"1.0"}"#;

/// The built binary with a clean environment and an empty home directory
fn fnac(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fnac"));
    cmd.env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("FNAC_API_URL")
        .env_remove("FNAC_TIMEOUT_MS")
        .env_remove("FNAC_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn run(cmd: &mut Command) -> (Output, String, String) {
    let output = cmd.output().expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output, stdout, stderr)
}

fn example_values() -> String {
    let (_, stdout, _) = run(fnac(Path::new("/nonexistent")).args(["--format", "json", "features"]));
    let rows: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    rows.iter()
        .map(|row| row["example"].to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    let (output, stdout, _) = run(fnac(home.path()).arg("--help"));

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("FNA Tumour Classifier"), "Should show app name");
    for command in ["info", "health", "model", "features", "predict"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let (output, stdout, _) = run(fnac(home.path()).arg("--version"));

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("fnac"), "Should show binary name");
}

/// Test predict subcommand help
#[test]
fn test_predict_help() {
    let home = tempfile::tempdir().unwrap();
    let (output, stdout, _) = run(fnac(home.path()).args(["predict", "--help"]));

    assert!(output.status.success());
    for flag in ["--example", "--values", "--file", "--set"] {
        assert!(stdout.contains(flag), "Should show {} option", flag);
    }
}

#[test]
fn test_features_json_lists_thirty_in_order() {
    let home = tempfile::tempdir().unwrap();
    let (output, stdout, _) = run(fnac(home.path()).args(["--format", "json", "features"]));

    assert!(output.status.success());
    let rows: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rows.len(), 30);
    assert_eq!(rows[0]["index"], 1);
    assert_eq!(rows[0]["name"], "mean radius");
    assert_eq!(rows[0]["example"], 17.99);
    assert_eq!(rows[29]["name"], "worst fractal dimension");
}

#[test]
fn test_predict_example_prints_result_card() {
    let home = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/predict")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(PREDICTION_BODY)
        .create();

    let (output, stdout, stderr) = run(fnac(home.path())
        .args(["--api-url", &server.url()])
        .args(["predict", "--example"]));

    mock.assert();
    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stdout.contains("Malignant"));
    assert!(stdout.contains("87.00%"));
    assert!(stdout.contains("High Confidence"));
}

#[test]
fn test_predict_values_json_output() {
    let home = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/predict")
        .with_status(200)
        .with_body(PREDICTION_BODY)
        .create();

    let (output, stdout, _) = run(fnac(home.path())
        .args(["--api-url", &server.url(), "--format", "json"])
        .args(["predict", "--values", &example_values()]));

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(body["prediction_label"], "Malignant");
    assert_eq!(body["probability"], 0.87);
}

#[test]
fn test_predict_invalid_field_never_reaches_server() {
    let home = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server.mock("POST", "/predict").expect(0).create();

    let (output, stdout, stderr) = run(fnac(home.path())
        .args(["--api-url", &server.url()])
        .args(["predict", "--example", "--set", "1=abc", "--set", "4="]));

    mock.assert();
    assert!(!output.status.success());
    assert!(stdout.contains("Feature 1 (mean radius) must be a valid number"));
    assert!(stdout.contains("Feature 4 (mean area) is required"));
    assert!(stderr.contains("2 of 30 features failed validation"));
}

#[test]
fn test_predict_bulk_count_mismatch() {
    let home = tempfile::tempdir().unwrap();
    let values = vec!["1.0"; 29].join(" ");

    let (output, _, stderr) = run(fnac(home.path())
        .args(["--api-url", "http://127.0.0.1:9"])
        .args(["predict", "--values", &values]));

    assert!(!output.status.success());
    assert!(stderr.contains("Expected 30 values, got 29"));
}

#[test]
fn test_predict_model_not_loaded() {
    let home = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/predict")
        .with_status(503)
        .with_body(r#"{"detail":"Model not loaded"}"#)
        .create();

    let (output, _, stderr) = run(fnac(home.path())
        .args(["--api-url", &server.url()])
        .args(["predict", "--example"]));

    assert!(!output.status.success());
    assert!(stderr.contains("Model not loaded. Please wait for the model to load and try again."));
}

#[test]
fn test_predict_from_file() {
    let home = tempfile::tempdir().unwrap();
    let input = home.path().join("sample.txt");
    std::fs::write(&input, example_values().replace(", ", "\n")).unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/predict")
        .with_status(200)
        .with_body(PREDICTION_BODY)
        .create();

    let (output, _, stderr) = run(fnac(home.path())
        .args(["--api-url", &server.url()])
        .args(["predict", "--file"])
        .arg(&input));

    mock.assert();
    assert!(output.status.success(), "stderr: {}", stderr);
}

#[test]
fn test_health_reads_api_url_from_config_file() {
    let home = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status":"healthy","model_loaded":true,"model_version":"v3"}"#)
        .create();

    let config_dir = home.path().join(".config").join("fnac");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        format!(r#"{{"api_url":"{}","default_format":"json"}}"#, server.url()),
    )
    .unwrap();

    let (output, stdout, stderr) = run(fnac(home.path()).arg("health"));

    mock.assert();
    assert!(output.status.success(), "stderr: {}", stderr);
    let body: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
}

#[test]
fn test_model_info_table() {
    let home = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/model/info")
        .with_status(200)
        .with_body(
            r#"{"model_type":"LogisticRegression","model_version":"v3","promotion_metadata":{"promoted_by":"ci","environment":"production"}}"#,
        )
        .create();

    let (output, stdout, _) = run(fnac(home.path())
        .args(["--api-url", &server.url()])
        .arg("model"));

    assert!(output.status.success());
    assert!(stdout.contains("LogisticRegression"));
    assert!(stdout.contains("production"));
}

#[test]
fn test_unreachable_service_fails() {
    let home = tempfile::tempdir().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (output, _, stderr) = run(fnac(home.path())
        .args(["--api-url", &format!("http://{}", addr)])
        .arg("info"));

    assert!(!output.status.success());
    assert!(stderr.contains("Failed to fetch service info"));
}
