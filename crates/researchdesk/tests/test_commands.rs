//! Command behaviour tests that need no network access

mod common;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_init_creates_config() {
    let env = TestEnv::new().unwrap();

    env.command()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("researchdesk initialized"))
        .stdout(predicate::str::contains("GROQ_API_KEY"));

    let content = std::fs::read_to_string(env.config_file()).unwrap();
    let config: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(config["agent"]["name"], "3aref");
    assert_eq!(config["tools"]["arxiv"]["max_results"], 5);
    assert_eq!(config["server"]["port"], 5000);
}

#[test]
fn test_init_keeps_existing_config() {
    let env = TestEnv::new().unwrap();
    env.write_config(r#"{"agent": {"name": "custom"}}"#).unwrap();

    env.command().arg("init").assert().success();

    let content = std::fs::read_to_string(env.config_file()).unwrap();
    assert!(content.contains("custom"));
}

#[test]
fn test_status_without_config() {
    let env = TestEnv::new().unwrap();

    env.command()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Missing]"))
        .stdout(predicate::str::contains("GROQ_API_KEY:  [Missing]"))
        .stdout(predicate::str::contains("127.0.0.1:5000"));
}

#[test]
fn test_status_reads_env_overrides() {
    let env = TestEnv::new().unwrap();

    env.command()
        .arg("status")
        .env("GROQ_API_KEY", "gsk-test")
        .env("RESEARCHDESK_PORT", "8088")
        .assert()
        .success()
        .stdout(predicate::str::contains("GROQ_API_KEY:  [Set]"))
        .stdout(predicate::str::contains("127.0.0.1:8088"));
}

#[test]
fn test_status_reads_dotenv_file() {
    let env = TestEnv::new().unwrap();
    env.write_dotenv("NEWS_API_KEY=news-from-dotenv\n").unwrap();

    env.command()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("NEWS_API_KEY:  [Set]"));
}

#[test]
fn test_status_check_fails_without_credentials() {
    let env = TestEnv::new().unwrap();

    env.command()
        .args(["status", "--check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("unhealthy"))
        .stdout(predicate::str::contains("not initialized"));
}

#[test]
fn test_ask_without_credentials_reports_unavailable() {
    let env = TestEnv::new().unwrap();

    let output = env
        .command()
        .args(["ask", "-q", "What is CRISPR?"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let envelope: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"], "not initialized");
    assert_eq!(envelope["answer"], "Research service unavailable.");
    assert_eq!(envelope["query"], "What is CRISPR?");
}

#[test]
fn test_ask_rejects_blank_query_before_any_request() {
    let env = TestEnv::new().unwrap();

    let output = env
        .command()
        .args(["ask", "-q", "   "])
        .env("GROQ_API_KEY", "gsk-test")
        .env("GROQ_API_BASE", "http://127.0.0.1:9")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let envelope: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["error"], "empty query");
    assert_eq!(envelope["answer"], "Please provide a research question.");
}

#[test]
fn test_interactive_mode_exits() {
    let env = TestEnv::new().unwrap();

    env.command()
        .arg("ask")
        .write_stdin("\n\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Interactive mode"));
}

#[test]
fn test_interactive_mode_ends_on_eof() {
    let env = TestEnv::new().unwrap();

    env.command()
        .arg("ask")
        .write_stdin("What is CRISPR?\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("not initialized"));
}
