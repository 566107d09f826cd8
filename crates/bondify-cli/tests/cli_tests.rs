//! CLI integration tests using assert_cmd against a wiremock server.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bondify() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("bondify").unwrap()
}

/// A temp home with a bondify.toml pointing at `base_url`.
fn workspace(base_url: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bondify.toml");
    let creds = dir.path().join("credentials.json");
    std::fs::write(
        &config,
        format!(
            "credentials_path = \"{}\"\n\n[api]\nbase_url = \"{base_url}\"\ntimeout_secs = 5\n",
            creds.display()
        ),
    )
    .unwrap();
    (dir, config)
}

fn command_in(dir: &Path, config: &Path) -> Command {
    let mut cmd = bondify();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("BONDIFY_TOKEN", "test-token")
        .env_remove("BONDIFY_API_URL")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

fn due_payload(words: &[(i64, &str)]) -> serde_json::Value {
    let words: Vec<serde_json::Value> = words
        .iter()
        .map(|(id, word)| {
            serde_json::json!({
                "id": id,
                "word": word,
                "definition": format!("meaning of {word}"),
                "partOfSpeech": "noun",
                "pronunciation": "",
                "examples": [],
                "state": "New",
                "due": null
            })
        })
        .collect();
    serde_json::json!({ "total": words.len(), "words": words })
}

fn review_payload(id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "word": "w",
        "state": "Review",
        "due": null,
        "masteryLevel": 50,
        "reviewCount": 1
    })
}

#[test]
fn help_lists_commands() {
    bondify()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("review"))
        .stdout(predicate::str::contains("forecast"))
        .stdout(predicate::str::contains("add-word"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    bondify()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created bondify.toml"));

    let content = std::fs::read_to_string(dir.path().join("bondify.toml")).unwrap();
    assert!(content.contains("batch_size = 20"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    bondify().current_dir(dir.path()).arg("init").assert().success();

    bondify()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn missing_config_file_fails() {
    bondify()
        .arg("--config")
        .arg("nonexistent.toml")
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn review_session_rates_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/srs/due"))
        .and(query_param("limit", "20"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(due_payload(&[(1, "alpha"), (2, "beta"), (3, "gamma")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    for (id, rating) in [(1, 3), (2, 1), (3, 4)] {
        Mock::given(method("POST"))
            .and(path("/api/srs/review"))
            .and(body_json(serde_json::json!({"word_id": id, "rating": rating})))
            .respond_with(ResponseTemplate::new(200).set_body_json(review_payload(id)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let (dir, config) = workspace(&server.uri());
    let summary_path = dir.path().join("summary.json");

    command_in(dir.path(), &config)
        .arg("review")
        .arg("--summary-out")
        .arg(&summary_path)
        .write_stdin("\n3\n\n1\n\n4\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[1/3] alpha"))
        .stdout(predicate::str::contains("meaning of beta"))
        .stdout(predicate::str::contains("Session complete: 3/3 reviewed"));

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["reviewed"], 3);
    assert_eq!(summary["total_due"], 3);
    assert_eq!(summary["ratings"]["again"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn review_failure_keeps_card_for_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/srs/due"))
        .respond_with(ResponseTemplate::new(200).set_body_json(due_payload(&[(7, "delta")])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/srs/review"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/srs/review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_payload(7)))
        .expect(1)
        .mount(&server)
        .await;

    let (dir, config) = workspace(&server.uri());

    command_in(dir.path(), &config)
        .arg("review")
        .write_stdin("\n3\n3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Could not save rating"))
        .stdout(predicate::str::contains("Session complete: 1/1 reviewed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn review_with_nothing_due() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/srs/due"))
        .respond_with(ResponseTemplate::new(200).set_body_json(due_payload(&[])))
        .mount(&server)
        .await;

    let (dir, config) = workspace(&server.uri());

    command_in(dir.path(), &config)
        .arg("review")
        .assert()
        .success()
        .stdout(predicate::str::contains("No words due for review"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unauthorized_suggests_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/srs/due"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"detail": "Token has expired"})),
        )
        .mount(&server)
        .await;

    let (dir, config) = workspace(&server.uri());

    command_in(dir.path(), &config)
        .arg("due")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Token has expired"))
        .stderr(predicate::str::contains("bondify login"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stats_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/srs/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalCards": 42,
            "dueToday": 5,
            "newCards": 3,
            "learningCards": 4,
            "reviewCards": 30,
            "relearningCards": 5,
            "averageRetention": 0.81
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wordlist/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_words": 42,
            "words_mastered": 10,
            "words_learning": 20,
            "words_new": 12,
            "average_mastery": 47.5
        })))
        .mount(&server)
        .await;

    let (dir, config) = workspace(&server.uri());

    let output = command_in(dir.path(), &config)
        .arg("stats")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["srs"]["totalCards"], 42);
    assert_eq!(json["wordlist"]["words_mastered"], 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn forecast_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/srs/forecast"))
        .and(query_param("days", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "forecast": [
                {"date": "2025-03-01", "count": 6},
                {"date": "2025-03-02", "count": 0},
                {"date": "2025-03-03", "count": 3}
            ]
        })))
        .mount(&server)
        .await;

    let (dir, config) = workspace(&server.uri());

    command_in(dir.path(), &config)
        .arg("forecast")
        .arg("--days")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-03-01"))
        .stdout(predicate::str::contains("9 review(s) in the next 3 day(s)"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn add_word_duplicate_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wordlist"))
        .and(body_json(serde_json::json!({"word": "serendipity"})))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "detail": {"error": "DUPLICATE_WORD", "detail": "Word 'serendipity' is already in your word list"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (dir, config) = workspace(&server.uri());

    command_in(dir.path(), &config)
        .arg("add-word")
        .arg("serendipity")
        .assert()
        .success()
        .stdout(predicate::str::contains("already in your word list"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn login_then_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-access",
            "refresh_token": "fresh-refresh",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (dir, config) = workspace(&server.uri());
    let creds = dir.path().join("credentials.json");

    command_in(dir.path(), &config)
        .env_remove("BONDIFY_TOKEN")
        .arg("login")
        .arg("--email")
        .arg("learner@example.com")
        .arg("--password")
        .arg("correct-horse")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as learner@example.com"));

    let stored = std::fs::read_to_string(&creds).unwrap();
    assert!(stored.contains("fresh-access"));

    command_in(dir.path(), &config)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));
    assert!(!creds.exists());
}

#[test]
fn unknown_format_rejected() {
    let (dir, config) = workspace("http://127.0.0.1:9");

    command_in(dir.path(), &config)
        .arg("stats")
        .arg("--format")
        .arg("xml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rust_log_raises_verbosity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/srs/due"))
        .respond_with(ResponseTemplate::new(200).set_body_json(due_payload(&[(1, "alpha")])))
        .mount(&server)
        .await;

    let (dir, config) = workspace(&server.uri());

    command_in(dir.path(), &config)
        .env("RUST_LOG", "bondify=debug")
        .arg("due")
        .assert()
        .success()
        .stderr(predicate::str::contains("cache miss"));

    command_in(dir.path(), &config)
        .arg("due")
        .assert()
        .success()
        .stderr(predicate::str::contains("cache miss").not());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn summary_covers_last_pass_after_restart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/srs/due"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(due_payload(&[(1, "alpha"), (2, "beta")])),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/srs/review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_payload(1)))
        .expect(3)
        .mount(&server)
        .await;

    let (dir, config) = workspace(&server.uri());
    let summary_path = dir.path().join("summary.json");

    command_in(dir.path(), &config)
        .arg("review")
        .arg("--summary-out")
        .arg(&summary_path)
        .write_stdin("\n3\n\n3\nr\n\n1\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session complete: 2/2 reviewed"));

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["reviewed"], 1);
    assert_eq!(summary["ratings"]["again"], 1);
    assert_eq!(summary["ratings"]["good"], 0);
}

#[test]
fn review_help_describes_summary_scope() {
    bondify()
        .args(["review", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("last pass"));
}
