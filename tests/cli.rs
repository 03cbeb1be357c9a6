mod common;

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::json;
use tweet_harvest::{io_utils, record::COLUMNS};
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path, query_param},
};

use common::{
    ISOLATED_ENV, MockTwitter, SEARCH_PATH, TestWorkspace, VERIFY_PATH, account_json,
    search_json, status_json,
};

fn harvest() -> Command {
    let mut cmd = Command::cargo_bin("tweet-harvest").expect("binary exists");
    for key in ISOLATED_ENV {
        cmd.env_remove(key);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

fn mount_verify_ok(mock: &MockTwitter) {
    mock.mount(
        Mock::given(method("GET"))
            .and(path(VERIFY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(account_json()))
            .expect(1),
    );
}

#[test]
fn exports_search_results_to_csv() {
    let mock = MockTwitter::start();
    mount_verify_ok(&mock);
    mock.mount(
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("count", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_json(vec![
                status_json(1, "whiskers", "first cat"),
                status_json(2, "rex", "a dog, with \"quotes\""),
                status_json(3, "tom", "multi\nline \\ text"),
            ])))
            .expect(1),
    );

    let workspace = TestWorkspace::new();
    let credentials = workspace.write_credentials(&mock.uri());
    let output = workspace.path().join("retrieved_tweets.csv");

    harvest()
        .args([
            "--credentials",
            credentials.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(contains("Authentication OK"))
        .stderr(contains("Output file located"));

    let bytes = fs::read(&output).expect("read output");
    assert!(bytes.starts_with(io_utils::UTF8_BOM));
    let raw = String::from_utf8_lossy(&bytes[io_utils::UTF8_BOM.len()..]).into_owned();
    assert!(raw.starts_with("Create_date,Display_name,User_name,"));
    assert!(
        raw.contains("\n2018-10-10 20:19:24,rex display,rex,2,4,2,\"a dog, with \"\"quotes\"\"\"\n")
    );
    assert!(raw.contains(",\"multi\nline \\\\ text\"\n"));

    let mut reader = io_utils::open_export_reader(&output).expect("open output");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), COLUMNS.to_vec());

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .expect("rows");
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0].iter().collect::<Vec<_>>(),
        vec![
            "2018-10-10 20:19:24",
            "whiskers display",
            "whiskers",
            "1",
            "2",
            "1",
            "first cat",
        ]
    );
    assert_eq!(rows[1].get(6), Some("a dog, with \"quotes\""));
    assert_eq!(rows[2].get(6), Some("multi\nline \\ text"));
}

#[test]
fn authentication_failure_exits_before_searching() {
    let mock = MockTwitter::start();
    mock.mount(
        Mock::given(method("GET"))
            .and(path(VERIFY_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "errors": [{"code": 32, "message": "Could not authenticate you."}]
            }))),
    );
    mock.mount(
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_json(vec![])))
            .expect(0),
    );

    let workspace = TestWorkspace::new();
    let credentials = workspace.write_credentials(&mock.uri());
    let output = workspace.path().join("retrieved_tweets.csv");

    harvest()
        .args([
            "-c",
            credentials.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .code(3)
        .stderr(contains("Error authenticating, check credentials"))
        .stderr(contains("Could not authenticate you."));

    assert!(!output.exists());
    assert_eq!(mock.requests_to(SEARCH_PATH), 0);
}

#[test]
fn verify_only_skips_search_and_output() {
    let mock = MockTwitter::start();
    mount_verify_ok(&mock);

    let workspace = TestWorkspace::new();
    let credentials = workspace.write_credentials(&mock.uri());
    let output = workspace.path().join("retrieved_tweets.csv");

    harvest()
        .args([
            "-c",
            credentials.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--verify-only",
        ])
        .assert()
        .success()
        .stderr(contains("skipping search"));

    assert!(!output.exists());
    assert_eq!(mock.requests_to(SEARCH_PATH), 0);
}

#[test]
fn missing_secret_fails_without_network() {
    let workspace = TestWorkspace::new();
    let credentials = workspace.write(
        "credentials.yaml",
        "consumer_key: ck\nconsumer_secret: cs\naccess_token: at\napi_url: http://127.0.0.1:9\n",
    );

    harvest()
        .args([
            "-c",
            credentials.to_str().unwrap(),
            "-o",
            workspace.path().join("out.csv").to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(contains("access_token_secret"));
}

#[test]
fn environment_supplies_credentials_and_output() {
    let mock = MockTwitter::start();
    mount_verify_ok(&mock);
    mock.mount(
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(search_json(vec![status_json(5, "kit", "hello")])),
            ),
    );

    let workspace = TestWorkspace::new();
    let credentials = workspace.write("endpoint.yaml", &format!("api_url: {}\n", mock.uri()));
    let output = workspace.path().join("from_env.csv");

    harvest()
        .env("TWEET_HARVEST_CREDENTIALS", &credentials)
        .env("TWEET_HARVEST_OUTPUT", &output)
        .env("TWITTER_CONSUMER_KEY", "ck")
        .env("TWITTER_CONSUMER_SECRET", "cs")
        .env("TWITTER_ACCESS_TOKEN", "at")
        .env("TWITTER_ACCESS_TOKEN_SECRET", "ats")
        .assert()
        .success();

    let mut reader = io_utils::open_export_reader(&output).expect("open output");
    assert_eq!(reader.records().count(), 1);
}

#[test]
fn count_above_result_cap_is_a_usage_error() {
    harvest()
        .args(["--count", "250"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("250"));
}

#[test]
fn search_failure_after_authentication_is_a_plain_error() {
    let mock = MockTwitter::start();
    mount_verify_ok(&mock);
    mock.mount(
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json")),
    );

    let workspace = TestWorkspace::new();
    let credentials = workspace.write_credentials(&mock.uri());
    let output = workspace.path().join("retrieved_tweets.csv");

    harvest()
        .args([
            "-c",
            credentials.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(contains("error: Exporting tweets"))
        .stderr(contains("Searching tweets"));

    assert!(!output.exists());
}
