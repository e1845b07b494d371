mod common;

use std::sync::Arc;
use std::time::Duration;

use card_pay::{
    Config, GatewayError, HttpGateway, PaymentGateway, PaymentRequest, PaymentStatus, Pid,
    Workflow,
};
use common::valid_card;
use mockito::{Matcher, Server};
use serde_json::json;

fn gateway(url: &str) -> HttpGateway {
    let config = Config {
        base_url: url.to_string(),
        request_timeout: Some(Duration::from_secs(5)),
        ..Config::default()
    };
    HttpGateway::new(&config).unwrap()
}

fn request() -> PaymentRequest {
    let mut card = valid_card();
    card.pan = "4111 1111 1111 1111".to_string();
    PaymentRequest::new(&card)
}

// submit

#[tokio::test]
async fn submit_posts_json_rpc_and_returns_pid() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "jsonrpc": "2.0",
            "method": "pay",
            "params": {
                "pan": "4111111111111111",
                "expire": "01/24",
                "cardholder": "Ivan Ivanov",
                "cvc": "123"
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":"1","result":{"pid":"abc"}}"#)
        .create_async()
        .await;

    let pid = gateway(&server.url()).submit(&request()).await.unwrap();

    assert_eq!(pid, Pid::new("abc"));
    mock.assert_async().await;
}

#[tokio::test]
async fn submit_without_pid_is_rejected() {
    let mut server = Server::new_async().await;
    for body in [
        r#"{"result":{}}"#,
        r#"{"result":{"pid":""}}"#,
        r#"{"error":{"code":-32000,"message":"declined"}}"#,
    ] {
        let mock = server
            .mock("POST", "/api")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let result = gateway(&server.url()).submit(&request()).await;
        assert!(
            matches!(result, Err(GatewayError::MissingPid)),
            "body {body}"
        );
        mock.remove_async().await;
    }
}

#[tokio::test]
async fn submit_with_malformed_body_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api")
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let result = gateway(&server.url()).submit(&request()).await;
    assert!(matches!(result, Err(GatewayError::Malformed(_))));
}

#[tokio::test]
async fn submit_with_error_status_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api")
        .with_status(500)
        .with_body(r#"{"result":{"pid":"abc"}}"#)
        .create_async()
        .await;

    let result = gateway(&server.url()).submit(&request()).await;
    assert!(matches!(result, Err(GatewayError::Status(s)) if s.as_u16() == 500));
}

#[tokio::test]
async fn submit_to_unreachable_host_fails() {
    let result = gateway("http://127.0.0.1:1").submit(&request()).await;
    assert!(matches!(result, Err(GatewayError::Transport(_))));
}

// check

#[tokio::test]
async fn check_reads_status_for_pid() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pay/check/abc")
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    let status = gateway(&server.url()).check(&Pid::new("abc")).await.unwrap();

    assert_eq!(status, PaymentStatus::Succeeded);
    mock.assert_async().await;
}

#[tokio::test]
async fn check_accepts_canonical_names() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/pay/check/abc")
        .with_status(200)
        .with_body(r#"{"status":"processing"}"#)
        .create_async()
        .await;

    let status = gateway(&server.url()).check(&Pid::new("abc")).await.unwrap();
    assert_eq!(status, PaymentStatus::Processing);
}

#[tokio::test]
async fn check_rejects_unknown_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/pay/check/abc")
        .with_status(200)
        .with_body(r#"{"status":"refunded"}"#)
        .create_async()
        .await;

    let result = gateway(&server.url()).check(&Pid::new("abc")).await;
    assert!(matches!(result, Err(GatewayError::UnknownStatus(_))));
}

#[tokio::test]
async fn check_without_status_field_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/pay/check/abc")
        .with_status(200)
        .with_body(r#"{"state":"ok"}"#)
        .create_async()
        .await;

    let result = gateway(&server.url()).check(&Pid::new("abc")).await;
    assert!(matches!(result, Err(GatewayError::Malformed(_))));
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pay/check/abc")
        .with_status(200)
        .with_body(r#"{"status":"fail"}"#)
        .create_async()
        .await;

    let url = format!("{}/", server.url());
    let status = gateway(&url).check(&Pid::new("abc")).await.unwrap();

    assert_eq!(status, PaymentStatus::Failed);
    mock.assert_async().await;
}

// full workflow over http

#[tokio::test]
async fn workflow_settles_over_http() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api")
        .with_status(200)
        .with_body(r#"{"result":{"pid":"abc"}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/pay/check/abc")
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    let config = Config {
        base_url: server.url(),
        poll_interval: Duration::from_millis(20),
        ..Config::default()
    };
    let mut workflow = Workflow::new(Arc::new(HttpGateway::new(&config).unwrap()), &config);
    workflow.fill(&valid_card()).unwrap();

    workflow.submit().await.unwrap();
    let status = tokio::time::timeout(Duration::from_secs(5), workflow.settled())
        .await
        .unwrap();

    assert_eq!(status, PaymentStatus::Succeeded);
}

#[tokio::test]
async fn workflow_fails_when_processor_is_down() {
    let config = Config {
        base_url: "http://127.0.0.1:1".to_string(),
        ..Config::default()
    };
    let mut workflow = Workflow::new(Arc::new(HttpGateway::new(&config).unwrap()), &config);
    workflow.fill(&valid_card()).unwrap();

    assert!(workflow.submit().await.is_err());
    assert_eq!(workflow.status(), PaymentStatus::Failed);
    assert!(workflow.poll_handle().is_none());
}
