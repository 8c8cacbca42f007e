use super::*;
use crate::engines::traits::{FetchRequest, HttpFetcher};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(url: &str) -> FetchRequest {
    FetchRequest {
        url: Url::parse(url).unwrap(),
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_fetch_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html><body>hi</body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let engine = ReqwestEngine::new("deepcrawl-test", 1024 * 1024).unwrap();
    let resp = engine.fetch(&request(&server.uri())).await.unwrap();

    assert_eq!(resp.status, 200);
    assert!(resp.is_success());
    assert!(resp.is_html());
    assert!(!resp.truncated);
    assert!(resp.body.contains("hi"));
}

#[tokio::test]
async fn test_http_error_is_a_response_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let engine = ReqwestEngine::new("deepcrawl-test", 1024).unwrap();
    let resp = engine
        .fetch(&request(&format!("{}/missing", server.uri())))
        .await
        .unwrap();
    assert_eq!(resp.status, 404);
    assert!(!resp.is_success());
}

#[tokio::test]
async fn test_body_cap_truncates() {
    let server = MockServer::start().await;
    let big = "x".repeat(4096);
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(big, "text/html"))
        .mount(&server)
        .await;

    let engine = ReqwestEngine::new("deepcrawl-test", 1000).unwrap();
    let resp = engine
        .fetch(&request(&format!("{}/big", server.uri())))
        .await
        .unwrap();

    assert!(resp.truncated);
    assert_eq!(resp.body_bytes, 1000);
}

#[tokio::test]
async fn test_connect_error_is_retryable() {
    // Bind then drop a listener so the port is closed
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let engine = ReqwestEngine::new("deepcrawl-test", 1024).unwrap();
    let err = engine
        .fetch(&request(&format!("http://{}/", addr)))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}
