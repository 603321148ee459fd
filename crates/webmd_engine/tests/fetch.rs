use std::time::Duration;

use pretty_assertions::assert_eq;
use webmd_engine::{
    Backend, FailureKind, FetchResult, FetchSettings, PayloadKind, ReqwestBackend,
    DEFAULT_USER_AGENT,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn fast_settings() -> FetchSettings {
    FetchSettings {
        retry_backoff: Duration::from_millis(1),
        ..FetchSettings::default()
    }
}

#[tokio::test]
async fn text_fetch_decodes_html_and_sends_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .and(|req: &Request| {
            req.headers
                .get("accept")
                .is_some_and(|v| v == "text/html,application/xhtml+xml")
        })
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>caf\u{e9}</html>", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(fast_settings()).expect("client");
    let result = backend
        .fetch(&format!("{}/doc", server.uri()), PayloadKind::Text)
        .await
        .expect("fetch ok");
    assert_eq!(result, FetchResult::Text("<html>caf\u{e9}</html>".to_string()));
}

#[tokio::test]
async fn latin1_pages_are_decoded_from_the_declared_charset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latin1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"caf\xe9".to_vec(), "text/html; charset=iso-8859-1"),
        )
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(fast_settings()).expect("client");
    let text = backend
        .fetch(&format!("{}/latin1", server.uri()), PayloadKind::Text)
        .await
        .and_then(FetchResult::into_text)
        .expect("fetch ok");
    assert_eq!(text, "caf\u{e9}");
}

#[tokio::test]
async fn binary_fetch_keeps_bytes_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img"))
        .and(header("accept", "*/*"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"))
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(fast_settings()).expect("client");
    let fetched = backend
        .fetch(&format!("{}/img", server.uri()), PayloadKind::Binary)
        .await
        .and_then(FetchResult::into_bytes)
        .expect("fetch ok");
    assert_eq!(fetched.bytes.as_ref(), &[0x89, b'P', b'N', b'G']);
    assert_eq!(fetched.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn client_errors_fail_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(fast_settings()).expect("client");
    let err = backend
        .fetch(&format!("{}/missing", server.uri()), PayloadKind::Text)
        .await
        .expect_err("should fail");
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert!(err.to_string().starts_with("fetch failed: http status 404"));
}

#[tokio::test]
async fn server_errors_are_retried_up_to_the_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(fast_settings()).expect("client");
    let err = backend
        .fetch(&format!("{}/flaky", server.uri()), PayloadKind::Text)
        .await
        .expect_err("should fail");
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn retry_recovers_once_the_server_does() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recover"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recover"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("ok", "text/plain"))
        .expect(1)
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(fast_settings()).expect("client");
    let text = backend
        .fetch(&format!("{}/recover", server.uri()), PayloadKind::Text)
        .await
        .and_then(FetchResult::into_text)
        .expect("fetch ok");
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("late", "text/plain")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(100),
        retry_limit: 0,
        ..fast_settings()
    };
    let backend = ReqwestBackend::new(settings).expect("client");
    let err = backend
        .fetch(&format!("{}/slow", server.uri()), PayloadKind::Text)
        .await
        .expect_err("should time out");
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("x".repeat(100), "text/html"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_text_bytes: 10,
        ..fast_settings()
    };
    let backend = ReqwestBackend::new(settings).expect("client");
    let err = backend
        .fetch(&format!("{}/big", server.uri()), PayloadKind::Text)
        .await
        .expect_err("should fail");
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 10, .. }));
}

#[tokio::test]
async fn malformed_urls_are_invalid() {
    let backend = ReqwestBackend::new(fast_settings()).expect("client");
    let err = backend
        .fetch("not a url", PayloadKind::Text)
        .await
        .expect_err("should fail");
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
