use std::net::SocketAddr;

use axum::{
    body::{to_bytes, Body},
    extract::connect_info::MockConnectInfo,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use oxidized_summarizer::{config::Config, create_router, export, types::DocumentFormat, AppState};

const BOUNDARY: &str = "digest-test-boundary-7MA4YWxkTrZu0gW";

/// Exactly fifty words, no page markers, nothing `post_process` would touch.
const FIXED_SUMMARY: &str = "The report reviews quarterly operations across three regional offices. \
Revenue grew while costs remained flat, improving margins. Staffing shortages slowed two \
projects, but both recovered by the final month. Customer satisfaction rose after support hours \
were extended. The authors recommend expanding the pilot program and revisiting supplier contracts \
next year.";

fn app(config: Config) -> Router {
    create_router(AppState::new(config).unwrap())
}

fn online_config(api_base: &str) -> Config {
    let mut config = Config::default();
    config.llm.api_key = "test-key".to_string();
    config.llm.api_base = Some(api_base.to_string());
    config
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/api/summarize")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(multipart_body(fields, file))).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name=value` pair from the response's Set-Cookie header.
fn session_cookie(response: &Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie issued")
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn three_page_text() -> Vec<u8> {
    [
        "Page one covers the northern office and its revenue figures.",
        "Page two covers staffing, hiring delays and project recovery.",
        "Page three covers customer satisfaction and recommendations.",
    ]
    .join("\n\u{c}")
    .into_bytes()
}

#[tokio::test]
async fn test_upload_summarize_and_download_txt() {
    assert_eq!(FIXED_SUMMARY.split_whitespace().count(), 50);

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(mockito::Matcher::Regex("sources in English".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{"message": {"role": "assistant", "content": FIXED_SUMMARY}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 300, "completion_tokens": 70, "total_tokens": 370}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let app = app(online_config(&server.url()));
    let document = three_page_text();

    let response = app
        .clone()
        .oneshot(upload_request(
            &[("words", "50"), ("language", "English"), ("task", "summary"), ("format", "txt")],
            Some(("quarterly.txt", "text/plain", &document)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);

    let result = body_json(response).await;
    assert_eq!(result["summary"], FIXED_SUMMARY);
    assert_eq!(result["source_filename"], "quarterly.txt");
    assert_eq!(result["options"]["words"], 50);
    assert_eq!(result["options"]["language"], "English");
    assert_eq!(result["metadata"]["format"], "txt");
    assert_eq!(result["metadata"]["page_count"], 3);
    assert_eq!(result["metadata"]["truncated"], false);
    mock.assert_async().await;

    let download = app
        .clone()
        .oneshot(get_request("/api/download?format=txt", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(download.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(
        download.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Summary_50w_English.txt\""
    );
    assert!(download.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_bytes(download).await, FIXED_SUMMARY.as_bytes());

    // A different browser sees nothing.
    let stranger = app.clone().oneshot(get_request("/api/download?format=txt", None)).await.unwrap();
    assert_eq!(stranger.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(stranger).await["error"], "not_found");
}

#[tokio::test]
async fn test_docx_download_and_edited_export() {
    let app = app(Config::default());

    let response = app
        .clone()
        .oneshot(upload_request(
            &[("task", "report"), ("words", "300"), ("language", "polish"), ("format", "docx")],
            Some(("notes.txt", "text/plain", b"Some meeting notes worth summarizing.")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let result = body_json(response).await;
    assert!(result["summary"].as_str().unwrap().starts_with("# Detailed Report (Polish, ~300 words)"));

    let download = app.clone().oneshot(get_request("/api/download", Some(&cookie))).await.unwrap();
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(
        download.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(
        download.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Detailed_300w_Polish.docx\""
    );
    assert!(body_bytes(download).await.starts_with(b"PK"));

    let edited = app
        .clone()
        .oneshot(
            Request::post("/api/download")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("format=txt&text=Edited+line+one%0D%0AEdited+line+two"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(edited.status(), StatusCode::OK);
    assert_eq!(body_bytes(edited).await, b"Edited line one\nEdited line two");
}

#[tokio::test]
async fn test_unsupported_export_format() {
    let app = app(Config::default());
    let response = app
        .clone()
        .oneshot(upload_request(&[], Some(("a.txt", "text/plain", b"hello world")), None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let download = app.oneshot(get_request("/api/download?format=odt", Some(&cookie))).await.unwrap();
    assert_eq!(download.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body_json(download).await["error"], "unsupported_format");
}

#[tokio::test]
async fn test_upload_errors() {
    let app = app(Config::default());

    let unsupported = app
        .clone()
        .oneshot(upload_request(&[], Some(("slides.pptx", "application/octet-stream", b"PK\x03\x04")), None))
        .await
        .unwrap();
    assert_eq!(unsupported.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body_json(unsupported).await["error"], "unsupported_format");

    let corrupt = app
        .clone()
        .oneshot(upload_request(&[], Some(("fake.pdf", "application/pdf", b"this is not a pdf")), None))
        .await
        .unwrap();
    assert_eq!(corrupt.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(corrupt).await["error"], "corrupt_document");

    let empty = app
        .clone()
        .oneshot(upload_request(&[], Some(("blank.txt", "text/plain", b"  \n\n ")), None))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(empty).await["error"], "empty_input");

    let missing = app
        .clone()
        .oneshot(upload_request(&[("words", "100")], None, None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"], "invalid_request");
}

#[tokio::test]
async fn test_quota_error_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(json!({"error": {"message": "You exceeded your current quota", "code": "insufficient_quota"}}).to_string())
        .create_async()
        .await;

    let app = app(online_config(&server.url()));
    let response = app
        .clone()
        .oneshot(upload_request(&[], Some(("a.txt", "text/plain", b"Quarterly report body.")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let cookie = session_cookie(&response);
    assert_eq!(body_json(response).await["error"], "quota_exceeded");

    // Nothing was stored for the session.
    let latest = app.oneshot(get_request("/api/summary", Some(&cookie))).await.unwrap();
    assert_eq!(latest.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_summary_reset_and_rate_limit() {
    let mut config = Config::default();
    config.summary.generate_per_minute = 1;
    let app = app(config);

    let first = app
        .clone()
        .oneshot(upload_request(&[], Some(("a.txt", "text/plain", b"First document.")), None))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let cookie = session_cookie(&first);

    let latest = app.clone().oneshot(get_request("/api/summary", Some(&cookie))).await.unwrap();
    assert_eq!(latest.status(), StatusCode::OK);
    assert_eq!(body_json(latest).await["source_filename"], "a.txt");

    let second = app
        .clone()
        .oneshot(upload_request(&[], Some(("b.txt", "text/plain", b"Second document.")), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(second).await["error"], "rate_limited");

    let reset = app
        .clone()
        .oneshot(Request::post("/api/reset").header(header::COOKIE, &cookie).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(reset.status(), StatusCode::OK);
    assert_eq!(body_json(reset).await["cleared"], true);

    let after = app.oneshot(get_request("/api/summary", Some(&cookie))).await.unwrap();
    assert_eq!(after.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_index() {
    let app = app(Config::default());

    let health = app.clone().oneshot(get_request("/api/health", None)).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let json = body_json(health).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["llm"], "offline");

    let index = app.oneshot(get_request("/", None)).await.unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(index).await).unwrap();
    assert!(html.contains("/api/summarize"));
}

#[tokio::test]
async fn test_pdf_and_docx_uploads_are_extracted() {
    let app = app(Config::default());
    let text = "Quarterly review\n\nRevenue grew in the north.\n\tCosts stayed flat.";

    let uploads = [
        ("report.pdf", "application/pdf", DocumentFormat::Pdf, "pdf"),
        (
            "report.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            DocumentFormat::Docx,
            "docx",
        ),
    ];

    for (filename, content_type, format, tag) in uploads {
        let bytes = export::render(text, format).unwrap();
        let response = app
            .clone()
            .oneshot(upload_request(&[("words", "100")], Some((filename, content_type, &bytes)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{filename}");

        let result = body_json(response).await;
        assert_eq!(result["source_filename"], filename);
        assert_eq!(result["metadata"]["format"], tag);
        assert!(result["metadata"]["char_count"].as_u64().unwrap() > 0, "{filename}");
    }
}

#[tokio::test]
async fn test_oversize_upload_is_payload_too_large() {
    let mut config = Config::default();
    config.server.max_upload_bytes = 1024;
    let app = app(config);

    let big = vec![b'a'; 4096];
    let response = app
        .oneshot(upload_request(&[], Some(("big.txt", "text/plain", &big)), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["error"], "payload_too_large");
}

#[tokio::test]
async fn test_cookieless_uploads_share_the_client_quota() {
    let mut config = Config::default();
    config.summary.generate_per_minute = 1;
    let app = app(config).layer(MockConnectInfo(SocketAddr::from(([203, 0, 113, 7], 4000))));

    let first = app
        .clone()
        .oneshot(upload_request(&[], Some(("a.txt", "text/plain", b"First document.")), None))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // Dropping the cookie does not buy a fresh quota.
    for _ in 0..4 {
        let again = app
            .clone()
            .oneshot(upload_request(&[], Some(("b.txt", "text/plain", b"Another document.")), None))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(again).await["error"], "rate_limited");
    }
}

#[tokio::test]
async fn test_cookieless_requests_store_no_sessions() {
    let state = AppState::new(Config::default()).unwrap();
    let app = create_router(state.clone());

    for _ in 0..20 {
        let response = app.clone().oneshot(get_request("/api/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(state.sessions.len().await, 0);

    let upload = app
        .oneshot(upload_request(&[], Some(("a.txt", "text/plain", b"Worth keeping.")), None))
        .await
        .unwrap();
    assert_eq!(upload.status(), StatusCode::OK);
    assert_eq!(state.sessions.len().await, 1);
}
