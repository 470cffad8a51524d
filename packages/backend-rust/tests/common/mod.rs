#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::body::Body;
use axum::extract::Query;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use flashcards_backend::config::Config;
use flashcards_backend::services::dataset::{DatasetConfig, DatasetService};
use flashcards_backend::services::tts::{TtsClient, TtsConfig};
use flashcards_backend::state::AppState;
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Mock provider answers are `MP3[<text>]`; text containing this word fails.
pub const UPSTREAM_FAIL_WORD: &str = "fail";
/// Fragments containing this particle are answered slowly.
pub const SLOW_PARTICLE: &str = "ครับ";

type MainRow = (i64, &'static str, &'static str, &'static str, &'static str);

pub const MAIN_ROWS: &[MainRow] = &[
    (1, "안녕하세요", "남성", "싸왓디 크랍", "สวัสดีครับ"),
    (2, "안녕하세요", "여성", "싸왓디 카", "สวัสดีค่ะ"),
    (3, "감사합니다", "남성", "컵쿤 크랍", "ขอบคุณครับ"),
    (4, "감사합니다", "여성", "컵쿤 카", "ขอบคุณค่ะ"),
    (5, "미안해요", "남성", "커 톳 크랍", ""),
];

pub const BASIC_ROWS: &[(i64, &str, &str, &str)] = &[(1, "물", "남", "น้ำ"), (2, "차", "차", "ชา")];

pub struct TestApp {
    pub router: Router,
    _dir: TempDir,
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Starts a session and returns its id and initial view.
    pub async fn start_session(&self, body: Value) -> (String, Value) {
        let (status, json) = self.json(Method::POST, "/api/sessions", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        let id = json["data"]["sessionId"].as_str().unwrap().to_string();
        (id, json["data"]["view"].clone())
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// App over a fixture workbook and a local mock provider.
pub async fn create_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Thai_Basic.xlsx");
    write_fixture_workbook(&path);
    build_app(dir, DatasetConfig::from_path(path)).await
}

/// App whose workbook does not exist.
pub async fn create_test_app_without_dataset() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.xlsx");
    build_app(dir, DatasetConfig::from_path(path)).await
}

async fn build_app(dir: TempDir, dataset: DatasetConfig) -> TestApp {
    let upstream = spawn_mock_tts().await;
    let tts = TtsClient::new(TtsConfig {
        endpoint: format!("http://{upstream}/translate_tts"),
        ..TtsConfig::default()
    });

    let state = AppState::new(&Config::default(), DatasetService::new(dataset), tts);
    TestApp {
        router: flashcards_backend::app(state),
        _dir: dir,
    }
}

pub fn write_fixture_workbook(path: &Path) {
    let mut workbook = Workbook::new();

    let main = workbook.add_worksheet();
    main.set_name("Main").unwrap();
    for (r, (id, korean, gender, pronunciation, thai)) in MAIN_ROWS.iter().enumerate() {
        let r = r as u32;
        main.write_number(r, 0, *id as f64).unwrap();
        for (c, value) in [korean, gender, pronunciation, thai].iter().enumerate() {
            if !value.is_empty() {
                main.write_string(r, c as u16 + 1, **value).unwrap();
            }
        }
    }

    let basic = workbook.add_worksheet();
    basic.set_name("Basic").unwrap();
    basic.write_string(0, 0, "Basic Voca I").unwrap();
    basic.write_string(3, 0, "번호").unwrap();
    basic.write_string(3, 1, "한국어").unwrap();
    basic.write_string(3, 2, "발음").unwrap();
    basic.write_string(3, 3, "태국어").unwrap();
    for (r, (id, korean, pronunciation, thai)) in BASIC_ROWS.iter().enumerate() {
        let r = r as u32 + 4;
        basic.write_number(r, 0, *id as f64).unwrap();
        basic.write_string(r, 1, *korean).unwrap();
        basic.write_string(r, 2, *pronunciation).unwrap();
        basic.write_string(r, 3, *thai).unwrap();
    }

    workbook.save(path).unwrap();
}

async fn mock_translate_tts(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let text = params.get("q").cloned().unwrap_or_default();
    let valid = headers.contains_key(header::USER_AGENT)
        && params.get("client").map(String::as_str) == Some("tw-ob")
        && params.get("tl").map(String::as_str) == Some("th");

    if !valid || text.contains(UPSTREAM_FAIL_WORD) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    if text.contains(SLOW_PARTICLE) {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    ([(header::CONTENT_TYPE, "audio/mpeg")], format!("MP3[{text}]")).into_response()
}

pub async fn spawn_mock_tts() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/translate_tts", get(mock_translate_tts));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
