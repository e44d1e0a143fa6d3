//! Integration tests for the HTTP-facing parts: the Practicum client and the
//! Telegram notifier.
//!
//! Each test spins up an Axum server on a random port that plays both the
//! status API and the Bot API, and points the real clients at it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use review_bot::channels::{Notifier, TelegramNotifier};
use review_bot::config::TelegramTarget;
use review_bot::error::{ChannelError, PollError};
use review_bot::poller::{CycleOutcome, StatusPoller};
use review_bot::practicum::{PracticumClient, StatusApi};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const STATUS_PATH: &str = "/api/user_api/homework_statuses/";

/// Shared state of the fake upstream services.
#[derive(Clone)]
struct Fake {
    status_code: Arc<Mutex<u16>>,
    body: Arc<Mutex<String>>,
    /// (Authorization header, from_date query) per status request.
    requests: Arc<Mutex<Vec<(Option<String>, Option<String>)>>>,
    /// (bot path segment, JSON body) per sendMessage call.
    messages: Arc<Mutex<Vec<(String, Value)>>>,
    telegram_down: Arc<AtomicBool>,
}

impl Fake {
    fn new(status_code: u16, body: &str) -> Self {
        Self {
            status_code: Arc::new(Mutex::new(status_code)),
            body: Arc::new(Mutex::new(body.to_string())),
            requests: Arc::new(Mutex::new(Vec::new())),
            messages: Arc::new(Mutex::new(Vec::new())),
            telegram_down: Arc::new(AtomicBool::new(false)),
        }
    }
}

async fn homework_statuses(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    fake.requests
        .lock()
        .unwrap()
        .push((auth, query.get("from_date").cloned()));

    let code = StatusCode::from_u16(*fake.status_code.lock().unwrap()).unwrap();
    (code, fake.body.lock().unwrap().clone())
}

async fn send_message(
    State(fake): State<Fake>,
    Path(bot): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if fake.telegram_down.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "description": "Bad Request: chat not found"})),
        );
    }
    fake.messages.lock().unwrap().push((bot, body));
    (StatusCode::OK, Json(json!({"ok": true})))
}

/// Start an Axum server on a random port, return its base URL.
async fn start_server(fake: Fake) -> String {
    let app = Router::new()
        .route(STATUS_PATH, get(homework_statuses))
        .route("/{bot}/sendMessage", post(send_message))
        .with_state(fake);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://{addr}")
}

fn client(base: &str) -> PracticumClient {
    PracticumClient::new(
        format!("{base}{STATUS_PATH}"),
        SecretString::from("practicum-secret"),
        Duration::from_secs(2),
    )
}

fn telegram(base: &str) -> TelegramNotifier {
    TelegramNotifier::new(
        base,
        TelegramTarget {
            bot_token: SecretString::from("42:XYZ"),
            chat_id: "777".into(),
        },
        Duration::from_secs(2),
    )
}

// ── Practicum client ─────────────────────────────────────────────────

#[tokio::test]
async fn client_sends_cursor_and_oauth_header() {
    timeout(TEST_TIMEOUT, async {
        let fake = Fake::new(200, r#"{"homeworks": [], "current_date": 1700000000}"#);
        let base = start_server(fake.clone()).await;

        let payload = client(&base).fetch(1234).await.unwrap();
        assert_eq!(payload["current_date"], 1700000000);

        let requests = fake.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0.as_deref(), Some("OAuth practicum-secret"));
        assert_eq!(requests[0].1.as_deref(), Some("1234"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn client_non_200_is_endpoint_unavailable() {
    timeout(TEST_TIMEOUT, async {
        let fake = Fake::new(503, "maintenance");
        let base = start_server(fake).await;

        let err = client(&base).fetch(0).await.unwrap_err();
        match err {
            PollError::EndpointUnavailable { ref reason } => assert!(reason.contains("503")),
            other => panic!("expected EndpointUnavailable, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn client_non_json_body_is_malformed_payload() {
    timeout(TEST_TIMEOUT, async {
        let fake = Fake::new(200, "<html>oops</html>");
        let base = start_server(fake).await;

        let err = client(&base).fetch(0).await.unwrap_err();
        assert!(matches!(err, PollError::MalformedPayload(_)), "got {err:?}");
        assert!(err.is_transient());
    })
    .await
    .expect("test timed out");
}

// ── Telegram notifier ────────────────────────────────────────────────

#[tokio::test]
async fn telegram_posts_text_to_chat() {
    timeout(TEST_TIMEOUT, async {
        let fake = Fake::new(200, "{}");
        let base = start_server(fake.clone()).await;

        telegram(&base).notify("привет").await.unwrap();

        let messages = fake.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "bot42:XYZ");
        assert_eq!(messages[0].1["chat_id"], "777");
        assert_eq!(messages[0].1["text"], "привет");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn telegram_rejection_is_send_failed() {
    timeout(TEST_TIMEOUT, async {
        let fake = Fake::new(200, "{}");
        fake.telegram_down.store(true, Ordering::SeqCst);
        let base = start_server(fake).await;

        let err = telegram(&base).notify("hi").await.unwrap_err();
        match err {
            ChannelError::SendFailed { ref reason, .. } => assert!(reason.contains("400")),
        }
    })
    .await
    .expect("test timed out");
}

// ── Full cycle over HTTP ─────────────────────────────────────────────

#[tokio::test]
async fn cycle_reports_status_change_end_to_end() {
    timeout(TEST_TIMEOUT, async {
        let fake = Fake::new(
            200,
            r#"{"homeworks": [{"homework_name": "hw1", "status": "approved"}], "current_date": 1000}"#,
        );
        let base = start_server(fake.clone()).await;

        let mut poller = StatusPoller::new(
            Arc::new(client(&base)),
            Arc::new(telegram(&base)),
            Duration::from_secs(600),
            10,
        );

        let outcome = poller.run_cycle().await;
        assert!(matches!(
            outcome,
            CycleOutcome::StatusChanged { delivered: true, .. }
        ));
        assert_eq!(poller.cursor(), 1000);

        // Server starts failing: one error notification, cursor frozen.
        *fake.status_code.lock().unwrap() = 500;
        poller.run_cycle().await;
        poller.run_cycle().await;
        assert_eq!(poller.cursor(), 1000);

        let messages = fake.messages.lock().unwrap();
        let texts: Vec<&str> = messages
            .iter()
            .map(|(_, body)| body["text"].as_str().unwrap())
            .collect();
        assert_eq!(texts.len(), 2);
        assert_eq!(
            texts[0],
            "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"
        );
        assert!(texts[1].starts_with("Сбой в работе программы:"));
        assert!(texts[1].contains("500"));

        let requests = fake.requests.lock().unwrap();
        let cursors: Vec<&str> = requests.iter().filter_map(|(_, c)| c.as_deref()).collect();
        assert_eq!(cursors, vec!["10", "1000", "1000"]);
    })
    .await
    .expect("test timed out");
}
