use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use quest_core::time::fixed_now;
use reqwest::Client;
use serde_json::{Value, json};
use services::{AppServices, Clock, TutorConfig, TutorService};
use storage::repository::Storage;
use tokio::net::TcpListener;

use api::{AppState, EnvStatus};

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_api(storage: Storage, tutor: TutorService) -> String {
    let services = AppServices::new(storage, tutor, Clock::fixed(fixed_now()));
    let env = EnvStatus {
        db_url_set: true,
        db_name_set: false,
        ai_key_set: false,
    };
    serve(api::router(AppState::new(services, env))).await
}

async fn seeded_api() -> String {
    let base = spawn_api(Storage::in_memory(), TutorService::disabled()).await;
    let res = Client::new()
        .post(format!("{base}/api/initialize-data"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    base
}

#[tokio::test]
async fn root_reports_configuration_presence_and_connection() {
    let base = spawn_api(Storage::in_memory(), TutorService::disabled()).await;
    let client = Client::new();

    for path in ["/api", "/api/"] {
        let body: Value = client
            .get(format!("{base}{path}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["message"], "Welcome to Dental Quest API!");
        assert_eq!(body["environment_variables_status"]["DB_URL_IS_SET"], true);
        assert_eq!(body["environment_variables_status"]["DB_NAME_IS_SET"], false);
        assert_eq!(body["environment_variables_status"]["AI_API_KEY_IS_SET"], false);
        assert_eq!(body["database_connection_state"], "Connected");
    }
}

#[tokio::test]
async fn learner_journey_from_signup_to_progress() {
    let base = seeded_api().await;
    let client = Client::new();

    let user: Value = client
        .post(format!("{base}/api/users"))
        .json(&json!({"username": "kid", "email": "kid@example.com"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user["level"], 1);
    assert_eq!(user["total_score"], 0);
    assert_eq!(user["achievements"], json!([]));
    let user_id = user["id"].as_str().unwrap().to_string();

    let again: Value = client
        .post(format!("{base}/api/users"))
        .json(&json!({"username": "other name", "email": "kid@example.com"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["id"], user_id.as_str());
    assert_eq!(again["username"], "kid");

    let lessons: Vec<Value> = client
        .get(format!("{base}/api/lessons"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0]["title"], "Tooth Brushing Basics");
    let lesson_id = lessons[0]["id"].as_str().unwrap().to_string();

    let lesson: Value = client
        .get(format!("{base}/api/lessons/{lesson_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let correct = lesson["quiz_questions"][0]["correct_answer"].clone();

    let outcome: Value = client
        .post(format!("{base}/api/quiz/submit"))
        .json(&json!({
            "user_id": user_id,
            "lesson_id": lesson_id,
            "answers": [{"selected_option": correct}],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(outcome["correct_answers"], 1);
    assert_eq!(outcome["total_questions"], 1);
    assert_eq!(outcome["score"], 100);
    assert_eq!(outcome["passed"], true);

    let refreshed: Value = client
        .get(format!("{base}/api/users/{user_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(refreshed["total_score"], 100);

    let progress: Vec<Value> = client
        .get(format!("{base}/api/users/{user_id}/progress"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0]["lesson_id"], lesson_id.as_str());
    assert_eq!(progress[0]["score"], 100);
    assert_eq!(progress[0]["completed"], true);
}

#[tokio::test]
async fn level_filter_and_not_found_details() {
    let base = seeded_api().await;
    let client = Client::new();

    let level_one: Vec<Value> = client
        .get(format!("{base}/api/lessons?level=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(level_one.len(), 2);

    let level_zero: Vec<Value> = client
        .get(format!("{base}/api/lessons?level=0"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(level_zero.is_empty());

    let res = client
        .get(format!("{base}/api/lessons/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"detail": "Lesson not found"}));

    let res = client
        .get(format!("{base}/api/users/nobody"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"detail": "User not found"}));

    let res = client
        .post(format!("{base}/api/quiz/submit"))
        .json(&json!({"user_id": "nobody", "lesson_id": "nope", "answers": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_for_unknown_user_returns_the_grade() {
    let base = seeded_api().await;
    let client = Client::new();

    let lessons: Vec<Value> = client
        .get(format!("{base}/api/lessons"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let lesson_id = lessons[0]["id"].as_str().unwrap();
    let correct = lessons[0]["quiz_questions"][0]["correct_answer"].clone();

    for _ in 0..2 {
        let res = client
            .post(format!("{base}/api/quiz/submit"))
            .json(&json!({
                "user_id": "ghost",
                "lesson_id": lesson_id,
                "answers": [{"selected_option": correct}],
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let outcome: Value = res.json().await.unwrap();
        assert_eq!(outcome["score"], 100);
        assert_eq!(outcome["passed"], true);
    }

    let progress: Vec<Value> = client
        .get(format!("{base}/api/users/ghost/progress"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress.len(), 2);

    let res = client
        .get(format!("{base}/api/users/ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_username_is_rejected() {
    let base = spawn_api(Storage::in_memory(), TutorService::disabled()).await;

    let res = Client::new()
        .post(format!("{base}/api/users"))
        .json(&json!({"username": "  ", "email": "kid@example.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unavailable_store_fails_data_routes_but_not_root() {
    let base = spawn_api(Storage::unavailable(), TutorService::disabled()).await;
    let client = Client::new();

    let root: Value = client
        .get(format!("{base}/api"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(root["database_connection_state"], "NOT CONNECTED");

    for res in [
        client.get(format!("{base}/api/lessons")).send().await.unwrap(),
        client.get(format!("{base}/api/users/u1")).send().await.unwrap(),
        client
            .post(format!("{base}/api/initialize-data"))
            .send()
            .await
            .unwrap(),
    ] {
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["detail"], "Database connection is not available.");
    }
}

#[tokio::test]
async fn cors_allows_frontend_origins_with_credentials() {
    let base = spawn_api(Storage::in_memory(), TutorService::disabled()).await;
    let client = Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, format!("{base}/api/lessons"))
        .header("Origin", "https://dental-quest.vercel.app")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();
    let headers = res.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "https://dental-quest.vercel.app"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");

    let res = client
        .get(format!("{base}/api/"))
        .header("Origin", "https://example.com")
        .send()
        .await
        .unwrap();
    assert!(res.headers().get("access-control-allow-origin").is_none());
}

type Captured = Arc<Mutex<Option<Value>>>;

async fn fake_completions(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
    *captured.lock().unwrap() = Some(body);
    Json(json!({
        "choices": [{"message": {"role": "assistant", "content": "Brush for two minutes!"}}]
    }))
}

#[tokio::test]
async fn tutor_proxies_to_chat_completions() {
    let captured: Captured = Arc::default();
    let upstream = serve(
        Router::new()
            .route("/chat/completions", post(fake_completions))
            .with_state(Arc::clone(&captured)),
    )
    .await;

    let tutor = TutorService::new(TutorConfig::new(upstream, "test-key")).unwrap();
    let base = spawn_api(Storage::in_memory(), tutor).await;

    let reply: Value = Client::new()
        .post(format!("{base}/api/ai/ask"))
        .json(&json!({"question": "How long?", "context": "Tooth Brushing Basics"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply["response"], "Brush for two minutes!");
    assert_eq!(reply["suggestions"].as_array().unwrap().len(), 2);
    assert!((reply["confidence"].as_f64().unwrap() - 0.9).abs() < 1e-6);

    let sent = captured.lock().unwrap().clone().unwrap();
    assert_eq!(sent["model"], "openai/gpt-oss-20b");
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(
        sent["messages"][1]["content"],
        "Context: Tooth Brushing Basics\n\nQuestion: How long?"
    );
}

#[tokio::test]
async fn tutor_upstream_failure_is_a_server_error() {
    let upstream = serve(Router::new().route(
        "/chat/completions",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
    ))
    .await;

    let tutor = TutorService::new(TutorConfig::new(upstream, "test-key")).unwrap();
    let base = spawn_api(Storage::in_memory(), tutor).await;

    let res = Client::new()
        .post(format!("{base}/api/ai/ask"))
        .json(&json!({"question": "Why floss?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("An AI error occurred:")
    );
}

#[tokio::test]
async fn slow_tutor_upstream_times_out_as_a_server_error() {
    let upstream = serve(Router::new().route(
        "/chat/completions",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"choices": [{"message": {"content": "too late"}}]}))
        }),
    ))
    .await;

    let config = TutorConfig {
        timeout: Duration::from_millis(200),
        ..TutorConfig::new(upstream, "test-key")
    };
    let base = spawn_api(Storage::in_memory(), TutorService::new(config).unwrap()).await;

    let started = Instant::now();
    let res = Client::new()
        .post(format!("{base}/api/ai/ask"))
        .json(&json!({"question": "Why floss?"}))
        .send()
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(3));

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("An AI error occurred:")
    );
}

#[tokio::test]
async fn unconfigured_tutor_is_a_server_error() {
    let base = spawn_api(Storage::in_memory(), TutorService::disabled()).await;

    let res = Client::new()
        .post(format!("{base}/api/ai/ask"))
        .json(&json!({"question": "Why floss?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
