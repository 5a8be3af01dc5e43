// tests/api_tests.rs

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use class_optimizer::{routes, state::AppState, store::Store};
use tower::ServiceExt;

fn test_state() -> AppState {
    let path = std::env::temp_dir().join(format!(
        "class_optimizer_api_{}.db",
        uuid::Uuid::new_v4()
    ));
    let store = Store::new(format!("sqlite://{}?mode=rwc", path.display()))
        .expect("Failed to build test store");
    AppState { store }
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    let app = routes::create_router(test_state());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn seed(client: &reqwest::Client, address: &str) {
    let response = client
        .post(format!("{}/api/admin/seed", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Resource not found");
}

#[tokio::test]
async fn router_lists_no_subjects_on_fresh_database() {
    let app = routes::create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/subjects")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let subjects: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(subjects, serde_json::json!([]));
}

#[tokio::test]
async fn seed_then_list() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    seed(&client, &address).await;

    let subjects: Vec<serde_json::Value> = client
        .get(format!("{}/api/subjects", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(subjects.len(), 2);
    assert_eq!(subjects[0]["subject"], "TESTE");
    assert_eq!(
        subjects[0]["topics"],
        serde_json::json!(["Funções", "Módulos", "Decoradores"])
    );

    let teste: Vec<serde_json::Value> = client
        .get(format!("{}/api/answers", address))
        .query(&[("subject", "TESTE")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(teste.len(), 5);
    for answer in &teste {
        assert_eq!(answer["subject"], "TESTE");
        let levels = answer["answers_for_topics"].as_object().unwrap();
        assert_eq!(levels.len(), 3);
        assert!(levels.values().all(|v| v.as_u64().unwrap() <= 5));
    }

    // No subject means no filter.
    let all: Vec<serde_json::Value> = client
        .get(format!("{}/api/answers", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 10);
}

#[tokio::test]
async fn clear_empties_everything() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    seed(&client, &address).await;

    let response = client
        .post(format!("{}/api/admin/clear", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let subjects: Vec<serde_json::Value> = client
        .get(format!("{}/api/subjects", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(subjects.is_empty());

    let answers: Vec<serde_json::Value> = client
        .get(format!("{}/api/answers", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(answers.is_empty());
}

#[tokio::test]
async fn submit_answer_and_see_it_in_status() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    seed(&client, &address).await;

    let response = client
        .post(format!("{}/api/answers", address))
        .json(&serde_json::json!({
            "subject": "TESTE",
            "answers_for_topics": {"Funções": 3, "Módulos": 0, "Decoradores": 5}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let answers: Vec<serde_json::Value> = client
        .get(format!("{}/api/answers", address))
        .query(&[("subject", "TESTE")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(answers.len(), 6);
    assert_eq!(
        answers[5]["answers_for_topics"],
        serde_json::json!({"Funções": 3, "Módulos": 0, "Decoradores": 5})
    );

    let status: serde_json::Value = client
        .get(format!("{}/api/status", address))
        .query(&[("subject", "TESTE")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        status["table"]["columns"],
        serde_json::json!(["Funções", "Módulos", "Decoradores"])
    );
    assert_eq!(status["answers"].as_array().unwrap().len(), 6);

    let traces = status["chart"]["data"].as_array().unwrap();
    assert_eq!(traces.len(), 3);
    for (trace, expected) in traces.iter().zip([3, 0, 5]) {
        let y = trace["y"].as_array().unwrap();
        assert_eq!(y.len(), 6);
        assert_eq!(y[5], expected);
        assert_eq!(trace["type"], "box");
        assert_eq!(trace["boxpoints"], "all");
    }

    let summary = status["summary"].as_array().unwrap();
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[0]["topic"], "Funções");
    assert_eq!(summary[0]["count"], 6);
}

#[tokio::test]
async fn submit_answer_rejects_out_of_range_levels() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/answers", address))
        .json(&serde_json::json!({
            "subject": "TESTE",
            "answers_for_topics": {"Funções": 6}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let answers: Vec<serde_json::Value> = client
        .get(format!("{}/api/answers", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(answers.is_empty());
}

#[tokio::test]
async fn status_requires_a_subject() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/status", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn status_of_subject_without_answers_is_empty() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let status: serde_json::Value = client
        .get(format!("{}/api/status", address))
        .query(&[("subject", "Nada")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["subject"], "Nada");
    assert_eq!(status["chart"]["data"], serde_json::json!([]));
    assert_eq!(status["summary"], serde_json::json!([]));
    assert_eq!(status["chart"]["layout"]["title"]["text"], "Familiarity by topic");
}
