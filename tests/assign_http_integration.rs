//! Integration tests for the assignment REST API.
//!
//! Each test spins up an Axum server on a random port backed by an
//! in-memory libSQL store, seeds records, and exercises the HTTP contract.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use task_assign::assignment::model::Availability;
use task_assign::assignment::{AssignmentService, assignment_routes};
use task_assign::store::{AssignmentStore, LibSqlBackend, NewDeveloper, NewTask};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Start an Axum server on a random port, return (port, store).
async fn start_server() -> (u16, Arc<dyn AssignmentStore>) {
    let store: Arc<dyn AssignmentStore> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let service = Arc::new(AssignmentService::new(Arc::clone(&store)));
    let app = assignment_routes(service);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (port, store)
}

/// Helper: developer with skills and `assigned` tasks already on their plate.
async fn seed_developer(store: &Arc<dyn AssignmentStore>, name: &str, skills: &[&str], assigned: u32) -> i64 {
    let id = store
        .insert_developer(&NewDeveloper::new(name).with_skills(skills.iter().copied()))
        .await
        .unwrap();
    for n in 0..assigned {
        let filler = store
            .insert_task(&NewTask::new(format!("{name} backlog {n}")))
            .await
            .unwrap();
        store.create_assignment(filler, id).await.unwrap();
    }
    id
}

async fn seed_task(store: &Arc<dyn AssignmentStore>, skills: &[&str], priority: u8) -> i64 {
    store
        .insert_task(
            &NewTask::new("Ship billing export")
                .with_required_skills(skills.iter().copied())
                .with_priority(priority),
        )
        .await
        .unwrap()
}

async fn post(port: u16, path: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

// ── Health ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_endpoint() {
    timeout(TEST_TIMEOUT, async {
        let (port, _store) = start_server().await;

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/health"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "task-assign");
    })
    .await
    .expect("test timed out");
}

// ── Evaluate ────────────────────────────────────────────────────────────

#[tokio::test]
async fn evaluate_highly_recommended() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_server().await;
        let dev = seed_developer(&store, "alice", &["python", "sql", "docker"], 2).await;
        let task = seed_task(&store, &["python", "sql"], 5).await;

        let resp = post(port, "/api/assign/evaluate", json!({"task_id": task, "developer_id": dev})).await;
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["recommendation"], "Highly recommended match");
        assert_eq!(body["score"], 0.9);
        assert_eq!(body["skill_match"], 1.0);
        assert_eq!(
            body["explanation"],
            "Developer has excellent skill match (100%) and available capacity (60% available)."
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn evaluate_fallback() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_server().await;
        let dev = seed_developer(&store, "bob", &["python"], 1).await;
        let task = seed_task(&store, &["python", "sql"], 3).await;

        let resp = post(port, "/api/assign/evaluate", json!({"task_id": task, "developer_id": dev})).await;
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["recommendation"], "Consider other developers");
        assert_eq!(body["score"], 0.3);
        assert_eq!(body["skill_match"], 0.5);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn evaluate_unavailable_developer() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_server().await;
        let dev = seed_developer(&store, "carol", &["python", "sql"], 0).await;
        store
            .set_developer_availability(dev, Availability::Unavailable)
            .await
            .unwrap();
        let task = seed_task(&store, &["python", "sql"], 5).await;

        let resp = post(port, "/api/assign/evaluate", json!({"task_id": task, "developer_id": dev})).await;
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["recommendation"], "Developer is not available");
        assert_eq!(body["score"], 0.0);
        assert_eq!(
            body["explanation"],
            "Developer is not currently available for new assignments."
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn evaluate_unknown_task_is_400() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_server().await;
        let dev = seed_developer(&store, "dave", &["go"], 0).await;

        let resp = post(port, "/api/assign/evaluate", json!({"task_id": 9999, "developer_id": dev})).await;
        assert_eq!(resp.status(), 400);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Task with ID 9999 not found");
        assert_eq!(body["task_id"], 9999);
        assert_eq!(body["developer_id"], dev);
        assert!(body.get("score").is_none());
    })
    .await
    .expect("test timed out");
}

// ── Rank ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rank_candidates() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_server().await;
        let weak = seed_developer(&store, "weak", &["python"], 0).await;
        let strong = seed_developer(&store, "strong", &["python", "sql"], 1).await;
        let task = seed_task(&store, &["python", "sql"], 3).await;

        let resp = post(
            port,
            "/api/assign/rank",
            json!({"task_id": task, "developer_ids": [weak, 31337, strong]}),
        )
        .await;
        assert_eq!(resp.status(), 200);

        let body: Vec<Value> = resp.json().await.unwrap();
        assert_eq!(body.len(), 3);
        assert_eq!(body[0]["developer_id"], strong);
        assert_eq!(body[1]["developer_id"], weak);
        assert_eq!(body[2]["error"], "Developer with ID 31337 not found");
    })
    .await
    .expect("test timed out");
}

// ── Assign ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn assign_then_conflict() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_server().await;
        let dev = seed_developer(&store, "erin", &["rust"], 0).await;
        let other = seed_developer(&store, "fay", &["rust"], 0).await;
        let task = seed_task(&store, &["rust"], 3).await;

        let resp = post(port, "/api/assign", json!({"task_id": task, "developer_id": dev})).await;
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(
            body["message"],
            format!("Task {task} successfully assigned to developer {dev}")
        );

        let resp = post(port, "/api/assign", json!({"task_id": task, "developer_id": other})).await;
        assert_eq!(resp.status(), 409);

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/api/developers/{dev}/availability"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["availability"], "available");
        assert_eq!(body["current_task_count"], 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn assign_missing_and_unavailable() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_server().await;
        let away = seed_developer(&store, "gus", &["rust"], 0).await;
        store
            .set_developer_availability(away, Availability::Unavailable)
            .await
            .unwrap();
        let task = seed_task(&store, &["rust"], 3).await;

        let resp = post(port, "/api/assign", json!({"task_id": 404, "developer_id": away})).await;
        assert_eq!(resp.status(), 404);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Task with ID 404 not found");

        let resp = post(port, "/api/assign", json!({"task_id": task, "developer_id": 405})).await;
        assert_eq!(resp.status(), 404);

        let resp = post(port, "/api/assign", json!({"task_id": task, "developer_id": away})).await;
        assert_eq!(resp.status(), 409);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], format!("Developer {away} is not available"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn batch_assigns_everything() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_server().await;

        let resp = post(port, "/api/assign/batch", json!({})).await;
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "No unassigned tasks found.");

        let a = seed_developer(&store, "a", &["rust"], 0).await;
        let b = seed_developer(&store, "b", &["rust"], 0).await;
        seed_task(&store, &["rust"], 3).await;
        seed_task(&store, &["rust"], 3).await;

        let resp = post(port, "/api/assign/batch", json!({})).await;
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert!(body.get("message").is_none());
        let lines = body["assignments"].as_array().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["developer_id"], a);
        assert_eq!(lines[1]["developer_id"], b);
        assert!(lines.iter().all(|l| l["success"] == true));
    })
    .await
    .expect("test timed out");
}

// ── Lookups ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn task_lookup() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_server().await;
        let task = seed_task(&store, &["sql"], 2).await;

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/api/tasks/{task}"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["title"], "Ship billing export");
        assert_eq!(body["priority"], 2);
        assert_eq!(body["required_skills"], json!(["sql"]));

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/api/tasks/8080"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/api/developers/8080/availability"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    })
    .await
    .expect("test timed out");
}
