use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const TOKENS: &str = "token-alice:alice,token-bob:bob,token-carol:carol,token-dave:dave";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Habit {
    id: String,
    completed_dates: Vec<String>,
    streak: u32,
    completed_today: bool,
}

#[derive(Debug, Deserialize)]
struct HabitsResponse {
    habits: Vec<Habit>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/settings")).send().await {
            if resp.status() == StatusCode::UNAUTHORIZED {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_habit_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("APP_TOKENS", TOKENS)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn create_account(client: &Client, server: &TestServer, token: &str) {
    let response = client
        .post(format!("{}/api/account", server.base_url))
        .bearer_auth(token)
        .json(&serde_json::json!({ "email": "someone@example.com", "name": "Someone" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

async fn toggle(client: &Client, server: &TestServer, token: &str, id: &str, date: &str) -> reqwest::Response {
    client
        .put(format!("{}/api/habits/{id}/toggle?date={date}", server.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_toggle_twice_restores_habit() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    create_account(&client, &server, "token-alice").await;

    for date in ["2024-02-08", "2024-02-09"] {
        assert!(toggle(&client, &server, "token-alice", "1", date).await.status().is_success());
    }

    let before: HabitsResponse = client
        .get(format!("{}/api/habits?date=2024-02-10", server.base_url))
        .bearer_auth("token-alice")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let meditation = before.habits.iter().find(|habit| habit.id == "1").unwrap();
    assert_eq!(meditation.streak, 2);
    assert!(!meditation.completed_today);

    let on: HabitsResponse = toggle(&client, &server, "token-alice", "1", "2024-02-10")
        .await
        .json()
        .await
        .unwrap();
    let meditation = on.habits.iter().find(|habit| habit.id == "1").unwrap();
    assert_eq!(meditation.streak, 3);
    assert!(meditation.completed_today);
    assert!(meditation.completed_dates.contains(&"2024-02-10".to_string()));

    let off: HabitsResponse = toggle(&client, &server, "token-alice", "1", "2024-02-10")
        .await
        .json()
        .await
        .unwrap();
    let meditation = off.habits.iter().find(|habit| habit.id == "1").unwrap();
    assert_eq!(meditation.streak, 2);
    assert!(!meditation.completed_today);
    assert_eq!(meditation.completed_dates, vec!["2024-02-08", "2024-02-09"]);
    assert!(off.habits.iter().filter(|habit| habit.id != "1").all(|habit| habit.completed_dates.is_empty()));
}

#[tokio::test]
async fn http_toggle_rejects_unknown_habit_and_bad_date() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    create_account(&client, &server, "token-bob").await;

    let missing = toggle(&client, &server, "token-bob", "nope", "2024-02-10").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let bad_date = toggle(&client, &server, "token-bob", "1", "2024-02-30").await;
    assert_eq!(bad_date.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_requires_known_token() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let anonymous = client
        .get(format!("{}/api/habits", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let unknown = client
        .get(format!("{}/api/habits", server.base_url))
        .bearer_auth("token-mallory")
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_bulk_replace_validates_dates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let rejected = client
        .post(format!("{}/api/habits?date=2024-03-02", server.base_url))
        .bearer_auth("token-carol")
        .json(&serde_json::json!({
            "habits": [{ "id": "walk", "name": "Walk", "completedDates": ["March 1st"] }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let accepted: HabitsResponse = client
        .post(format!("{}/api/habits?date=2024-03-02", server.base_url))
        .bearer_auth("token-carol")
        .json(&serde_json::json!({
            "habits": [{ "id": "walk", "name": "Walk", "completedDates": ["2024-03-01", "2024-03-02", "2024-03-01"] }]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(accepted.habits.len(), 1);
    assert_eq!(accepted.habits[0].completed_dates.len(), 2);
    assert_eq!(accepted.habits[0].streak, 2);
}

#[tokio::test]
async fn http_malformed_body_gets_json_error() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/habits", server.base_url))
        .bearer_auth("token-carol")
        .header("content-type", "application/json")
        .body("{\"habits\": [")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn http_stats_reflect_toggles() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    create_account(&client, &server, "token-dave").await;

    for id in ["1", "2"] {
        assert!(toggle(&client, &server, "token-dave", id, "2026-01-05").await.status().is_success());
    }

    let stats: serde_json::Value = client
        .get(format!("{}/api/stats?date=2026-01-05", server.base_url))
        .bearer_auth("token-dave")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["summary"]["completedToday"], 2);
    assert_eq!(stats["summary"]["completionRate"], 50);
    assert_eq!(stats["last7Days"][6]["completions"], 2);
}
