//! In-process mock of the hospital backend
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};

use medidesk::{ApiClient, BackendConfig, MemoryTokenStore, RecordingNotifier};

pub const TOKEN: &str = "test-token";

/// A request the mock backend received
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<(String, String), (u16, Value)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: MockState,
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let recorded = Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    };
    state.requests.lock().unwrap().push(recorded);

    let route = state
        .routes
        .lock()
        .unwrap()
        .get(&(method.to_string(), path))
        .cloned();

    match route {
        Some((status, body)) => (StatusCode::from_u16(status).unwrap(), Json(body)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Answer `method path` with `status` and a JSON body
    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    pub fn client(&self, token: Option<&str>) -> ApiClient {
        client_at(&self.base_url, token)
    }
}

pub fn client_at(base_url: &str, token: Option<&str>) -> ApiClient {
    let store = match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    };
    let config = BackendConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
    };
    ApiClient::new(&config, Arc::new(store)).unwrap()
}

/// Address nothing listens on
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn notifier() -> Arc<RecordingNotifier> {
    Arc::new(RecordingNotifier::new())
}

pub fn patient_profile() -> Value {
    json!({"id": 11, "full_name": "Ravi Kumar", "email": "ravi@example.com"})
}

pub fn doctor_profile() -> Value {
    json!({
        "user": {"id": 3, "full_name": "Asha Rao", "email": "asha@hospital.org"},
        "specialization": "Cardiologist",
        "available_from": "08:00:00",
        "available_to": "20:00:00",
        "upi_id": "asha@upi",
        "max_appointments": 10
    })
}

pub fn medicines() -> Value {
    json!([
        {"id": 1, "name": "Paracetamol", "type": "Tablet"},
        {"id": 2, "name": "Amoxicillin", "type": "Capsule"},
        {"id": 3, "name": "Cough Syrup", "type": "Syrup"}
    ])
}
