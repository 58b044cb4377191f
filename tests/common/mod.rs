//! In-process stub of the attendance backend
//!
//! Speaks the Mongo-flavoured wire format (`_id`, `session_name`, snake_case
//! counters) so the tests exercise the real reqwest adapter end to end.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use fellowship_attendance::{BackendConfig, HttpAttendanceApi};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct StubMember {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub first_scan_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StubSession {
    pub id: String,
    pub name: String,
    pub date: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct Scan {
    pub session_id: String,
    pub member_id: String,
    pub time: String,
    pub first_time: bool,
}

#[derive(Debug, Default)]
pub struct StubState {
    pub next_id: u64,
    pub members: Vec<StubMember>,
    pub sessions: Vec<StubSession>,
    pub scans: Vec<Scan>,
    /// Fail every members listing with a 500
    pub fail_members: bool,
}

impl StubState {
    fn new_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }

    fn active(&self) -> Option<&StubSession> {
        self.sessions.iter().find(|s| s.active)
    }
}

#[derive(Clone, Default)]
struct Shared {
    state: Arc<Mutex<StubState>>,
    stats_hits: Arc<AtomicUsize>,
}

pub struct StubBackend {
    pub base_url: String,
    state: Arc<Mutex<StubState>>,
    stats_hits: Arc<AtomicUsize>,
}

impl StubBackend {
    /// Serve the stub on an ephemeral local port
    pub async fn spawn() -> Self {
        let shared = Shared::default();
        let app = router(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state: shared.state,
            stats_hits: shared.stats_hits,
        }
    }

    pub fn config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            ..BackendConfig::default()
        }
    }

    pub fn api(&self) -> Arc<HttpAttendanceApi> {
        Arc::new(HttpAttendanceApi::new(&self.config()).unwrap())
    }

    pub fn add_member(&self, name: &str, email: &str, phone: Option<&str>) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.new_id();
        state.members.push(StubMember {
            id: id.clone(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
            first_scan_date: None,
        });
        id
    }

    pub fn start_session(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        start_session(&mut state, name)
    }

    /// Mark a member present in the active session
    pub fn mark_present(&self, member_id: &str) {
        let mut state = self.state.lock().unwrap();
        let session_id = state.active().map(|s| s.id.clone()).unwrap();
        state.scans.push(Scan {
            session_id,
            member_id: member_id.to_string(),
            time: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            first_time: false,
        });
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&mut StubState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn stats_hits(&self) -> usize {
        self.stats_hits.load(Ordering::SeqCst)
    }
}

fn router(shared: Shared) -> Router {
    let api = Router::new()
        .route("/members", get(list_members).post(create_member))
        .route("/members/:id", delete(delete_member))
        .route("/sessions", post(create_session))
        .route("/sessions/active", get(active_session))
        .route("/sessions/:id/stats", get(session_stats))
        .route("/attendance/current", get(current_attendance))
        .route("/scan", post(scan))
        .route("/attendees", post(scan));

    Router::new().nest("/api", api).with_state(shared)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn member_json(member: &StubMember) -> Value {
    json!({
        "_id": member.id,
        "name": member.name,
        "email": member.email,
        "phone": member.phone,
        "first_scan_date": member.first_scan_date,
    })
}

fn session_json(session: &StubSession) -> Value {
    json!({
        "_id": session.id,
        "session_name": session.name,
        "session_date": session.date,
        "is_active": session.active,
        "qr_data": format!("http://localhost:5173/attend/{}", session.id),
        "qr_code_image": "data:image/png;base64,iVBORw0KGgo=",
    })
}

fn start_session(state: &mut StubState, name: &str) -> String {
    for session in &mut state.sessions {
        session.active = false;
    }
    let id = state.new_id();
    state.sessions.push(StubSession {
        id: id.clone(),
        name: name.to_string(),
        date: Utc::now().to_rfc3339(),
        active: true,
    });
    id
}

async fn list_members(State(shared): State<Shared>) -> Response {
    let state = shared.state.lock().unwrap();
    if state.fail_members {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }
    Json(Value::Array(state.members.iter().map(member_json).collect())).into_response()
}

async fn create_member(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default().trim().to_string();
    let email = body["email"].as_str().unwrap_or_default().trim().to_string();
    if name.is_empty() || email.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Name and email are required");
    }

    let mut state = shared.state.lock().unwrap();
    if state.members.iter().any(|m| m.email == email) {
        return error(StatusCode::BAD_REQUEST, "Member with this email already exists");
    }

    let member = StubMember {
        id: state.new_id(),
        name,
        email,
        phone: body["phone"].as_str().map(str::to_string),
        first_scan_date: None,
    };
    let reply = member_json(&member);
    state.members.push(member);
    (StatusCode::CREATED, Json(reply)).into_response()
}

async fn delete_member(State(shared): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = shared.state.lock().unwrap();
    let before = state.members.len();
    state.members.retain(|m| m.id != id);
    if state.members.len() == before {
        return error(StatusCode::NOT_FOUND, "Member not found");
    }
    state.scans.retain(|s| s.member_id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn active_session(State(shared): State<Shared>) -> Response {
    let state = shared.state.lock().unwrap();
    match state.active() {
        Some(session) => Json(session_json(session)).into_response(),
        None => error(StatusCode::NOT_FOUND, "No active session"),
    }
}

async fn create_session(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Session name is required");
    }

    let mut state = shared.state.lock().unwrap();
    start_session(&mut state, &name);
    let reply = state.active().map(session_json).unwrap();
    (StatusCode::CREATED, Json(reply)).into_response()
}

async fn session_stats(State(shared): State<Shared>, Path(id): Path<String>) -> Response {
    shared.stats_hits.fetch_add(1, Ordering::SeqCst);
    let state = shared.state.lock().unwrap();
    let scans: Vec<&Scan> = state.scans.iter().filter(|s| s.session_id == id).collect();
    Json(json!({
        "total_members": state.members.len(),
        "present_count": scans.len(),
        "first_time_count": scans.iter().filter(|s| s.first_time).count(),
    }))
    .into_response()
}

async fn current_attendance(State(shared): State<Shared>) -> Response {
    let state = shared.state.lock().unwrap();
    let Some(session) = state.active() else {
        return Json(json!([])).into_response();
    };

    let records: Vec<Value> = state
        .members
        .iter()
        .map(|member| {
            let scan = state
                .scans
                .iter()
                .find(|s| s.session_id == session.id && s.member_id == member.id);
            json!({
                "_id": member.id,
                "name": member.name,
                "email": member.email,
                "is_present": scan.is_some(),
                "scan_time": scan.map(|s| s.time.clone()),
                "is_first_time": scan.map(|s| s.first_time).unwrap_or(false),
            })
        })
        .collect();
    Json(Value::Array(records)).into_response()
}

async fn scan(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let session_id = body["sessionId"].as_str().unwrap_or_default().to_string();
    let phone = body["phone"].as_str().unwrap_or_default().trim().to_string();
    if phone.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Phone number is required");
    }

    let mut state = shared.state.lock().unwrap();
    if state.active().map(|s| s.id.as_str()) != Some(session_id.as_str()) {
        return error(StatusCode::NOT_FOUND, "Session not found or inactive");
    }

    let now = Utc::now();
    let existing = state
        .members
        .iter()
        .find(|m| m.phone.as_deref() == Some(phone.as_str()))
        .map(|m| m.id.clone());

    let (member_id, first_time, message) = match existing {
        Some(id) => {
            if state
                .scans
                .iter()
                .any(|s| s.session_id == session_id && s.member_id == id)
            {
                return error(StatusCode::BAD_REQUEST, "Attendance already recorded");
            }
            (id, false, "Welcome back!".to_string())
        }
        None => {
            let Some(name) = body["name"].as_str().filter(|n| !n.trim().is_empty()) else {
                return error(
                    StatusCode::BAD_REQUEST,
                    "Name is required for first-time attendees",
                );
            };
            let id = state.new_id();
            state.members.push(StubMember {
                id: id.clone(),
                name: name.trim().to_string(),
                email: body["email"].as_str().unwrap_or_default().to_string(),
                phone: Some(phone.clone()),
                first_scan_date: Some(now.to_rfc3339()),
            });
            (id, true, format!("Welcome, {}! First-time attendance recorded.", name.trim()))
        }
    };

    state.scans.push(Scan {
        session_id,
        member_id,
        time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        first_time,
    });
    Json(json!({ "message": message })).into_response()
}
