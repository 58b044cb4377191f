//! Attendee registration form
//!
//! Reached by scanning a session's link. The session id comes from the link;
//! the attendee supplies a phone number and, on a first visit, a name and email.
//! Whether the attendee is new or returning is decided by the backend.

use super::message::UiMessage;
use super::{BusyGuard, Outcome};
use crate::api::AttendanceApi;
use crate::models::{Registration, SessionId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

const RECORDED: &str = "Attendance recorded successfully!";

/// Path segment that precedes the session id in a scan link
const ATTEND_SEGMENT: &str = "attend";

/// Session id carried by a scan link.
///
/// Accepts `.../attend/{id}` and `...?sessionId={id}`; the path form wins when
/// both are present. Works on full URLs and bare paths alike.
pub fn parse_session_link(link: &str) -> Option<SessionId> {
    let link = link.trim();
    let link = link.split('#').next().unwrap_or_default();
    let (path, query) = match link.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (link, None),
    };
    // Drop `scheme://authority` so a host name is never read as a segment
    let path = match path.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or_default(),
        None => path,
    };

    let mut segments = path.split('/');
    let from_path = segments
        .by_ref()
        .find(|s| *s == ATTEND_SEGMENT)
        .and_then(|_| segments.next())
        .and_then(decode);
    if from_path.is_some() {
        return from_path.map(SessionId::new);
    }

    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "sessionId")
        .and_then(|(_, value)| decode(value))
        .map(SessionId::new)
}

fn decode(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw).ok()?;
    let trimmed = decoded.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Link encoded in a session's QR code when the backend does not supply one
pub fn build_scan_link(base_url: &str, session_id: &SessionId) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        ATTEND_SEGMENT,
        urlencoding::encode(session_id.as_str())
    )
}

#[derive(Debug, Clone, Default)]
struct FormState {
    name: String,
    phone: String,
    email: String,
    message: Option<UiMessage>,
}

/// Point-in-time copy of the form
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationSnapshot {
    pub session_id: Option<SessionId>,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: Option<UiMessage>,
    pub busy: bool,
}

/// One attendee's registration against a single session.
///
/// The message stays until the next submission.
pub struct RegistrationForm<A: AttendanceApi> {
    api: Arc<A>,
    session_id: Option<SessionId>,
    state: RwLock<FormState>,
    busy: AtomicBool,
}

impl<A: AttendanceApi> RegistrationForm<A> {
    pub fn new(api: Arc<A>, session_id: Option<SessionId>) -> Self {
        Self {
            api,
            session_id,
            state: RwLock::new(FormState::default()),
            busy: AtomicBool::new(false),
        }
    }

    /// Form for the session named by a scanned link
    pub fn from_link(api: Arc<A>, link: &str) -> Self {
        let session_id = parse_session_link(link);
        if session_id.is_none() {
            tracing::warn!(link, "Scan link carries no session id");
        }
        Self::new(api, session_id)
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub async fn set_name(&self, name: impl Into<String>) {
        self.state.write().await.name = name.into();
    }

    pub async fn set_phone(&self, phone: impl Into<String>) {
        self.state.write().await.phone = phone.into();
    }

    pub async fn set_email(&self, email: impl Into<String>) {
        self.state.write().await.email = email.into();
    }

    pub async fn submit(&self) -> Outcome {
        let Some(session_id) = self.session_id.clone() else {
            self.set_message(UiMessage::error("Invalid session link")).await;
            return Outcome::Invalid;
        };

        let registration = {
            let state = self.state.read().await;
            Registration {
                session_id,
                phone: state.phone.trim().to_string(),
                name: non_blank(&state.name),
                email: non_blank(&state.email),
            }
        };

        if registration.phone.is_empty() {
            self.set_message(UiMessage::error("Phone number is required"))
                .await;
            return Outcome::Invalid;
        }

        let Some(guard) = BusyGuard::acquire(&self.busy) else {
            tracing::debug!("Registration already in flight");
            return Outcome::Skipped;
        };
        let result = self.api.register_attendance(&registration).await;
        drop(guard);

        match result {
            Ok(reply) => {
                tracing::info!(
                    session = %registration.session_id,
                    first_visit = registration.name.is_some(),
                    "Attendance registered"
                );
                let text = reply.unwrap_or_else(|| RECORDED.to_string());
                let mut state = self.state.write().await;
                *state = FormState {
                    message: Some(UiMessage::success(text)),
                    ..FormState::default()
                };
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!(session = %registration.session_id, error = %e, "Registration failed");
                self.set_message(UiMessage::error(e.user_message("Error submitting attendance")))
                    .await;
                Outcome::Failed
            }
        }
    }

    pub async fn message(&self) -> Option<UiMessage> {
        self.state.read().await.message.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> RegistrationSnapshot {
        let state = self.state.read().await.clone();
        RegistrationSnapshot {
            session_id: self.session_id.clone(),
            name: state.name,
            phone: state.phone,
            email: state.email,
            message: state.message,
            busy: self.is_busy(),
        }
    }

    async fn set_message(&self, message: UiMessage) {
        self.state.write().await.message = Some(message);
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
