//! Attendance dashboard view model
//!
//! Holds the organizer's view of members, the active session, live attendance
//! and session stats. Each refresh replaces exactly one field of the snapshot,
//! so overlapping refreshes never corrupt each other; the last reply to land
//! wins.

use super::message::{MessageBanner, UiMessage};
use super::{BusyGuard, Outcome};
use crate::api::{ApiError, AttendanceApi, UNREACHABLE_MESSAGE};
use crate::config::DashboardConfig;
use crate::models::{
    absent_count, present_count, AttendanceRecord, Member, MemberId, NewMember, Session,
    SessionId, Stats,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const DELETE_PROMPT: &str = "Are you sure you want to delete this member?";

/// Asks the user to confirm an irreversible action
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Default)]
struct DashboardState {
    members: Vec<Member>,
    active_session: Option<Session>,
    attendance: Vec<AttendanceRecord>,
    stats: Stats,
    member_draft: NewMember,
    session_name_draft: String,
}

/// Point-in-time copy of the dashboard for rendering
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub members: Vec<Member>,
    pub active_session: Option<Session>,
    pub attendance: Vec<AttendanceRecord>,
    pub stats: Stats,
    pub member_draft: NewMember,
    pub session_name_draft: String,
    pub message: Option<UiMessage>,
    pub busy: bool,
}

impl DashboardSnapshot {
    pub fn present_count(&self) -> usize {
        present_count(&self.attendance)
    }

    pub fn absent_count(&self) -> usize {
        absent_count(&self.attendance)
    }
}

/// Organizer dashboard state and actions
pub struct AttendanceViewModel<A: AttendanceApi> {
    api: Arc<A>,
    state: RwLock<DashboardState>,
    banner: MessageBanner,
    busy: AtomicBool,
}

impl<A: AttendanceApi> AttendanceViewModel<A> {
    /// Create an empty view model; nothing is fetched until [`Self::activate`]
    pub fn new(api: Arc<A>, message_timeout: Duration) -> Self {
        Self {
            api,
            state: RwLock::new(DashboardState::default()),
            banner: MessageBanner::new(message_timeout),
            busy: AtomicBool::new(false),
        }
    }

    pub fn from_config(api: Arc<A>, config: &DashboardConfig) -> Self {
        Self::new(api, config.message_timeout())
    }

    /// Initial load: members, active session and attendance, concurrently
    pub async fn activate(&self) {
        tracing::debug!("Activating attendance dashboard");
        tokio::join!(
            self.refresh_members(),
            self.refresh_active_session(),
            self.refresh_attendance(),
        );
    }

    // ============================================
    // Reads
    // ============================================

    pub async fn refresh_members(&self) {
        match self.api.list_members().await {
            Ok(members) => {
                tracing::debug!(count = members.len(), "Members refreshed");
                self.state.write().await.members = members;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch members");
                self.show(UiMessage::error(e.user_message("Failed to fetch members")))
                    .await;
            }
        }
    }

    /// A missing session is the normal idle state and is never reported
    pub async fn refresh_active_session(&self) {
        match self.api.active_session().await {
            Ok(Some(session)) => {
                let id = session.id.clone();
                tracing::debug!(session = %id, name = %session.name, "Active session refreshed");
                self.state.write().await.active_session = Some(session);
                self.refresh_stats(&id).await;
            }
            Ok(None) => {
                tracing::debug!("No active session");
                self.state.write().await.active_session = None;
            }
            Err(ApiError::Rejected { status, .. }) => {
                tracing::debug!(status, "Active session lookup rejected, treating as no session");
                self.state.write().await.active_session = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch active session");
                self.show(UiMessage::error(e.user_message("Error fetching session")))
                    .await;
            }
        }
    }

    pub async fn refresh_attendance(&self) {
        match self.api.current_attendance().await {
            Ok(records) => {
                tracing::debug!(
                    records = records.len(),
                    present = present_count(&records),
                    "Attendance refreshed"
                );
                self.state.write().await.attendance = records;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch attendance");
                self.show(UiMessage::error(e.user_message("Failed to fetch attendance")))
                    .await;
            }
        }
    }

    /// Best effort: failures are logged, never shown
    pub async fn refresh_stats(&self, session_id: &SessionId) {
        match self.api.session_stats(session_id).await {
            Ok(stats) => {
                let mut state = self.state.write().await;
                let local_present = present_count(&state.attendance);
                if stats.present_count as usize != local_present {
                    tracing::debug!(
                        session = %session_id,
                        backend = stats.present_count,
                        local = local_present,
                        "Present count differs from attendance snapshot"
                    );
                }
                state.stats = stats;
            }
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "Failed to fetch session stats");
            }
        }
    }

    /// Attendance plus stats for the known session. Members and the active
    /// session are not re-fetched.
    pub async fn refresh_now(&self) {
        match self.active_session_id().await {
            Some(id) => {
                tokio::join!(self.refresh_attendance(), self.refresh_stats(&id));
            }
            None => self.refresh_attendance().await,
        }
    }

    /// One polling period; a session created elsewhere is only picked up by
    /// [`Self::refresh_active_session`]
    pub async fn poll_tick(&self) {
        tracing::trace!("Poll tick");
        self.refresh_now().await;
    }

    // ============================================
    // Writes
    // ============================================

    /// Submit the member draft
    pub async fn create_member(&self) -> Outcome {
        let draft = self.state.read().await.member_draft.clone();
        if !draft.is_complete() {
            self.show(UiMessage::error("Name and email are required")).await;
            return Outcome::Invalid;
        }

        let Some(guard) = self.begin_write() else {
            tracing::debug!("Member creation already in flight");
            return Outcome::Skipped;
        };

        let input = NewMember {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        };

        let result = self.api.create_member(&input).await;
        drop(guard);

        match result {
            Ok(created) => {
                tracing::info!(
                    member = created.as_ref().map(|m| m.id.as_str()).unwrap_or("?"),
                    email = %input.email,
                    "Member created"
                );
                self.state.write().await.member_draft = NewMember::default();
                self.show(UiMessage::success("Member added successfully!")).await;
                tokio::join!(self.refresh_members(), self.refresh_attendance());
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create member");
                self.show(UiMessage::error(e.user_message("Error adding member")))
                    .await;
                Outcome::Failed
            }
        }
    }

    /// Delete a member after the user confirms
    pub async fn remove_member(&self, id: &MemberId, confirmation: &impl Confirmation) -> Outcome {
        if !confirmation.confirm(DELETE_PROMPT) {
            tracing::debug!(member = %id, "Member deletion declined");
            return Outcome::Skipped;
        }

        match self.api.delete_member(id).await {
            Ok(()) => {
                tracing::info!(member = %id, "Member deleted");
                self.show(UiMessage::success("Member deleted successfully")).await;
                tokio::join!(self.refresh_members(), self.refresh_attendance());
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!(member = %id, error = %e, "Failed to delete member");
                let text = if e.is_network() {
                    UNREACHABLE_MESSAGE
                } else {
                    "Failed to delete member"
                };
                self.show(UiMessage::error(text)).await;
                Outcome::Failed
            }
        }
    }

    /// Start a session from the name draft; the backend deactivates the old one
    pub async fn create_session(&self) -> Outcome {
        let name = self.state.read().await.session_name_draft.trim().to_string();
        if name.is_empty() {
            self.show(UiMessage::error("Session name is required")).await;
            return Outcome::Invalid;
        }

        let Some(guard) = self.begin_write() else {
            tracing::debug!("Session creation already in flight");
            return Outcome::Skipped;
        };

        let result = self.api.create_session(&name).await;
        drop(guard);

        match result {
            Ok(session) => {
                let id = session.id.clone();
                tracing::info!(session = %id, name = %session.name, "Session created");
                {
                    let mut state = self.state.write().await;
                    state.active_session = Some(session);
                    state.session_name_draft.clear();
                }
                self.show(UiMessage::success("New session created successfully!"))
                    .await;
                tokio::join!(self.refresh_attendance(), self.refresh_stats(&id));
                Outcome::Completed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create session");
                self.show(UiMessage::error(e.user_message("Error creating session")))
                    .await;
                Outcome::Failed
            }
        }
    }

    // ============================================
    // Drafts and accessors
    // ============================================

    pub async fn set_member_draft(&self, draft: NewMember) {
        self.state.write().await.member_draft = draft;
    }

    pub async fn set_session_name_draft(&self, name: impl Into<String>) {
        self.state.write().await.session_name_draft = name.into();
    }

    pub async fn active_session_id(&self) -> Option<SessionId> {
        self.state
            .read()
            .await
            .active_session
            .as_ref()
            .map(|s| s.id.clone())
    }

    pub async fn message(&self) -> Option<UiMessage> {
        self.banner.current().await
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.read().await.clone();
        DashboardSnapshot {
            members: state.members,
            active_session: state.active_session,
            attendance: state.attendance,
            stats: state.stats,
            member_draft: state.member_draft,
            session_name_draft: state.session_name_draft,
            message: self.banner.current().await,
            busy: self.is_busy(),
        }
    }

    async fn show(&self, message: UiMessage) {
        self.banner.show(message).await;
    }

    fn begin_write(&self) -> Option<BusyGuard<'_>> {
        BusyGuard::acquire(&self.busy)
    }
}
