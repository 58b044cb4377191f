//! Backend API
//!
//! The attendance backend owns all state. The view models talk to it only
//! through [`AttendanceApi`], which keeps them testable against a fake and keeps
//! the wire format behind [`dto`].
//!
//! ## Endpoints
//!
//! | Method   | Path                   | Purpose                              |
//! |----------|------------------------|--------------------------------------|
//! | `GET`    | `/members`             | All members                          |
//! | `POST`   | `/members`             | Create a member                      |
//! | `DELETE` | `/members/{id}`        | Delete a member                      |
//! | `GET`    | `/sessions/active`     | The active session, if any           |
//! | `POST`   | `/sessions`            | Start a session (supersedes the old) |
//! | `GET`    | `/sessions/{id}/stats` | Aggregate counts for a session       |
//! | `GET`    | `/attendance/current`  | Joined attendance for the current one|
//! | `POST`   | `/scan`                | Attendee registration                |

mod client;
pub mod dto;
mod error;

#[cfg(test)]
pub(crate) mod fake;

pub use client::HttpAttendanceApi;
pub use error::{ApiError, ApiResult, UNREACHABLE_MESSAGE};

use crate::models::{
    AttendanceRecord, Member, MemberId, NewMember, Registration, Session, SessionId, Stats,
};
use async_trait::async_trait;

/// Operations the attendance backend exposes
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn list_members(&self) -> ApiResult<Vec<Member>>;

    /// Rejected with the backend's message on e.g. a duplicate email.
    /// The created member is returned when the reply carries one.
    async fn create_member(&self, member: &NewMember) -> ApiResult<Option<Member>>;

    async fn delete_member(&self, id: &MemberId) -> ApiResult<()>;

    /// `Ok(None)` when no session is running
    async fn active_session(&self) -> ApiResult<Option<Session>>;

    /// The returned session becomes active and deactivates any prior one
    async fn create_session(&self, name: &str) -> ApiResult<Session>;

    async fn session_stats(&self, id: &SessionId) -> ApiResult<Stats>;

    /// Attendance for whichever session the backend considers current
    async fn current_attendance(&self) -> ApiResult<Vec<AttendanceRecord>>;

    /// Returns the backend's confirmation message, if it sent one
    async fn register_attendance(&self, registration: &Registration) -> ApiResult<Option<String>>;
}
