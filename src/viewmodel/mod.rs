//! View Models
//!
//! Presentation state for the two attendance screens:
//!
//! - [`AttendanceViewModel`]: the organizer dashboard (members, active session,
//!   live attendance, stats)
//! - [`RegistrationForm`]: the attendee form reached by scanning a session link
//!
//! Both own snapshots that are only ever replaced wholesale from backend replies
//! and report problems through [`UiMessage`]s rather than errors.

use std::sync::atomic::{AtomicBool, Ordering};

mod dashboard;
mod message;
mod registration;

pub use dashboard::{AttendanceViewModel, Confirmation, DashboardSnapshot};
pub use message::{MessageBanner, MessageKind, UiMessage};
pub use registration::{build_scan_link, parse_session_link, RegistrationForm, RegistrationSnapshot};

/// Result of a user-initiated write action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The backend accepted the action
    Completed,
    /// Local validation failed; nothing was sent
    Invalid,
    /// The backend rejected the action or could not be reached
    Failed,
    /// Not attempted: another submission is in flight, or the user declined
    Skipped,
}

impl Outcome {
    pub fn is_completed(self) -> bool {
        self == Outcome::Completed
    }
}

/// Holds a busy flag for the length of one write; released on drop, including
/// when the submitting future is cancelled
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    /// None when another write already holds the flag
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
