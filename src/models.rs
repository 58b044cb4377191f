//! Domain Models
//!
//! Canonical client-side view of the backend's entities. Backend field naming
//! never leaks past the wire adapter in [`crate::api`]; everything here uses a
//! single identity field per entity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Opaque member identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MemberId(String);

/// Opaque session identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(String);

macro_rules! opaque_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(MemberId);
opaque_id!(SessionId);

/// A registered member of the fellowship
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Set by the backend on the member's first scan, never changed afterwards
    pub first_attended_at: Option<DateTime<Utc>>,
}

/// An attendance-taking window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// Link encoded in the session's QR code
    pub scan_url: Option<String>,
    /// Pre-rendered QR image reference (data URL or remote URL)
    pub qr_image: Option<String>,
}

/// A member's presence joined against the current session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub member_id: MemberId,
    pub name: String,
    pub email: String,
    pub is_present: bool,
    pub scan_time: Option<DateTime<Utc>>,
    pub is_first_time: bool,
}

/// Aggregate counts for one session, computed by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_members: u32,
    pub present_count: u32,
    pub first_time_count: u32,
}

/// Input for creating a member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl NewMember {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Name and email are both required before anything is sent
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }
}

/// A single attendee registration submitted through a scanned link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub session_id: SessionId,
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Number of records marked present
pub fn present_count(records: &[AttendanceRecord]) -> usize {
    records.iter().filter(|r| r.is_present).count()
}

/// Number of records not marked present
pub fn absent_count(records: &[AttendanceRecord]) -> usize {
    records.len() - present_count(records)
}
