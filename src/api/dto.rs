//! Wire DTOs
//!
//! The backend has shipped several revisions with different field names for the
//! same data (`id` / `_id` / `sessionId`, `name` / `session_name`, `qr_data` /
//! `qrData`, counts as numbers or strings). Every variant is accepted here and
//! collapsed into the canonical types in [`crate::models`]; nothing past this
//! module sees a wire name.

use crate::models::{
    AttendanceRecord, Member, MemberId, Registration, Session, SessionId, Stats,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

// ============================================
// Lenient scalars
// ============================================

/// Identity sent as a JSON string or integer
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
    Other(IgnoredAny),
}

impl RawId {
    fn into_string(self) -> Option<String> {
        match self {
            RawId::Text(s) if s.trim().is_empty() => None,
            RawId::Text(s) => Some(s),
            RawId::Number(n) => Some(n.to_string()),
            RawId::Other(_) => None,
        }
    }
}

/// Count sent as a number or as a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCount {
    Number(u64),
    Text(String),
    Other(IgnoredAny),
}

impl RawCount {
    fn value(&self) -> u32 {
        match self {
            RawCount::Number(n) => u32::try_from(*n).unwrap_or(u32::MAX),
            RawCount::Text(s) => s.trim().parse().unwrap_or(0),
            RawCount::Other(_) => 0,
        }
    }
}

/// Flag sent as a bool, 0/1, or "true"/"false"
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFlag {
    Bool(bool),
    Number(i64),
    Text(String),
    Other(IgnoredAny),
}

impl RawFlag {
    fn value(&self) -> bool {
        match self {
            RawFlag::Bool(b) => *b,
            RawFlag::Number(n) => *n != 0,
            RawFlag::Text(s) => matches!(s.trim(), "true" | "1" | "t" | "yes"),
            RawFlag::Other(_) => false,
        }
    }
}

/// Timestamp sent as a string in one of several formats, or as epoch millis
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
    /// Floats, `{"$date": ..}` wrappers and the like; read as absent
    Other(IgnoredAny),
}

impl RawTimestamp {
    fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            RawTimestamp::Text(s) => parse_timestamp(s),
            RawTimestamp::Other(_) => None,
        }
    }
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` (assumed UTC) or a bare date
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn first_text(candidates: [Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

fn first_id(candidates: impl IntoIterator<Item = Option<RawId>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find_map(RawId::into_string)
}

// ============================================
// Responses
// ============================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberDto {
    id: Option<RawId>,
    #[serde(rename = "_id")]
    mongo_id: Option<RawId>,
    #[serde(rename = "memberId")]
    member_id: Option<RawId>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    first_scan_date: Option<RawTimestamp>,
    first_attended_at: Option<RawTimestamp>,
}

impl MemberDto {
    /// None when the backend sent no usable identity
    pub fn into_member(self) -> Option<Member> {
        let id = first_id([self.id, self.mongo_id, self.member_id])?;
        Some(Member {
            id: MemberId::new(id),
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.filter(|p| !p.trim().is_empty()),
            first_attended_at: self
                .first_scan_date
                .or(self.first_attended_at)
                .and_then(|t| t.parse()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionDto {
    id: Option<RawId>,
    #[serde(rename = "_id")]
    mongo_id: Option<RawId>,
    #[serde(rename = "sessionId")]
    session_id_camel: Option<RawId>,
    session_id: Option<RawId>,
    name: Option<String>,
    session_name: Option<String>,
    #[serde(rename = "sessionName")]
    session_name_camel: Option<String>,
    created_at: Option<RawTimestamp>,
    #[serde(rename = "createdAt")]
    created_at_camel: Option<RawTimestamp>,
    session_date: Option<RawTimestamp>,
    is_active: Option<RawFlag>,
    #[serde(rename = "isActive")]
    is_active_camel: Option<RawFlag>,
    qr_data: Option<String>,
    #[serde(rename = "qrData")]
    qr_data_camel: Option<String>,
    scan_url: Option<String>,
    qr_code_image: Option<String>,
    #[serde(rename = "qrCodeImage")]
    qr_code_image_camel: Option<String>,
}

impl SessionDto {
    /// None when the body carries no session identity (an empty active-session reply)
    pub fn into_session(self) -> Option<Session> {
        let id = first_id([
            self.id,
            self.mongo_id,
            self.session_id_camel,
            self.session_id,
        ])?;
        let name = first_text([self.name, self.session_name, self.session_name_camel])
            .unwrap_or_default();
        let created_at = self
            .created_at
            .or(self.created_at_camel)
            .or(self.session_date)
            .and_then(|t| t.parse());
        // Both endpoints that return a session return the active one
        let is_active = self
            .is_active
            .or(self.is_active_camel)
            .map(|f| f.value())
            .unwrap_or(true);

        Some(Session {
            id: SessionId::new(id),
            name,
            created_at,
            is_active,
            scan_url: first_text([self.qr_data, self.qr_data_camel, self.scan_url]),
            qr_image: first_text([self.qr_code_image, self.qr_code_image_camel, None]),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceRecordDto {
    id: Option<RawId>,
    #[serde(rename = "_id")]
    mongo_id: Option<RawId>,
    member_id: Option<RawId>,
    #[serde(rename = "memberId")]
    member_id_camel: Option<RawId>,
    name: Option<String>,
    email: Option<String>,
    is_present: Option<RawFlag>,
    #[serde(rename = "isPresent")]
    is_present_camel: Option<RawFlag>,
    scan_time: Option<RawTimestamp>,
    #[serde(rename = "scanTime")]
    scan_time_camel: Option<RawTimestamp>,
    is_first_time: Option<RawFlag>,
    #[serde(rename = "isFirstTime")]
    is_first_time_camel: Option<RawFlag>,
}

impl AttendanceRecordDto {
    pub fn into_record(self) -> Option<AttendanceRecord> {
        let id = first_id([
            self.member_id,
            self.member_id_camel,
            self.id,
            self.mongo_id,
        ])?;
        Some(AttendanceRecord {
            member_id: MemberId::new(id),
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            is_present: self
                .is_present
                .or(self.is_present_camel)
                .map(|f| f.value())
                .unwrap_or(false),
            scan_time: self
                .scan_time
                .or(self.scan_time_camel)
                .and_then(|t| t.parse()),
            is_first_time: self
                .is_first_time
                .or(self.is_first_time_camel)
                .map(|f| f.value())
                .unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsDto {
    total_members: Option<RawCount>,
    #[serde(rename = "totalMembers")]
    total_members_camel: Option<RawCount>,
    present_count: Option<RawCount>,
    #[serde(rename = "presentCount")]
    present_count_camel: Option<RawCount>,
    first_time_count: Option<RawCount>,
    #[serde(rename = "firstTimeCount")]
    first_time_count_camel: Option<RawCount>,
}

impl From<StatsDto> for Stats {
    fn from(dto: StatsDto) -> Self {
        let count = |a: Option<RawCount>, b: Option<RawCount>| {
            a.or(b).map(|c| c.value()).unwrap_or(0)
        };
        Stats {
            total_members: count(dto.total_members, dto.total_members_camel),
            present_count: count(dto.present_count, dto.present_count_camel),
            first_time_count: count(dto.first_time_count, dto.first_time_count_camel),
        }
    }
}

/// Reply to a registration: `{message}` on success
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationReply {
    pub message: Option<String>,
}

/// Error payload: `{"error": "..."}`, `{"error": {"message": "..."}}` or `{"message": "..."}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    error: Option<ErrorField>,
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Detailed { message: String },
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        let from_error = self.error.map(|e| match e {
            ErrorField::Text(s) => s,
            ErrorField::Detailed { message } => message,
        });
        first_text([from_error, self.message, None])
    }
}

// ============================================
// Requests
// ============================================

#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegistrationRequest<'a> {
    #[serde(rename = "sessionId")]
    pub session_id: &'a str,
    pub phone: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

impl<'a> From<&'a Registration> for RegistrationRequest<'a> {
    fn from(r: &'a Registration) -> Self {
        Self {
            session_id: r.session_id.as_str(),
            phone: &r.phone,
            name: r.name.as_deref(),
            email: r.email.as_deref(),
        }
    }
}
