//! Plain-text rendering for the terminal front-ends

use crate::models::{AttendanceRecord, Member, Session};
use crate::viewmodel::{build_scan_link, DashboardSnapshot, UiMessage};
use chrono::{DateTime, Local, Utc};
use std::fmt;

/// Full dashboard: header counts, session, live attendance and the banner
pub struct DashboardView<'a> {
    pub snapshot: &'a DashboardSnapshot,
    pub scan_base_url: &'a str,
}

impl<'a> DashboardView<'a> {
    pub fn new(snapshot: &'a DashboardSnapshot, scan_base_url: &'a str) -> Self {
        Self {
            snapshot,
            scan_base_url,
        }
    }
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = self.snapshot;

        writeln!(f, "Fellowship Attendance")?;
        let session_name = snap
            .active_session
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("No Active Session");
        writeln!(f, "{} - {}", session_name, Local::now().format("%a %b %d %Y"))?;
        writeln!(
            f,
            "{} Present | {} Absent | {} First-Time",
            snap.present_count(),
            snap.absent_count(),
            snap.stats.first_time_count
        )?;

        if let Some(message) = &snap.message {
            writeln!(f)?;
            write!(f, "{}", MessageLine(message))?;
        }

        writeln!(f)?;
        match &snap.active_session {
            Some(session) => write!(f, "{}", SessionView::new(session, self.scan_base_url))?,
            None => {
                writeln!(f, "No Active Session")?;
                writeln!(f, "Create a new session to generate a scan link for attendance.")?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", AttendanceList(&snap.attendance))?;

        if snap.busy {
            writeln!(f)?;
            writeln!(f, "Working...")?;
        }
        Ok(())
    }
}

/// Active session details and its scan link
pub struct SessionView<'a> {
    pub session: &'a Session,
    pub scan_base_url: &'a str,
}

impl<'a> SessionView<'a> {
    pub fn new(session: &'a Session, scan_base_url: &'a str) -> Self {
        Self {
            session,
            scan_base_url,
        }
    }

    /// The backend's scan reference, else one built from the base URL
    pub fn scan_link(&self) -> String {
        self.session
            .scan_url
            .clone()
            .unwrap_or_else(|| build_scan_link(self.scan_base_url, &self.session.id))
    }
}

impl fmt::Display for SessionView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.session;
        writeln!(f, "Session: {} ({})", session.name, session.id)?;
        if let Some(created) = session.created_at {
            writeln!(f, "Started: {}", local(created).format("%a %b %d %Y %H:%M"))?;
        }
        writeln!(f, "Scan URL: {}", self.scan_link())?;
        if let Some(image) = &session.qr_image {
            // Data URLs are far too long for a terminal
            if image.starts_with("data:") {
                writeln!(f, "QR image: embedded ({} bytes)", image.len())?;
            } else {
                writeln!(f, "QR image: {}", image)?;
            }
        }
        Ok(())
    }
}

/// Live attendance, one line per member
pub struct AttendanceList<'a>(pub &'a [AttendanceRecord]);

impl fmt::Display for AttendanceList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Live Attendance Status")?;
        if self.0.is_empty() {
            return writeln!(f, "  No members found. Add members first.");
        }

        for record in self.0 {
            let status = if record.is_present { "Present" } else { "Absent" };
            write!(f, "  [{:<7}] {} <{}>", status, record.name, record.email)?;
            if record.is_first_time {
                write!(f, " (First Time!)")?;
            }
            if let Some(scanned) = record.scan_time {
                write!(f, " at {}", local(scanned).format("%H:%M:%S"))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Member directory with ids, for removal by id
pub struct MemberList<'a>(pub &'a [Member]);

impl fmt::Display for MemberList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No members added yet.");
        }

        for member in self.0 {
            write!(f, "{}  {} <{}>", member.id, member.name, member.email)?;
            if let Some(phone) = &member.phone {
                write!(f, "  {}", phone)?;
            }
            if let Some(first) = member.first_attended_at {
                write!(f, "  first attended {}", local(first).format("%Y-%m-%d"))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A banner line, tagged by kind
pub struct MessageLine<'a>(pub &'a UiMessage);

impl fmt::Display for MessageLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.0.kind, self.0.text)
    }
}

fn local(at: DateTime<Utc>) -> DateTime<Local> {
    at.with_timezone(&Local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{member, record, session};
    use crate::models::{NewMember, Stats};

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            members: vec![],
            active_session: Some(session("s1", "Sunday Service")),
            attendance: vec![record("m1", true), record("m2", false)],
            stats: Stats {
                total_members: 2,
                present_count: 1,
                first_time_count: 0,
            },
            member_draft: NewMember::default(),
            session_name_draft: String::new(),
            message: None,
            busy: false,
        }
    }

    #[test]
    fn test_sunday_service_counts() {
        let text = DashboardView::new(&snapshot(), "http://localhost:5173").to_string();
        assert!(text.contains("Sunday Service"));
        assert!(text.contains("1 Present"));
        assert!(text.contains("1 Absent"));
        assert!(text.contains("0 First-Time"));
        assert!(text.contains("Scan URL: http://localhost:5173/attend/s1"));
        assert!(text.contains("[Present] Member m1 <m1@example.org>"));
        assert!(text.contains("[Absent ] Member m2 <m2@example.org>"));
    }

    #[test]
    fn test_no_session_and_banner() {
        let mut snap = snapshot();
        snap.active_session = None;
        snap.attendance.clear();
        snap.message = Some(UiMessage::error("Failed to fetch members"));

        let text = DashboardView::new(&snap, "http://localhost:5173").to_string();
        assert!(text.contains("No Active Session"));
        assert!(text.contains("[error] Failed to fetch members"));
        assert!(text.contains("0 Present | 0 Absent"));
        assert!(text.contains("No members found"));
        assert!(!text.contains("Scan URL"));
    }

    #[test]
    fn test_backend_scan_url_preferred() {
        let mut s = session("s1", "Sunday Service");
        s.scan_url = Some("https://fellowship.example/scan?sessionId=s1".to_string());
        s.qr_image = Some("data:image/png;base64,AAAA".to_string());

        let text = SessionView::new(&s, "http://localhost:5173").to_string();
        assert!(text.contains("Scan URL: https://fellowship.example/scan?sessionId=s1"));
        assert!(text.contains("QR image: embedded"));
    }

    #[test]
    fn test_first_time_marker() {
        let mut r = record("m1", true);
        r.is_first_time = true;
        let text = AttendanceList(&[r]).to_string();
        assert!(text.contains("(First Time!)"));
    }

    #[test]
    fn test_member_list() {
        let mut ada = member("m1", "Ada", "ada@example.org");
        ada.phone = Some("555-0000".to_string());
        let text = MemberList(&[ada]).to_string();
        assert_eq!(text, "m1  Ada <ada@example.org>  555-0000\n");
        assert_eq!(MemberList(&[]).to_string(), "No members added yet.\n");
    }
}
