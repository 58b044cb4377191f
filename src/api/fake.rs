//! Recording fake backend for view-model tests

use super::{ApiError, ApiResult, AttendanceApi};
use crate::models::{
    AttendanceRecord, Member, MemberId, NewMember, Registration, Session, SessionId, Stats,
};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// A call the fake received, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListMembers,
    CreateMember(NewMember),
    DeleteMember(MemberId),
    ActiveSession,
    CreateSession(String),
    SessionStats(SessionId),
    CurrentAttendance,
    Register(Registration),
}

/// Canned replies; each defaults to an empty success
pub struct Replies {
    pub members: ApiResult<Vec<Member>>,
    pub create_member: ApiResult<Option<Member>>,
    pub delete_member: ApiResult<()>,
    pub active_session: ApiResult<Option<Session>>,
    pub create_session: ApiResult<Session>,
    pub stats: ApiResult<Stats>,
    pub attendance: ApiResult<Vec<AttendanceRecord>>,
    pub register: ApiResult<Option<String>>,
    /// Time `register_attendance` takes before replying
    pub register_delay: Duration,
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            members: Ok(Vec::new()),
            create_member: Ok(None),
            delete_member: Ok(()),
            active_session: Ok(None),
            create_session: Err(ApiError::Rejected {
                status: 500,
                message: None,
            }),
            stats: Ok(Stats::default()),
            attendance: Ok(Vec::new()),
            register: Ok(None),
            register_delay: Duration::ZERO,
        }
    }
}

#[derive(Default)]
pub struct FakeApi {
    replies: Mutex<Replies>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change canned replies in place
    pub fn set(&self, f: impl FnOnce(&mut Replies)) {
        f(&mut self.replies.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn reply<T: Clone>(&self, pick: impl Fn(&Replies) -> &ApiResult<T>) -> ApiResult<T> {
        pick(&self.replies.lock().unwrap()).clone()
    }
}

#[async_trait]
impl AttendanceApi for FakeApi {
    async fn list_members(&self) -> ApiResult<Vec<Member>> {
        self.record(Call::ListMembers);
        self.reply(|r| &r.members)
    }

    async fn create_member(&self, member: &NewMember) -> ApiResult<Option<Member>> {
        self.record(Call::CreateMember(member.clone()));
        self.reply(|r| &r.create_member)
    }

    async fn delete_member(&self, id: &MemberId) -> ApiResult<()> {
        self.record(Call::DeleteMember(id.clone()));
        self.reply(|r| &r.delete_member)
    }

    async fn active_session(&self) -> ApiResult<Option<Session>> {
        self.record(Call::ActiveSession);
        self.reply(|r| &r.active_session)
    }

    async fn create_session(&self, name: &str) -> ApiResult<Session> {
        self.record(Call::CreateSession(name.to_string()));
        self.reply(|r| &r.create_session)
    }

    async fn session_stats(&self, id: &SessionId) -> ApiResult<Stats> {
        self.record(Call::SessionStats(id.clone()));
        self.reply(|r| &r.stats)
    }

    async fn current_attendance(&self) -> ApiResult<Vec<AttendanceRecord>> {
        self.record(Call::CurrentAttendance);
        self.reply(|r| &r.attendance)
    }

    async fn register_attendance(&self, registration: &Registration) -> ApiResult<Option<String>> {
        self.record(Call::Register(registration.clone()));
        let delay = self.replies.lock().unwrap().register_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.reply(|r| &r.register)
    }
}
