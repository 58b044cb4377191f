//! Backend REST Client
//!
//! reqwest implementation of [`AttendanceApi`].

use super::dto::{
    AttendanceRecordDto, CreateSessionRequest, ErrorBody, MemberDto, RegistrationReply,
    RegistrationRequest, SessionDto, StatsDto,
};
use super::{ApiError, ApiResult, AttendanceApi};
use crate::config::BackendConfig;
use crate::models::{
    AttendanceRecord, Member, MemberId, NewMember, Registration, Session, SessionId, Stats,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the attendance backend
#[derive(Debug, Clone)]
pub struct HttpAttendanceApi {
    client: Client,
    base_url: String,
    registration_path: String,
}

impl HttpAttendanceApi {
    /// Create a client for the configured backend
    pub fn new(config: &BackendConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            registration_path: normalize_path(&config.registration_path),
        })
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Turn a non-success response into [`ApiError::Rejected`], keeping the body's message
async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message);

    tracing::debug!(status = status.as_u16(), body = %text, "Backend rejected request");

    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// Read a body that may legitimately be empty
async fn optional_body<T: DeserializeOwned>(response: Response) -> ApiResult<Option<T>> {
    let text = response.text().await?;
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

fn collect<D, T>(items: Vec<D>, convert: impl Fn(D) -> Option<T>, what: &str) -> Vec<T> {
    let total = items.len();
    let kept: Vec<T> = items.into_iter().filter_map(convert).collect();
    if kept.len() < total {
        tracing::warn!(
            dropped = total - kept.len(),
            "Ignoring {} without an identity",
            what
        );
    }
    kept
}

#[async_trait]
impl AttendanceApi for HttpAttendanceApi {
    async fn list_members(&self) -> ApiResult<Vec<Member>> {
        let items: Vec<MemberDto> = self.get_json("/members").await?;
        Ok(collect(items, MemberDto::into_member, "members"))
    }

    async fn create_member(&self, member: &NewMember) -> ApiResult<Option<Member>> {
        let response = self
            .client
            .post(self.url("/members"))
            .json(member)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let created: Option<MemberDto> = optional_body(response).await?;
        Ok(created.and_then(MemberDto::into_member))
    }

    async fn delete_member(&self, id: &MemberId) -> ApiResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/members/{}", segment(id.as_str()))))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn active_session(&self) -> ApiResult<Option<Session>> {
        let response = self.client.get(self.url("/sessions/active")).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => return Ok(None),
            _ => {}
        }

        let response = ensure_success(response).await?;
        let session: Option<SessionDto> = optional_body(response).await?;
        Ok(session.and_then(SessionDto::into_session))
    }

    async fn create_session(&self, name: &str) -> ApiResult<Session> {
        let response = self
            .client
            .post(self.url("/sessions"))
            .json(&CreateSessionRequest { name })
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let session: SessionDto = response.json().await?;
        session
            .into_session()
            .ok_or_else(|| ApiError::Decode("session reply carried no identity".to_string()))
    }

    async fn session_stats(&self, id: &SessionId) -> ApiResult<Stats> {
        let dto: StatsDto = self
            .get_json(&format!("/sessions/{}/stats", segment(id.as_str())))
            .await?;
        Ok(dto.into())
    }

    async fn current_attendance(&self) -> ApiResult<Vec<AttendanceRecord>> {
        let items: Vec<AttendanceRecordDto> = self.get_json("/attendance/current").await?;
        Ok(collect(items, AttendanceRecordDto::into_record, "attendance records"))
    }

    async fn register_attendance(&self, registration: &Registration) -> ApiResult<Option<String>> {
        let response = self
            .client
            .post(self.url(&self.registration_path))
            .json(&RegistrationRequest::from(registration))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        // A success without a readable body still counts as recorded
        let reply: Option<RegistrationReply> = optional_body(response).await.unwrap_or(None);
        Ok(reply.and_then(|r| r.message).filter(|m| !m.trim().is_empty()))
    }
}
