//! # Fellowship Attendance
//!
//! Client and presentation layer for a fellowship's attendance service: a live
//! dashboard for organizers and a scan-link registration form for attendees.
//! All data lives in an external REST backend; this crate fetches it, keeps a
//! fresh snapshot, and turns it into present/absent/first-time state.
//!
//! ## Modules
//!
//! - [`api`]: backend adapter (`AttendanceApi` trait, reqwest implementation)
//! - [`models`]: canonical members, sessions, attendance records and stats
//! - [`viewmodel`]: dashboard view model, registration form, UI messages
//! - [`scheduler`]: cancellable polling timer
//! - [`render`]: plain-text views for the terminal
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fellowship_attendance::{AttendanceViewModel, Config, HttpAttendanceApi, PollingScheduler};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::resolve(None)?;
//!     let api = Arc::new(HttpAttendanceApi::new(&config.backend)?);
//!
//!     let dashboard = Arc::new(AttendanceViewModel::from_config(api, &config.dashboard));
//!     dashboard.activate().await;
//!
//!     let polling = PollingScheduler::from_config(&config.dashboard).start(Arc::clone(&dashboard));
//!
//!     let snapshot = dashboard.snapshot().await;
//!     println!("{} present, {} absent", snapshot.present_count(), snapshot.absent_count());
//!
//!     polling.stop();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod models;
pub mod render;
pub mod scheduler;
pub mod viewmodel;

// Re-export top-level types for convenience
pub use api::{ApiError, ApiResult, AttendanceApi, HttpAttendanceApi};

pub use config::{BackendConfig, Config, ConfigError, DashboardConfig, LoggingConfig};

pub use models::{
    AttendanceRecord, Member, MemberId, NewMember, Registration, Session, SessionId, Stats,
};

pub use scheduler::{PollHandle, PollTarget, PollingScheduler};

pub use viewmodel::{
    AttendanceViewModel, Confirmation, DashboardSnapshot, MessageKind, Outcome, RegistrationForm,
    UiMessage,
};
