//! Polling Scheduler
//!
//! Keeps the dashboard fresh by re-running a refresh on a fixed period. The
//! timer is the only thing owned by the handle: stopping it never cancels a
//! refresh that is already in flight.

use crate::api::AttendanceApi;
use crate::config::DashboardConfig;
use crate::viewmodel::AttendanceViewModel;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Something refreshed on every tick
#[async_trait]
pub trait PollTarget: Send + Sync + 'static {
    async fn poll(&self);
}

#[async_trait]
impl<A: AttendanceApi + 'static> PollTarget for AttendanceViewModel<A> {
    async fn poll(&self) {
        self.poll_tick().await;
    }
}

/// Starts repeating refresh timers
#[derive(Debug, Clone, Copy)]
pub struct PollingScheduler {
    interval: Duration,
}

impl PollingScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.poll_interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the timer. The first tick fires one full period after start.
    pub fn start<T: PollTarget>(&self, target: Arc<T>) -> PollHandle {
        let period = self.interval;
        tracing::info!(interval_secs = period.as_secs_f64(), "Starting attendance polling");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;
                tracing::debug!("Running scheduled attendance refresh");
                let target = Arc::clone(&target);
                tokio::spawn(async move { target.poll().await });
            }
        });

        PollHandle { task }
    }
}

/// Owns a running timer; stopped on [`PollHandle::stop`] or drop
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(&self) {
        if !self.task.is_finished() {
            tracing::info!("Stopping attendance polling");
        }
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
