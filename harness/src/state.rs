//! Harness state management
//!
//! Process-wide counters and configuration shared by the HTTP handlers and
//! the orchestrator. Subscriber channels live in the registry, not here.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::config::HarnessConfig;
use crate::types::TestReport;

/// Core harness state
#[derive(Debug)]
pub struct HarnessState {
    pub config: HarnessConfig,

    // Server state
    pub is_running: AtomicBool,
    pub server_start_time: Instant,

    // Subscriber connections
    pub connection_count: AtomicU32,

    // Test activity
    pub tests_started: AtomicU64,
    pub tests_finished: AtomicU64,
    pub active_sessions: AtomicU32,
    pub last_report: RwLock<Option<TestReport>>,
}

impl HarnessState {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            is_running: AtomicBool::new(true),
            server_start_time: Instant::now(),
            connection_count: AtomicU32::new(0),
            tests_started: AtomicU64::new(0),
            tests_finished: AtomicU64::new(0),
            active_sessions: AtomicU32::new(0),
            last_report: RwLock::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    pub fn set_running(&self, running: bool) {
        self.is_running.store(running, Ordering::Relaxed);
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }

    pub fn get_connection_count(&self) -> u32 {
        self.connection_count.load(Ordering::Relaxed)
    }

    pub fn increment_connection_count(&self) -> u32 {
        self.connection_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn decrement_connection_count(&self) -> u32 {
        // Saturate at zero rather than wrapping
        let previous = self
            .connection_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |count| Some(count.saturating_sub(1)))
            .unwrap_or(0);
        previous.saturating_sub(1)
    }

    pub fn test_started(&self) -> u64 {
        self.tests_started.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn test_finished(&self, report: TestReport) {
        self.tests_finished.fetch_add(1, Ordering::Relaxed);
        *self.last_report.write().await = Some(report);
    }

    pub fn get_active_sessions(&self) -> u32 {
        self.active_sessions.load(Ordering::Relaxed)
    }

    /// Count a session as active until the returned guard drops
    pub fn enter_session(self: &Arc<Self>) -> ActiveSessionGuard {
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
        ActiveSessionGuard { state: Arc::clone(self) }
    }
}

/// Decrements the active-session count on drop, including on panic
#[derive(Debug)]
pub struct ActiveSessionGuard {
    state: Arc<HarnessState>,
}

impl Drop for ActiveSessionGuard {
    fn drop(&mut self) {
        self.state.active_sessions.fetch_sub(1, Ordering::Relaxed);
    }
}
