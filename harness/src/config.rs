//! Runtime configuration for the harness

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{HarnessError, HarnessResult};

/// Default port for the HTTP and WebSocket server
pub const DEFAULT_PORT: u16 = 8091;

/// Ceiling applied to every session independently
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(600);

/// Harness configuration, built from command line arguments in `main`
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub bind_address: SocketAddr,

    /// Directory holding `index.html` and a `static/` subdirectory
    pub frontend_dir: PathBuf,

    pub session_timeout: Duration,

    /// Optional upper bound on a single test's `concurrency`; unbounded when `None`
    pub max_concurrency: Option<u32>,

    /// Base used to resolve relative endpoints such as `/echo`
    pub target_base_url: Option<Url>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            frontend_dir: PathBuf::from("./frontend_build"),
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            max_concurrency: None,
            target_base_url: None,
        }
    }
}

impl HarnessConfig {
    pub fn with_bind_address(mut self, bind_address: SocketAddr) -> Self {
        self.bind_address = bind_address;
        self
    }

    pub fn with_session_timeout(mut self, session_timeout: Duration) -> Self {
        self.session_timeout = session_timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: u32) -> Self {
        self.max_concurrency = Some(max_concurrency);
        self
    }

    pub fn with_target_base_url(mut self, target_base_url: Url) -> Self {
        self.target_base_url = Some(target_base_url);
        self
    }

    pub fn with_frontend_dir(mut self, frontend_dir: impl Into<PathBuf>) -> Self {
        self.frontend_dir = frontend_dir.into();
        self
    }

    /// Reject settings that would make every test fail up front
    pub fn validate(&self) -> HarnessResult<()> {
        if self.session_timeout.is_zero() {
            return Err(HarnessError::config("session timeout must be greater than zero"));
        }
        if self.max_concurrency == Some(0) {
            return Err(HarnessError::config("max concurrency must be at least 1"));
        }
        if let Some(base) = &self.target_base_url {
            if base.cannot_be_a_base() {
                return Err(HarnessError::config(format!("target base url '{}' cannot be a base", base)));
            }
        }
        Ok(())
    }
}
