//! Harness entry point

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use shared::{Component, harness_info, logging};
use url::Url;

use harness::{DefaultHarnessServer, HarnessConfig, HarnessError, HarnessResult};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "harness")]
#[command(about = "Concurrent HTTP streaming load-test harness")]
struct Args {
    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port for the HTTP and WebSocket server
    #[arg(long, default_value_t = harness::config::DEFAULT_PORT)]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory holding index.html and static/
    #[arg(long, default_value = "./frontend_build")]
    frontend_dir: PathBuf,

    /// Per-session timeout in seconds
    ///
    /// A timed-out session always reports "ERROR: 요청 시간 초과 (10분)" since the
    /// frontend matches that exact text; the "(10분)" does not follow this value.
    #[arg(long, default_value_t = 600)]
    session_timeout_secs: u64,

    /// Upper bound on sessions per test; unbounded when omitted
    #[arg(long)]
    max_concurrency: Option<u32>,

    /// Base URL that relative endpoints are resolved against
    #[arg(long)]
    target_base_url: Option<Url>,
}

impl Args {
    fn into_config(self) -> HarnessResult<HarnessConfig> {
        if self.port == 0 {
            return Err(HarnessError::config("Port 0 is not allowed for the harness server"));
        }
        let bind_address = SocketAddr::new(self.host, self.port);

        let mut config = HarnessConfig::default()
            .with_bind_address(bind_address)
            .with_frontend_dir(self.frontend_dir)
            .with_session_timeout(Duration::from_secs(self.session_timeout_secs));
        if let Some(max) = self.max_concurrency {
            config = config.with_max_concurrency(max);
        }
        if let Some(base) = self.target_base_url {
            config = config.with_target_base_url(base);
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> HarnessResult<()> {
    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    let config = args.into_config()?;
    harness_info!(
        Component::Server,
        "🌐 Harness on {} (session timeout {:?}, max concurrency {})",
        config.bind_address,
        config.session_timeout,
        config
            .max_concurrency
            .map(|max| max.to_string())
            .unwrap_or_else(|| "unbounded".to_string())
    );

    let server = DefaultHarnessServer::from_config(config)?;
    if let Err(e) = server.run().await {
        logging::log_error(Component::Server, "Harness server", &e);
        return Err(e);
    }

    logging::log_success(Component::Server, "Harness stopped cleanly");
    Ok(())
}
