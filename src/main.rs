//! publish-notifier — binary entrypoint.
//! One parameterless run per scheduler trigger; the exit code tells the
//! scheduler how it went (0 ok, 1 some source failed, 2 bad configuration).

use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` for log shippers.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("publish_notifier=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    match publish_notifier::run().await {
        Ok(report) if report.is_success() => {
            tracing::info!(announced = report.announced(), "run complete");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            tracing::error!(
                announced = report.announced(),
                failed = report.errors().count(),
                "run finished with failures"
            );
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!("configuration error: {e}");
            ExitCode::from(2)
        }
    }
}
