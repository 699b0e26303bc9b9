//! Content curator service: binary entrypoint.
//! Boots the Axum HTTP server with the curation pipeline, the condenser, and
//! the Prometheus `/metrics` route.

use content_curator::bootstrap::CurateRuntime;
use content_curator::metrics::Metrics;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - CURATE_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("CURATE_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("content_curator=info,curate=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let metrics = Metrics::init()?;
    let runtime = CurateRuntime::from_env()?;
    let router = content_curator::router(runtime.into_app_state()).merge(metrics.router());

    Ok(router.into())
}
