//! One curation pass from the command line; prints the curated JSON to stdout.
//!
//! Reads `config/curate.toml` / `config/llm.json` (or the paths in
//! `CURATE_CONFIG_PATH` / `LLM_CONFIG_PATH`). Extra links to verify can be
//! passed as arguments.

use content_curator::bootstrap::CurateRuntime;
use content_curator::curate::CurationRequest;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let runtime = CurateRuntime::from_env()?;
    let req = CurationRequest {
        links: std::env::args().skip(1).collect(),
        ..Default::default()
    };

    let curated = runtime.pipeline.run(req).await?;
    println!("{}", serde_json::to_string_pretty(&curated)?);
    Ok(())
}
