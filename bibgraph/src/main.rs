use std::env;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bibgraph::{Dependencies, IngesterError};
use bibgraph_shared::Graph;

#[tokio::main]
async fn main() -> Result<(), IngesterError> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = env::args()
        .nth(1)
        .ok_or_else(|| IngesterError::config("Usage: bibgraph <graph.json>"))?;

    let raw = tokio::fs::read_to_string(&path).await?;
    let graph: Graph = serde_json::from_str(&raw)?;
    info!(path = %path, triples = graph.len(), "Loaded input graph");

    let deps = Dependencies::new().await?;
    let orchestrator = deps.orchestrator.clone();

    // Ctrl-C stops scheduling new subjects; the run winds down and still
    // reports what it finished.
    let canceller = orchestrator.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancellation requested");
            canceller.cancel();
        }
    });

    let report = orchestrator.run(&graph).await?;
    info!(
        subjects = report.subjects_total,
        created = report.created,
        resolved = report.resolved,
        linked = report.linked,
        cancelled = report.cancelled,
        "Run complete"
    );
    for failure in &report.failures {
        error!(
            subject = %failure.subject,
            phase = ?failure.phase,
            location = ?failure.location,
            error = %failure.error,
            "Subject failed"
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
