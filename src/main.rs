use std::sync::Arc;

use task_assign::assignment::{AssignmentService, assignment_routes};
use task_assign::config::ServiceConfig;
use task_assign::store::{AssignmentStore, LibSqlBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("📋 Task Assign v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   API: http://{}/api/assign", config.bind_addr());

    // ── Database ─────────────────────────────────────────────────────────
    let store: Arc<dyn AssignmentStore> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {}",
                    config.db_path.display(),
                    e
                );
                std::process::exit(1);
            }),
    );

    // ── HTTP ─────────────────────────────────────────────────────────────
    let service = Arc::new(AssignmentService::new(store));
    let app = assignment_routes(service);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Assignment server started");
    axum::serve(listener, app).await?;

    Ok(())
}
