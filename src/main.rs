// Estate Back Office API Server - mock REST API for the admin back office

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use estate_backoffice::{api::create_router, app_state::AppState, config::Config, schemas};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    schemas::validate_schemas()
        .map_err(|errors| anyhow::anyhow!("Invalid schemas: {}", errors.join("; ")))?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;
    let app = create_router(app_state);

    // Start server
    let addr = config.server_address();
    info!("Estate back-office API starting on http://{}", addr);
    info!("  GET|POST        /api/{{resource}}");
    info!("  GET|PUT|DELETE  /api/{{resource}}/{{id}}");
    info!("  POST            /api/{{resource}}/bulk");
    info!("  POST            /api/auth/login");
    info!("  GET|PUT         /api/settings");
    info!("  GET             /api/stats, /api/health");
    info!("  resources: properties, blog-posts, users, inquiries");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
