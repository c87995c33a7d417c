// Volunteer Scheduler Server

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use volunteer_scheduler::{api::create_scheduler_router, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    // Build main application router
    let app = Router::new()
        .nest("/api/v1/scheduler", create_scheduler_router(app_state))
        .layer(CorsLayer::permissive());

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    println!("Volunteer scheduler listening on http://{}", addr);
    println!("  POST /api/v1/scheduler/events/search        - Filtered event search");
    println!("  GET  /api/v1/scheduler/events/{{id}}          - Event with nested opportunities");
    println!("  POST /api/v1/scheduler/events               - Create event (not implemented)");
    println!("  POST /api/v1/scheduler/volunteers           - Create volunteer");
    println!("  POST /api/v1/scheduler/volunteers/qualified - Qualified volunteer search");
    println!("  POST /api/v1/scheduler/assignments          - Assign volunteer to shift");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
