use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use webhook_board::{
    config::Config,
    api::routes::create_router,
    fetcher,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    fetcher::init_client(config.fetch_timeout)?;

    // Create application state and fetch both webhooks once
    let app_state = AppState::new(config);
    app_state.start_loading();

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
