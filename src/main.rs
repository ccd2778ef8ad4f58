use anyhow::Context;
use listline::api::{self, AppState};
use listline::{Config, Engine, InProcessGateway, NominationGateway};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;
    let port = config.port;

    let engine = Engine::new(config.sim).context("invalid simulation configuration")?;
    let engine = Arc::new(Mutex::new(engine));

    let gateway: Arc<dyn NominationGateway> = Arc::new(InProcessGateway);
    let app = api::create_router(AppState::new(engine, gateway));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
