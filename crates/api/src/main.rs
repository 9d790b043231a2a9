use anyhow::Context;

use workaccess_api::app::build_app;
use workaccess_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    workaccess_observability::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            return Err(e.into());
        }
    };

    let app = build_app(&config);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{}", config.port))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
