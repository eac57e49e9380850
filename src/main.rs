use anyhow::Context;
use marker_functions::config::Config;
use marker_functions::telemetry::init_tracing;
use marker_functions::{server, FunctionsApp};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let key = yup_oauth2::read_service_account_key(&config.credentials_path)
        .await
        .with_context(|| format!("reading service account key {}", config.credentials_path.display()))?;

    let port = config.port;
    let app = FunctionsApp::initialize(key, config).await?;
    tracing::info!(
        project_id = app.project_id(),
        pattern = app.config().document_pattern.as_str(),
        topic = %app.config().notifier.topic,
        "functions initialized"
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, server::router(app.state())).await?;
    Ok(())
}
