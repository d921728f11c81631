use adrecon::application::routes::build_router;
use adrecon::application::services::report_service::{ReportService, ReportSettings};
use adrecon::application::state::AppState;
use adrecon::auth::ApiKeys;
use adrecon::config::ReportConfig;
use adrecon::infrastructure::binom_client::{BinomClient, BinomConfig};
use adrecon::infrastructure::build_http_client;
use adrecon::infrastructure::google_ads_client::{GoogleAdsClient, GoogleAdsConfig};
use adrecon::infrastructure::google_oauth::{GoogleOAuthClient, GoogleOAuthConfig};
use adrecon::persistence::credential_repository::SqliteCredentialRepository;
use adrecon::persistence::init_database;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env file: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adrecon=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("adrecon starting...");

    let config = ReportConfig::from_env();
    let api_keys = ApiKeys::new(config.api_keys.clone())?;

    if config.login_customer_digits().is_empty() {
        warn!("GOOGLE_LOGIN_CUSTOMER_ID is not set; hierarchy requests will be rejected");
    }
    if config.binom_api_url.is_empty() {
        warn!("BINOM_API_URL is not set; tracker requests will fail");
    }

    let pool = init_database(&config.database_url).await?;
    let credentials = Arc::new(SqliteCredentialRepository::new(pool));

    let http = build_http_client(Duration::from_secs(config.http_timeout_seconds))?;
    let oauth = Arc::new(GoogleOAuthClient::new(
        http.clone(),
        GoogleOAuthConfig::new(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.backend_redirect_uri.clone(),
            config.frontend_redirect_uri.clone(),
        ),
    ));
    let ads = Arc::new(GoogleAdsClient::new(
        http.clone(),
        GoogleAdsConfig::new(
            config.ads_api_version.clone(),
            config.google_developer_token.clone(),
            config.login_customer_digits(),
        ),
        oauth.clone(),
    ));
    let tracker = Arc::new(BinomClient::new(
        http,
        BinomConfig {
            api_url: config.binom_api_url.clone(),
            api_key: config.binom_api_key.clone(),
        },
    ));

    let reports = Arc::new(ReportService::new(
        ads,
        tracker,
        credentials.clone(),
        ReportSettings::from(&config),
    ));
    info!(
        "Reporting with max {} accounts, {} parallel cost queries",
        config.max_accounts, config.cost_fetch_concurrency
    );

    let state = AppState {
        reports,
        oauth,
        credentials,
        frontend_url: config.frontend_url.clone(),
    };
    let app = build_router(state, api_keys);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    let shutdown_signal = async {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    info!("Server started successfully. Press Ctrl+C to stop.");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Shutdown complete");
    Ok(())
}
