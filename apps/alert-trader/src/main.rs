//! Alert Trader Binary
//!
//! Serves the TradingView webhook and the dispatcher callbacks.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin alert-trader
//! ```
//!
//! # Environment Variables
//!
//! - `ALERT_TRADER_CONFIG`: Path to the YAML config (default: config.yaml)
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)
//! - `OTEL_ENABLED`, `OTEL_EXPORTER_OTLP_ENDPOINT`, `OTEL_SERVICE_NAME`: tracing export
//!
//! Secrets are usually referenced from the config file as `${VAR}` and
//! supplied through the environment or a `.env` file.

use std::net::SocketAddr;
use std::sync::Arc;

use alert_trader::application::ports::{
    DispatcherPort, SystemTimeSource, TakeProfitQueuePort, TaxLedgerPort, TimeSource,
};
use alert_trader::application::services::{PositionReader, QuoteResolver, Scheduler};
use alert_trader::application::use_cases::{
    RecheckUseCase, SubmitPairTradeUseCase, TakeProfitUseCase,
};
use alert_trader::config::{Config, PersistenceBackend, load_config};
use alert_trader::domain::accounts::CredentialSelector;
use alert_trader::infrastructure::dispatcher::{
    QstashConfig, QstashDispatcher, UnconfiguredDispatcher,
};
use alert_trader::infrastructure::http::{AppState, create_router};
use alert_trader::infrastructure::persistence::{
    InMemoryTakeProfitQueue, InMemoryTaxLedger, SqliteStore,
};
use alert_trader::infrastructure::venue::RestVenueFactory;
use alert_trader::observability::{MetricsConfig, init_metrics};
use alert_trader::telemetry::init_telemetry;
use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

/// Components shared by every storage and dispatcher combination.
struct Shared {
    config: Config,
    venues: Arc<RestVenueFactory>,
    selector: Arc<CredentialSelector>,
    time: Arc<dyn TimeSource>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config_path = std::env::var("ALERT_TRADER_CONFIG").ok();
    let config = load_config(config_path.as_deref()).context("failed to load configuration")?;

    let _telemetry = init_telemetry(&config.observability.logging);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting alert trader");

    if config.observability.metrics.enabled {
        let addr: SocketAddr = config
            .observability
            .metrics
            .listen_addr
            .parse()
            .context("invalid observability.metrics.listen_addr")?;
        init_metrics(&MetricsConfig::with_addr(addr))?;
        tracing::info!(%addr, "Prometheus exporter listening");
    }

    let table = config.account_table()?;
    tracing::info!(
        accounts = table.len(),
        pairs = config.pairs.len(),
        dev_mode = config.environment.dev_mode,
        backend = ?config.persistence.backend,
        "Configuration loaded"
    );

    let shared = Shared {
        venues: Arc::new(RestVenueFactory::new(
            config.retry.http_policy(),
            config.retry.timeout(),
        )),
        selector: Arc::new(CredentialSelector::new(table)),
        time: Arc::new(SystemTimeSource),
        config,
    };

    let year_start = shared.config.tax.financial_year_start;
    match shared.config.persistence.backend {
        PersistenceBackend::Memory => {
            tracing::warn!("Using in-memory storage; the tax ledger is lost on restart");
            let ledger = Arc::new(InMemoryTaxLedger::new(year_start));
            let queue = Arc::new(InMemoryTakeProfitQueue::new());
            with_dispatcher(shared, ledger, queue).await
        }
        PersistenceBackend::Sqlite => {
            let store = Arc::new(
                SqliteStore::connect(&shared.config.persistence.database_url, year_start).await?,
            );
            with_dispatcher(shared, Arc::clone(&store), store).await
        }
    }
}

async fn with_dispatcher<L, Q>(shared: Shared, ledger: Arc<L>, queue: Arc<Q>) -> anyhow::Result<()>
where
    L: TaxLedgerPort + 'static,
    Q: TakeProfitQueuePort + 'static,
{
    if !shared.config.dispatcher.is_configured() {
        tracing::warn!("No dispatcher token; rechecks and take-profit crons will fail");
        return serve(shared, ledger, queue, Arc::new(UnconfiguredDispatcher)).await;
    }

    let dispatcher = QstashDispatcher::new(
        QstashConfig::new(shared.config.dispatcher.token.clone())
            .with_base_url(shared.config.dispatcher.base_url.clone())
            .with_callback_token(shared.config.server.callback_token.clone())
            .with_retry(shared.config.retry.http_policy()),
    )?;
    serve(shared, ledger, queue, Arc::new(dispatcher)).await
}

async fn serve<L, Q, D>(
    shared: Shared,
    ledger: Arc<L>,
    queue: Arc<Q>,
    dispatcher: Arc<D>,
) -> anyhow::Result<()>
where
    L: TaxLedgerPort + 'static,
    Q: TakeProfitQueuePort + 'static,
    D: DispatcherPort + 'static,
{
    let Shared {
        config,
        venues,
        selector,
        time,
    } = shared;

    let scheduler = Arc::new(Scheduler::new(dispatcher, config.server.public_url.clone()));
    let positions = PositionReader::new(config.trading.position_retry_delay());
    let settings = config.trading_settings();

    let pair_trade = SubmitPairTradeUseCase::new(
        Arc::clone(&venues),
        Arc::clone(&selector),
        Arc::new(config.pair_book()),
        ledger,
        Arc::clone(&queue),
        Arc::clone(&scheduler),
        Arc::clone(&time),
        settings.clone(),
    )
    .with_readers(QuoteResolver::new(config.retry.quote_policy()), positions);

    let take_profit = TakeProfitUseCase::new(
        Arc::clone(&venues),
        Arc::clone(&selector),
        queue,
        scheduler,
        time,
        settings.dev_mode,
    )
    .with_position_reader(positions, settings.position_retries);

    let recheck = RecheckUseCase::new(venues, selector, settings.dev_mode)
        .with_position_reader(positions, settings.position_retries);

    let state = AppState {
        pair_trade: Arc::new(pair_trade),
        take_profit: Arc::new(take_profit),
        recheck: Arc::new(recheck),
        webhook_token: Arc::from(config.server.webhook_token.as_str()),
        callback_token: config.server.callback_token.as_deref().map(Arc::from),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.http_port)
        .parse()
        .context("invalid server bind address")?;

    tracing::info!(%addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  POST /webhook/{{exchange}}");
    tracing::info!("  POST /recheck");
    tracing::info!("  POST /take-profit/next");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Alert trader stopped");
    Ok(())
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
