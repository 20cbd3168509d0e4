use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webmention_receiver::config::Config;
use webmention_receiver::context::ReceiverContext;
use webmention_receiver::persistence::{FailureCounter, NotificationStore};
use webmention_receiver::queue::AdmissionPolicy;
use webmention_receiver::server::{AppState, build_router};
use webmention_receiver::verifier::{HttpFetcher, Verifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webmention_receiver=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    let allow_list = config.load_allow_list()?;
    let store = NotificationStore::load(&config.mentions_file)
        .context("loading notification store")?;
    let failures =
        FailureCounter::load(&config.failures_file).context("loading failure counts")?;
    tracing::info!(
        records = store.len(),
        allowed_prefixes = allow_list.urls.len(),
        "State loaded"
    );

    let policy = AdmissionPolicy::new().with_max_queue_depth(config.max_queue_depth);
    let context = Arc::new(ReceiverContext::new(allow_list, policy, store, failures));

    let fetcher = HttpFetcher::new(config.fetch_timeout(), config.max_body_bytes)
        .context("building HTTP client")?;
    let verifier =
        Verifier::new(context.clone(), fetcher).with_interval(config.verify_interval());

    let shutdown = CancellationToken::new();
    let verifier_task = tokio::spawn(verifier.run(shutdown.clone()));

    let app = build_router(AppState::new(context));
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    tracing::info!("listening on {}", config.listen);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
            server_shutdown.cancel();
        })
        .await
        .context("serving HTTP")?;

    shutdown.cancel();
    verifier_task.await.context("verifier task panicked")?;
    Ok(())
}
