//! Catalog CLI
//!
//! Restores the saved session, optionally signs in, loads the product list
//! and prints it.
//!
//! Environment:
//! - `CATALOG_API_URL`, `CATALOG_TOKEN_KEY`, `CATALOG_TOKEN_FILE`,
//!   `CATALOG_REQUEST_TIMEOUT_SECS`: see [`ClientConfig::from_env`]
//! - `CATALOG_EMAIL` / `CATALOG_PASSWORD`: sign in before fetching
//! - `RUST_LOG`: log filter

use anyhow::Context;
use catalog_sync::{CatalogClient, ClientConfig, Credentials};
use catalog_sync_runtime::EffectHandle;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_sync=debug,catalog_sync_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().context("invalid configuration")?;
    info!(base_url = %config.base_url, token_file = %config.token_path.display(), "starting");

    let client = CatalogClient::connect(&config).context("could not build client")?;
    if client.state(|s| s.auth.is_authenticated()).await {
        info!("restored saved session");
    }

    let login = match (std::env::var("CATALOG_EMAIL"), std::env::var("CATALOG_PASSWORD")) {
        (Ok(email), Ok(password)) => Some(client.login(Credentials::new(email, password)).await?),
        _ => None,
    };
    let fetch = client.fetch_products().await?;

    // Both calls are in flight; their results fold in whichever order they settle
    let mut handles: Vec<EffectHandle> = login.into_iter().chain([fetch]).collect();
    futures::future::join_all(handles.iter_mut().map(|handle| handle.wait())).await;

    let snapshot = client.snapshot().await;
    if let Some(error) = &snapshot.auth.error {
        warn!(%error, "login failed");
    }
    if let Some(user) = &snapshot.auth.user {
        info!(name = %user.name, email = %user.email, "signed in");
    }

    match &snapshot.products.error {
        Some(error) => warn!(%error, "could not load products"),
        None => {
            info!(count = snapshot.products.list.len(), "products loaded");
            for product in &snapshot.products.list {
                println!(
                    "{:<26} {:<32} {:>10.2} {:>6}  {}",
                    product.id, product.title, product.price, product.stock, product.category
                );
            }
        },
    }

    client
        .shutdown(SHUTDOWN_TIMEOUT)
        .await
        .context("shutdown timed out")?;
    Ok(())
}
