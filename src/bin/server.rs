//! route-contract demo server.
//!
//! Serves the users service from `route_contract::demo`, seeded with one
//! user (`id = 1`).
//!
//! # Environment Variables
//!
//! - `HOST`: bind address (default: 0.0.0.0)
//! - `PORT`: HTTP port (default: 8080)
//! - `RUST_LOG`: Tracing filter (default: "info,route_contract=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! curl localhost:8080/users/1
//! ```

use route_contract::demo::{routes, User, UserStore};
use route_contract::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,route_contract=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let bind_addr = config.bind_addr()?;

    let store = UserStore::with_users([User {
        id: "1".to_string(),
        name: "Ada Lovelace".to_string(),
    }]);
    let table = routes(store);

    tracing::info!("route-contract server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    for binding in table.bindings() {
        tracing::info!("  {:<6} {}", binding.method(), binding.pattern());
    }

    let app = table.into_router()?;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
