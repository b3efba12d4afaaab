//! Employee Identity Host Library
//!
//! HTTP API over the identity and token services. Seeds the database once
//! before the listener opens.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use tower_http::trace::TraceLayer;
use tracing::info;

use identity_service_lib::infra::Database;
use identity_service_lib::seed::Seeder;

use crate::config::HostConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Startup switches for `serve`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServeOptions {
    /// Drop the database before seeding
    pub clear_database: bool,
    /// Skip seeding and only apply migrations
    pub skip_seed: bool,
}

/// Seed the database and run the HTTP server.
pub async fn run_server(
    config: HostConfig,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let database = Database::connect_without_migrations(&config.identity.database_url).await?;

    if options.skip_seed {
        database.run_migrations().await?;
        info!("Seeding skipped, migrations applied");
    } else {
        let clear = options.clear_database || config.identity.clear_database;
        let results = Seeder::new(database.clone(), config.identity.identity.clone())
            .seed_database(clear)
            .await;
        info!("Seeding finished: {}", results);
    }

    // Create app state
    let state = AppState::new(
        database,
        config.identity.identity.clone(),
        config.token.clone(),
    );

    // Build router
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Build address
    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Employee identity host listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the seeding protocol once without starting the server.
pub async fn run_seed(clear_database: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = identity_service_lib::config::IdentityServiceConfig::from_env();
    let database = Database::connect_without_migrations(&config.database_url).await?;

    let results = Seeder::new(database, config.identity)
        .seed_database(clear_database || config.clear_database)
        .await;

    for result in results.results() {
        println!("{}", result);
    }
    Ok(())
}
