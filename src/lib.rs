#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::services::employees::SearchGateway;

pub mod db;
pub mod domain;
pub mod dto;
pub mod models;
pub mod render;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    server_config
        .search
        .validate()
        .map_err(|e| std::io::Error::other(format!("Invalid search settings: {e}")))?;

    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let gateway = web::Data::new(SearchGateway::new(
        DieselRepository::new(pool),
        server_config.search.clone(),
    ));

    log::info!(
        "Serving employee search on {}:{} ({:?} rendering, max page size {})",
        server_config.address,
        server_config.port,
        server_config.search.rendering,
        server_config.search.max_page_size,
    );

    let bind_address = (server_config.address.clone(), server_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(gateway.clone())
            .service(web::scope("/api").configure(routes::api::configure::<DieselRepository>))
    })
    .bind(bind_address)?
    .run()
    .await
}
