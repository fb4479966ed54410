use actix_web::{web, App, HttpServer};
use tracing::info;

use ripple::config;
use ripple::core::db::{AppState, FileStore};
use ripple::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ripple=debug".into()),
        )
        .init();

    let data_path = config::data_path();
    let addr = config::listen_addr();
    let state = web::Data::new(AppState::new(FileStore::new(&data_path)));

    info!(%addr, data = %data_path, "ripple listening");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(&addr)?
    .run()
    .await
}
