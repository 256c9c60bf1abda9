mod catalog;
mod config;
mod controller;
mod db;
mod entities;
mod error;
mod image;
mod models;
mod repo;
mod routes;
mod slot;
mod templates;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    catalog::CatalogStore,
    config::Config,
    controller::Controller,
    repo::MovieRepo,
    slot::{CatalogSlot, FileSlot},
};

pub type SharedCatalog = Arc<Mutex<Controller<Box<dyn CatalogSlot>>>>;

pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: SharedCatalog,
    pub movies: MovieRepo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,marquee=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url).await?;

    let slot = FileSlot::new(&config.slot_dir, config.slot_key.clone());
    tracing::info!(path = %slot.path().display(), "catalog slot");
    let slot: Box<dyn CatalogSlot> = Box::new(slot);
    let catalog = Controller::new(CatalogStore::hydrate(slot));

    let state = Arc::new(AppState {
        config: config.clone(),
        catalog: Arc::new(Mutex::new(catalog)),
        movies: MovieRepo::new(db),
    });

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
