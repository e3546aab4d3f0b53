//! main file for the server

pub(crate) mod controller;
pub(crate) mod database;
pub(crate) mod model;
mod routes;
mod scheduler;
pub(crate) mod service;
mod state;
pub(crate) mod util;

use crate::server::database::pool;
use crate::server::database::postgres::PgStore;
use crate::server::model::config::ServerConfig;
use crate::server::service::auth;
use crate::server::service::session::SessionRegistry;
use crate::server::state::AppState;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Error};
use log::info;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the server
pub async fn run(config: ServerConfig) -> Result<(), Error> {
    // abort the process if failed to connect db
    let read_pool = pool::init("read", &config.db_read_conn_str, config.db_pool_size)
        .await
        .context("failed to connect read pool")?;
    let write_pool = pool::init("write", &config.db_write_conn_str, config.db_pool_size)
        .await
        .context("failed to connect write pool")?;
    let store = PgStore::new(read_pool, write_pool, config.db_timeout);

    auth::prepare().await?;
    if let Some(admin) = &config.admin {
        auth::bootstrap_admin(&store, admin).await?;
    }

    let state = web::Data::new(AppState::new(store, SessionRegistry::new(config.session_ttl)));
    let cancel_token = CancellationToken::new();
    let sweeper = scheduler::job::session_sweeper(state.sessions(), SESSION_SWEEP_INTERVAL, cancel_token.clone());

    info!("listening on {}", config.addr);
    let served = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure::<PgStore>)
    })
    .bind(config.addr)?
    .run()
    .await;

    cancel_token.cancel();
    sweeper.wait().await;
    served.map_err(Error::from)
}
