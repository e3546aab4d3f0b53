//! application entry point

use crate::server::model::config::ServerConfig;
use derive_more::Display;
use log::{info, warn};
use std::env;
use std::path::Path;
use std::str::FromStr;

mod server;

#[actix_web::main()]
async fn main() -> Result<(), anyhow::Error> {
    // bootstrap
    // a. env
    let env = env::var("APP_ENV")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Env::Dev); // default dev env if absent

    let dotenv = match env {
        Env::Prod | Env::Stg => Ok(()), // load in CI
        Env::Dev => dotenvy::from_path(Path::new(".env.dev")),
    };

    // b. logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    if let Err(e) = dotenv {
        warn!("failed to load envs from .env.dev, using process env only, {}", e);
    }

    // c. run app
    let config = ServerConfig::from_env()?;

    info!("App is starting in env={}", env);

    server::run(config).await
}

#[derive(Debug, Display)]
#[non_exhaustive]
enum Env {
    Dev,
    Stg,
    Prod,
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "stg" => Ok(Self::Stg),
            "prod" => Ok(Self::Prod),
            s => Err(format!("Invalid Env: {s}")),
        }
    }
}
