//! http handlers, generic over the `Store` behind the app state

pub(crate) mod admin;
pub(crate) mod cart;
pub(crate) mod error;
pub(crate) mod menu;

use crate::server::controller::error::CustomError;
use crate::server::database::store::Store;
use crate::server::state::AppState;
use actix_web::http::header;
use actix_web::HttpRequest;

const TERMINAL_MAX_LEN: usize = 32;

/// terminal names are short slugs, e.g. `front-1`
fn check_terminal(terminal: &str) -> Result<&str, CustomError> {
    let valid = !terminal.is_empty()
        && terminal.len() <= TERMINAL_MAX_LEN
        && terminal.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    match valid {
        true => Ok(terminal),
        false => Err(CustomError::BadRequest(format!("invalid terminal: {terminal}"))),
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// username of the admin behind the request's bearer token
fn require_admin<S: Store>(req: &HttpRequest, data: &AppState<S>) -> Result<String, CustomError> {
    bearer_token(req)
        .and_then(|token| data.sessions().validate(token))
        .ok_or(CustomError::SessionRequired)
}
