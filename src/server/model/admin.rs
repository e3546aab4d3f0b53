use crate::server::model::menu::MenuItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Outcome of a menu change, with the menu as reloaded afterwards.
#[derive(Debug, Serialize)]
pub(crate) struct MenuChangeResponse {
    pub message: String,
    pub items: Vec<MenuItem>,
}
