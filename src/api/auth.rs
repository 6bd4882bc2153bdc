use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::state::ApiState;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub valid: bool,
}

pub fn is_admin(headers: &HeaderMap, config: &ServerConfig) -> bool {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| key == config.admin_secret)
}

/// `GET /api/v1/auth`: tells a client whether its API key is the admin one.
pub async fn verify(
    State(state): State<ApiState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Json<AuthStatus> {
    let valid = is_admin(&headers, &state.config);
    if valid {
        info!("Valid login from {}", addr.ip());
    }
    Json(AuthStatus { valid })
}
