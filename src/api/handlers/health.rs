use crate::{auth::Authenticator, GIT_COMMIT_HASH};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error};
use utoipa::ToSchema;

const PING_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    store: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "User store is reachable", body = Health),
        (status = 503, description = "User store is unreachable", body = Health)
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(
    method: Method,
    authenticator: Extension<Arc<Authenticator>>,
) -> impl IntoResponse {
    let store = authenticator.store();
    let result = match tokio::time::timeout(PING_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => {
            error!("Failed to ping user store: {}", err);
            Err(())
        }
        Err(_) => {
            error!("User store ping timed out");
            Err(())
        }
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if result.is_ok() {
            "ok".to_string()
        } else {
            "error".to_string()
        },
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let headers = x_app_headers(&health);

    if result.is_ok() {
        debug!("User store is healthy");
        (StatusCode::OK, headers, body)
    } else {
        debug!("User store is unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }
}

fn x_app_headers(health: &Health) -> HeaderMap {
    let short_hash = if health.commit.len() > 7 {
        health.commit.get(0..7).unwrap_or("")
    } else {
        ""
    };

    let mut headers = HeaderMap::new();
    match format!("{}:{}:{}", health.name, health.version, short_hash).parse::<HeaderValue>() {
        Ok(value) => {
            debug!("X-App header: {:?}", value);
            headers.insert("X-App", value);
        }
        Err(err) => error!("Failed to parse X-App header: {}", err),
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_app_header_uses_short_hash() {
        let health = Health {
            commit: "0123456789abcdef".to_string(),
            name: "accounts".to_string(),
            version: "0.1.0".to_string(),
            store: "ok".to_string(),
        };
        let headers = x_app_headers(&health);
        assert_eq!(
            headers.get("X-App").and_then(|v| v.to_str().ok()),
            Some("accounts:0.1.0:0123456")
        );
    }

    #[test]
    fn x_app_header_without_hash() {
        let health = Health {
            commit: "unknown".to_string(),
            name: "accounts".to_string(),
            version: "0.1.0".to_string(),
            store: "ok".to_string(),
        };
        let headers = x_app_headers(&health);
        assert_eq!(
            headers.get("X-App").and_then(|v| v.to_str().ok()),
            Some("accounts:0.1.0:")
        );
    }
}
