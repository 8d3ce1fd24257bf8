// CORS configuration from ALLOWED_ORIGINS ("*" allows any origin)

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::ServerConfig;

pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if config.cors_allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Session cookies only travel cross-origin when credentials are allowed,
    // which is forbidden together with a wildcard origin.
    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

pub fn apply_cors(router: Router, config: &ServerConfig) -> Router {
    router.layer(cors_layer(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    fn config(origins: &[&str]) -> ServerConfig {
        ServerConfig {
            cors_allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..ServerConfig::default()
        }
    }

    async fn allow_origin_for(config: &ServerConfig, origin: &str) -> Option<String> {
        let app = apply_cors(Router::new().route("/", get(|| async { "ok" })), config);
        let response = app
            .oneshot(Request::get("/").header(header::ORIGIN, origin).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_listed_origin_is_allowed() {
        let config = config(&["http://localhost:3000"]);
        assert_eq!(
            allow_origin_for(&config, "http://localhost:3000").await.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(allow_origin_for(&config, "http://evil.example").await, None);
    }

    #[tokio::test]
    async fn test_wildcard_allows_any() {
        let config = config(&["*"]);
        assert_eq!(allow_origin_for(&config, "http://anywhere.example").await.as_deref(), Some("*"));
    }
}
