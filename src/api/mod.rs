//! REST API layer: route handlers, DTOs, router composition and the
//! OpenAPI document.
//!
//! All resource endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app_state::AppState;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "eventmap-api", description = "Event map REST API with live zip-code notifications"),
    paths(
        handlers::system::health_handler,
        handlers::system::subscription_stats,
        handlers::event::create_event,
        handlers::event::list_events,
        handlers::event::get_event,
        handlers::event::update_event,
        handlers::event::delete_event,
    ),
    components(schemas(
        crate::domain::Event,
        crate::domain::EventDraft,
        crate::domain::RegistryStats,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
        dto::EventListResponse,
        dto::PaginationMeta,
        handlers::system::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Events", description = "Event CRUD"),
        (name = "System", description = "Health and subscription statistics"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` JWT security scheme.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tokio_test::assert_ok;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::JwtAuthenticator;
    use crate::persistence::EventStore;
    use crate::shutdown::Shutdown;

    fn app() -> Router {
        let (_shutdown, signal) = Shutdown::channel();
        let state = AppState::new(
            EventStore::in_memory(),
            JwtAuthenticator::with_secret(b"router-test"),
            signal,
        );
        build_router().with_state(state)
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("request should build");
        };
        let response = assert_ok!(app().oneshot(request).await);
        let status = response.status();
        let bytes = assert_ok!(to_bytes(response.into_body(), usize::MAX).await);
        let body = serde_json::from_slice(&bytes).unwrap_or_default();
        (status, body)
    }

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/subscriptions/stats",
            "/api/v1/events",
            "/api/v1/events/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("status"), Some(&serde_json::json!("healthy")));
    }

    #[tokio::test]
    async fn stats_start_empty() {
        let (status, body) = get("/api/v1/subscriptions/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("topics"), Some(&serde_json::json!(0)));
        assert_eq!(body.get("published"), Some(&serde_json::json!(0)));
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let uri = format!("/api/v1/events/{}", uuid::Uuid::new_v4());
        let (status, body) = get(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body.pointer("/error/code"),
            Some(&serde_json::json!(2001))
        );
    }

    #[tokio::test]
    async fn out_of_range_zip_filter_is_rejected() {
        let (status, _) = get("/api/v1/events?zip=123456").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
