// Mock REST API - in-memory back end for the back-office clients

pub mod handlers;
pub mod query;
pub mod store;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::core::Resource;
use handlers::*;

pub use query::ListParams;
pub use store::ApiStore;

/// Routes shared by every collection; the resource arrives as an `Extension`
fn resource_routes(resource: Resource) -> Router<AppState> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/bulk", post(bulk_handler))
        .route(
            "/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .layer(Extension(resource))
}

pub fn create_router(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/auth/login", post(login_handler))
        .route("/settings", get(get_settings_handler).put(update_settings_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler));

    for resource in Resource::ALL {
        api = api.nest(&format!("/{}", resource.segment()), resource_routes(resource));
    }

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn router() -> Router {
        let state = AppState::new(Config::default()).await.unwrap();
        create_router(state)
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let router = router().await;
        let (status, created) = call(
            &router,
            "POST",
            "/api/blog-posts",
            Some(json!({"title": "Spring market", "slug": "spring-market"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["success"], true);
        let id = created["data"]["id"].as_i64().unwrap();

        let (status, fetched) = call(&router, "GET", &format!("/api/blog-posts/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["data"]["slug"], "spring-market");

        let (_, listed) = call(&router, "GET", "/api/blog-posts?search=SPRING", None).await;
        assert_eq!(listed["data"]["pagination"]["total"], 1);

        let (status, _) = call(&router, "DELETE", &format!("/api/blog-posts/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, missing) = call(&router, "GET", &format!("/api/blog-posts/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["success"], false);
    }

    #[tokio::test]
    async fn test_seeded_admin_can_log_in() {
        let router = router().await;
        let admin = Config::default().admin;
        let (status, body) = call(
            &router,
            "POST",
            "/api/auth/login",
            Some(json!({"email": admin.email, "password": admin.password})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["role"], "ADMIN");

        let (status, body) = call(
            &router,
            "POST",
            "/api/auth/login",
            Some(json!({"email": admin.email, "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_bad_id_and_stats() {
        let router = router().await;
        let (status, _) = call(&router, "GET", "/api/properties/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(&router, "GET", "/api/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["users"], 1);
        assert_eq!(body["data"]["properties"], 0);

        let (status, _) = call(&router, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
