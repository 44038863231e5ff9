use std::collections::HashMap;

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use super::query::ListParams;
use crate::app_state::AppState;
use crate::core::{EntityId, Resource};
use crate::error::{AppError, AppResult};
use crate::models::{ApiEnvelope, BulkRequest, LoginRequest, Page};

fn parse_id(raw: &str) -> AppResult<EntityId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid id: {}", raw)))
}

// Collection handlers, shared by every resource through the Extension layer

pub async fn list_handler(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<ApiEnvelope<Page<Value>>> {
    let params = ListParams::from_query(&query);
    Json(ApiEnvelope::ok(state.store.list(resource, &params).await))
}

pub async fn get_handler(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    AxumPath(id): AxumPath<String>,
) -> AppResult<Json<ApiEnvelope<Value>>> {
    let id = parse_id(&id)?;
    let record = state.store.get(resource, id).await?;
    Ok(Json(ApiEnvelope::ok(record)))
}

pub async fn create_handler(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<ApiEnvelope<Value>>)> {
    let record = state.store.create(resource, body).await?;
    Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(record))))
}

pub async fn update_handler(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    AxumPath(id): AxumPath<String>,
    Json(body): Json<Value>,
) -> AppResult<Json<ApiEnvelope<Value>>> {
    let id = parse_id(&id)?;
    let record = state.store.update(resource, id, body).await?;
    Ok(Json(ApiEnvelope::ok(record)))
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    AxumPath(id): AxumPath<String>,
) -> AppResult<Json<ApiEnvelope<()>>> {
    let id = parse_id(&id)?;
    state.store.delete(resource, id).await?;
    Ok(Json(ApiEnvelope::message(format!(
        "{} {} deleted",
        resource.label(),
        id
    ))))
}

pub async fn bulk_handler(
    State(state): State<AppState>,
    Extension(resource): Extension<Resource>,
    Json(request): Json<BulkRequest>,
) -> AppResult<Json<ApiEnvelope<()>>> {
    let message = state.store.bulk(resource, request).await?;
    Ok(Json(ApiEnvelope::message(message)))
}

// Singleton endpoints

pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiEnvelope<Value>>> {
    let session = state.store.login(&request).await?;
    Ok(Json(ApiEnvelope::ok(session)))
}

pub async fn get_settings_handler(State(state): State<AppState>) -> Json<ApiEnvelope<Value>> {
    Json(ApiEnvelope::ok(state.store.settings().await))
}

pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<Json<ApiEnvelope<Value>>> {
    let settings = state.store.update_settings(body).await?;
    Ok(Json(ApiEnvelope::ok(settings)))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<ApiEnvelope<Value>> {
    let counts = state.store.stats().await;
    Json(ApiEnvelope::ok(json!(counts)))
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
