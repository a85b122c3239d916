use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use server_api::{ControllerError, EntityController};
use shared::{
    domain::{Entity, EntityId, ViewModel},
    error::{ApiError, ErrorCode, ValidationErrors, ValidationFailure},
};
use tracing::error;
use uuid::Uuid;

struct ResourceState<E, V> {
    prefix: Arc<str>,
    controller: EntityController<E, V>,
}

impl<E, V> Clone for ResourceState<E, V> {
    fn clone(&self) -> Self {
        Self {
            prefix: Arc::clone(&self.prefix),
            controller: self.controller.clone(),
        }
    }
}

/// Routes for one resource: `GET/POST/PUT {prefix}` and `GET/DELETE {prefix}/:id`.
///
/// A prefix of `"/"` (or `""`) mounts the resource at the root.
pub fn resource_routes<E, V>(prefix: &str, controller: EntityController<E, V>) -> Router
where
    E: Entity,
    V: ViewModel + Serialize + DeserializeOwned,
{
    let prefix = prefix.trim_end_matches('/');
    let collection = if prefix.is_empty() { "/" } else { prefix };
    let state = ResourceState {
        prefix: Arc::from(prefix),
        controller,
    };
    Router::new()
        .route(
            collection,
            get(list_all::<E, V>)
                .post(create::<E, V>)
                .put(update::<E, V>),
        )
        .route(
            &format!("{prefix}/:id"),
            get(get_by_id::<E, V>).delete(delete::<E, V>),
        )
        .with_state(state)
}

async fn list_all<E, V>(State(state): State<ResourceState<E, V>>) -> Result<Json<Vec<V>>, Response>
where
    E: Entity,
    V: ViewModel + Serialize,
{
    let views = state
        .controller
        .list_all()
        .await
        .map_err(|e| reject("list", e))?;
    Ok(Json(views))
}

async fn get_by_id<E, V>(
    State(state): State<ResourceState<E, V>>,
    Path(id): Path<Uuid>,
) -> Result<Json<V>, Response>
where
    E: Entity,
    V: ViewModel + Serialize,
{
    let view = state
        .controller
        .get_by_id(EntityId(id))
        .await
        .map_err(|e| reject("get", e))?;
    Ok(Json(view))
}

async fn create<E, V>(
    State(state): State<ResourceState<E, V>>,
    body: Result<Json<V>, JsonRejection>,
) -> Result<Response, Response>
where
    E: Entity,
    V: ViewModel + Serialize + DeserializeOwned,
{
    let Json(view) = body.map_err(malformed_body)?;
    let created = state
        .controller
        .create(view)
        .await
        .map_err(|e| reject("create", e))?;
    let location = format!("{}/{}", state.prefix, created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created.view),
    )
        .into_response())
}

async fn update<E, V>(
    State(state): State<ResourceState<E, V>>,
    body: Result<Json<V>, JsonRejection>,
) -> Result<Json<V>, Response>
where
    E: Entity,
    V: ViewModel + Serialize + DeserializeOwned,
{
    let Json(view) = body.map_err(malformed_body)?;
    let updated = state
        .controller
        .update(view)
        .await
        .map_err(|e| reject("update", e))?;
    Ok(Json(updated))
}

async fn delete<E, V>(
    State(state): State<ResourceState<E, V>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Response>
where
    E: Entity,
    V: ViewModel,
{
    state
        .controller
        .delete(EntityId(id))
        .await
        .map_err(|e| reject("delete", e))?;
    Ok(StatusCode::NO_CONTENT)
}

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

// Undecodable bodies are client errors (400); the body-limit rejection keeps its 413.
fn malformed_body(rejection: JsonRejection) -> Response {
    match &rejection {
        JsonRejection::JsonDataError(err) => (
            StatusCode::BAD_REQUEST,
            Json(ValidationErrors {
                errors: vec![data_error_failure(&err.body_text())],
            }),
        )
            .into_response(),
        JsonRejection::JsonSyntaxError(_) | JsonRejection::MissingJsonContentType(_) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(ErrorCode::Validation, rejection.body_text())),
        )
            .into_response(),
        _ => (
            rejection.status(),
            Json(ApiError::new(ErrorCode::Validation, rejection.body_text())),
        )
            .into_response(),
    }
}

/// Splits serde's `path: message` text into a field failure; root-level errors land on `body`.
fn data_error_failure(text: &str) -> ValidationFailure {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);
    match detail.split_once(": ") {
        Some((path, message)) if is_field_path(path) => ValidationFailure::new(path, message),
        _ => ValidationFailure::new("body", detail),
    }
}

fn is_field_path(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate != "."
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
}

fn reject(operation: &'static str, err: ControllerError) -> Response {
    match err {
        ControllerError::Validation(result) => (
            StatusCode::BAD_REQUEST,
            Json(ValidationErrors::from(result)),
        )
            .into_response(),
        ControllerError::NotFound { kind, id } => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                ErrorCode::NotFound,
                format!("{kind} {id} not found"),
            )),
        )
            .into_response(),
        ControllerError::Collaborator(source) => {
            error!(operation, error = %format!("{source:#}"), "resource operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, "internal server error")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
#[path = "tests/resource_tests.rs"]
mod tests;
