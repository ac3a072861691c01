//! Event CRUD handlers: create, list, get, update, delete.
//!
//! Create and update publish the stored event to its zip code's live
//! subscribers before responding.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{EventListQuery, EventListResponse};
use crate::app_state::AppState;
use crate::auth::Caller;
use crate::domain::{Event, EventDraft, EventId};
use crate::error::{ApiError, ErrorResponse};

/// `POST /events`: Create an event and notify its zip code.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid input, missing credentials or storage
/// failure.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Stores a new event and pushes it to every live subscriber of its zip code.",
    request_body = EventDraft,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid event", body = ErrorResponse),
        (status = 401, description = "Missing credentials", body = ErrorResponse),
        (status = 403, description = "Invalid token", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_event(
    State(state): State<AppState>,
    caller: Caller,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(caller = %caller.username, zip = %draft.zip, "create event");
    let event = state.event_service.create_event(draft).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events`: List events with pagination and optional zip filter.
///
/// # Errors
///
/// Returns [`ApiError`] on an invalid zip filter or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Returns a paginated list of events ordered by start date, optionally filtered by zip code.",
    params(EventListQuery),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
        (status = 400, description = "Invalid zip code", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let zip = query.zip()?;
    let events = state.event_service.list_events(zip).await?;
    let (data, pagination) = query.page().apply(events);
    Ok(Json(EventListResponse { data, pagination }))
}

/// `GET /events/:id`: Get a single event.
///
/// # Errors
///
/// Returns [`ApiError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = Event),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state
        .event_service
        .get_event(EventId::from_uuid(id))
        .await?;
    Ok(Json(event))
}

/// `PUT /events/:id`: Replace an event and notify its (new) zip code.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid input, missing credentials, unknown id
/// or storage failure.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Update an event",
    description = "Replaces the event's fields and pushes the result to live subscribers of its zip code.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = EventDraft,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Invalid event", body = ErrorResponse),
        (status = 401, description = "Missing credentials", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn update_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<uuid::Uuid>,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(caller = %caller.username, event_id = %id, "update event");
    let event = state
        .event_service
        .update_event(EventId::from_uuid(id), draft)
        .await?;
    Ok(Json(event))
}

/// `DELETE /events/:id`: Remove an event.
///
/// # Errors
///
/// Returns [`ApiError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Missing credentials", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn delete_event(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(caller = %caller.username, event_id = %id, "delete event");
    state
        .event_service
        .delete_event(EventId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
}
