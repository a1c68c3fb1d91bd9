use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use crate::{
    AppState,
    error::ApiError,
    models::{BookingRequest, BookingView, ClassView},
    validation::client_name_length_ok,
};

#[derive(Debug, serde::Deserialize)]
pub struct ClassesQuery {
    pub target_timezone: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct BookingsQuery {
    pub client_email: String,
}

#[utoipa::path(get, path = "/", tag = "studio")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the Fitness Studio Booking API. Go to /docs for API documentation.",
        "endpoints": {
            "/classes": "List upcoming classes",
            "/classes.ical": "Download upcoming classes as iCal file",
            "/book": "Book a spot in a class",
            "/bookings": "List bookings made by a client email"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "studio")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "studio")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/classes",
    params(
        ("target_timezone" = Option<String>, Query, description = "IANA timezone to render display_date/display_time in, e.g. America/New_York")
    ),
    responses(
        (status = 200, description = "Upcoming classes in schedule order", body = [ClassView])
    ),
    tag = "classes"
)]
pub async fn get_classes(
    State(state): State<AppState>,
    Query(query): Query<ClassesQuery>,
) -> Json<Vec<ClassView>> {
    let target = query
        .target_timezone
        .as_deref()
        .filter(|tz| !tz.trim().is_empty());
    Json(state.service.upcoming_classes(Utc::now(), target))
}

#[utoipa::path(
    get,
    path = "/classes.ical",
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 404, description = "No upcoming classes")
    ),
    tag = "classes"
)]
pub async fn get_classes_ical(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let sessions = state.service.upcoming_sessions(Utc::now());
    if sessions.is_empty() {
        return Err(ApiError::NotFound("No upcoming classes".into()));
    }

    let body = state
        .exporter
        .generate(&state.settings.studio_name, &sessions);
    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            (
                "content-disposition",
                "attachment; filename=fitness_classes.ics",
            ),
        ],
        body,
    ))
}

#[utoipa::path(
    post,
    path = "/book",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingView),
        (status = 400, description = "Invalid input or class already started"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "No slots available"),
        (status = 422, description = "Malformed request body"),
        (status = 500, description = "Corrupt class schedule")
    ),
    tag = "bookings"
)]
pub async fn book_class(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !client_name_length_ok(&request.client_name) {
        return Err(ApiError::Unprocessable(
            "client_name must be between 2 and 100 characters".into(),
        ));
    }

    let view = state.service.book(
        &request.class_id,
        &request.client_name,
        &request.client_email,
        Utc::now(),
    )?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/bookings",
    params(
        ("client_email" = String, Query, description = "Email address used when booking")
    ),
    responses(
        (status = 200, description = "Bookings made with this email", body = [BookingView]),
        (status = 400, description = "Invalid email format"),
        (status = 422, description = "Missing client_email")
    ),
    tag = "bookings"
)]
pub async fn get_bookings(
    State(state): State<AppState>,
    query: Result<Query<BookingsQuery>, QueryRejection>,
) -> Result<Json<Vec<BookingView>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::Unprocessable(rejection.body_text()))?;
    Ok(Json(state.service.list_by_email(&query.client_email)?))
}
