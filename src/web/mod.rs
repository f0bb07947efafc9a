// SPDX-License-Identifier: GPL-2.0-or-later
use std::{any::Any, sync::Arc};

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use earmark_api_structs::ErrorBody;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{error, Level};
use ulid::Ulid;

use crate::store::ClipStore;
use crate::Error;

pub(crate) mod handlers;


const INTERNAL_ERROR: &str = "Internal server error";

/// Build the router for the clip API, backed by the given store.
///
/// The store is constructed once by the caller and shared by every request.
pub fn create_router<S: ClipStore>(store: S) -> Router {
    Router::new()
        .route("/api/status", get(handlers::status::get::<S>))
        .route("/api/clips/random", get(handlers::clip::random::<S>))
        .route(
            "/api/clips",
            get(handlers::clip::get_all::<S>).post(handlers::clip::create::<S>),
        )
        .fallback(handle_404)
        .layer(Extension(Arc::new(store)))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!("request",
                        id = %Ulid::new(),
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Micros),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

async fn handle_404() -> impl IntoResponse {
    error_response(
        StatusCode::NOT_FOUND,
        "This isn't the endpoint you're looking for".to_string(),
    )
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(details, "Request handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
            Error::NotFound(message) => error_response(StatusCode::NOT_FOUND, message),
            err => {
                error!(error = %err, "Request failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
        }
    }
}
