mod health;
mod levels;
mod sessions;
mod tts;

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest("/api/levels", levels::router())
        .nest("/api/sessions", sessions::router())
        .nest("/api/tts", tts::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("route not found").into_response()
}

fn audio_response(body: Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"tts.mp3\""),
        ],
        body,
    )
        .into_response()
}
