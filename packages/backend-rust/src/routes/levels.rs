use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use flashcards_core::Level;
use serde::Serialize;

use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_levels))
        .route("/:level/phrases", get(list_phrases))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LevelInfo {
    level: Level,
    title: &'static str,
    gendered: bool,
    typed_answer: bool,
    shows_thai: bool,
}

impl From<Level> for LevelInfo {
    fn from(level: Level) -> Self {
        Self {
            level,
            title: level.title(),
            gendered: level.is_gendered(),
            typed_answer: level.requires_typed_answer(),
            shows_thai: level.shows_thai(),
        }
    }
}

async fn list_levels() -> Response {
    let levels: Vec<LevelInfo> = Level::ALL.iter().copied().map(LevelInfo::from).collect();
    ok(levels).into_response()
}

async fn list_phrases(
    State(state): State<AppState>,
    Path(level): Path<String>,
) -> Result<Response, AppError> {
    let level = level
        .parse::<Level>()
        .map_err(|e| AppError::validation("INVALID_LEVEL", e.to_string()))?;

    let records = state.dataset().load(level).await;
    Ok(ok(records).into_response())
}
