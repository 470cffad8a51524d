use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use flashcards_core::{
    session_rng, Gender, Level, OrderMode, Session, SessionError, SessionView, SpeakError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::response::{ok, AppError};
use crate::services::sessions::SessionEntry;
use crate::services::speech::stream_utterance;
use crate::state::AppState;

use super::audio_response;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", get(get_session).delete(delete_session))
        .route("/:id/next", post(next_card))
        .route("/:id/previous", post(previous_card))
        .route("/:id/jump", post(jump_to_card))
        .route("/:id/answer", put(set_answer))
        .route("/:id/reveal", post(reveal_card))
        .route("/:id/speak", get(speak_card))
}

// ==================== Request / Response ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    /// Level number, either `2` or `"2"`
    level: Value,
    order: Option<String>,
    gender: Option<String>,
    seed: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    session_id: Uuid,
    view: SessionView,
}

#[derive(Debug, Deserialize)]
struct JumpRequest {
    index: i64,
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct SpeakQuery {
    field: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SpeakField {
    Thai,
    Korean,
}

impl SpeakField {
    fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::Thai),
            Some(v) if v.eq_ignore_ascii_case("thai") => Ok(Self::Thai),
            Some(v) if v.eq_ignore_ascii_case("korean") => Ok(Self::Korean),
            Some(v) => Err(AppError::validation(
                "INVALID_FIELD",
                format!("field must be thai or korean, got {v}"),
            )),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Thai => "thai",
            Self::Korean => "korean",
        }
    }
}

// ==================== Handlers ====================

async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Response, AppError> {
    let level = parse_level(&payload.level)?;
    let gender = match payload.gender.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(
            value
                .parse::<Gender>()
                .map_err(|e| AppError::validation("INVALID_GENDER", e.to_string()))?,
        ),
    };
    let order = payload
        .order
        .as_deref()
        .map(OrderMode::parse_lenient)
        .unwrap_or_default();

    let records = state.dataset().load(level).await;
    let mut rng = session_rng(payload.seed);
    let session = Session::build(records, level, gender, order, &mut rng).map_err(|e| match e {
        SessionError::GenderRequired(level) => AppError::validation(
            "GENDER_REQUIRED",
            format!("level {level} requires a gender; choose one at /gender-selection first"),
        ),
    })?;

    let view = session.view();
    let (session_id, _) = state.sessions().insert(session).await;
    info!(
        session_id = %session_id,
        level = %level,
        total = view.total,
        order = ?order,
        "session started"
    );

    Ok((
        StatusCode::CREATED,
        ok(CreateSessionResponse { session_id, view }),
    )
        .into_response())
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let entry = find_session(&state, id).await?;
    Ok(ok(entry.with_session(|s| s.view())).into_response())
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    if !state.sessions().remove(id).await {
        return Err(session_not_found());
    }
    Ok(ok(serde_json::json!({ "deleted": true })).into_response())
}

async fn next_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    update_session(&state, id, |s| {
        s.next();
    })
    .await
}

async fn previous_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    update_session(&state, id, |s| {
        s.previous();
    })
    .await
}

async fn jump_to_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JumpRequest>,
) -> Result<Response, AppError> {
    update_session(&state, id, |s| {
        s.jump_to(payload.index);
    })
    .await
}

async fn set_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Response, AppError> {
    update_session(&state, id, |s| s.set_input(payload.text)).await
}

async fn reveal_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    update_session(&state, id, |s| {
        s.reveal();
    })
    .await
}

async fn speak_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SpeakQuery>,
) -> Result<Response, AppError> {
    let field = SpeakField::parse(query.field.as_deref())?;
    let entry = find_session(&state, id).await?;

    let text = entry
        .with_session(|s| {
            s.current().map(|record| match field {
                SpeakField::Thai => record.thai.clone(),
                SpeakField::Korean => record.korean.clone(),
            })
        })
        .ok_or_else(|| AppError::conflict("EMPTY_SESSION", "session has no cards"))?;

    if text.trim().is_empty() {
        return Err(AppError::validation(
            "NOTHING_TO_SPEAK",
            format!("current card has no {} text", field.as_str()),
        ));
    }

    let lease = entry.speech().try_acquire().map_err(|e| match e {
        SpeakError::Busy => AppError::conflict("BUSY", "session is already speaking"),
    })?;

    let body = stream_utterance(lease, text, state.tts());
    Ok(audio_response(body))
}

// ==================== Helpers ====================

fn parse_level(value: &Value) -> Result<Level, AppError> {
    let invalid = || AppError::validation("INVALID_LEVEL", format!("unknown level {value}"));
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .and_then(Level::from_number)
            .ok_or_else(invalid),
        Value::String(s) => s.parse::<Level>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn session_not_found() -> AppError {
    AppError::not_found("session not found or expired")
}

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<SessionEntry>, AppError> {
    state.sessions().get(id).await.ok_or_else(session_not_found)
}

async fn update_session(
    state: &AppState,
    id: Uuid,
    f: impl FnOnce(&mut Session),
) -> Result<Response, AppError> {
    let entry = find_session(state, id).await?;
    let view = entry.with_session(|s| {
        f(s);
        s.view()
    });
    Ok(ok(view).into_response())
}
