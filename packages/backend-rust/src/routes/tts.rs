use axum::body::Body;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use flashcards_core::SpeechPlayer;
use serde::Deserialize;
use tracing::warn;

use crate::response::AppError;
use crate::services::speech::stream_utterance;
use crate::state::AppState;

use super::audio_response;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(synthesize))
        .route("/speak", get(speak))
}

#[derive(Debug, Default, Deserialize)]
struct TtsQuery {
    text: Option<String>,
}

impl TtsQuery {
    fn required_text(self) -> Result<String, AppError> {
        self.text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("No text"))
    }
}

/// Relays one fragment to the provider. Upstream failures never reach the
/// client as audio.
async fn synthesize(
    State(state): State<AppState>,
    Query(query): Query<TtsQuery>,
) -> Result<Response, AppError> {
    let text = query.required_text()?;

    match state.tts().synthesize(&text).await {
        Ok(audio) => Ok(audio_response(Body::from(audio))),
        Err(err) => {
            warn!(error = %err, "tts relay failed");
            Err(AppError::upstream("TTS_UPSTREAM_FAILED", "TTS fetch failed"))
        }
    }
}

/// Streams arbitrarily long text chunk by chunk, in order.
async fn speak(
    State(state): State<AppState>,
    Query(query): Query<TtsQuery>,
) -> Result<Response, AppError> {
    let text = query.required_text()?;

    let player = SpeechPlayer::new(state.speech_max_chunk_chars());
    let lease = player
        .try_acquire()
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(audio_response(stream_utterance(lease, text, state.tts())))
}
