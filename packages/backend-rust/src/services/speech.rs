use std::sync::Arc;

use axum::body::Body;
use bytes::Bytes;
use flashcards_core::{AudioChunk, ChunkPlayer, PlaybackError, PlaybackLease, SpeakReport};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::services::tts::TtsClient;

const STREAM_BUFFER_CHUNKS: usize = 2;

type AudioFrame = Result<Bytes, std::io::Error>;

/// Synthesizes each chunk and forwards its audio into a response stream.
/// A chunk is finished once its audio has been handed to the stream.
pub struct StreamingChunkPlayer {
    tts: Arc<TtsClient>,
    tx: mpsc::Sender<AudioFrame>,
}

impl StreamingChunkPlayer {
    pub fn new(tts: Arc<TtsClient>, tx: mpsc::Sender<AudioFrame>) -> Self {
        Self { tts, tx }
    }
}

impl ChunkPlayer for StreamingChunkPlayer {
    async fn play(&self, chunk: &AudioChunk) -> Result<(), PlaybackError> {
        if self.tx.is_closed() {
            return Err(PlaybackError::Play("listener disconnected".to_string()));
        }

        let audio = self
            .tts
            .synthesize(&chunk.text)
            .await
            .map_err(|e| PlaybackError::Fetch(e.to_string()))?;

        self.tx
            .send(Ok(audio))
            .await
            .map_err(|_| PlaybackError::Play("listener disconnected".to_string()))
    }
}

/// Plays `text` on a background task and returns the audio as a streamed
/// body. The lease is released when the last chunk is done.
pub fn stream_utterance(lease: PlaybackLease, text: String, tts: Arc<TtsClient>) -> Body {
    let (tx, rx) = mpsc::channel(STREAM_BUFFER_CHUNKS);

    tokio::spawn(async move {
        let player = StreamingChunkPlayer::new(tts, tx);
        let report = lease.play(&text, &player).await;
        log_report(&report);
    });

    Body::from_stream(ReceiverStream::new(rx))
}

/// How much of an utterance reached the listener
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UtteranceOutcome {
    Complete,
    Partial,
    /// Chunks existed but none produced audio; the body is empty
    Silent,
}

impl UtteranceOutcome {
    pub fn of(report: &SpeakReport) -> Self {
        if report.chunks > 0 && report.played == 0 {
            Self::Silent
        } else if report.failed > 0 {
            Self::Partial
        } else {
            Self::Complete
        }
    }
}

fn log_report(report: &SpeakReport) {
    match UtteranceOutcome::of(report) {
        UtteranceOutcome::Silent => warn!(
            chunks = report.chunks,
            failed = report.failed,
            "utterance streamed without audio, every chunk failed"
        ),
        UtteranceOutcome::Partial => warn!(
            chunks = report.chunks,
            played = report.played,
            failed = report.failed,
            "utterance streamed with gaps"
        ),
        UtteranceOutcome::Complete => info!(
            chunks = report.chunks,
            played = report.played,
            "utterance streamed"
        ),
    }
}
