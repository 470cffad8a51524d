//! Speech Playback Adapter
//!
//! Turns arbitrary text into bounded chunks and plays them one after another
//! through a [`ChunkPlayer`].
//!
//! Ordering: chunk `k + 1` is only handed to the player once chunk `k`'s
//! future resolved, successfully or not. A failed chunk counts as finished.
//!
//! A [`SpeechPlayer`] is one playback surface. While an utterance holds its
//! [`PlaybackLease`] every other `speak` on the same surface is rejected with
//! [`SpeakError::Busy`]. The lease is released when it is dropped, i.e. when
//! the last chunk finished.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::types::{AudioChunk, DEFAULT_MAX_CHUNK_CHARS};

// ==================== Chunking ====================

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\r' | '\n')
}

/// Splits `text` into chunks of at most `max_chars` characters plus the
/// sentence terminator.
///
/// Sentences end at runs of `.`, `!`, `?` or line breaks; the punctuation
/// stays with its sentence. Longer sentences are hard-sliced and the
/// terminator rides on the last slice.
pub fn split_text(text: &str, max_chars: usize) -> Vec<AudioChunk> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();

    for (body, terminator) in sentences(text) {
        let body: Vec<char> = body.trim().chars().collect();
        let terminator = terminator.trim();

        if body.is_empty() {
            if !terminator.is_empty() {
                chunks.push(AudioChunk::new(terminator));
            }
            continue;
        }

        let pieces: Vec<String> = body
            .chunks(max_chars)
            .map(|piece| piece.iter().collect::<String>())
            .collect();
        let last = pieces.len() - 1;
        for (i, piece) in pieces.into_iter().enumerate() {
            let text = if i == last {
                format!("{piece}{terminator}")
            } else {
                piece
            };
            let text = text.trim();
            if !text.is_empty() {
                chunks.push(AudioChunk::new(text));
            }
        }
    }

    chunks
}

/// `(body, terminator run)` pairs in order
fn sentences(text: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }
        let body_end = i;
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if !is_terminator(next) {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        out.push((&text[start..body_end], &text[body_end..end]));
        start = end;
    }

    if start < text.len() {
        out.push((&text[start..], ""));
    }
    out
}

// ==================== Player ====================

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio request failed: {0}")]
    Fetch(String),
    #[error("audio playback failed: {0}")]
    Play(String),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpeakError {
    #[error("speech is already playing on this surface")]
    Busy,
}

/// Plays one chunk; the returned future resolves when the chunk's audio
/// finished or failed.
pub trait ChunkPlayer {
    fn play(&self, chunk: &AudioChunk) -> impl Future<Output = Result<(), PlaybackError>> + Send;
}

/// Outcome of one utterance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpeakReport {
    pub chunks: usize,
    pub played: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct SpeechPlayer {
    max_chunk_chars: usize,
    playing: Arc<AtomicBool>,
}

impl Default for SpeechPlayer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHUNK_CHARS)
    }
}

impl SpeechPlayer {
    pub fn new(max_chunk_chars: usize) -> Self {
        Self {
            max_chunk_chars: max_chunk_chars.max(1),
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Claims the surface for one utterance.
    pub fn try_acquire(&self) -> Result<PlaybackLease, SpeakError> {
        self.playing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SpeakError::Busy)?;
        Ok(PlaybackLease {
            playing: Arc::clone(&self.playing),
            max_chunk_chars: self.max_chunk_chars,
        })
    }

    /// Speaks `text`, rejecting the call if an utterance is in progress.
    pub async fn speak<P: ChunkPlayer>(
        &self,
        text: &str,
        player: &P,
    ) -> Result<SpeakReport, SpeakError> {
        let lease = self.try_acquire()?;
        Ok(lease.play(text, player).await)
    }
}

/// Exclusive right to play on a [`SpeechPlayer`]; owned so it can move into a
/// spawned task.
#[derive(Debug)]
pub struct PlaybackLease {
    playing: Arc<AtomicBool>,
    max_chunk_chars: usize,
}

impl PlaybackLease {
    /// Plays every chunk of `text` in order, then releases the surface.
    pub async fn play<P: ChunkPlayer>(self, text: &str, player: &P) -> SpeakReport {
        let chunks = split_text(text, self.max_chunk_chars);
        let mut report = SpeakReport {
            chunks: chunks.len(),
            ..SpeakReport::default()
        };

        for (index, chunk) in chunks.iter().enumerate() {
            match player.play(chunk).await {
                Ok(()) => report.played += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(chunk = index, error = %err, "chunk playback failed, continuing");
                }
            }
        }

        debug!(
            chunks = report.chunks,
            played = report.played,
            failed = report.failed,
            "utterance finished"
        );
        report
    }
}

impl Drop for PlaybackLease {
    fn drop(&mut self) {
        self.playing.store(false, Ordering::Release);
    }
}
