//! # flashcards-core - Korean-Thai flashcard core
//!
//! Pure Rust building blocks of the flashcard service:
//!
//! - **Dataset** - workbook rows into typed phrase records, per-level layouts
//! - **Session** - gender filter, order mode, cursor navigation, answer checks
//! - **Speech** - sentence-aware chunking and strictly sequential playback
//!
//! Nothing here does network I/O or depends on an async runtime; the backend
//! plugs in workbook fetching and audio synthesis.
//!
//! ## Modules
//!
//! - [`dataset`] - workbook loader (soft-fail boundary in [`dataset::load_or_empty`])
//! - [`session`] - working set construction and [`Session`] state
//! - [`speech`] - [`speech::split_text`] and [`SpeechPlayer`]
//! - [`sanitize`] - cell coercion helpers
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use flashcards_core::{Gender, Level, OrderMode, PhraseRecord, Session};
//! use rand::SeedableRng;
//!
//! let records = vec![PhraseRecord {
//!     id: 1,
//!     korean: "감사합니다".to_string(),
//!     pronunciation: "컵쿤 크랍".to_string(),
//!     thai: "ขอบคุณครับ".to_string(),
//!     gender: Some(Gender::Male),
//!     level: Some(2),
//! }];
//!
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
//! let mut session = Session::build(records, Level::Quiz, Some(Gender::Male), OrderMode::Random, &mut rng)
//!     .expect("gender given");
//! session.set_input(" ขอบคุณครับ ");
//! assert_eq!(session.reveal(), Some(true));
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod dataset;
pub mod sanitize;
pub mod session;
pub mod speech;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use dataset::{DatasetError, LayoutConfig, LoadReport, SheetSelector};

pub use session::{
    session_rng, shuffle, CardView, Session, SessionError, SessionStatus, SessionView,
};

pub use speech::{
    split_text, ChunkPlayer, PlaybackError, PlaybackLease, SpeakError, SpeakReport, SpeechPlayer,
};
