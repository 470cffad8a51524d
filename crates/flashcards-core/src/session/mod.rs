//! Session Sequencer
//!
//! Builds the working set for one learning session and tracks the learner's
//! position in it.
//!
//! - Gendered levels keep only the records matching the learner's gender,
//!   in their original relative order
//! - Random order applies one Fisher–Yates pass at build time; navigation
//!   never reshuffles
//! - Every cursor move resets the per-card state (revealed, typed answer,
//!   answer check)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::types::{Gender, Level, OrderMode, PhraseRecord};

// ==================== Errors ====================

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Gendered levels cannot start before the learner picked a gender
    #[error("level {0} requires a gender selection")]
    GenderRequired(Level),
}

// ==================== Shuffle ====================

/// Uniform in-place Fisher–Yates shuffle driven by `rng`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Session shuffle source: reproducible with a seed, OS entropy otherwise.
pub fn session_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Filters and orders `records` into a working set.
pub fn build_working_set<R: Rng + ?Sized>(
    records: Vec<PhraseRecord>,
    level: Level,
    gender: Option<Gender>,
    order: OrderMode,
    rng: &mut R,
) -> Result<Vec<PhraseRecord>, SessionError> {
    let mut working_set = if level.is_gendered() {
        let gender = gender.ok_or(SessionError::GenderRequired(level))?;
        records
            .into_iter()
            .filter(|r| r.gender == Some(gender))
            .collect()
    } else {
        records
    };

    if order == OrderMode::Random {
        shuffle(&mut working_set, rng);
    }
    Ok(working_set)
}

// ==================== Session ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Ready,
    /// Nothing matched the level and gender; terminal
    Empty,
}

/// Card as the learner sees it: answer fields stay hidden until revealed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: i64,
    pub korean: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thai: Option<String>,
}

/// Serializable snapshot of a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub level: Level,
    pub status: SessionStatus,
    pub total: usize,
    /// 1-based position, 0 when empty
    pub position: usize,
    pub revealed: bool,
    pub user_input: String,
    pub answer_correct: Option<bool>,
    pub has_previous: bool,
    pub has_next: bool,
    pub card: Option<CardView>,
}

#[derive(Clone, Debug)]
pub struct Session {
    level: Level,
    working_set: Vec<PhraseRecord>,
    cursor: usize,
    revealed: bool,
    user_input: String,
    answer_correct: Option<bool>,
}

impl Session {
    /// Session over an already ordered working set
    pub fn new(level: Level, working_set: Vec<PhraseRecord>) -> Self {
        Self {
            level,
            working_set,
            cursor: 0,
            revealed: false,
            user_input: String::new(),
            answer_correct: None,
        }
    }

    pub fn build<R: Rng + ?Sized>(
        records: Vec<PhraseRecord>,
        level: Level,
        gender: Option<Gender>,
        order: OrderMode,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        let working_set = build_working_set(records, level, gender, order, rng)?;
        Ok(Self::new(level, working_set))
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn len(&self) -> usize {
        self.working_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working_set.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn working_set(&self) -> &[PhraseRecord] {
        &self.working_set
    }

    pub fn current(&self) -> Option<&PhraseRecord> {
        self.working_set.get(self.cursor)
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    pub fn answer_correct(&self) -> Option<bool> {
        self.answer_correct
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_empty() {
            SessionStatus::Empty
        } else {
            SessionStatus::Ready
        }
    }

    // ==================== Navigation ====================

    /// Advances one card. No-op on the last card.
    pub fn next(&mut self) -> bool {
        if self.cursor + 1 < self.len() {
            self.move_to(self.cursor + 1);
            true
        } else {
            false
        }
    }

    /// Steps back one card. No-op on the first card.
    pub fn previous(&mut self) -> bool {
        if self.cursor > 0 && !self.is_empty() {
            self.move_to(self.cursor - 1);
            true
        } else {
            false
        }
    }

    /// Jumps to `index`; out-of-range indices are ignored.
    pub fn jump_to(&mut self, index: i64) -> bool {
        match usize::try_from(index) {
            Ok(index) if index < self.len() => {
                self.move_to(index);
                true
            }
            _ => false,
        }
    }

    fn move_to(&mut self, index: usize) {
        self.cursor = index;
        self.revealed = false;
        self.user_input.clear();
        self.answer_correct = None;
    }

    // ==================== Answer ====================

    pub fn set_input(&mut self, text: impl Into<String>) {
        if !self.is_empty() {
            self.user_input = text.into();
        }
    }

    /// Reveals the current card; on the quiz level also checks the typed
    /// answer. Returns the check result, if any.
    pub fn reveal(&mut self) -> Option<bool> {
        let record = self.working_set.get(self.cursor)?;
        self.revealed = true;
        if self.level.requires_typed_answer() {
            self.answer_correct = Some(answer_matches(&self.user_input, &record.thai));
        }
        self.answer_correct
    }

    pub fn view(&self) -> SessionView {
        let card = self.current().map(|record| CardView {
            id: record.id,
            korean: record.korean.clone(),
            pronunciation: self.revealed.then(|| record.pronunciation.clone()),
            thai: (self.revealed && self.level.shows_thai()).then(|| record.thai.clone()),
        });

        SessionView {
            level: self.level,
            status: self.status(),
            total: self.len(),
            position: if self.is_empty() { 0 } else { self.cursor + 1 },
            revealed: self.revealed,
            user_input: self.user_input.clone(),
            answer_correct: self.answer_correct,
            has_previous: self.cursor > 0,
            has_next: self.cursor + 1 < self.len(),
            card,
        }
    }
}

/// Trimmed, case-insensitive comparison. A blank expected answer never
/// matches.
pub fn answer_matches(input: &str, expected: &str) -> bool {
    let expected = expected.trim();
    if expected.is_empty() {
        return false;
    }
    input.trim().to_lowercase() == expected.to_lowercase()
}
