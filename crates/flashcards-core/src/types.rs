//! Common Types and Constants
//!
//! Shared data structures used by the loader, the sequencer and the
//! speech adapter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Default maximum characters per synthesized chunk
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 200;

/// Default header rows above the first basic-vocabulary data row
pub const DEFAULT_BASIC_HEADER_ROWS: u32 = 4;

/// Source marker for male speech forms
pub const MALE_MARKER: &str = "남성";

/// Source marker for female speech forms
pub const FEMALE_MARKER: &str = "여성";

// ==================== Gender ====================

/// Speaker gender, selects gendered speech forms (e.g. ครับ / ค่ะ)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Maps a workbook gender cell onto a tag. Unknown markers are `None`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let marker = marker.trim();
        match marker {
            MALE_MARKER => Some(Self::Male),
            FEMALE_MARKER => Some(Self::Female),
            _ if marker.eq_ignore_ascii_case("male") => Some(Self::Male),
            _ if marker.eq_ignore_ascii_case("female") => Some(Self::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_marker(s).ok_or_else(|| UnknownValue::new("gender", s))
    }
}

// ==================== Level ====================

/// Learning level. Changes both the workbook layout and the quiz behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    /// Level 0: vocabulary only, gender agnostic
    Basic,
    /// Level 1: pronunciation focus
    Pronunciation,
    /// Level 2: reading and writing, typed answers are checked
    Quiz,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Basic, Level::Pronunciation, Level::Quiz];

    pub fn number(&self) -> u8 {
        match self {
            Self::Basic => 0,
            Self::Pronunciation => 1,
            Self::Quiz => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Basic),
            1 => Some(Self::Pronunciation),
            2 => Some(Self::Quiz),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Basic => "Basic Voca I",
            Self::Pronunciation => "Pronunciation Focus",
            Self::Quiz => "Reading & Writing",
        }
    }

    /// Whether records of this level carry a gender and sessions filter on it
    pub fn is_gendered(&self) -> bool {
        !matches!(self, Self::Basic)
    }

    /// Whether `reveal` checks the learner's typed answer
    pub fn requires_typed_answer(&self) -> bool {
        matches!(self, Self::Quiz)
    }

    /// Whether the Thai text is shown on reveal (level 1 only shows pronunciation)
    pub fn shows_thai(&self) -> bool {
        !matches!(self, Self::Pronunciation)
    }

    pub fn layout(&self) -> SheetLayout {
        match self {
            Self::Basic => SheetLayout::BasicVocabulary,
            Self::Pronunciation | Self::Quiz => SheetLayout::Main,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for Level {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::from_number)
            .ok_or_else(|| UnknownValue::new("level", s))
    }
}

impl TryFrom<u8> for Level {
    type Error = UnknownValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or_else(|| UnknownValue::new("level", &value.to_string()))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.number()
    }
}

// ==================== Layout ====================

/// Column layout of a workbook sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetLayout {
    /// id, korean, pronunciation, thai (below a fixed header block)
    BasicVocabulary,
    /// id, korean, gender, pronunciation, thai (from the first row)
    Main,
}

impl SheetLayout {
    pub fn column_count(&self) -> usize {
        match self {
            Self::BasicVocabulary => 4,
            Self::Main => 5,
        }
    }
}

// ==================== Order ====================

/// Presentation order of a session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    #[default]
    Sequential,
    Random,
}

impl OrderMode {
    /// Lenient parse: anything but `random` is sequential
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("random") {
            Self::Random
        } else {
            Self::Sequential
        }
    }
}

// ==================== Records ====================

/// One Korean-Thai phrase pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseRecord {
    pub id: i64,
    pub korean: String,
    /// Thai rendered in Hangul pronunciation
    pub pronunciation: String,
    /// May be empty for main-layout rows
    pub thai: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

/// Text chunk sent to the synthesis provider as one playback unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioChunk {
    pub text: String,
}

impl AudioChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

// ==================== Errors ====================

/// A selector value that does not name a known level, gender, ...
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownValue {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
