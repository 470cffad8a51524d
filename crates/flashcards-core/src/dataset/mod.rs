//! Workbook Dataset Loader
//!
//! Parses the phrase workbook into [`PhraseRecord`]s.
//!
//! Two layouts live in the same workbook:
//! - **Basic vocabulary** (level 0): `id, korean, pronunciation, thai`,
//!   below a fixed header block
//! - **Main** (levels 1 and 2): `id, korean, gender, pronunciation, thai`,
//!   from the first row
//!
//! Rows missing a mandatory field are skipped and counted. Callers that want
//! the "always renderable" behavior go through [`load_or_empty`], which turns
//! any failure into an empty record list and logs the cause.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sanitize::{cell_at, cell_id, cell_text};
use crate::types::{
    Gender, Level, PhraseRecord, SheetLayout, DEFAULT_BASIC_HEADER_ROWS,
};

// ==================== Configuration ====================

/// Identifies a sheet inside the workbook
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl SheetSelector {
    /// A numeric value selects by index, anything else by name.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<usize>() {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Name(raw.to_string()),
        }
    }
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Name(name) => write!(f, "{name:?}"),
        }
    }
}

/// Where each layout lives in the workbook
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub main_sheet: SheetSelector,
    pub basic_sheet: SheetSelector,
    /// Rows above the first basic-vocabulary data row
    pub basic_header_rows: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            main_sheet: SheetSelector::Index(0),
            basic_sheet: SheetSelector::Index(1),
            basic_header_rows: DEFAULT_BASIC_HEADER_ROWS,
        }
    }
}

impl LayoutConfig {
    pub fn sheet(&self, layout: SheetLayout) -> &SheetSelector {
        match layout {
            SheetLayout::BasicVocabulary => &self.basic_sheet,
            SheetLayout::Main => &self.main_sheet,
        }
    }

    pub fn header_rows(&self, layout: SheetLayout) -> u32 {
        match layout {
            SheetLayout::BasicVocabulary => self.basic_header_rows,
            SheetLayout::Main => 0,
        }
    }
}

// ==================== Results ====================

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read workbook: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("sheet {0} not found in workbook")]
    MissingSheet(String),
    #[error("failed to fetch workbook: {0}")]
    Fetch(String),
}

/// Records parsed from one sheet
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub records: Vec<PhraseRecord>,
    /// Data rows dropped for a missing mandatory field
    pub skipped_rows: usize,
}

// ==================== Parsing ====================

/// Parses one row of `level`'s layout. Columns count from the first used
/// column of the sheet.
pub fn parse_row(row: &[Data], level: Level) -> Option<PhraseRecord> {
    let cell = |column: usize| cell_at(row, column);

    match level.layout() {
        SheetLayout::BasicVocabulary => Some(PhraseRecord {
            id: cell_id(cell(0))?,
            korean: cell_text(cell(1))?,
            pronunciation: cell_text(cell(2))?,
            thai: cell_text(cell(3))?,
            gender: None,
            level: Some(level.number()),
        }),
        SheetLayout::Main => {
            let id = cell_id(cell(0))?;
            let korean = cell_text(cell(1))?;
            let gender = cell_text(cell(2)).and_then(|marker| Gender::from_marker(&marker))?;
            let pronunciation = cell_text(cell(3))?;
            Some(PhraseRecord {
                id,
                korean,
                pronunciation,
                thai: cell_text(cell(4)).unwrap_or_default(),
                gender: Some(gender),
                level: Some(level.number()),
            })
        }
    }
}

/// Parses a worksheet range, skipping the first `header_rows` rows of the
/// sheet. Rows are absolute, columns are relative to the used range.
pub fn parse_range(range: &Range<Data>, level: Level, header_rows: u32) -> LoadReport {
    let mut report = LoadReport::default();
    let Some((first_row, _)) = range.start() else {
        return report;
    };

    for (offset, row) in range.rows().enumerate() {
        let absolute_row = first_row + offset as u32;
        if absolute_row < header_rows {
            continue;
        }
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        match parse_row(row, level) {
            Some(record) => report.records.push(record),
            None => {
                report.skipped_rows += 1;
                debug!(row = absolute_row + 1, level = %level, "skipping incomplete row");
            }
        }
    }

    report
}

/// Reads `level`'s sheet from any seekable workbook source.
pub fn read_workbook<RS>(
    reader: RS,
    level: Level,
    config: &LayoutConfig,
) -> Result<LoadReport, DatasetError>
where
    RS: Read + Seek + Clone,
{
    let mut workbook = open_workbook_auto_from_rs(reader)?;
    let layout = level.layout();
    let selector = config.sheet(layout);

    let range = match selector {
        SheetSelector::Index(index) => workbook
            .worksheet_range_at(*index)
            .ok_or_else(|| DatasetError::MissingSheet(selector.to_string()))??,
        SheetSelector::Name(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(DatasetError::MissingSheet(selector.to_string()));
            }
            workbook.worksheet_range(name)?
        }
    };

    let report = parse_range(&range, level, config.header_rows(layout));
    debug!(
        level = %level,
        sheet = %selector,
        records = report.records.len(),
        skipped = report.skipped_rows,
        "workbook sheet parsed"
    );
    Ok(report)
}

pub fn read_workbook_bytes(
    bytes: impl AsRef<[u8]>,
    level: Level,
    config: &LayoutConfig,
) -> Result<LoadReport, DatasetError> {
    read_workbook(Cursor::new(bytes.as_ref()), level, config)
}

pub fn read_workbook_path(
    path: impl AsRef<Path>,
    level: Level,
    config: &LayoutConfig,
) -> Result<LoadReport, DatasetError> {
    let bytes = std::fs::read(path.as_ref())?;
    read_workbook_bytes(bytes, level, config)
}

/// Soft-fail boundary: any error becomes an empty record list.
pub fn load_or_empty(result: Result<LoadReport, DatasetError>, level: Level) -> Vec<PhraseRecord> {
    match result {
        Ok(report) => report.records,
        Err(err) => {
            warn!(level = %level, error = %err, "dataset load failed, continuing with no records");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    fn range_from(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), value);
            }
        }
        range
    }

    #[test]
    fn test_main_row_complete() {
        let row = vec![
            Data::Float(3.0),
            text("감사합니다"),
            text("남성"),
            text("컵쿤 크랍"),
            text("ขอบคุณครับ"),
        ];
        let record = parse_row(&row, Level::Pronunciation).unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.gender, Some(Gender::Male));
        assert_eq!(record.thai, "ขอบคุณครับ");
        assert_eq!(record.level, Some(1));
    }

    #[test]
    fn test_main_row_blank_thai_is_kept() {
        let row = vec![Data::Int(1), text("네"), text("여성"), text("카"), Data::Empty];
        let record = parse_row(&row, Level::Quiz).unwrap();
        assert_eq!(record.thai, "");
        assert_eq!(record.gender, Some(Gender::Female));
    }

    #[test]
    fn test_main_row_unknown_gender_is_dropped() {
        let row = vec![Data::Int(1), text("네"), text("공통"), text("카"), text("ค่ะ")];
        assert!(parse_row(&row, Level::Pronunciation).is_none());
    }

    #[test]
    fn test_basic_row_requires_thai() {
        let row = vec![Data::Int(1), text("물"), text("남"), Data::Empty];
        assert!(parse_row(&row, Level::Basic).is_none());

        let row = vec![Data::Int(1), text("물"), text("남"), text("น้ำ")];
        let record = parse_row(&row, Level::Basic).unwrap();
        assert_eq!(record.gender, None);
        assert_eq!(record.level, Some(0));
    }

    #[test]
    fn test_non_numeric_id_is_dropped() {
        let row = vec![text("번호"), text("한국어"), text("성별"), text("발음"), text("태국어")];
        assert!(parse_row(&row, Level::Pronunciation).is_none());
    }

    #[test]
    fn test_parse_range_skips_header_rows_and_keeps_order() {
        let range = range_from(vec![
            vec![text("Basic Voca I")],
            vec![Data::Empty],
            vec![text("note")],
            vec![text("번호"), text("한국어"), text("발음"), text("태국어")],
            vec![Data::Int(10), text("물"), text("남"), text("น้ำ")],
            vec![Data::Int(11), text("밥"), Data::Empty, text("ข้าว")],
            vec![Data::Int(12), text("차"), text("차"), text("ชา")],
        ]);

        let report = parse_range(&range, Level::Basic, 4);
        let ids: Vec<i64> = report.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 12]);
        assert_eq!(report.skipped_rows, 1);
    }

    #[test]
    fn test_parse_range_uses_absolute_offsets() {
        // used range starts at B3: the first two rows and column A are blank
        let mut range = Range::new((2, 1), (5, 4));
        for (r, (id, kr)) in [(1, "하나"), (2, "둘"), (3, "셋"), (4, "넷")].iter().enumerate() {
            let row = 2 + r as u32;
            range.set_value((row, 1), Data::Int(*id));
            range.set_value((row, 2), text(kr));
            range.set_value((row, 3), text("발음"));
            range.set_value((row, 4), text("ไทย"));
        }

        // columns count from B, rows 0..4 are header rows: rows 5 and 6 remain
        let report = parse_range(&range, Level::Basic, 4);
        let ids: Vec<i64> = report.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_parse_empty_range() {
        let range: Range<Data> = Range::empty();
        assert_eq!(parse_range(&range, Level::Quiz, 0), LoadReport::default());
    }

    #[test]
    fn test_load_or_empty_swallows_errors() {
        let result = read_workbook_bytes(b"not a workbook".to_vec(), Level::Basic, &LayoutConfig::default());
        assert!(result.is_err());
        assert!(load_or_empty(result, Level::Basic).is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = read_workbook_path(
            "/definitely/not/here/Thai_Basic.xlsx",
            Level::Pronunciation,
            &LayoutConfig::default(),
        );
        assert!(matches!(result, Err(DatasetError::Io(_))));
    }

    #[test]
    fn test_sheet_selector_parse() {
        assert_eq!(SheetSelector::parse("1"), SheetSelector::Index(1));
        assert_eq!(SheetSelector::parse(" Main "), SheetSelector::Name("Main".into()));
    }
}
