//! Cell Sanitization
//!
//! Coerces raw workbook cells into the text and integer values a phrase
//! record needs. The workbook is edited by hand, so every helper treats
//! blanks, error cells and odd numeric encodings as "missing" instead of
//! failing.

use calamine::Data;

/// Trimmed text of a cell, `None` when the cell is blank or an error cell.
///
/// Numbers render in their shortest form (`12`, not `12.0`).
pub fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f)?,
        other => other.to_string().trim().to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Integer id of a cell. Accepts integer cells, integral floats and
/// numeric strings.
pub fn cell_id(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) => integral(*f),
        Data::String(s) => parse_id(s),
        _ => None,
    }
}

/// Parses a textual id such as `"12"`, `" 7 "` or `"3.0"`.
pub fn parse_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(integral))
}

/// Cell at `column` of a row, blank when the row is shorter.
pub fn cell_at(row: &[Data], column: usize) -> &Data {
    const EMPTY: &Data = &Data::Empty;
    row.get(column).unwrap_or(EMPTY)
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn format_float(f: f64) -> Option<String> {
    if !f.is_finite() {
        return None;
    }
    Some(format!("{f}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_trims_and_rejects_blank() {
        assert_eq!(cell_text(&Data::String("  สวัสดี ".into())), Some("สวัสดี".into()));
        assert_eq!(cell_text(&Data::String("   ".into())), None);
        assert_eq!(cell_text(&Data::Empty), None);
    }

    #[test]
    fn test_cell_text_numbers() {
        assert_eq!(cell_text(&Data::Int(12)), Some("12".into()));
        assert_eq!(cell_text(&Data::Float(12.0)), Some("12".into()));
        assert_eq!(cell_text(&Data::Float(1.5)), Some("1.5".into()));
        assert_eq!(cell_text(&Data::Float(f64::NAN)), None);
    }

    #[test]
    fn test_cell_id_coercion() {
        assert_eq!(cell_id(&Data::Int(3)), Some(3));
        assert_eq!(cell_id(&Data::Float(4.0)), Some(4));
        assert_eq!(cell_id(&Data::Float(4.5)), None);
        assert_eq!(cell_id(&Data::String(" 42 ".into())), Some(42));
        assert_eq!(cell_id(&Data::String("7.0".into())), Some(7));
        assert_eq!(cell_id(&Data::String("번호".into())), None);
        assert_eq!(cell_id(&Data::Bool(true)), None);
        assert_eq!(cell_id(&Data::Empty), None);
    }

    #[test]
    fn test_cell_at_short_row() {
        let row = vec![Data::Int(1), Data::String("a".into())];
        assert_eq!(cell_at(&row, 1), &Data::String("a".into()));
        assert_eq!(cell_at(&row, 4), &Data::Empty);
    }
}
