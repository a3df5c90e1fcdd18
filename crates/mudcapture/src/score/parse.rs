//! 分數區塊解析
//!
//! 變體判斷與形狀驗證都只看便宜的子字串；欄位擷取用一張
//! (正則, 欄位名) 規則表，依序套用到每一行。

use lazy_static::lazy_static;
use regex::Regex;

use super::{ScoreFields, ScoreVariant};
use crate::error::CaptureError;
use crate::session::CaptureMode;
use crate::shapes;

/// 內容行超過此數即視為長表格
const LONG_TABLE_ROWS: usize = 4;

lazy_static! {
    static ref CELL_GAP: Regex = Regex::new(r"\s{2,}").unwrap();
    static ref REPORT_RULES: Vec<(Regex, &'static [&'static str])> = vec![
        (
            Regex::new(r"(?i)^you are an? \d+[- ]years?[- ]old\s+(.+?)\.?$").unwrap(),
            &["descriptor"] as &[&str],
        ),
        (Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s+hit").unwrap(), &["hp", "max_hp"] as &[&str]),
        (Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s+mana").unwrap(), &["mana", "max_mana"] as &[&str]),
        (Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s+move").unwrap(), &["moves", "max_moves"] as &[&str]),
        (Regex::new(r"(?i)\b(\d+)\s+gold\b").unwrap(), &["gold"] as &[&str]),
        (Regex::new(r"(?i)\b(\d+)\s+(?:experience|exp)\b").unwrap(), &["exp"] as &[&str]),
        (Regex::new(r"(?i)\blevel\s+(\d+)").unwrap(), &["level"] as &[&str]),
        (Regex::new(r"(?i)ranks you as ([A-Z][\w'-]*)").unwrap(), &["name"] as &[&str]),
    ];
}

/// 依模式與內容判斷變體
pub fn detect_variant(mode: CaptureMode, clean_lines: &[String]) -> ScoreVariant {
    if mode == CaptureMode::Report {
        return ScoreVariant::Report;
    }
    let rows: Vec<&String> = clean_lines
        .iter()
        .filter(|line| !line.is_empty() && !shapes::is_border_line(line))
        .collect();
    if !rows.iter().any(|row| row.contains('|')) {
        ScoreVariant::Unknown
    } else if rows.len() > LONG_TABLE_ROWS {
        ScoreVariant::TableLong
    } else {
        ScoreVariant::TableShort
    }
}

/// 各變體必須包含的子字串（不分大小寫）
pub fn required_substrings(variant: ScoreVariant) -> &'static [&'static str] {
    match variant {
        ScoreVariant::TableShort => &["|", "name:"],
        ScoreVariant::TableLong => &["|", "level"],
        ScoreVariant::Report => &["you are", "year"],
        ScoreVariant::Unknown => &[":"],
    }
}

/// 檢查區塊看起來真的像該變體
pub fn validate_shape(variant: ScoreVariant, text: &str) -> Result<(), CaptureError> {
    let lower = text.to_lowercase();
    let missing: Vec<String> = required_substrings(variant)
        .iter()
        .filter(|needle| !lower.contains(*needle))
        .map(|needle| needle.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CaptureError::ShapeMismatch { variant, missing })
    }
}

/// 擷取欄位
pub fn extract_fields(variant: ScoreVariant, clean_lines: &[String]) -> ScoreFields {
    match variant {
        ScoreVariant::Report => extract_report(clean_lines),
        _ => extract_table(clean_lines),
    }
}

fn extract_table(clean_lines: &[String]) -> ScoreFields {
    let mut fields = ScoreFields::new();
    for line in clean_lines {
        if shapes::is_border_line(line) {
            continue;
        }
        for cell in line.split('|') {
            for segment in CELL_GAP.split(cell.trim()) {
                if let Some((key, value)) = split_pair(segment) {
                    fields.insert(key, value);
                }
            }
        }
    }
    fields
}

fn split_pair(segment: &str) -> Option<(String, String)> {
    let (key, value) = segment.split_once(':')?;
    let key = field_key(key);
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value.to_string()))
}

/// "Hit Points" -> "hit_points"
fn field_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
        } else if !key.ends_with('_') && !key.is_empty() {
            key.push('_');
        }
    }
    key.trim_end_matches('_').to_string()
}

fn extract_report(clean_lines: &[String]) -> ScoreFields {
    let mut fields = ScoreFields::new();
    for line in clean_lines {
        if let Some(age) = shapes::report_header_age(line) {
            fields.insert("age", age.to_string());
        }
        for (regex, keys) in REPORT_RULES.iter() {
            if let Some(caps) = regex.captures(line) {
                for (i, key) in keys.iter().enumerate() {
                    if let Some(m) = caps.get(i + 1) {
                        fields.insert(*key, m.as_str().trim());
                    }
                }
            }
        }
        if let Some(state) = shapes::terminal_state(line) {
            fields.insert("state", state);
        }
    }
    fields
}
