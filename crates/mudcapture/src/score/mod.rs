//! 分數區塊模組
//!
//! - `capture`: 表格/報告兩種擷取狀態機
//! - `parse`: 變體判斷、形狀驗證、欄位擷取

mod capture;
mod parse;

pub use capture::ScoreCapture;
pub use parse::{detect_variant, extract_fields, required_substrings, validate_shape};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::history::SnapshotSource;

/// 分數區塊變體
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreVariant {
    TableShort,
    TableLong,
    Report,
    Unknown,
}

impl fmt::Display for ScoreVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::TableShort => "table_short",
            Self::TableLong => "table_long",
            Self::Report => "report",
            Self::Unknown => "unknown",
        };
        f.write_str(tag)
    }
}

/// 擷取出的欄位
///
/// 找不到的欄位就不存在，不會補零或補 false。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScoreFields(BTreeMap<String, String>);

impl ScoreFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入欄位，已存在時保留先出現的值
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// 欄位中的第一個整數
    pub fn number(&self, key: &str) -> Option<i64> {
        let value = self.get(key)?;
        let start = value.find(|c: char| c.is_ascii_digit())?;
        let negative = value[..start].ends_with('-');
        let digits: String = value[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let n: i64 = digits.parse().ok()?;
        Some(if negative { -n } else { n })
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn level(&self) -> Option<i64> {
        self.number("level")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// 完成的分數快照
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSnapshot {
    /// 原始文字（以換行串接）
    pub text: String,
    /// 變體
    pub variant: ScoreVariant,
    /// 擷取出的欄位
    pub fields: ScoreFields,
    /// Unix 時間（秒）
    pub timestamp: u64,
    /// 來源標記
    pub source: SnapshotSource,
}
