//! 錯誤型別
//!
//! 分類不明與防護觸發都不是錯誤；只有形狀驗證失敗、
//! 協作者缺席、輸出端失敗與設定錯誤會回報給呼叫端。

use std::io;
use thiserror::Error;

use crate::score::ScoreVariant;

/// 擷取流程錯誤（在 finalize 邊界回報）
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("分數區塊形狀不符 ({variant}): 缺少 {missing:?}")]
    ShapeMismatch {
        variant: ScoreVariant,
        missing: Vec<String>,
    },

    #[error("協作者不存在: {0}")]
    MissingCollaborator(&'static str),

    #[error("輸出端錯誤: {0}")]
    Sink(#[from] SinkError),
}

/// 快照輸出端錯誤
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO 錯誤: {0}")]
    Io(#[from] io::Error),

    #[error("序列化失敗: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 設定錯誤
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO 錯誤: {0}")]
    Io(#[from] io::Error),

    #[error("設定檔格式錯誤: {0}")]
    Json(#[from] serde_json::Error),

    #[error("無效的樣式 {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{field} 超出範圍: {value}（允許 {min}..={max}）")]
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
}
