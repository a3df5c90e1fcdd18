//! 擷取 Session 模組
//!
//! 每個擷取家族同時最多只有一個進行中的 `CaptureSession`，
//! 由狀態機自己持有，完成、重啟或防護觸發時銷毀。

use serde::Serialize;
use std::fmt;

/// 擷取模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// 表格式分數
    Table,
    /// 句子式分數報告
    Report,
    /// 房間快照
    RoomSnapshot,
}

/// 中止原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// 超過行數上限
    LineLimit(usize),
    /// 超過位元組上限
    ByteLimit(usize),
    /// 出現新的標題，重新開始
    Restarted,
    /// 出口標記前就遇到結束提示
    MissingExits,
    /// 形狀驗證失敗
    ShapeRejected,
    /// 串流結束時區塊尚未完成
    EndOfStream,
    /// 外部明確中止
    Explicit,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineLimit(limit) => write!(f, "超過行數上限 {}", limit),
            Self::ByteLimit(limit) => write!(f, "超過位元組上限 {}", limit),
            Self::Restarted => write!(f, "出現新的標題，重新擷取"),
            Self::MissingExits => write!(f, "出口標記前遇到結束提示"),
            Self::ShapeRejected => write!(f, "區塊形狀不符"),
            Self::EndOfStream => write!(f, "串流結束時區塊未完成"),
            Self::Explicit => write!(f, "外部中止"),
        }
    }
}

/// 擷取狀態（對外的狀態欄位）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStatus {
    #[default]
    Idle,
    Capturing(CaptureMode),
    Done,
    Aborted(AbortReason),
}

impl CaptureStatus {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

/// 進行中的擷取
#[derive(Debug, Clone)]
pub struct CaptureSession {
    /// 擷取模式
    pub mode: CaptureMode,
    /// 原始行（由舊到新）
    pub buffer: Vec<String>,
    /// 起始行（原始文字）
    pub start_line: String,
    /// 已看過的行數（含雜訊）
    pub lines_seen: usize,
    /// 已看過的位元組數（含雜訊）
    pub bytes_seen: usize,
    /// 邊框行出現次數（表格模式）
    pub border_count: u32,
    /// 已看到結尾狀態句（報告模式）
    pub terminal_state_seen: bool,
    /// 已看到出口標記（房間快照）
    pub has_exits: bool,
}

impl CaptureSession {
    /// 以起始行建立 Session，起始行本身計入緩衝區與計數器
    pub fn start(mode: CaptureMode, raw: &str) -> Self {
        Self {
            mode,
            buffer: vec![raw.to_string()],
            start_line: raw.to_string(),
            lines_seen: 1,
            bytes_seen: raw.len(),
            border_count: 0,
            terminal_state_seen: false,
            has_exits: false,
        }
    }

    /// 計入一行，返回是否超出上限
    pub fn count(&mut self, raw: &str, max_lines: usize, max_bytes: usize) -> Option<AbortReason> {
        self.lines_seen += 1;
        self.bytes_seen += raw.len();
        if self.lines_seen > max_lines {
            Some(AbortReason::LineLimit(max_lines))
        } else if self.bytes_seen > max_bytes {
            Some(AbortReason::ByteLimit(max_bytes))
        } else {
            None
        }
    }

    /// 合併為單一文字
    pub fn text(&self) -> String {
        self.buffer.join("\n")
    }
}
