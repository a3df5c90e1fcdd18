//! 分數區塊擷取狀態機
//!
//! `IDLE -> CAPTURING(table|report) -> DONE`，任何擷取中狀態都可能 `ABORTED`。
//! 表格在第二條邊框結束；報告沒有固定結尾，看到結尾狀態句後，
//! 下一個不屬於報告詞彙也不是雜訊的行就結束區塊。

use tracing::{debug, info, warn};

use super::parse::{detect_variant, extract_fields, validate_shape};
use super::ScoreSnapshot;
use crate::config::ScoreConfig;
use crate::error::{CaptureError, ConfigError};
use crate::history::{current_timestamp, SnapshotSource};
use crate::normalize::normalize_line;
use crate::prompt::PromptMatcher;
use crate::session::{AbortReason, CaptureMode, CaptureSession, CaptureStatus};
use crate::shapes;

/// 分數區塊擷取器
#[derive(Debug)]
pub struct ScoreCapture {
    max_lines: usize,
    max_bytes: usize,
    prompt: PromptMatcher,
    /// 報告詞彙（小寫）
    vocabulary: Vec<String>,
    source: SnapshotSource,
    session: Option<CaptureSession>,
    status: CaptureStatus,
    /// 開始後第一次呼叫若與起始行相同就略過（掛鉤可能在起始行的回呼中才安裝）
    reentry_guard: Option<String>,
}

impl ScoreCapture {
    /// 依設定建立擷取器
    pub fn new(config: &ScoreConfig, source: SnapshotSource) -> Result<Self, ConfigError> {
        Ok(Self {
            max_lines: config.max_lines,
            max_bytes: config.max_bytes,
            prompt: PromptMatcher::new(config.prompt_pattern.as_deref())?,
            vocabulary: config
                .report_vocabulary
                .iter()
                .map(|v| v.to_lowercase())
                .collect(),
            source,
            session: None,
            status: CaptureStatus::Idle,
            reentry_guard: None,
        })
    }

    /// 目前狀態
    pub fn status(&self) -> &CaptureStatus {
        &self.status
    }

    /// 是否正在擷取
    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    /// 進行中的 Session
    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// 回到 IDLE，丟棄一切
    pub fn reset(&mut self) {
        self.session = None;
        self.reentry_guard = None;
        self.status = CaptureStatus::Idle;
    }

    /// 外部明確中止
    pub fn abort(&mut self) {
        if let Some(session) = self.session.take() {
            self.abort_session(session, AbortReason::Explicit);
        }
    }

    /// 餵入一行原始輸出
    ///
    /// 完成時返回快照；形狀驗證失敗時返回錯誤（區塊已丟棄，狀態機已回到 IDLE）。
    pub fn feed_line(&mut self, raw: &str) -> Result<Option<ScoreSnapshot>, CaptureError> {
        let clean = normalize_line(raw);

        let Some(mut session) = self.session.take() else {
            self.try_start(raw, &clean);
            return Ok(None);
        };

        if let Some(start_line) = self.reentry_guard.take() {
            if start_line == raw {
                debug!("略過重入的起始行");
                self.session = Some(session);
                return Ok(None);
            }
        }

        if let Some(reason) = session.count(raw, self.max_lines, self.max_bytes) {
            self.abort_session(session, reason);
            return Ok(None);
        }

        // 雜訊不進緩衝區，也不結束擷取
        if self.prompt.is_noise(&clean) {
            self.session = Some(session);
            return Ok(None);
        }

        match session.mode {
            CaptureMode::Table => self.step_table(session, raw, &clean),
            _ => self.step_report(session, raw, &clean),
        }
    }

    /// 串流結束：已看到結尾狀態句的報告直接完成，其餘中止
    pub fn flush(&mut self) -> Result<Option<ScoreSnapshot>, CaptureError> {
        self.reentry_guard = None;
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        if session.mode == CaptureMode::Report && session.terminal_state_seen {
            self.finalize(session).map(Some)
        } else {
            self.abort_session(session, AbortReason::EndOfStream);
            Ok(None)
        }
    }

    fn step_table(
        &mut self,
        mut session: CaptureSession,
        raw: &str,
        clean: &str,
    ) -> Result<Option<ScoreSnapshot>, CaptureError> {
        session.buffer.push(raw.to_string());
        if shapes::is_border_line(clean) {
            session.border_count += 1;
            if session.border_count >= 2 {
                return self.finalize(session).map(Some);
            }
        }
        self.session = Some(session);
        Ok(None)
    }

    fn step_report(
        &mut self,
        mut session: CaptureSession,
        raw: &str,
        clean: &str,
    ) -> Result<Option<ScoreSnapshot>, CaptureError> {
        // 連續兩份報告：結束目前的，從新開頭重新擷取，不合併
        if shapes::is_report_header(clean) {
            debug!("報告中出現新的開頭，切分區塊");
            let outcome = self.finalize(session);
            self.begin(CaptureMode::Report, raw);
            return outcome.map(Some);
        }

        let ends = shapes::is_border_line(clean)
            || (session.terminal_state_seen && !self.is_vocabulary(clean));
        if ends {
            let outcome = self.finalize(session);
            // 結束行本身可能是下一個區塊的開頭
            self.try_start(raw, clean);
            return outcome.map(Some);
        }

        if shapes::terminal_state(clean).is_some() {
            session.terminal_state_seen = true;
        }
        session.buffer.push(raw.to_string());
        self.session = Some(session);
        Ok(None)
    }

    fn try_start(&mut self, raw: &str, clean: &str) {
        if shapes::is_border_line(clean) {
            self.begin(CaptureMode::Table, raw);
        } else if shapes::is_report_header(clean) {
            self.begin(CaptureMode::Report, raw);
        }
    }

    fn begin(&mut self, mode: CaptureMode, raw: &str) {
        let mut session = CaptureSession::start(mode, raw);
        if mode == CaptureMode::Table {
            session.border_count = 1;
        }
        debug!("開始擷取分數區塊 ({:?})", mode);
        self.session = Some(session);
        self.status = CaptureStatus::Capturing(mode);
        self.reentry_guard = Some(raw.to_string());
    }

    fn is_vocabulary(&self, clean: &str) -> bool {
        let lower = clean.to_lowercase();
        self.vocabulary.iter().any(|prefix| lower.starts_with(prefix.as_str()))
    }

    fn abort_session(&mut self, session: CaptureSession, reason: AbortReason) {
        warn!(
            "分數區塊擷取中止: {} (已看 {} 行 / {} 位元組)",
            reason, session.lines_seen, session.bytes_seen
        );
        self.reentry_guard = None;
        self.status = CaptureStatus::Aborted(reason);
    }

    fn finalize(&mut self, session: CaptureSession) -> Result<ScoreSnapshot, CaptureError> {
        let mut lines = session.buffer;
        while lines.last().is_some_and(|line| {
            let clean = normalize_line(line);
            clean.is_empty() || self.prompt.is_noise(&clean)
        }) {
            lines.pop();
        }

        let clean: Vec<String> = lines.iter().map(|line| normalize_line(line)).collect();
        let variant = detect_variant(session.mode, &clean);

        if let Err(err) = validate_shape(variant, &clean.join("\n")) {
            warn!("丟棄分數區塊: {}", err);
            self.status = CaptureStatus::Aborted(AbortReason::ShapeRejected);
            return Err(err);
        }

        let fields = extract_fields(variant, &clean);
        info!("分數區塊完成: {} ({} 行, {} 個欄位)", variant, lines.len(), fields.len());
        self.status = CaptureStatus::Done;

        Ok(ScoreSnapshot {
            text: lines.join("\n"),
            variant,
            fields,
            timestamp: current_timestamp(),
            source: self.source,
        })
    }
}
