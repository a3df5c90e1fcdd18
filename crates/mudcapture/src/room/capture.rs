//! 房間快照擷取狀態機
//!
//! `IDLE -> CAPTURING(room) -> DONE`。區塊從標題開始，到下一個提示字元結束；
//! 結束時若沒看過出口標記就整塊丟棄。出入訊息只在 IDLE 時處理。

use tracing::{debug, info, warn};

use crate::config::RoomConfig;
use crate::error::ConfigError;
use crate::normalize::strip_controls;
use crate::prompt::PromptMatcher;
use crate::session::{AbortReason, CaptureMode, CaptureSession, CaptureStatus};
use crate::shapes;

/// 出入種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    Arrival,
    Departure,
}

/// 出入訊息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub name: String,
    pub kind: MovementKind,
}

impl Movement {
    /// 解析 `<Name> arrives/appears out of thin air/leaves`
    pub fn parse(clean: &str) -> Option<Self> {
        let (name, verb) = shapes::movement(clean)?;
        let kind = if verb == "leaves" {
            MovementKind::Departure
        } else {
            MovementKind::Arrival
        };
        Some(Self {
            name: name.to_string(),
            kind,
        })
    }
}

/// 餵入一行後的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// 完成的區塊（原始行）
    Completed(Vec<String>),
    /// 閒置時看到的出入訊息
    Movement(Movement),
}

/// 房間快照擷取器
#[derive(Debug)]
pub struct RoomCapture {
    max_lines: usize,
    prompt: PromptMatcher,
    session: Option<CaptureSession>,
    status: CaptureStatus,
}

impl RoomCapture {
    pub fn new(config: &RoomConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            max_lines: config.max_snapshot_lines,
            prompt: PromptMatcher::new(config.prompt_pattern.as_deref())?,
            session: None,
            status: CaptureStatus::Idle,
        })
    }

    pub fn status(&self) -> &CaptureStatus {
        &self.status
    }

    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    pub fn reset(&mut self) {
        self.session = None;
        self.status = CaptureStatus::Idle;
    }

    pub fn abort(&mut self) {
        if let Some(session) = self.session.take() {
            self.abort_session(session, AbortReason::Explicit);
        }
    }

    /// 串流結束，未完成的區塊一律丟棄
    pub fn flush(&mut self) {
        if let Some(session) = self.session.take() {
            self.abort_session(session, AbortReason::EndOfStream);
        }
    }

    /// 餵入一行原始輸出
    pub fn feed_line(&mut self, raw: &str) -> Option<RoomEvent> {
        let stripped = strip_controls(raw);
        let clean = stripped.trim();

        let Some(mut session) = self.session.take() else {
            if self.is_header(&stripped, clean) {
                self.begin(raw, clean);
                return None;
            }
            return Movement::parse(clean).map(RoomEvent::Movement);
        };

        session.lines_seen += 1;
        session.bytes_seen += raw.len();

        if self.prompt.is_noise(clean) {
            if session.has_exits {
                info!("房間快照完成: {} 行", session.buffer.len());
                self.status = CaptureStatus::Done;
                return Some(RoomEvent::Completed(session.buffer));
            }
            self.abort_session(session, AbortReason::MissingExits);
            return None;
        }

        if self.is_header(&stripped, clean) {
            if raw == session.start_line {
                debug!("略過重複的房間標題");
                self.session = Some(session);
                return None;
            }
            self.abort_session(session, AbortReason::Restarted);
            self.begin(raw, clean);
            return None;
        }

        if session.buffer.len() + 1 > self.max_lines {
            self.abort_session(session, AbortReason::LineLimit(self.max_lines));
            return None;
        }

        if shapes::is_exits_line(clean) {
            session.has_exits = true;
        }
        session.buffer.push(raw.to_string());
        self.session = Some(session);
        None
    }

    fn is_header(&self, stripped: &str, clean: &str) -> bool {
        shapes::is_strong_room_marker(clean) || shapes::is_room_title(stripped)
    }

    fn begin(&mut self, raw: &str, clean: &str) {
        let mut session = CaptureSession::start(CaptureMode::RoomSnapshot, raw);
        session.has_exits = shapes::is_exits_line(clean) || shapes::has_inline_exits(clean);
        debug!("開始擷取房間快照: {}", clean);
        self.session = Some(session);
        self.status = CaptureStatus::Capturing(CaptureMode::RoomSnapshot);
    }

    fn abort_session(&mut self, session: CaptureSession, reason: AbortReason) {
        match reason {
            // 大部分是誤判的標題，不值得警告
            AbortReason::MissingExits | AbortReason::Restarted => debug!(
                "丟棄房間區塊: {} (起始行 {:?})",
                reason, session.start_line
            ),
            _ => warn!(
                "房間快照擷取中止: {} (已看 {} 行)",
                reason, session.lines_seen
            ),
        }
        self.status = CaptureStatus::Aborted(reason);
    }
}
