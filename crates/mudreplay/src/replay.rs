//! 紀錄檔重播

use anyhow::{Context, Result};
use mudcapture::{decode_transcript, CaptureError, LineEncoding, MudTracker, TrackerEvent};
use std::fs;
use std::path::Path;
use tracing::warn;

/// 重播統計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub lines: usize,
    pub scores: usize,
    pub rooms: usize,
    pub entity_updates: usize,
    /// 被丟棄的分數區塊（形狀不符）
    pub rejected: usize,
}

impl ReplaySummary {
    fn record(&mut self, events: &[TrackerEvent]) {
        for event in events {
            match event {
                TrackerEvent::ScoreCaptured(_) => self.scores += 1,
                TrackerEvent::RoomCaptured(_) => self.rooms += 1,
                TrackerEvent::BucketsChanged => self.entity_updates += 1,
            }
        }
    }
}

/// 逐行餵入並在結尾 flush
///
/// 形狀不符只計數繼續；輸出端失敗則中斷重播。
pub fn replay_lines<I, S>(tracker: &mut MudTracker, lines: I) -> Result<ReplaySummary>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut summary = ReplaySummary::default();
    for line in lines {
        summary.lines += 1;
        match tracker.feed_line(line.as_ref()) {
            Ok(events) => summary.record(&events),
            Err(CaptureError::ShapeMismatch { variant, missing }) => {
                warn!("第 {} 行: {} 區塊缺少 {:?}", summary.lines, variant, missing);
                summary.rejected += 1;
            }
            Err(err) => return Err(err).context(format!("第 {} 行", summary.lines)),
        }
    }
    match tracker.flush() {
        Ok(events) => summary.record(&events),
        Err(CaptureError::ShapeMismatch { .. }) => summary.rejected += 1,
        Err(err) => return Err(err).context("串流結束"),
    }
    Ok(summary)
}

/// 讀取並重播紀錄檔
pub fn replay_file(
    tracker: &mut MudTracker,
    path: &Path,
    encoding: LineEncoding,
) -> Result<ReplaySummary> {
    let bytes = fs::read(path).with_context(|| format!("無法讀取紀錄檔 {}", path.display()))?;
    replay_lines(tracker, decode_transcript(&bytes, encoding))
}
