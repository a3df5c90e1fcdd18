//! 擷取總管
//!
//! 每一行同時餵給分數與房間兩個家族（兩者互不影響），
//! 完成的快照放進歷史並交給輸出端。協作者缺席或輸出端失敗時，
//! 狀態機的轉移已經完成，錯誤只是回報給呼叫端。

use tracing::{debug, warn};

use crate::config::CaptureConfig;
use crate::entity::{
    EntityBucketSet, PlayerRoster, ReclassificationEngine, ReclassifyOutcome,
};
use crate::error::{CaptureError, ConfigError, SinkError};
use crate::history::SnapshotHistory;
use crate::room::{RoomSnapshot, RoomTracker, RoomUpdate};
use crate::score::{ScoreCapture, ScoreSnapshot, ScoreVariant};
use crate::session::CaptureStatus;
use crate::sink::SnapshotSink;

/// 一行造成的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    ScoreCaptured(ScoreVariant),
    /// 附房間指紋
    RoomCaptured(String),
    BucketsChanged,
}

/// 擷取總管
pub struct MudTracker {
    score: ScoreCapture,
    room: RoomTracker,
    reclassifier: ReclassificationEngine,
    roster: Option<Box<dyn PlayerRoster>>,
    sink: Option<Box<dyn SnapshotSink>>,
    score_history: SnapshotHistory<ScoreSnapshot>,
    room_history: SnapshotHistory<RoomSnapshot>,
}

impl MudTracker {
    /// 依設定建立，設定會先驗證
    pub fn new(config: &CaptureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            score: ScoreCapture::new(&config.score, config.source)?,
            room: RoomTracker::new(&config.room, &config.classifier, config.source)?,
            reclassifier: ReclassificationEngine::new(),
            roster: None,
            sink: None,
            score_history: SnapshotHistory::new(config.history_limit),
            room_history: SnapshotHistory::new(config.history_limit),
        })
    }

    /// 設定玩家名單來源（同時訂閱名單變化）
    pub fn with_roster(mut self, roster: impl PlayerRoster + 'static) -> Self {
        self.set_roster(Box::new(roster));
        self
    }

    /// 設定輸出端
    pub fn with_sink(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.set_sink(Box::new(sink));
        self
    }

    pub fn set_roster(&mut self, roster: Box<dyn PlayerRoster>) {
        self.roster = Some(roster);
        self.reclassifier.subscribe();
    }

    pub fn set_sink(&mut self, sink: Box<dyn SnapshotSink>) {
        self.sink = Some(sink);
    }

    /// 餵入一行原始輸出
    ///
    /// 兩個家族都處理完才回報錯誤；同一行有多個錯誤時只回報第一個。
    pub fn feed_line(&mut self, raw: &str) -> Result<Vec<TrackerEvent>, CaptureError> {
        let mut events = Vec::new();
        let mut first_error: Option<CaptureError> = None;

        match self.score.feed_line(raw) {
            Ok(Some(snapshot)) => {
                events.push(TrackerEvent::ScoreCaptured(snapshot.variant));
                if let Err(err) = self.publish_score(snapshot) {
                    first_error.get_or_insert(err);
                }
            }
            Ok(None) => {}
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }

        if let Some(update) = self.room.feed_line(raw, self.roster.as_deref()) {
            let result = match update {
                RoomUpdate::Snapshot(snapshot) => {
                    events.push(TrackerEvent::RoomCaptured(snapshot.fingerprint.clone()));
                    self.publish_room(snapshot)
                }
                RoomUpdate::BucketsChanged => {
                    events.push(TrackerEvent::BucketsChanged);
                    self.publish_entities()
                }
            };
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(events),
        }
    }

    /// 串流結束
    pub fn flush(&mut self) -> Result<Vec<TrackerEvent>, CaptureError> {
        self.room.flush();
        match self.score.flush()? {
            Some(snapshot) => {
                let variant = snapshot.variant;
                self.publish_score(snapshot)?;
                Ok(vec![TrackerEvent::ScoreCaptured(variant)])
            }
            None => Ok(Vec::new()),
        }
    }

    /// 名單改變，重新分類目前的分桶
    ///
    /// 返回分桶是否改變（沒變時不通知輸出端）。
    pub fn on_roster_changed(&mut self) -> Result<bool, CaptureError> {
        let Some(roster) = self.roster.as_ref() else {
            warn!("名單變化通知，但沒有名單來源");
            return Err(CaptureError::MissingCollaborator("roster"));
        };
        let players = roster.current_players();
        match self.reclassifier.apply(self.room.buckets_mut(), &players) {
            ReclassifyOutcome::Changed { .. } => {
                self.publish_entities()?;
                Ok(true)
            }
            ReclassifyOutcome::Unchanged => Ok(false),
        }
    }

    /// 兩個家族都回到 IDLE，清空分桶與歷史
    pub fn reset(&mut self) {
        self.score.reset();
        self.room.reset();
        self.score_history.clear();
        self.room_history.clear();
    }

    pub fn buckets(&self) -> &EntityBucketSet {
        self.room.buckets()
    }

    pub fn score_status(&self) -> &CaptureStatus {
        self.score.status()
    }

    pub fn room_status(&self) -> &CaptureStatus {
        self.room.status()
    }

    pub fn score_history(&self) -> &SnapshotHistory<ScoreSnapshot> {
        &self.score_history
    }

    pub fn room_history(&self) -> &SnapshotHistory<RoomSnapshot> {
        &self.room_history
    }

    pub fn reclassifier(&self) -> &ReclassificationEngine {
        &self.reclassifier
    }

    fn publish_score(&mut self, snapshot: ScoreSnapshot) -> Result<(), CaptureError> {
        let result = self.deliver(|sink| sink.on_score(&snapshot));
        self.score_history.push(snapshot);
        result
    }

    fn publish_room(&mut self, snapshot: RoomSnapshot) -> Result<(), CaptureError> {
        let result = self.deliver(|sink| sink.on_room(&snapshot));
        self.room_history.push(snapshot);
        result
    }

    fn publish_entities(&mut self) -> Result<(), CaptureError> {
        let buckets = self.room.buckets().clone();
        self.deliver(|sink| sink.on_entities(&buckets))
    }

    fn deliver<F>(&mut self, send: F) -> Result<(), CaptureError>
    where
        F: FnOnce(&mut dyn SnapshotSink) -> Result<(), SinkError>,
    {
        let Some(sink) = self.sink.as_deref_mut() else {
            debug!("沒有輸出端，快照只留在歷史中");
            return Err(CaptureError::MissingCollaborator("sink"));
        };
        send(sink).map_err(|err| {
            warn!("輸出端失敗: {}", err);
            CaptureError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{KnownPlayerSet, SharedRoster};
    use crate::sink::MemorySink;

    const BORDER: &str = "+-=-=-=-=-=-=-+";
    const PROMPT: &str = "<100hp 50m 80mv>";

    fn tracker() -> (MudTracker, MemorySink) {
        let sink = MemorySink::new();
        let tracker = MudTracker::new(&CaptureConfig::default())
            .unwrap()
            .with_sink(sink.clone());
        (tracker, sink)
    }

    #[test]
    fn test_score_reaches_sink_and_history() {
        let (mut tracker, sink) = tracker();
        for line in [BORDER, "| Name: Vzae |", BORDER] {
            tracker.feed_line(line).unwrap();
        }
        assert_eq!(sink.received().scores.len(), 1);
        assert_eq!(tracker.score_history().len(), 1);
        assert_eq!(tracker.score_status(), &CaptureStatus::Done);
    }

    #[test]
    fn test_families_are_independent() {
        let (mut tracker, sink) = tracker();
        let lines = [
            BORDER,
            "Temple Square [3001]",
            "| Name: Vzae |",
            "[Exits: north]",
            BORDER,
            PROMPT,
        ];
        let mut events = Vec::new();
        for line in lines {
            events.extend(tracker.feed_line(line).unwrap());
        }

        assert!(events.contains(&TrackerEvent::ScoreCaptured(ScoreVariant::TableShort)));
        assert!(events
            .iter()
            .any(|e| matches!(e, TrackerEvent::RoomCaptured(_))));
        assert_eq!(sink.received().scores.len(), 1);
        assert_eq!(sink.received().rooms.len(), 1);
    }

    #[test]
    fn test_missing_sink_is_reported_after_transition() {
        let mut tracker = MudTracker::new(&CaptureConfig::default()).unwrap();
        tracker.feed_line(BORDER).unwrap();
        tracker.feed_line("| Name: Vzae |").unwrap();
        let err = tracker.feed_line(BORDER).unwrap_err();

        assert!(matches!(err, CaptureError::MissingCollaborator("sink")));
        assert_eq!(tracker.score_status(), &CaptureStatus::Done);
        assert_eq!(tracker.score_history().len(), 1);
    }

    #[test]
    fn test_missing_roster() {
        let (mut tracker, _) = tracker();
        let err = tracker.on_roster_changed().unwrap_err();
        assert!(matches!(err, CaptureError::MissingCollaborator("roster")));
    }

    #[test]
    fn test_roster_change_reclassifies_once() {
        let roster = SharedRoster::default();
        let (tracker, sink) = tracker();
        let mut tracker = tracker.with_roster(roster.clone());

        for line in [
            "Temple Square [3001]",
            "[Exits: north]",
            "Scynox the adventurer is here.",
            PROMPT,
        ] {
            tracker.feed_line(line).unwrap();
        }
        assert!(tracker.buckets().unknown().contains("Scynox the adventurer"));

        roster.replace(KnownPlayerSet::from_names(["scynox"]));
        assert!(tracker.on_roster_changed().unwrap());
        assert!(tracker.buckets().players().contains("Scynox"));
        assert!(tracker.buckets().unknown().is_empty());
        assert_eq!(sink.received().entities.len(), 1);

        // 名單沒再變，第二次不通知
        assert!(!tracker.on_roster_changed().unwrap());
        assert_eq!(sink.received().entities.len(), 1);
        assert_eq!(tracker.reclassifier().suppressed_count(), 1);
    }

    #[test]
    fn test_flush_finishes_report() {
        let (mut tracker, sink) = tracker();
        tracker.feed_line("You are a 25 year-old elf warrior.").unwrap();
        tracker.feed_line("You are standing.").unwrap();
        let events = tracker.flush().unwrap();
        assert_eq!(events, vec![TrackerEvent::ScoreCaptured(ScoreVariant::Report)]);
        assert_eq!(sink.received().scores.len(), 1);
    }

    #[test]
    fn test_reset() {
        let (mut tracker, _) = tracker();
        for line in [BORDER, "| Name: Vzae |", BORDER, "Bob arrives from the north."] {
            tracker.feed_line(line).unwrap();
        }
        tracker.reset();
        assert!(tracker.score_history().is_empty());
        assert!(tracker.buckets().is_empty());
    }

    struct BrokenSink;

    impl SnapshotSink for BrokenSink {
        fn on_score(&mut self, _: &ScoreSnapshot) -> Result<(), SinkError> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into())
        }

        fn on_room(&mut self, _: &RoomSnapshot) -> Result<(), SinkError> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into())
        }

        fn on_entities(&mut self, _: &EntityBucketSet) -> Result<(), SinkError> {
            Ok(())
        }
    }

    #[test]
    fn test_failing_sink_keeps_history() {
        let mut tracker = MudTracker::new(&CaptureConfig::default())
            .unwrap()
            .with_sink(BrokenSink);
        tracker.feed_line(BORDER).unwrap();
        tracker.feed_line("| Name: Vzae |").unwrap();

        let err = tracker.feed_line(BORDER).unwrap_err();
        assert!(matches!(err, CaptureError::Sink(SinkError::Io(_))));
        assert_eq!(tracker.score_history().len(), 1);
    }
}
