//! 房間快照模組
//!
//! - `capture`: 房間區塊擷取狀態機
//! - `layout`: 標題/描述/出口解析與房間指紋
//! - `movement`: 出入訊息套用
//!
//! `RoomTracker` 把三者和分類器串起來，持有目前房間的分桶。

mod capture;
mod layout;
mod movement;

pub use capture::{Movement, MovementKind, RoomCapture, RoomEvent};
pub use layout::RoomLayout;
pub use movement::apply_movement;

use serde::Serialize;

use crate::config::{ClassifierConfig, RoomConfig};
use crate::entity::{EntityBucketSet, EntityClassifier, KnownPlayerSet, PlayerRoster};
use crate::error::ConfigError;
use crate::history::{current_timestamp, SnapshotSource};
use crate::session::CaptureStatus;

/// 完成的房間快照
#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    /// 原始行
    pub lines: Vec<String>,
    pub title: String,
    pub room_id: Option<u32>,
    pub description: String,
    pub exits: Vec<String>,
    /// SHA256 指紋（hex）
    pub fingerprint: String,
    pub buckets: EntityBucketSet,
    pub timestamp: u64,
    pub source: SnapshotSource,
}

/// 房間追蹤的輸出
#[derive(Debug, Clone)]
pub enum RoomUpdate {
    /// 新的房間快照（分桶整份替換）
    Snapshot(RoomSnapshot),
    /// 出入訊息改變了目前的分桶
    BucketsChanged,
}

/// 房間追蹤器
#[derive(Debug)]
pub struct RoomTracker {
    capture: RoomCapture,
    classifier: EntityClassifier,
    buckets: EntityBucketSet,
    source: SnapshotSource,
}

impl RoomTracker {
    pub fn new(
        room: &RoomConfig,
        classifier: &ClassifierConfig,
        source: SnapshotSource,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            capture: RoomCapture::new(room)?,
            classifier: EntityClassifier::new(classifier)?,
            buckets: EntityBucketSet::new(),
            source,
        })
    }

    /// 目前房間的分桶
    pub fn buckets(&self) -> &EntityBucketSet {
        &self.buckets
    }

    pub fn buckets_mut(&mut self) -> &mut EntityBucketSet {
        &mut self.buckets
    }

    pub fn status(&self) -> &CaptureStatus {
        self.capture.status()
    }

    pub fn abort(&mut self) {
        self.capture.abort();
    }

    /// 回到 IDLE 並清空分桶
    pub fn reset(&mut self) {
        self.capture.reset();
        self.buckets = EntityBucketSet::new();
    }

    pub fn flush(&mut self) {
        self.capture.flush();
    }

    /// 餵入一行
    ///
    /// 名單只在需要分類時才向 `roster` 取得。
    pub fn feed_line(&mut self, raw: &str, roster: Option<&dyn PlayerRoster>) -> Option<RoomUpdate> {
        match self.capture.feed_line(raw)? {
            RoomEvent::Completed(lines) => {
                let players = roster.map(|r| r.current_players());
                Some(RoomUpdate::Snapshot(self.ingest(lines, players.as_ref())))
            }
            RoomEvent::Movement(movement) => {
                apply_movement(&mut self.buckets, &movement).then_some(RoomUpdate::BucketsChanged)
            }
        }
    }

    /// 把完成的區塊轉成快照，並替換目前的分桶
    pub fn ingest(&mut self, lines: Vec<String>, players: Option<&KnownPlayerSet>) -> RoomSnapshot {
        let layout = RoomLayout::parse(&lines);
        let buckets = self.classifier.classify(&lines, players);
        self.buckets = buckets.clone();

        RoomSnapshot {
            fingerprint: layout.fingerprint(),
            title: layout.title,
            room_id: layout.room_id,
            description: layout.description,
            exits: layout.exits,
            lines,
            buckets,
            timestamp: current_timestamp(),
            source: self.source,
        }
    }
}
