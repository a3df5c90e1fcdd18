//! 快照輸出端
//!
//! 擷取核心不做任何 I/O，完成的快照交給 `SnapshotSink`。

use serde::Serialize;
use std::cell::{Ref, RefCell};
use std::io::Write;
use std::rc::Rc;

use crate::entity::EntityBucketSet;
use crate::error::SinkError;
use crate::room::RoomSnapshot;
use crate::score::ScoreSnapshot;

/// 快照輸出端
pub trait SnapshotSink {
    fn on_score(&mut self, snapshot: &ScoreSnapshot) -> Result<(), SinkError>;
    fn on_room(&mut self, snapshot: &RoomSnapshot) -> Result<(), SinkError>;
    /// 分桶在沒有新房間快照的情況下改變（出入、重新分類）
    fn on_entities(&mut self, buckets: &EntityBucketSet) -> Result<(), SinkError>;
}

/// JSON Lines 輸出時的一筆紀錄
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkRecord<'a> {
    Score(&'a ScoreSnapshot),
    Room(&'a RoomSnapshot),
    Entities(&'a EntityBucketSet),
}

/// 每筆快照一行 JSON
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &SinkRecord<'_>) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> SnapshotSink for JsonLinesSink<W> {
    fn on_score(&mut self, snapshot: &ScoreSnapshot) -> Result<(), SinkError> {
        self.write_record(&SinkRecord::Score(snapshot))
    }

    fn on_room(&mut self, snapshot: &RoomSnapshot) -> Result<(), SinkError> {
        self.write_record(&SinkRecord::Room(snapshot))
    }

    fn on_entities(&mut self, buckets: &EntityBucketSet) -> Result<(), SinkError> {
        self.write_record(&SinkRecord::Entities(buckets))
    }
}

/// 記憶體內收到的快照
#[derive(Debug, Clone, Default)]
pub struct Received {
    pub scores: Vec<ScoreSnapshot>,
    pub rooms: Vec<RoomSnapshot>,
    pub entities: Vec<EntityBucketSet>,
}

/// 收在記憶體裡的輸出端，Clone 出來的 handle 共用同一份紀錄
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    received: Rc<RefCell<Received>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Ref<'_, Received> {
        self.received.borrow()
    }
}

impl SnapshotSink for MemorySink {
    fn on_score(&mut self, snapshot: &ScoreSnapshot) -> Result<(), SinkError> {
        self.received.borrow_mut().scores.push(snapshot.clone());
        Ok(())
    }

    fn on_room(&mut self, snapshot: &RoomSnapshot) -> Result<(), SinkError> {
        self.received.borrow_mut().rooms.push(snapshot.clone());
        Ok(())
    }

    fn on_entities(&mut self, buckets: &EntityBucketSet) -> Result<(), SinkError> {
        self.received.borrow_mut().entities.push(buckets.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Bucket;

    #[test]
    fn test_json_lines_entities() {
        let mut buckets = EntityBucketSet::new();
        buckets.insert(Bucket::Mobs, "A goblin");

        let mut sink = JsonLinesSink::new(Vec::new());
        sink.on_entities(&buckets).unwrap();
        sink.on_entities(&EntityBucketSet::new()).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["kind"], "entities");
        assert_eq!(value["mobs"][0], "A goblin");
    }

    #[test]
    fn test_memory_sink_shared_handle() {
        let sink = MemorySink::new();
        let mut boxed: Box<dyn SnapshotSink> = Box::new(sink.clone());
        boxed.on_entities(&EntityBucketSet::new()).unwrap();
        assert_eq!(sink.received().entities.len(), 1);
    }
}
