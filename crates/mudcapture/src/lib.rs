//! MUD Capture Library
//!
//! 被動擷取 MUD 輸出中的結構化區塊：
//! - `normalize`: 去除 ANSI/控制序列
//! - `prompt`: 提示字元與狀態列（雜訊）判斷
//! - `score`: 分數區塊擷取（表格/報告）
//! - `room`: 房間快照擷取、版面解析、出入訊息
//! - `entity`: 實體分類與名單變化後的重新分類
//! - `tracker`: 把以上串起來，交給 `SnapshotSink`
//! - `encoding`: 紀錄檔 Big5/UTF-8 解碼
//!
//! 核心本身不做 I/O，也不送出任何指令。

pub mod config;
pub mod encoding;
pub mod entity;
pub mod error;
pub mod history;
pub mod matcher;
pub mod normalize;
pub mod prompt;
pub mod room;
pub mod score;
pub mod session;
pub mod shapes;
pub mod sink;
pub mod tracker;

pub use config::{CaptureConfig, ClassifierConfig, RoomConfig, ScoreConfig};
pub use encoding::{decode_line, decode_transcript, LineEncoding};
pub use entity::{
    Bucket, EntityBucketSet, EntityClassifier, KnownPlayerSet, PlayerRoster,
    ReclassificationEngine, SharedRoster,
};
pub use error::{CaptureError, ConfigError, SinkError};
pub use history::{SnapshotHistory, SnapshotSource};
pub use normalize::{normalize_line, strip_controls};
pub use room::{RoomCapture, RoomSnapshot, RoomTracker};
pub use score::{ScoreCapture, ScoreFields, ScoreSnapshot, ScoreVariant};
pub use session::{AbortReason, CaptureMode, CaptureSession, CaptureStatus};
pub use sink::{JsonLinesSink, MemorySink, SnapshotSink};
pub use tracker::{MudTracker, TrackerEvent};
