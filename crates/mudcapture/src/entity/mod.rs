//! 房間實體模組
//!
//! - `buckets`: 四個互斥分桶
//! - `players`: 已知玩家名單與名單來源
//! - `classify`: 規則表分類器
//! - `reclassify`: 名單變化後的重新分類

mod buckets;
mod classify;
mod players;
mod reclassify;

pub use buckets::{Bucket, EntityBucketSet};
pub use classify::{EntityClassifier, Verdict};
pub use players::{KnownPlayerSet, PlayerRoster, SharedRoster};
pub use reclassify::{reclassify, ReclassificationEngine, ReclassifyOutcome};
