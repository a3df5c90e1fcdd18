//! 快照歷史模組
//!
//! 固定容量的環形緩衝區，滿了時丟棄最舊的快照

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// 歷史容量下限
pub const MIN_HISTORY: usize = 1;
/// 歷史容量上限
pub const MAX_HISTORY: usize = 500;
/// 預設容量
pub const DEFAULT_HISTORY: usize = 50;

/// 快照來源標記
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    /// 即時連線
    #[default]
    Live,
    /// 重播紀錄檔
    Replay,
}

/// 快照歷史
#[derive(Debug, Clone)]
pub struct SnapshotHistory<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> SnapshotHistory<T> {
    /// 創建新的歷史緩衝區，容量會被夾在 1..=500
    ///
    /// # Example
    /// ```
    /// use mudcapture::history::SnapshotHistory;
    ///
    /// let history: SnapshotHistory<String> = SnapshotHistory::new(0);
    /// assert_eq!(history.capacity(), 1);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(MIN_HISTORY, MAX_HISTORY);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 添加快照，滿了時移除最舊的
    pub fn push(&mut self, entry: T) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// 由舊到新的迭代器
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// 最新一筆
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for SnapshotHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}

/// 目前 Unix 時間（秒）
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
