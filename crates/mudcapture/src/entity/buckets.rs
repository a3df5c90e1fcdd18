//! 實體分桶
//!
//! 四個互斥的集合：同一個 key 同時最多只會出現在一個桶裡。

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// 分桶種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Players,
    Mobs,
    Items,
    Unknown,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Players, Bucket::Mobs, Bucket::Items, Bucket::Unknown];

    /// 衝突時的優先順序，數字大者勝出
    fn rank(self) -> u8 {
        match self {
            Self::Players => 3,
            Self::Items => 2,
            Self::Mobs => 1,
            Self::Unknown => 0,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Players => "players",
            Self::Mobs => "mobs",
            Self::Items => "items",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// 四個分桶
///
/// 用有序集合，序列化結果與插入順序無關。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityBucketSet {
    players: BTreeSet<String>,
    mobs: BTreeSet<String>,
    items: BTreeSet<String>,
    unknown: BTreeSet<String>,
}

impl EntityBucketSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &BTreeSet<String> {
        &self.players
    }

    pub fn mobs(&self) -> &BTreeSet<String> {
        &self.mobs
    }

    pub fn items(&self) -> &BTreeSet<String> {
        &self.items
    }

    pub fn unknown(&self) -> &BTreeSet<String> {
        &self.unknown
    }

    /// 取得指定的桶
    pub fn bucket(&self, bucket: Bucket) -> &BTreeSet<String> {
        match bucket {
            Bucket::Players => &self.players,
            Bucket::Mobs => &self.mobs,
            Bucket::Items => &self.items,
            Bucket::Unknown => &self.unknown,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut BTreeSet<String> {
        match bucket {
            Bucket::Players => &mut self.players,
            Bucket::Mobs => &mut self.mobs,
            Bucket::Items => &mut self.items,
            Bucket::Unknown => &mut self.unknown,
        }
    }

    /// 查詢 key 所在的桶
    pub fn find(&self, key: &str) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|b| self.bucket(*b).contains(key))
    }

    /// 不分大小寫查詢，返回桶與實際的 key
    pub fn find_ignore_case(&self, key: &str) -> Option<(Bucket, &str)> {
        Bucket::ALL.into_iter().find_map(|b| {
            self.bucket(b)
                .iter()
                .find(|k| k.eq_ignore_ascii_case(key))
                .map(|k| (b, k.as_str()))
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// 放入 key，返回內容是否改變
    ///
    /// key 已在別的桶時，只有優先順序較高的新桶才會搬移它。
    pub fn insert(&mut self, bucket: Bucket, key: impl Into<String>) -> bool {
        let key = key.into();
        match self.find(&key) {
            Some(current) if current == bucket => false,
            Some(current) if current.rank() >= bucket.rank() => false,
            Some(current) => {
                self.bucket_mut(current).remove(&key);
                self.bucket_mut(bucket).insert(key)
            }
            None => self.bucket_mut(bucket).insert(key),
        }
    }

    /// 從所在的桶移除 key
    pub fn remove(&mut self, key: &str) -> Option<Bucket> {
        let bucket = self.find(key)?;
        self.bucket_mut(bucket).remove(key);
        Some(bucket)
    }

    /// 全部 (桶, key)
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &str)> {
        Bucket::ALL
            .into_iter()
            .flat_map(move |b| self.bucket(b).iter().map(move |k| (b, k.as_str())))
    }

    /// key 總數
    pub fn len(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.bucket(*b).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 每個 key 只出現在一個桶
    pub fn is_exclusive(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.iter().all(|(_, key)| seen.insert(key))
    }
}
