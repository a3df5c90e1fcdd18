//! 名單變化後的重新分類
//!
//! 不重新解析房間文字，只把 unknown/mobs/items 中現在符合名單的 key 搬到 players。
//! 結果與舊分桶相同時不發出通知。

use tracing::{debug, info};

use super::buckets::{Bucket, EntityBucketSet};
use super::players::KnownPlayerSet;

/// 重新分類結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclassifyOutcome {
    /// 分桶已更新，需要通知
    Changed { moved: usize },
    /// 與舊分桶相同，通知被抑制
    Unchanged,
}

/// 計算重新分類後的分桶
pub fn reclassify(buckets: &EntityBucketSet, players: &KnownPlayerSet) -> EntityBucketSet {
    let mut next = buckets.clone();
    for (bucket, key) in buckets.iter() {
        if bucket == Bucket::Players {
            continue;
        }
        if let Some(name) = players.match_phrase(key) {
            next.remove(key);
            next.insert(Bucket::Players, name);
        }
    }
    next
}

/// 重新分類引擎
#[derive(Debug, Default)]
pub struct ReclassificationEngine {
    subscribed: bool,
    runs: u64,
    suppressed: u64,
}

impl ReclassificationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 訂閱名單變化，重複呼叫不會重複訂閱
    ///
    /// 返回這次是否為第一次訂閱。
    pub fn subscribe(&mut self) -> bool {
        if self.subscribed {
            return false;
        }
        self.subscribed = true;
        debug!("已訂閱玩家名單變化");
        true
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// 套用重新分類，分桶有變化時才改寫
    pub fn apply(
        &mut self,
        buckets: &mut EntityBucketSet,
        players: &KnownPlayerSet,
    ) -> ReclassifyOutcome {
        self.runs += 1;
        let next = reclassify(buckets, players);
        if next == *buckets {
            self.suppressed += 1;
            debug!("重新分類無變化，略過通知");
            return ReclassifyOutcome::Unchanged;
        }

        let moved = next.players().difference(buckets.players()).count();
        info!("重新分類: {} 個實體移到 players", moved);
        *buckets = next;
        ReclassifyOutcome::Changed { moved }
    }

    /// 已執行次數
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// 被抑制的通知次數
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buckets_with(entries: &[(Bucket, &str)]) -> EntityBucketSet {
        let mut set = EntityBucketSet::new();
        for (bucket, key) in entries {
            set.insert(*bucket, *key);
        }
        set
    }

    #[test]
    fn test_unknown_moves_to_players() {
        let mut buckets = buckets_with(&[(Bucket::Unknown, "Scynox the adventurer")]);
        let players = KnownPlayerSet::from_names(["scynox"]);
        let mut engine = ReclassificationEngine::new();

        let outcome = engine.apply(&mut buckets, &players);

        assert_eq!(outcome, ReclassifyOutcome::Changed { moved: 1 });
        assert!(buckets.players().contains("Scynox"));
        assert!(buckets.unknown().is_empty());
        assert!(buckets.is_exclusive());
    }

    #[test]
    fn test_mobs_and_items_also_checked() {
        let buckets = buckets_with(&[(Bucket::Mobs, "Grimm"), (Bucket::Items, "Ada's lantern")]);
        let next = reclassify(&buckets, &KnownPlayerSet::from_names(["grimm"]));
        assert!(next.players().contains("Grimm"));
        assert!(next.items().contains("Ada's lantern"));
    }

    #[test]
    fn test_unchanged_is_suppressed() {
        let mut buckets = buckets_with(&[(Bucket::Mobs, "A goblin")]);
        let players = KnownPlayerSet::from_names(["scynox"]);
        let mut engine = ReclassificationEngine::new();

        assert_eq!(engine.apply(&mut buckets, &players), ReclassifyOutcome::Unchanged);
        assert_eq!(engine.suppressed_count(), 1);
        assert_eq!(engine.runs(), 1);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let mut buckets = buckets_with(&[(Bucket::Unknown, "Scynox")]);
        let players = KnownPlayerSet::from_names(["scynox"]);
        let mut engine = ReclassificationEngine::new();

        engine.apply(&mut buckets, &players);
        let after_first = buckets.clone();
        assert_eq!(engine.apply(&mut buckets, &players), ReclassifyOutcome::Unchanged);
        assert_eq!(buckets, after_first);
    }

    #[test]
    fn test_subscribe_idempotent() {
        let mut engine = ReclassificationEngine::new();
        assert!(!engine.is_subscribed());
        assert!(engine.subscribe());
        assert!(!engine.subscribe());
        assert!(engine.is_subscribed());
    }

    #[test]
    fn test_word_boundary_respected() {
        let buckets = buckets_with(&[(Bucket::Unknown, "Xiantha")]);
        let next = reclassify(&buckets, &KnownPlayerSet::from_names(["xia"]));
        assert_eq!(next, buckets);
    }
}
