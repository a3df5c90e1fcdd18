//! 出入訊息套用到目前的分桶

use tracing::debug;

use super::capture::{Movement, MovementKind};
use crate::entity::{Bucket, EntityBucketSet};

/// 套用出入訊息，返回分桶是否改變
///
/// 到達：任一桶已有此名字（不分大小寫）就不動，否則放 unknown，
/// 之後的名單變化會把它搬到 players。
/// 離開：移除名字完全相同（不分大小寫）的 key。
pub fn apply_movement(buckets: &mut EntityBucketSet, movement: &Movement) -> bool {
    match movement.kind {
        MovementKind::Arrival => {
            if buckets.find_ignore_case(&movement.name).is_some() {
                return false;
            }
            debug!("{} 到達", movement.name);
            buckets.insert(Bucket::Unknown, movement.name.as_str())
        }
        MovementKind::Departure => {
            let Some((_, key)) = buckets.find_ignore_case(&movement.name) else {
                return false;
            };
            let key = key.to_string();
            debug!("{} 離開", key);
            buckets.remove(&key).is_some()
        }
    }
}
