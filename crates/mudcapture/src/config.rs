//! 擷取設定模組
//!
//! 每個擷取家族各自一組設定：
//! - `ScoreConfig`: 分數區塊的防護上限、提示字元樣式、報告詞彙
//! - `RoomConfig`: 房間快照的行數上限、提示字元樣式
//! - `ClassifierConfig`: 分類器的忽略規則與詞彙表

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::history::{SnapshotSource, DEFAULT_HISTORY, MAX_HISTORY, MIN_HISTORY};
use crate::matcher::{LinePattern, LineRule, RuleSet};

// ============================================================================
// 分數區塊
// ============================================================================

/// 分數區塊擷取設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// 單一區塊最多行數（含雜訊）
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    /// 單一區塊最多位元組數
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// 自訂提示字元樣式（正則）
    #[serde(default)]
    pub prompt_pattern: Option<String>,
    /// 報告模式視為同一區塊的行首詞彙（不分大小寫）
    #[serde(default = "default_report_vocabulary")]
    pub report_vocabulary: Vec<String>,
}

fn default_max_lines() -> usize {
    250
}
fn default_max_bytes() -> usize {
    25_000
}

fn default_report_vocabulary() -> Vec<String> {
    [
        "You ",
        "Your ",
        "You're ",
        "You've ",
        "This ranks you",
        "Hit points",
        "Experience",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            max_bytes: default_max_bytes(),
            prompt_pattern: None,
            report_vocabulary: default_report_vocabulary(),
        }
    }
}

// ============================================================================
// 房間快照
// ============================================================================

/// 房間快照擷取設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// 單一快照最多行數
    #[serde(default = "default_max_snapshot_lines")]
    pub max_snapshot_lines: usize,
    /// 自訂提示字元樣式（正則）
    #[serde(default)]
    pub prompt_pattern: Option<String>,
}

fn default_max_snapshot_lines() -> usize {
    140
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_snapshot_lines: default_max_snapshot_lines(),
            prompt_pattern: None,
        }
    }
}

// ============================================================================
// 分類器
// ============================================================================

/// 實體分類器設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// 大寫開頭且有姿勢的實體視為玩家
    #[serde(default)]
    pub assume_capitalized_as_player: bool,
    /// 忽略的行（正則）
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// 忽略的行（子字串）
    #[serde(default)]
    pub ignore_substrings: Vec<String>,
    /// "is <posture> here." 的姿勢詞彙
    #[serde(default = "default_postures")]
    pub postures: Vec<String>,
    /// 冠詞開頭時視為物品的名詞
    #[serde(default = "default_item_nouns")]
    pub item_nouns: Vec<String>,
    /// 系統性單行訊息（整行比對，不分大小寫）
    #[serde(default = "default_systemic_lines")]
    pub systemic_lines: Vec<String>,
}

fn default_postures() -> Vec<String> {
    [
        "standing",
        "sitting",
        "resting",
        "sleeping",
        "lying",
        "lying down",
        "kneeling",
        "floating",
        "hovering",
        "meditating",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_item_nouns() -> Vec<String> {
    [
        "sword", "dagger", "axe", "mace", "spear", "bow", "shield", "armor", "helmet", "boots",
        "gloves", "cloak", "ring", "amulet", "necklace", "potion", "scroll", "wand", "staff",
        "key", "bag", "sack", "backpack", "chest", "box", "coin", "coins", "gold", "gem",
        "bread", "waterskin", "torch", "lantern", "bottle", "book",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_systemic_lines() -> Vec<String> {
    [
        "It is pitch black...",
        "You can't see a thing!",
        "You are too tired to look around.",
        "The room is empty.",
        "There is nothing here.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            assume_capitalized_as_player: false,
            ignore_patterns: Vec::new(),
            ignore_substrings: Vec::new(),
            postures: default_postures(),
            item_nouns: default_item_nouns(),
            systemic_lines: default_systemic_lines(),
        }
    }
}

impl ClassifierConfig {
    /// 編譯忽略規則
    pub fn ignore_rules(&self) -> Result<RuleSet, ConfigError> {
        RuleSet::from_lists(&self.ignore_substrings, &self.ignore_patterns)
    }
}

// ============================================================================
// 總設定
// ============================================================================

/// 擷取核心的完整設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub score: ScoreConfig,
    #[serde(default)]
    pub room: RoomConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// 每個家族保留的快照數
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// 快照來源標記
    #[serde(default)]
    pub source: SnapshotSource,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            score: ScoreConfig::default(),
            room: RoomConfig::default(),
            classifier: ClassifierConfig::default(),
            history_limit: default_history_limit(),
            source: SnapshotSource::default(),
        }
    }
}

impl CaptureConfig {
    /// 從 JSON 字串解析並驗證
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 從檔案載入並驗證
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 驗證數值範圍並試編譯所有樣式
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("history_limit", self.history_limit, MIN_HISTORY, MAX_HISTORY)?;
        check_range("score.max_lines", self.score.max_lines, 1, usize::MAX)?;
        check_range("score.max_bytes", self.score.max_bytes, 1, usize::MAX)?;
        check_range(
            "room.max_snapshot_lines",
            self.room.max_snapshot_lines,
            1,
            usize::MAX,
        )?;

        for pattern in [&self.score.prompt_pattern, &self.room.prompt_pattern]
            .into_iter()
            .flatten()
        {
            LineRule::new(LinePattern::Regex(pattern.clone()))?;
        }
        self.classifier.ignore_rules()?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
