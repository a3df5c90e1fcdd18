//! 實體分類器
//!
//! 房間區塊的每一行依序套用規則表，第一條給出結論的規則決定結果：
//!
//! 1. `ignore`: 使用者設定的忽略規則
//! 2. `indent`: 有縮排但不是存在句（描述文字換行）
//! 3. `non_entity`: 標題、出口、空行、系統訊息
//! 4. `posture`: `<X> is <姿勢> here.`
//! 5. `here`: `<X> is here.`
//! 6. `fallback`: 其餘行
//!
//! 分類只會偏向 unknown，不會猜測成 players。

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, trace};

use super::buckets::{Bucket, EntityBucketSet};
use super::players::KnownPlayerSet;
use crate::config::ClassifierConfig;
use crate::error::ConfigError;
use crate::matcher::RuleSet;
use crate::normalize::strip_controls;
use crate::shapes;

lazy_static! {
    static ref IS_HERE: Regex = Regex::new(r"(?i)^(.+?)\s+is\s+here\.?$").unwrap();
}

/// 單行分類結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// 不是實體
    Drop,
    /// 放入指定的桶
    Place(Bucket, String),
}

/// 規則看到的行
struct LineView<'a> {
    /// 去除控制序列、保留縮排
    stripped: &'a str,
    /// 再 trim 過
    clean: &'a str,
    indented: bool,
}

type Rule = fn(&EntityClassifier, &LineView<'_>, Option<&KnownPlayerSet>) -> Option<Verdict>;

const RULES: &[(&str, Rule)] = &[
    ("ignore", rule_ignore as Rule),
    ("indent", rule_indent as Rule),
    ("non_entity", rule_non_entity as Rule),
    ("posture", rule_posture as Rule),
    ("here", rule_here as Rule),
    ("fallback", rule_fallback as Rule),
];

/// 實體分類器
#[derive(Debug, Clone)]
pub struct EntityClassifier {
    ignore: RuleSet,
    assume_capitalized_as_player: bool,
    /// 由姿勢詞彙組成的存在句
    posture_here: Option<Regex>,
    item_nouns: HashSet<String>,
    /// 小寫
    systemic_lines: HashSet<String>,
}

impl EntityClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            ignore: config.ignore_rules()?,
            assume_capitalized_as_player: config.assume_capitalized_as_player,
            posture_here: build_posture_regex(&config.postures)?,
            item_nouns: config.item_nouns.iter().map(|n| n.to_lowercase()).collect(),
            systemic_lines: config
                .systemic_lines
                .iter()
                .map(|l| l.trim().to_lowercase())
                .collect(),
        })
    }

    /// 分類整個區塊
    ///
    /// 純函式：相同的輸入與名單永遠得到相同的分桶。
    pub fn classify(&self, lines: &[String], players: Option<&KnownPlayerSet>) -> EntityBucketSet {
        let mut buckets = EntityBucketSet::new();
        for line in lines {
            if let Verdict::Place(bucket, key) = self.classify_line(line, players) {
                buckets.insert(bucket, key);
            }
        }
        debug!(
            "分類完成: {} 行 -> players {} / mobs {} / items {} / unknown {}",
            lines.len(),
            buckets.players().len(),
            buckets.mobs().len(),
            buckets.items().len(),
            buckets.unknown().len()
        );
        buckets
    }

    /// 分類單行
    pub fn classify_line(&self, raw: &str, players: Option<&KnownPlayerSet>) -> Verdict {
        let stripped = strip_controls(raw);
        let clean = stripped.trim();
        let view = LineView {
            stripped: &stripped,
            clean,
            indented: stripped.starts_with(char::is_whitespace),
        };

        for (name, rule) in RULES {
            if let Some(verdict) = rule(self, &view, players) {
                trace!("規則 {} 判定 {:?}: {:?}", name, clean, verdict);
                return verdict;
            }
        }
        Verdict::Drop
    }

    fn posture_phrase<'a>(&self, clean: &'a str) -> Option<&'a str> {
        let caps = self.posture_here.as_ref()?.captures(clean)?;
        Some(caps.get(1)?.as_str().trim())
    }

    fn is_presence(&self, clean: &str) -> bool {
        self.posture_phrase(clean).is_some() || IS_HERE.is_match(clean)
    }

    fn has_item_noun(&self, phrase: &str) -> bool {
        phrase
            .split_whitespace()
            .map(|word| {
                word.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .any(|word| {
                self.item_nouns.contains(&word)
                    || word
                        .strip_suffix('s')
                        .is_some_and(|singular| self.item_nouns.contains(singular))
            })
    }

    /// 有名單時依名單判斷是否為玩家，返回正規化的名字
    fn player_name<'a>(
        &self,
        phrase: &'a str,
        players: Option<&KnownPlayerSet>,
    ) -> Option<&'a str> {
        players.and_then(|set| set.match_phrase(phrase))
    }
}

fn build_posture_regex(postures: &[String]) -> Result<Option<Regex>, ConfigError> {
    let mut words: Vec<&str> = postures
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if words.is_empty() {
        return Ok(None);
    }
    // 長的先比，"lying down" 才不會被 "lying" 吃掉
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    let pattern = format!(r"(?i)^(.+?)\s+is\s+(?:{})\s+here\.?$", alternatives.join("|"));
    Regex::new(&pattern)
        .map(Some)
        .map_err(|source| ConfigError::InvalidPattern { pattern, source })
}

fn starts_with_article(phrase: &str) -> bool {
    let lower = phrase.to_ascii_lowercase();
    ["a ", "an ", "the ", "some "]
        .iter()
        .any(|article| lower.starts_with(article))
}

fn rule_ignore(
    classifier: &EntityClassifier,
    view: &LineView<'_>,
    _: Option<&KnownPlayerSet>,
) -> Option<Verdict> {
    classifier.ignore.any_match(view.clean).then_some(Verdict::Drop)
}

fn rule_indent(
    classifier: &EntityClassifier,
    view: &LineView<'_>,
    _: Option<&KnownPlayerSet>,
) -> Option<Verdict> {
    (view.indented && !classifier.is_presence(view.clean)).then_some(Verdict::Drop)
}

fn rule_non_entity(
    classifier: &EntityClassifier,
    view: &LineView<'_>,
    _: Option<&KnownPlayerSet>,
) -> Option<Verdict> {
    let clean = view.clean;
    let dropped = clean.is_empty()
        || clean.eq_ignore_ascii_case("you see nothing special.")
        || shapes::is_exits_line(clean)
        || shapes::is_exit_row(clean)
        || shapes::is_border_line(clean)
        || shapes::is_strong_room_marker(clean)
        || shapes::is_room_title(view.stripped)
        || classifier.systemic_lines.contains(&clean.to_lowercase());
    dropped.then_some(Verdict::Drop)
}

fn rule_posture(
    classifier: &EntityClassifier,
    view: &LineView<'_>,
    players: Option<&KnownPlayerSet>,
) -> Option<Verdict> {
    let phrase = classifier.posture_phrase(view.clean)?;
    if let Some(name) = classifier.player_name(phrase, players) {
        return Some(Verdict::Place(Bucket::Players, name.to_string()));
    }
    let capitalized = phrase.starts_with(char::is_uppercase) && !starts_with_article(phrase);
    if classifier.assume_capitalized_as_player && capitalized {
        return Some(Verdict::Place(Bucket::Players, phrase.to_string()));
    }
    Some(Verdict::Place(Bucket::Unknown, phrase.to_string()))
}

fn rule_here(
    classifier: &EntityClassifier,
    view: &LineView<'_>,
    players: Option<&KnownPlayerSet>,
) -> Option<Verdict> {
    let caps = IS_HERE.captures(view.clean)?;
    let phrase = caps.get(1)?.as_str().trim();
    if let Some(name) = classifier.player_name(phrase, players) {
        return Some(Verdict::Place(Bucket::Players, name.to_string()));
    }
    let bucket = if phrase.to_lowercase().contains("corpse") {
        Bucket::Items
    } else if starts_with_article(phrase) {
        if classifier.has_item_noun(phrase) {
            Bucket::Items
        } else {
            Bucket::Mobs
        }
    } else {
        Bucket::Unknown
    };
    Some(Verdict::Place(bucket, phrase.to_string()))
}

fn rule_fallback(
    _: &EntityClassifier,
    view: &LineView<'_>,
    _: Option<&KnownPlayerSet>,
) -> Option<Verdict> {
    let bucket = if view.clean.to_lowercase().contains("corpse") {
        Bucket::Items
    } else {
        Bucket::Unknown
    };
    Some(Verdict::Place(bucket, view.clean.to_string()))
}
