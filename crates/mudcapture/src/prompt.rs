//! 提示字元（雜訊）判斷
//!
//! 提示行可能因網路延遲夾在區塊中間出現，兩個擷取家族都用它分辨雜訊。
//! 判斷順序：自訂樣式、狀態列形狀、結尾的 `>`。

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ConfigError;
use crate::matcher::{LinePattern, LineRule};

/// 狀態列最長長度
const MAX_STAT_BAR_LEN: usize = 120;
/// 以 `>` 結尾的提示最長長度
const MAX_TRAILING_PROMPT_LEN: usize = 80;
/// 狀態列去除數值欄位後允許殘留的字母數
const MAX_STAT_BAR_LEFTOVER: usize = 4;

lazy_static! {
    static ref STAT_TOKEN: Regex = Regex::new(
        r"(?i)\b(?:hp|mp|sp|mv|ep|mana|moves?)\s*[:=]?\s*\d+(?:/\d+)?\b|\b\d+(?:/\d+)?\s*(?:hp|mp|sp|mv|ep|h|m|v)\b"
    )
    .unwrap();
}

/// 提示字元判斷器
#[derive(Debug, Clone)]
pub struct PromptMatcher {
    custom: Option<LineRule>,
    trailing: LineRule,
}

impl PromptMatcher {
    /// 建立判斷器，`pattern` 為選用的自訂正則
    pub fn new(pattern: Option<&str>) -> Result<Self, ConfigError> {
        let custom = pattern
            .map(|p| LineRule::new(LinePattern::Regex(p.to_string())))
            .transpose()?;
        Ok(Self {
            custom,
            trailing: LineRule::ends_with(">"),
        })
    }

    /// 判斷一行（已正規化）是否為提示雜訊
    pub fn is_noise(&self, clean: &str) -> bool {
        if clean.is_empty() {
            return false;
        }
        if self.custom.as_ref().is_some_and(|rule| rule.is_match(clean)) {
            return true;
        }
        is_stat_bar(clean) || (clean.len() <= MAX_TRAILING_PROMPT_LEN && self.trailing.is_match(clean))
    }
}

impl Default for PromptMatcher {
    fn default() -> Self {
        Self {
            custom: None,
            trailing: LineRule::ends_with(">"),
        }
    }
}

/// 狀態列形狀：至少兩個數值欄位，且幾乎沒有其他文字
///
/// 含 `|` 的行屬於表格，以 "You" 開頭的屬於報告句子，兩者都不算。
pub fn is_stat_bar(clean: &str) -> bool {
    if clean.len() > MAX_STAT_BAR_LEN || clean.contains('|') || clean.starts_with("You") {
        return false;
    }
    if STAT_TOKEN.find_iter(clean).count() < 2 {
        return false;
    }
    let leftover = STAT_TOKEN.replace_all(clean, "");
    leftover.chars().filter(|c| c.is_alphabetic()).count() <= MAX_STAT_BAR_LEFTOVER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_bar_shapes() {
        assert!(is_stat_bar("<120hp 40m 80mv>"));
        assert!(is_stat_bar("HP:120/150 SP:40/40 MV:80/80"));
        assert!(is_stat_bar("[ 95h 110v ]"));
    }

    #[test]
    fn test_stat_bar_rejects_prose_and_tables() {
        assert!(!is_stat_bar("You have 120/150 hit points, 80/80 mana and 90/90 moves."));
        assert!(!is_stat_bar("| Hp: 120/150 | Mana: 80/80 |"));
        assert!(!is_stat_bar("The goblin hits you for 12hp and you lose 3mv of stamina."));
    }

    #[test]
    fn test_trailing_prompt() {
        let matcher = PromptMatcher::default();
        assert!(matcher.is_noise(">"));
        assert!(matcher.is_noise("[Vzae] >"));
        assert!(!matcher.is_noise("A goblin is here."));
        assert!(!matcher.is_noise(""));
    }

    #[test]
    fn test_custom_pattern() {
        let matcher = PromptMatcher::new(Some(r"^\(\d+\)$")).unwrap();
        assert!(matcher.is_noise("(42)"));
        assert!(!matcher.is_noise("(42) foo"));
    }

    #[test]
    fn test_invalid_custom_pattern() {
        assert!(PromptMatcher::new(Some("(")).is_err());
    }
}
