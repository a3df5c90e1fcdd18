//! 行匹配規則模組
//!
//! 忽略規則與提示字元樣式共用的編譯後匹配器

use regex::Regex;

use crate::error::ConfigError;

/// 行匹配模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePattern {
    /// 純文字匹配（包含）
    Contains(String),
    /// 純文字匹配（開頭）
    StartsWith(String),
    /// 純文字匹配（結尾）
    EndsWith(String),
    /// 正則表達式
    Regex(String),
}

/// 編譯後的匹配規則
#[derive(Debug, Clone)]
pub struct LineRule {
    /// 匹配模式
    pub pattern: LinePattern,
    /// 編譯後的正則（僅 Regex 模式）
    compiled_regex: Option<Regex>,
}

impl LineRule {
    /// 編譯匹配規則，正則無效時回報設定錯誤
    pub fn new(pattern: LinePattern) -> Result<Self, ConfigError> {
        let compiled_regex = match &pattern {
            LinePattern::Regex(re) => Some(Regex::new(re).map_err(|source| {
                ConfigError::InvalidPattern {
                    pattern: re.clone(),
                    source,
                }
            })?),
            _ => None,
        };

        Ok(Self {
            pattern,
            compiled_regex,
        })
    }

    /// 純文字結尾規則（不需編譯，不會失敗）
    pub fn ends_with(suffix: impl Into<String>) -> Self {
        Self {
            pattern: LinePattern::EndsWith(suffix.into()),
            compiled_regex: None,
        }
    }

    /// 檢查一行是否符合
    pub fn is_match(&self, line: &str) -> bool {
        match &self.pattern {
            LinePattern::Contains(s) => line.contains(s.as_str()),
            LinePattern::StartsWith(s) => line.starts_with(s.as_str()),
            LinePattern::EndsWith(s) => line.ends_with(s.as_str()),
            LinePattern::Regex(_) => self
                .compiled_regex
                .as_ref()
                .is_some_and(|re| re.is_match(line)),
        }
    }
}

/// 一組規則，任一條符合即視為符合
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<LineRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由子字串與正則列表建立（分類器的忽略規則）
    pub fn from_lists(substrings: &[String], patterns: &[String]) -> Result<Self, ConfigError> {
        let mut set = Self::new();
        for s in substrings.iter().filter(|s| !s.is_empty()) {
            set.push(LineRule::new(LinePattern::Contains(s.clone()))?);
        }
        for p in patterns {
            set.push(LineRule::new(LinePattern::Regex(p.clone()))?);
        }
        Ok(set)
    }

    /// 添加規則
    pub fn push(&mut self, rule: LineRule) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 任一規則符合
    pub fn any_match(&self, line: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(line))
    }
}
