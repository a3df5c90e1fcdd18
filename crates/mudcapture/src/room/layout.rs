//! 房間區塊版面解析
//!
//! 從完成的區塊取出標題、編號、描述與出口，並計算房間指紋。

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::normalize::normalize_line;
use crate::shapes;

/// 房間版面
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoomLayout {
    pub title: String,
    pub room_id: Option<u32>,
    pub description: String,
    /// 已排序
    pub exits: Vec<String>,
}

impl RoomLayout {
    /// 解析區塊，第一行為標題
    pub fn parse(lines: &[String]) -> Self {
        let clean: Vec<String> = lines.iter().map(|line| normalize_line(line)).collect();
        let Some(first) = clean.first() else {
            return Self::default();
        };

        let (exits_idx, exits) = if shapes::has_inline_exits(first) {
            (0, shapes::exit_directions(first))
        } else {
            match clean.iter().position(|line| shapes::is_exits_line(line)) {
                Some(idx) => (idx, shapes::exit_directions(&clean[idx])),
                None => (clean.len(), Vec::new()),
            }
        };

        let description = clean
            .iter()
            .take(exits_idx)
            .skip(1)
            .filter(|line| !line.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        Self::new(
            shapes::strip_room_id(first),
            shapes::room_id(first),
            &description,
            exits,
        )
    }

    pub fn new(title: &str, room_id: Option<u32>, description: &str, exits: Vec<String>) -> Self {
        let mut sorted_exits = exits;
        sorted_exits.sort();
        sorted_exits.dedup();

        Self {
            title: title.to_string(),
            room_id,
            description: description.to_string(),
            exits: sorted_exits,
        }
    }

    /// 房間指紋 SHA256(title + description + sorted_exits)
    ///
    /// 出口順序不影響結果；房間編號不參與計算。
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.title.as_bytes());
        hasher.update(self.description.as_bytes());
        for exit in &self.exits {
            hasher.update(exit.as_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_basic_room() {
        let layout = RoomLayout::parse(&lines(&[
            "Temple Square [3001]",
            "   You stand in a wide square.",
            "   Pigeons flutter about.",
            "[Exits: south north]",
            "A goblin is here.",
        ]));
        assert_eq!(layout.title, "Temple Square");
        assert_eq!(layout.room_id, Some(3001));
        assert_eq!(layout.description, "You stand in a wide square. Pigeons flutter about.");
        assert_eq!(layout.exits, vec!["north", "south"]);
    }

    #[test]
    fn test_parse_inline_exits() {
        let layout = RoomLayout::parse(&lines(&[
            "Temple Square [3001] [Exits: n s]",
            "A goblin is here.",
        ]));
        assert_eq!(layout.title, "Temple Square");
        assert_eq!(layout.exits, vec!["n", "s"]);
        assert_eq!(layout.description, "");
    }

    #[test]
    fn test_fingerprint_ignores_exit_order() {
        let a = RoomLayout::new("Room A", None, "Description A", vec!["north".into(), "south".into()]);
        let b = RoomLayout::new("Room A", Some(7), "Description A", vec!["south".into(), "north".into()]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_fingerprint_uniqueness() {
        let base = RoomLayout::new("Room A", None, "Description A", vec!["north".into()]);
        let other_title = RoomLayout::new("Room B", None, "Description A", vec!["north".into()]);
        let other_desc = RoomLayout::new("Room A", None, "Description B", vec!["north".into()]);
        let other_exit = RoomLayout::new("Room A", None, "Description A", vec!["south".into()]);

        assert_ne!(base.fingerprint(), other_title.fingerprint());
        assert_ne!(base.fingerprint(), other_desc.fingerprint());
        assert_ne!(base.fingerprint(), other_exit.fingerprint());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(RoomLayout::parse(&[]), RoomLayout::default());
    }
}
