//! 行形狀判斷
//!
//! 擷取狀態機與分類器共用的小型判斷函式。輸入皆為已去除控制序列的文字；
//! 除了 `is_room_title` 需要看縮排外，其餘都假設已 trim。

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BORDER: Regex = Regex::new(r"^\+[-=+~*]{4,}\+$").unwrap();
    static ref REPORT_HEADER: Regex =
        Regex::new(r"(?i)^you are an? (\d+)[- ]years?[- ]old\b").unwrap();
    static ref TERMINAL_STATE: Regex = Regex::new(r"(?i)^you are ([a-z][a-z' -]*)\.$").unwrap();
    static ref ROOM_ID: Regex = Regex::new(
        r"(?i)(?:\[\s*(?:room\s*|vnum\s*)?#?\s*(\d+)\s*\]|\(\s*#\s*(\d+)\s*\))\s*(?:[\[(]\s*exits?\s*:[^\])]*[\])])?\s*$"
    )
    .unwrap();
    static ref INLINE_EXITS: Regex = Regex::new(r"(?i)[\[(]\s*exits?\s*:").unwrap();
    static ref EXITS: Regex =
        Regex::new(r"(?i)^[\[(]?\s*(?:obvious\s+|visible\s+)?exits?\s*[:\]]|no obvious exits").unwrap();
    static ref EXIT_ROW: Regex = Regex::new(
        r"(?i)^(?:north|south|east|west|up|down|northeast|northwest|southeast|southwest|ne|nw|se|sw|n|s|e|w|u|d)\s*[-:]\s+\S"
    )
    .unwrap();
    static ref MOVEMENT: Regex =
        Regex::new(r"^([A-Z][A-Za-z'-]*) (arrives|appears out of thin air|leaves)\b").unwrap();
    static ref CHAT: Regex =
        Regex::new(r#"(?i)\b(?:says|asks|exclaims|tells you|gossips|shouts|yells|whispers)\b|['"]"#)
            .unwrap();
}

/// 方向詞彙（出口列解析用）
const DIRECTIONS: &[&str] = &[
    "north", "south", "east", "west", "up", "down", "northeast", "northwest", "southeast",
    "southwest", "n", "s", "e", "w", "u", "d", "ne", "nw", "se", "sw", "in", "out",
];

/// 房間標題長度範圍（字元數）
const TITLE_MIN_LEN: usize = 4;
const TITLE_MAX_LEN: usize = 72;

/// 裝飾邊框行，例如 `+-=-=-=-=-+`
pub fn is_border_line(clean: &str) -> bool {
    BORDER.is_match(clean)
}

/// 報告模式開頭 "You are a <N> year-old ..."，返回年齡
pub fn report_header_age(clean: &str) -> Option<u32> {
    REPORT_HEADER
        .captures(clean)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn is_report_header(clean: &str) -> bool {
    REPORT_HEADER.is_match(clean)
}

/// 報告結尾的狀態句 "You are <state>."，返回狀態
///
/// 開頭的 "You are a/an/the ..." 形式不算。
pub fn terminal_state(clean: &str) -> Option<&str> {
    let caps = TERMINAL_STATE.captures(clean)?;
    let state = caps.get(1)?.as_str();
    let lower = state.to_ascii_lowercase();
    if ["a ", "an ", "the "].iter().any(|article| lower.starts_with(article)) {
        return None;
    }
    Some(state)
}

/// 行尾的房間編號標記，例如 `[1234]`、`[Room 1234]`、`(#1234)`
pub fn room_id(clean: &str) -> Option<u32> {
    let caps = ROOM_ID.captures(clean)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

/// 去掉行尾的房間編號標記
pub fn strip_room_id(clean: &str) -> &str {
    match ROOM_ID.find(clean) {
        Some(m) => clean[..m.start()].trim_end(),
        None => clean,
    }
}

/// 強標記：標題 + 房間編號
pub fn is_strong_room_marker(clean: &str) -> bool {
    room_id(clean).is_some()
        && !is_exits_line(clean)
        && !clean.starts_with('[')
        && strip_room_id(clean).chars().any(|c| c.is_alphabetic())
}

/// 行內帶有出口標記，例如 `Temple Square [3001] [Exits: n s]`
pub fn has_inline_exits(clean: &str) -> bool {
    INLINE_EXITS.is_match(clean)
}

/// 出口標記行
pub fn is_exits_line(clean: &str) -> bool {
    EXITS.is_match(clean)
}

/// 從出口行解析方向
pub fn exit_directions(clean: &str) -> Vec<String> {
    let list = match clean.find(&[':', ']'][..]) {
        Some(idx) => &clean[idx + 1..],
        None => clean,
    };
    list.split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| {
            token
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_ascii_lowercase()
        })
        .filter(|token| DIRECTIONS.contains(&token.as_str()))
        .collect()
}

/// 方向出口列，例如 `North - The Temple Square`
pub fn is_exit_row(clean: &str) -> bool {
    EXIT_ROW.is_match(clean)
}

/// 出入訊息，返回 (名字, 動詞)
pub fn movement(clean: &str) -> Option<(&str, &str)> {
    let caps = MOVEMENT.captures(clean)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// 啟發式房間標題
///
/// 輸入為未 trim 的文字，有縮排即不是標題。
pub fn is_room_title(stripped: &str) -> bool {
    if stripped.starts_with(char::is_whitespace) {
        return false;
    }
    let text = stripped.trim_end();
    let len = text.chars().count();
    if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
        return false;
    }
    if !text.chars().any(|c| c.is_alphabetic()) || !text.chars().any(|c| c.is_uppercase()) {
        return false;
    }
    if text.ends_with(&['.', '!', '?', ':', ','][..]) {
        return false;
    }
    // 指令回顯慣例為小寫開頭
    if text.starts_with(|c: char| c.is_lowercase()) {
        return false;
    }
    if text.starts_with(&['[', '(', '<', '>', '*', '#', '|', '+'][..]) {
        return false;
    }
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("you ") || lower.starts_with("your ") || lower.starts_with("you're") {
        return false;
    }
    !(is_exits_line(text)
        || is_border_line(text)
        || is_exit_row(text)
        || movement(text).is_some()
        || CHAT.is_match(text))
}
