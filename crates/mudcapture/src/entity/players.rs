//! 已知玩家
//!
//! `KnownPlayerSet` 是某一時刻的玩家名單快照（小寫比對）；
//! `PlayerRoster` 是提供名單的外部協作者。

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// 玩家名單快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownPlayerSet {
    /// 小寫名字
    names: HashSet<String>,
}

impl KnownPlayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從名字清單建立，空白名字會被忽略
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.insert(name.as_ref());
        }
        set
    }

    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.names.insert(name.to_lowercase())
    }

    /// 名字完全相同（不分大小寫）
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// 以名單比對實體片語，返回正規化後的名字
    ///
    /// 片語等於某個名字，或以名字開頭且名字後緊接空白才算命中，
    /// 所以 `Xiantha is here` 不會命中 `xia`。多個名字命中時取最長者。
    /// 返回的是片語中對應的那一段，保留原本的大小寫。
    pub fn match_phrase<'a>(&self, phrase: &'a str) -> Option<&'a str> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return None;
        }
        // 只在片語自己的詞界切，小寫後位元組長度可能改變
        let ends = phrase
            .char_indices()
            .filter(|(_, c)| c.is_whitespace())
            .map(|(i, _)| i)
            .chain(std::iter::once(phrase.len()));
        ends.filter(|&end| self.names.contains(&phrase[..end].to_lowercase()))
            .max()
            .map(|end| &phrase[..end])
    }
}

impl<S: AsRef<str>> FromIterator<S> for KnownPlayerSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::from_names(iter)
    }
}

/// 玩家名單來源
///
/// 每次呼叫都返回當下的名單；名單變化時由擁有者呼叫
/// `MudTracker::on_roster_changed` 觸發重新分類。
pub trait PlayerRoster {
    fn current_players(&self) -> KnownPlayerSet;
}

/// 可共享的記憶體名單
///
/// Clone 出來的 handle 共用同一份名單，交給追蹤器後仍能從外部更新。
#[derive(Debug, Clone, Default)]
pub struct SharedRoster {
    players: Rc<RefCell<KnownPlayerSet>>,
}

impl SharedRoster {
    pub fn new(players: KnownPlayerSet) -> Self {
        Self {
            players: Rc::new(RefCell::new(players)),
        }
    }

    /// 整份替換
    pub fn replace(&self, players: KnownPlayerSet) {
        *self.players.borrow_mut() = players;
    }

    /// 加入一個名字，返回名單是否改變
    pub fn add(&self, name: &str) -> bool {
        self.players.borrow_mut().insert(name)
    }
}

impl PlayerRoster for SharedRoster {
    fn current_players(&self) -> KnownPlayerSet {
        self.players.borrow().clone()
    }
}

impl PlayerRoster for KnownPlayerSet {
    fn current_players(&self) -> KnownPlayerSet {
        self.clone()
    }
}
