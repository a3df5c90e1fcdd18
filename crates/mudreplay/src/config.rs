//! 重播工具的設定與名單載入

use anyhow::{Context, Result};
use mudcapture::{CaptureConfig, KnownPlayerSet, SnapshotSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 設定目錄
pub fn config_dir() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("mudcapture")
    } else {
        PathBuf::from(".")
    }
}

/// 預設設定檔路徑
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// 載入擷取設定
///
/// 指定路徑時必須存在；沒指定時讀預設路徑，不存在就用預設值。
/// 來源標記一律改為 replay。
pub fn load_capture_config(explicit: Option<&Path>) -> Result<CaptureConfig> {
    let mut config = match explicit {
        Some(path) => CaptureConfig::load(path)
            .with_context(|| format!("無法載入設定檔 {}", path.display()))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                info!("使用設定檔 {}", path.display());
                CaptureConfig::load(&path)
                    .with_context(|| format!("無法載入設定檔 {}", path.display()))?
            } else {
                debug!("找不到 {}，使用預設設定", path.display());
                CaptureConfig::default()
            }
        }
    };
    config.source = SnapshotSource::Replay;
    Ok(config)
}

/// 載入玩家名單：一行一個名字，`#` 開頭為註解
pub fn load_roster(path: &Path) -> Result<KnownPlayerSet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("無法讀取名單 {}", path.display()))?;
    let players: KnownPlayerSet = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .collect();
    info!("載入 {} 個玩家名字", players.len());
    Ok(players)
}
