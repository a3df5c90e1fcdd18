//! MUD 紀錄檔重播工具
//!
//! 把錄下來的輸出逐行餵給擷取核心，快照以 JSON Lines 印到 stdout。

mod config;
mod replay;

use anyhow::Result;
use clap::Parser;
use mudcapture::{JsonLinesSink, LineEncoding, MudTracker};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mudreplay")]
#[command(about = "Replay a recorded MUD transcript through the passive capture core")]
struct Cli {
    /// 紀錄檔路徑
    transcript: PathBuf,

    /// 設定檔（JSON），預設讀取設定目錄下的 mudcapture/config.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 玩家名單檔，一行一個名字
    #[arg(short, long)]
    players: Option<PathBuf>,

    /// 紀錄檔編碼 (utf8 | big5)
    #[arg(short, long, default_value = "utf8")]
    encoding: LineEncoding,
}

fn main() -> Result<()> {
    // 日誌走 stderr，stdout 留給快照
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let capture_config = config::load_capture_config(cli.config.as_deref())?;

    let mut tracker =
        MudTracker::new(&capture_config)?.with_sink(JsonLinesSink::new(std::io::stdout()));
    if let Some(path) = &cli.players {
        tracker = tracker.with_roster(config::load_roster(path)?);
    }

    let summary = replay::replay_file(&mut tracker, &cli.transcript, cli.encoding)?;
    tracing::info!(
        "重播完成: {} 行, {} 個分數區塊, {} 個房間, {} 次實體更新, {} 個區塊被丟棄",
        summary.lines,
        summary.scores,
        summary.rooms,
        summary.entity_updates,
        summary.rejected
    );
    Ok(())
}
