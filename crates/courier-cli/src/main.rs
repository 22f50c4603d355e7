//! courier デモ
//!
//! in-memory の adapter で relay を組み立て、destination を 1 つ参加させて
//! 数サイクル polling してから graceful に止める。
//!
//! - `COURIER_CONFIG`: RelayConfig の JSON ファイル（省略時はデモ用の短い間隔）
//! - `COURIER_DEMO_CYCLES`: 止めるまでのサイクル数（既定 3）
//! - `RUST_LOG`: ログフィルタ

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use courier_core::app::RelayBuilder;
use courier_core::config::RelayConfig;
use courier_core::domain::{ChannelId, DestinationId, Interest, Item, ItemId, Scope};
use courier_core::impls::{
    InMemoryDedupStore, InMemoryRegistryStore, RecordingDeliveryPlatform, ScriptedSearchProvider,
};
use courier_core::ports::ChannelInfo;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier_core=info,courier_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let config = load_config()?;
    let cycles: u64 = match std::env::var("COURIER_DEMO_CYCLES") {
        Ok(raw) => raw.parse().context("COURIER_DEMO_CYCLES must be a number")?,
        Err(_) => 3,
    };
    info!(?config, cycles, "starting courier demo");

    // (A) adapter を用意
    let search = Arc::new(ScriptedSearchProvider::new());
    let platform = Arc::new(RecordingDeliveryPlatform::new());
    let relay = RelayBuilder::new(config)
        .search(search.clone())
        .platform(platform.clone())
        .registry(Arc::new(InMemoryRegistryStore::new()))
        .dedup(Arc::new(InMemoryDedupStore::new()))
        .build()?;

    // (B) destination が参加（ボイスチャンネルは登録されない）
    let server = DestinationId::new("demo-server");
    platform
        .set_channels(
            &server,
            vec![
                channel("general", true),
                channel("launches", true),
                channel("voice", false),
            ],
        )
        .await;
    relay.lifecycle.on_destination_activated(&server).await?;

    // (C) interest を登録し、検索結果を仕込む。2 回目は 1 件だけ新着
    let interest = Interest::new("starship", "space");
    relay
        .coordinator
        .add_interest(&server, interest.clone())
        .await?;
    search
        .push_items(&interest, vec![demo_item("p1", "Starship flight test")])
        .await;
    search
        .push_items(
            &interest,
            vec![
                demo_item("p1", "Starship flight test"),
                demo_item("p2", "Booster catch replay"),
            ],
        )
        .await;

    // (D) worker と sweeper を起動
    let sweeper = relay.spawn_sweeper();
    relay.lifecycle.start(&server).await;

    let run = async {
        loop {
            let status = relay.lifecycle.status().await;
            if status.workers.iter().all(|w| w.cycles >= cycles) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    };
    tokio::select! {
        _ = run => info!("demo cycles finished"),
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }

    let status = relay.lifecycle.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    // (E) graceful shutdown
    relay.lifecycle.shutdown().await;
    sweeper.shutdown_and_join().await;

    for (title, channel) in platform.delivered_pairs().await {
        println!("delivered: {title} -> #{channel}");
    }
    Ok(())
}

fn load_config() -> Result<RelayConfig> {
    match std::env::var("COURIER_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {path}"))?;
            Ok(RelayConfig::from_json(&raw)?)
        }
        Err(_) => Ok(RelayConfig {
            poll_interval_secs: 1,
            ..RelayConfig::default()
        }),
    }
}

fn channel(id: &str, is_text: bool) -> ChannelInfo {
    ChannelInfo {
        id: ChannelId::new(id),
        is_text,
        can_read: true,
        can_post: true,
    }
}

fn demo_item(id: &str, title: &str) -> Item {
    Item {
        id: ItemId::new(id),
        scope: Scope::named("space"),
        permalink: format!("/r/space/comments/{id}/"),
        author: "astro".into(),
        title: title.into(),
        created_at: Utc::now(),
        score: 42,
        comment_count: 7,
    }
}
