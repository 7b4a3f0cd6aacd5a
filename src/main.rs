//! Matchbook - demo binary
//!
//! Seeds a book for 00700.HK, sends a crossing buy through the actor,
//! and prints the ladder, the trades, and the book's state root.
//!
//! Usage: `matchbook [config-file]`

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchbook::config::{EngineConfig, InstrumentConfig};
use matchbook::engine::Registry;
use matchbook::types::price::{from_fixed_trimmed, to_fixed};
use matchbook::types::{Order, Side};

const DEMO_INSTRUMENT: u64 = 700;
const DEMO_SYMBOL: &str = "00700.HK";

fn price(text: &str) -> Result<u64> {
    to_fixed(text).ok_or_else(|| anyhow!("bad price literal {text}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matchbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::args().nth(1);
    let mut config = EngineConfig::load(path.as_deref()).context("loading configuration")?;
    if config.symbol(DEMO_INSTRUMENT).is_none() {
        config.instruments.push(InstrumentConfig {
            id: DEMO_INSTRUMENT,
            symbol: DEMO_SYMBOL.into(),
        });
    }
    tracing::info!(instruments = config.instruments.len(), "configuration loaded");

    let registry = Registry::from_config(&config)?;
    let book = registry.handle(DEMO_INSTRUMENT)?;

    let seed = [
        (1, Side::Buy, "400.0", 100),
        (2, Side::Buy, "399.5", 200),
        (3, Side::Buy, "399.0", 300),
        (101, Side::Sell, "400.5", 150),
        (102, Side::Sell, "401.0", 250),
        (103, Side::Sell, "401.5", 200),
    ];
    for (id, side, px, qty) in seed {
        book.submit(Order::limit(id, DEMO_INSTRUMENT, side, price(px)?, qty))
            .await?;
    }

    println!("{DEMO_SYMBOL} before:");
    println!("{}", book.depth(config.depth_levels).await?);
    println!();

    let trades = book
        .submit(Order::limit(4, DEMO_INSTRUMENT, Side::Buy, price("400.5")?, 200))
        .await?;
    println!("buy 200 @ 400.5 -> {} trade(s)", trades.len());
    for trade in &trades {
        println!(
            "  #{} {} @ {} (maker {}, taker {})",
            trade.id,
            trade.quantity,
            from_fixed_trimmed(trade.price),
            trade.maker_order_id,
            trade.taker_order_id
        );
    }
    if let Some(status) = book.order_status(4).await? {
        println!("  order 4 is {status:?}");
    }
    println!();

    println!("{DEMO_SYMBOL} after:");
    println!("{}", book.depth(config.depth_levels).await?);
    println!();

    let snapshot = book.snapshot().await?;
    println!(
        "{} resting orders, state root {}",
        snapshot.orders.len(),
        snapshot.state_root_hex()?
    );

    registry.shutdown().await?;
    Ok(())
}
