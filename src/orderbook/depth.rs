//! Aggregated market depth.
//!
//! Depth groups resting quantity per price, independent of how many
//! orders make up each level. Computing it reads the level totals the
//! book already maintains, so it is O(levels) and never touches matching
//! state.

use std::fmt;

use serde::Serialize;

use crate::orderbook::OrderBook;
use crate::types::price::from_fixed_trimmed;

/// One aggregated price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepthLevel {
    pub price: u64,
    /// Sum of remaining quantity at this price
    pub quantity: u64,
    pub order_count: usize,
}

/// Top-of-book view, best price first on each side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepthSnapshot {
    pub instrument: u64,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
    /// `best_ask - best_bid`, absent if either side is empty
    pub spread: Option<u64>,
}

impl DepthSnapshot {
    pub fn best_bid(&self) -> Option<&DepthLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&DepthLevel> {
        self.asks.first()
    }

    /// `(price, quantity)` pairs of the bid side.
    pub fn bid_pairs(&self) -> Vec<(u64, u64)> {
        self.bids.iter().map(|l| (l.price, l.quantity)).collect()
    }

    /// `(price, quantity)` pairs of the ask side.
    pub fn ask_pairs(&self) -> Vec<(u64, u64)> {
        self.asks.iter().map(|l| (l.price, l.quantity)).collect()
    }
}

/// Ladder rendering: asks from worst to best, a rule, bids from best to
/// worst, then the spread.
impl fmt::Display for DepthSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "instrument {}", self.instrument)?;
        writeln!(f, "  asks:")?;
        for level in self.asks.iter().rev() {
            writeln!(f, "    {:>14}  {:>10}", from_fixed_trimmed(level.price), level.quantity)?;
        }
        writeln!(f, "  {}", "-".repeat(30))?;
        writeln!(f, "  bids:")?;
        for level in &self.bids {
            writeln!(f, "    {:>14}  {:>10}", from_fixed_trimmed(level.price), level.quantity)?;
        }
        match self.spread {
            Some(spread) => write!(f, "  spread: {}", from_fixed_trimmed(spread)),
            None => write!(f, "  spread: n/a"),
        }
    }
}

impl OrderBook {
    /// Aggregate the top `levels` prices of each side.
    ///
    /// ```
    /// use matchbook::orderbook::OrderBook;
    /// use matchbook::types::{Order, Side};
    ///
    /// let mut book = OrderBook::new(1);
    /// book.submit(Order::limit(1, 1, Side::Buy, 50, 10)).unwrap();
    /// book.submit(Order::limit(2, 1, Side::Buy, 50, 5)).unwrap();
    ///
    /// let depth = book.depth(5);
    /// assert_eq!(depth.bid_pairs(), vec![(50, 15)]);
    /// assert!(depth.spread.is_none());
    /// ```
    pub fn depth(&self, levels: usize) -> DepthSnapshot {
        let aggregate = |level: &crate::orderbook::PriceLevel| DepthLevel {
            price: level.price,
            quantity: level.total_quantity,
            order_count: level.order_count,
        };

        DepthSnapshot {
            instrument: self.instrument,
            bids: self.bids.values().take(levels).map(aggregate).collect(),
            asks: self.asks.values().take(levels).map(aggregate).collect(),
            spread: self.spread(),
        }
    }
}
