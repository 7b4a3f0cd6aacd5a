//! Trade type representing an executed match between two orders.
//!
//! A `Trade` doubles as the audit record of the durable-record contract:
//! it is a fixed-size SSZ container, so an append-only trade log is just
//! the concatenation of encoded trades.

use ssz_rs::prelude::*;

use crate::types::Side;

/// A single match between a resting (maker) and an incoming (taker) order.
///
/// The trade always executes at the maker's price. When the taker's limit
/// is more aggressive, the difference is the taker's price improvement.
///
/// ```
/// use matchbook::types::{Side, Trade};
///
/// let trade = Trade::new(1, 7, 10, 20, Side::Buy, 10_000_000_000, 5, 3);
/// assert_eq!(trade.buy_order_id, 20);
/// assert_eq!(trade.sell_order_id, 10);
/// assert_eq!(trade.maker_order_id, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Trade {
    /// Trade identifier, strictly increasing per instrument
    pub id: u64,

    pub instrument: u64,

    pub buy_order_id: u64,

    pub sell_order_id: u64,

    /// The resting order
    pub maker_order_id: u64,

    /// The incoming order
    pub taker_order_id: u64,

    /// Execution price (fixed-point), always the maker's price
    pub price: u64,

    pub quantity: u64,

    /// Book sequence at which the trade was executed
    pub sequence: u64,
}

impl Trade {
    /// Create a trade from the maker/taker pair.
    ///
    /// `taker_side` decides which of the two ids is the buyer.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        instrument: u64,
        maker_order_id: u64,
        taker_order_id: u64,
        taker_side: Side,
        price: u64,
        quantity: u64,
        sequence: u64,
    ) -> Self {
        let (buy_order_id, sell_order_id) = match taker_side {
            Side::Buy => (taker_order_id, maker_order_id),
            Side::Sell => (maker_order_id, taker_order_id),
        };
        Self {
            id,
            instrument,
            buy_order_id,
            sell_order_id,
            maker_order_id,
            taker_order_id,
            price,
            quantity,
            sequence,
        }
    }

    /// Side of the taker (the aggressor).
    pub fn taker_side(&self) -> Side {
        if self.buy_order_id == self.taker_order_id {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    /// Does this trade involve `order_id` on either side?
    pub fn involves(&self, order_id: u64) -> bool {
        self.buy_order_id == order_id || self.sell_order_id == order_id
    }

    /// Side `order_id` traded on, `None` if it is not part of this trade.
    pub fn side_of(&self, order_id: u64) -> Option<Side> {
        if self.buy_order_id == order_id {
            Some(Side::Buy)
        } else if self.sell_order_id == order_id {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// Notional value (price * quantity), scaled by 10^8 like the price.
    pub fn notional_raw(&self) -> u128 {
        (self.price as u128) * (self.quantity as u128)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
