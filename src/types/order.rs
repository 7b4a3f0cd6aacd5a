//! Order types for the matching engine.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` so it encodes as a fixed-size container.
//! Enumerations are therefore stored as raw `u8` fields and exposed through
//! typed accessors, and a Market order carries a raw price of 0.
//!
//! ## Lifecycle
//!
//! An order is built by the caller with [`Order::limit`] or [`Order::market`]
//! and handed to the book. From then on only the book mutates it: the
//! submission sequence is stamped on acceptance, fills accumulate in
//! `filled`, and the status is derived from the fill state.

use ssz_rs::prelude::*;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum Side {
    /// Buy order (bid)
    #[default]
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

// ============================================================================
// OrderKind enum
// ============================================================================

/// How an order is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderKind {
    /// Executes at the limit price or better; any remainder rests.
    #[default]
    Limit,
    /// Executes against whatever liquidity exists; the remainder is dropped.
    Market,
}

impl OrderKind {
    pub fn to_u8(self) -> u8 {
        match self {
            OrderKind::Limit => 0,
            OrderKind::Market => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderKind::Limit),
            1 => Some(OrderKind::Market),
            _ => None,
        }
    }
}

// ============================================================================
// OrderStatus enum
// ============================================================================

/// Fill state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub enum OrderStatus {
    /// Nothing filled yet
    #[default]
    Pending,
    /// Some, but not all, of the requested quantity filled
    PartiallyFilled,
    /// Requested quantity fully filled (terminal)
    Filled,
    /// Removed by an explicit cancel (terminal)
    Cancelled,
}

impl OrderStatus {
    pub fn to_u8(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::PartiallyFilled => 1,
            OrderStatus::Filled => 2,
            OrderStatus::Cancelled => 3,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderStatus::Pending),
            1 => Some(OrderStatus::PartiallyFilled),
            2 => Some(OrderStatus::Filled),
            3 => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Status implied by a fill state. Never yields `Cancelled`.
    pub fn from_fill(filled: u64, quantity: u64) -> Self {
        if filled >= quantity {
            OrderStatus::Filled
        } else if filled > 0 {
            OrderStatus::PartiallyFilled
        } else {
            OrderStatus::Pending
        }
    }

    /// Filled and Cancelled orders can no longer trade.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// An order-entry instruction and its fill state.
///
/// ## SSZ Layout
///
/// Fixed-size container of 51 bytes:
/// `id, instrument, side_raw, kind_raw, price, quantity, filled, sequence, status_raw`
/// (8+8+1+1+8+8+8+8+1).
///
/// ## Example
///
/// ```
/// use matchbook::types::{Order, OrderStatus, Side};
///
/// // Buy 10 at 100.00 on instrument 7
/// let order = Order::limit(1, 7, Side::Buy, 10_000_000_000, 10);
/// assert_eq!(order.limit_price(), Some(10_000_000_000));
/// assert_eq!(order.remaining(), 10);
/// assert_eq!(order.status(), OrderStatus::Pending);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Caller-assigned identifier, unique within one book
    pub id: u64,

    /// Instrument the order trades
    pub instrument: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Order kind as u8 (0=Limit, 1=Market)
    pub kind_raw: u8,

    /// Limit price in fixed-point; 0 for Market orders
    pub price: u64,

    /// Requested quantity
    pub quantity: u64,

    /// Cumulative filled quantity
    pub filled: u64,

    /// Submission sequence stamped by the book (0 until accepted)
    pub sequence: u64,

    /// Status as u8, see [`OrderStatus::to_u8`]
    pub status_raw: u8,
}

impl Order {
    /// Create a limit order.
    ///
    /// Validation (positive price and quantity) happens on submit, so an
    /// invalid order can be built and will be rejected by the book.
    pub fn limit(id: u64, instrument: u64, side: Side, price: u64, quantity: u64) -> Self {
        Self {
            id,
            instrument,
            side_raw: side.to_u8(),
            kind_raw: OrderKind::Limit.to_u8(),
            price,
            quantity,
            filled: 0,
            sequence: 0,
            status_raw: OrderStatus::Pending.to_u8(),
        }
    }

    /// Create a market order. It has no price.
    pub fn market(id: u64, instrument: u64, side: Side, quantity: u64) -> Self {
        Self {
            kind_raw: OrderKind::Market.to_u8(),
            price: 0,
            ..Self::limit(id, instrument, side, 0, quantity)
        }
    }

    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }

    pub fn kind(&self) -> OrderKind {
        OrderKind::from_u8(self.kind_raw).unwrap_or(OrderKind::Limit)
    }

    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_u8(self.status_raw).unwrap_or_default()
    }

    #[inline]
    pub fn is_market(&self) -> bool {
        self.kind() == OrderKind::Market
    }

    /// The limit price, `None` for Market orders.
    pub fn limit_price(&self) -> Option<u64> {
        match self.kind() {
            OrderKind::Limit => Some(self.price),
            OrderKind::Market => None,
        }
    }

    /// Quantity still open: `quantity - filled`
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.quantity.saturating_sub(self.filled)
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.filled >= self.quantity
    }

    /// Would this order trade against a resting order priced at `resting_price`?
    ///
    /// Market orders cross any price.
    pub fn crosses(&self, resting_price: u64) -> bool {
        match (self.kind(), self.side()) {
            (OrderKind::Market, _) => true,
            (OrderKind::Limit, Side::Buy) => self.price >= resting_price,
            (OrderKind::Limit, Side::Sell) => self.price <= resting_price,
        }
    }

    /// Apply a fill and recompute the status.
    ///
    /// Returns the quantity actually filled, capped at `remaining()`.
    pub(crate) fn fill(&mut self, fill_qty: u64) -> u64 {
        let actual = fill_qty.min(self.remaining());
        self.filled += actual;
        self.refresh_status();
        actual
    }

    pub(crate) fn cancel(&mut self) {
        self.status_raw = OrderStatus::Cancelled.to_u8();
    }

    pub(crate) fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    pub(crate) fn refresh_status(&mut self) {
        self.status_raw = OrderStatus::from_fill(self.filled, self.quantity).to_u8();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
