//! Order book storage, cancellation and queries for one instrument.
//!
//! ## Layout
//!
//! - **Slab**: resting order nodes, O(1) insert/remove/lookup
//! - **BTreeMap**: price levels; bids keyed by `Reverse(price)` so that
//!   iteration is best-first on both sides
//! - **HashMap**: `order_id -> slab key` for O(1) cancel
//! - **History**: orders that left the book (filled, cancelled, or a
//!   market remainder that was dropped), so status queries keep working.
//!   It grows with total order flow; `prune_history` bounds it
//!
//! The matching algorithm lives in `matching.rs` and the depth view in
//! `depth.rs`; both are further `impl OrderBook` blocks over this state.
//!
//! ## Example
//!
//! ```
//! use matchbook::orderbook::OrderBook;
//! use matchbook::types::{Order, OrderStatus, Side};
//!
//! let mut book = OrderBook::new(1);
//! book.submit(Order::limit(1, 1, Side::Buy, 5_000_000_000, 10)).unwrap();
//! book.submit(Order::limit(2, 1, Side::Sell, 5_100_000_000, 10)).unwrap();
//!
//! assert_eq!(book.best_bid(), Some(5_000_000_000));
//! assert_eq!(book.spread(), Some(100_000_000));
//!
//! book.cancel(1).unwrap();
//! assert_eq!(book.order_status(1), Some(OrderStatus::Cancelled));
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use slab::Slab;
use tracing::{debug, warn};

use crate::error::{BookError, RejectReason, SnapshotError};
use crate::orderbook::{OrderNode, PriceLevel};
use crate::types::{BookSnapshot, Order, OrderStatus, RestingOrder, Side, Trade};

/// Limit order book for a single instrument.
#[derive(Debug)]
pub struct OrderBook {
    pub(crate) instrument: u64,

    pub(crate) orders: Slab<OrderNode>,

    /// Bid levels, highest price first
    pub(crate) bids: BTreeMap<Reverse<u64>, PriceLevel>,

    /// Ask levels, lowest price first
    pub(crate) asks: BTreeMap<u64, PriceLevel>,

    pub(crate) order_index: HashMap<u64, usize>,

    /// Orders no longer resting, by id
    pub(crate) history: HashMap<u64, Order>,

    /// Append-only trade log
    pub(crate) trades: Vec<Trade>,

    /// Sequence stamped on the next accepted order
    pub(crate) next_sequence: u64,

    pub(crate) next_trade_id: u64,
}

impl OrderBook {
    pub fn new(instrument: u64) -> Self {
        Self::with_capacity(instrument, 0)
    }

    /// Create a book with room for `order_capacity` resting orders.
    ///
    /// ```
    /// use matchbook::orderbook::OrderBook;
    ///
    /// let book = OrderBook::with_capacity(1, 10_000);
    /// assert!(book.capacity() >= 10_000);
    /// ```
    pub fn with_capacity(instrument: u64, order_capacity: usize) -> Self {
        Self {
            instrument,
            orders: Slab::with_capacity(order_capacity),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_index: HashMap::with_capacity(order_capacity),
            history: HashMap::new(),
            trades: Vec::new(),
            next_sequence: 1,
            next_trade_id: 1,
        }
    }

    // ========================================================================
    // Size
    // ========================================================================

    #[inline]
    pub fn instrument(&self) -> u64 {
        self.instrument
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    // ========================================================================
    // Best Bid/Ask
    // ========================================================================

    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.keys().next().map(|r| r.0)
    }

    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.keys().next().copied()
    }

    /// `best_ask - best_bid`, or `None` if either side is empty.
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    // ========================================================================
    // Order Queries
    // ========================================================================

    /// Is the order currently resting in the book?
    #[inline]
    pub fn contains_order(&self, order_id: u64) -> bool {
        self.order_index.contains_key(&order_id)
    }

    /// Any order this book has accepted, resting or not.
    pub fn order(&self, order_id: u64) -> Option<&Order> {
        match self.order_index.get(&order_id) {
            Some(&key) => self.orders.get(key).map(|node| &node.order),
            None => self.history.get(&order_id),
        }
    }

    /// Status of an accepted order, `None` if the id was never accepted.
    pub fn order_status(&self, order_id: u64) -> Option<OrderStatus> {
        self.order(order_id).map(Order::status)
    }

    /// Number of orders kept in the terminal history.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drop terminal orders accepted before `sequence` from the history.
    ///
    /// The history grows with every order that leaves the book, so a
    /// long-running book should prune it once old ids no longer need to be
    /// queried. A pruned id is forgotten: `order_status` returns `None` for
    /// it and the duplicate-id check no longer covers it. Resting orders and
    /// the trade log are untouched.
    ///
    /// Returns the number of orders removed.
    pub fn prune_history(&mut self, sequence: u64) -> usize {
        let before = self.history.len();
        self.history.retain(|_, order| order.sequence >= sequence);
        let pruned = before - self.history.len();
        debug!(instrument = self.instrument, pruned, "history pruned");
        pruned
    }

    /// Full trade history, oldest first.
    #[inline]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Trades with an id greater than `trade_id`.
    pub fn trades_since(&self, trade_id: u64) -> &[Trade] {
        let start = self.trades.partition_point(|t| t.id <= trade_id);
        &self.trades[start..]
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    /// Remove a resting order and mark it cancelled.
    ///
    /// Fails with `OrderNotFound` for unknown ids and for orders that are
    /// already filled, already cancelled, or were never resting (market
    /// orders).
    pub fn cancel(&mut self, order_id: u64) -> Result<Order, RejectReason> {
        let Some(&key) = self.order_index.get(&order_id) else {
            warn!(instrument = self.instrument, order_id, "cancel rejected: order not resting");
            return Err(RejectReason::OrderNotFound(order_id));
        };

        let mut order = self.remove_resting(key);
        order.cancel();
        debug!(
            instrument = self.instrument,
            order_id,
            remaining = order.remaining(),
            "order cancelled"
        );
        self.history.insert(order_id, order.clone());
        Ok(order)
    }

    // ========================================================================
    // Resting order bookkeeping (shared with matching)
    // ========================================================================

    /// Append an accepted limit order to the tail of its price level.
    pub(crate) fn rest(&mut self, order: Order) {
        let order_id = order.id;
        let price = order.price;
        let side = order.side();

        let key = self.orders.insert(OrderNode::new(order));
        self.order_index.insert(order_id, key);

        let level = match side {
            Side::Buy => self
                .bids
                .entry(Reverse(price))
                .or_insert_with(|| PriceLevel::new(price)),
            Side::Sell => self
                .asks
                .entry(price)
                .or_insert_with(|| PriceLevel::new(price)),
        };
        level.push_back(key, &mut self.orders);
    }

    /// Unlink a resting order from its level, the index and the slab.
    ///
    /// Empty levels are dropped so that the first map entry is always the
    /// best live price.
    pub(crate) fn remove_resting(&mut self, key: usize) -> Order {
        let (order_id, price, side) = {
            let node = &self.orders[key];
            (node.order_id(), node.price(), node.order.side())
        };

        match side {
            Side::Buy => {
                if let Some(level) = self.bids.get_mut(&Reverse(price)) {
                    level.remove(key, &mut self.orders);
                    if level.is_empty() {
                        self.bids.remove(&Reverse(price));
                    }
                }
            }
            Side::Sell => {
                if let Some(level) = self.asks.get_mut(&price) {
                    level.remove(key, &mut self.orders);
                    if level.is_empty() {
                        self.asks.remove(&price);
                    }
                }
            }
        }

        self.order_index.remove(&order_id);
        self.orders.remove(key).order
    }

    /// Mutable level holding resting orders of `side` at `price`.
    pub(crate) fn level_mut(&mut self, side: Side, price: u64) -> Option<&mut PriceLevel> {
        match side {
            Side::Buy => self.bids.get_mut(&Reverse(price)),
            Side::Sell => self.asks.get_mut(&price),
        }
    }

    /// Remaining quantity resting on `side` at `price`, 0 if no level.
    pub(crate) fn level_total(&self, side: Side, price: u64) -> u64 {
        let level = match side {
            Side::Buy => self.bids.get(&Reverse(price)),
            Side::Sell => self.asks.get(&price),
        };
        level.map_or(0, |level| level.total_quantity)
    }

    /// Head of the best level on `side`, as `(price, slab key)`.
    pub(crate) fn best_resting(&self, side: Side) -> Option<(u64, usize)> {
        let level = match side {
            Side::Buy => self.bids.values().next(),
            Side::Sell => self.asks.values().next(),
        }?;
        level.peek_head().map(|key| (level.price, key))
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Best bid must be strictly below best ask whenever both exist.
    pub fn ensure_uncrossed(&self) -> Result<(), BookError> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if bid >= ask => Err(BookError::CrossedBook { bid, ask }),
            _ => Ok(()),
        }
    }

    /// Full structural check: uncrossed, level totals, index consistency.
    ///
    /// O(n) in the number of resting orders; meant for tests and audits.
    pub fn check_invariants(&self) -> Result<(), BookError> {
        self.ensure_uncrossed()?;

        let levels = self
            .bids
            .values()
            .map(|level| (Side::Buy, level))
            .chain(self.asks.values().map(|level| (Side::Sell, level)));

        let mut linked = 0usize;
        for (side, level) in levels {
            let mut total = 0u64;
            let mut count = 0usize;
            let mut last_sequence = 0u64;
            for key in level.keys(&self.orders) {
                let node = &self.orders[key];
                let order = &node.order;
                if order.side() != side
                    || order.price != level.price
                    || order.remaining() == 0
                    || order.sequence <= last_sequence
                {
                    return Err(BookError::LevelMismatch { price: level.price });
                }
                if self.order_index.get(&order.id) != Some(&key) {
                    return Err(BookError::IndexMismatch { order_id: order.id });
                }
                last_sequence = order.sequence;
                total = total
                    .checked_add(order.remaining())
                    .ok_or(BookError::LevelMismatch { price: level.price })?;
                count += 1;
            }
            if level.is_empty() || total != level.total_quantity || count != level.order_count {
                return Err(BookError::LevelMismatch { price: level.price });
            }
            linked += count;
        }

        if linked != self.orders.len() || self.order_index.len() != self.orders.len() {
            let order_id = self
                .orders
                .iter()
                .map(|(_, node)| node.order_id())
                .find(|id| !self.order_index.contains_key(id))
                .unwrap_or_default();
            return Err(BookError::IndexMismatch { order_id });
        }
        Ok(())
    }

    // ========================================================================
    // Snapshot / Restore
    // ========================================================================

    /// Capture the resting orders, bids best-first then asks best-first.
    pub fn snapshot(&self) -> BookSnapshot {
        let levels = self.bids.values().chain(self.asks.values());
        let orders = levels
            .flat_map(|level| level.keys(&self.orders))
            .map(|key| {
                let order = &self.orders[key].order;
                RestingOrder {
                    order_id: order.id,
                    side_raw: order.side_raw,
                    price: order.price,
                    quantity: order.quantity,
                    remaining: order.remaining(),
                    sequence: order.sequence,
                }
            })
            .collect();

        BookSnapshot {
            instrument: self.instrument,
            next_sequence: self.next_sequence,
            next_trade_id: self.next_trade_id,
            orders,
        }
    }

    /// Rebuild a book from a snapshot.
    ///
    /// Records are re-queued in sequence order, which reproduces the FIFO
    /// order of every level. Trade history starts empty; trade ids and
    /// sequences continue from the snapshot's counters.
    pub fn restore(snapshot: &BookSnapshot) -> Result<Self, SnapshotError> {
        let mut book = Self::with_capacity(snapshot.instrument, snapshot.orders.len());

        let mut records: Vec<&RestingOrder> = snapshot.orders.iter().collect();
        records.sort_by_key(|r| r.sequence);

        for record in records {
            let side = record.side()?;
            if record.remaining == 0 || record.remaining > record.quantity {
                return Err(RejectReason::InvalidQuantity.into());
            }
            if record.price == 0 {
                return Err(RejectReason::InvalidPrice.into());
            }
            if book.contains_order(record.order_id) {
                return Err(RejectReason::DuplicateOrderId(record.order_id).into());
            }
            if book
                .level_total(side, record.price)
                .checked_add(record.remaining)
                .is_none()
            {
                return Err(RejectReason::QuantityOverflow { price: record.price }.into());
            }

            let mut order =
                Order::limit(record.order_id, snapshot.instrument, side, record.price, record.quantity);
            order.filled = record.quantity - record.remaining;
            order.refresh_status();
            order.set_sequence(record.sequence);
            book.next_sequence = book.next_sequence.max(record.sequence + 1);
            book.rest(order);
        }

        book.next_sequence = book.next_sequence.max(snapshot.next_sequence);
        book.next_trade_id = snapshot.next_trade_id.max(1);
        book.check_invariants()?;

        debug!(
            instrument = book.instrument,
            orders = book.order_count(),
            "book restored from snapshot"
        );
        Ok(book)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
