//! Slab-resident wrapper around a resting order.
//!
//! Orders at one price form a doubly-linked FIFO whose links are slab keys,
//! so any node can be unlinked in O(1) once its key is known (the book keeps
//! an `order_id -> key` index for exactly that).

use crate::types::Order;

/// A resting order plus its queue links.
///
/// `prev` points towards the head (earlier sequence), `next` towards the
/// tail (later sequence).
#[derive(Debug, Clone)]
pub struct OrderNode {
    pub order: Order,
    pub next: Option<usize>,
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Wrap an order; the node starts unlinked.
    ///
    /// # Arguments
    ///
    /// * `order` - an accepted limit order with `remaining() > 0`
    ///
    /// Links are set by [`PriceLevel::push_back`](crate::orderbook::PriceLevel::push_back)
    /// once the node has a slab key.
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
        }
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order.id
    }

    #[inline]
    pub fn price(&self) -> u64 {
        self.order.price
    }

    #[inline]
    pub fn sequence(&self) -> u64 {
        self.order.sequence
    }

    /// Open quantity, which is what the level total counts.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.order.remaining()
    }
}
