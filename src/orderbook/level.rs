//! FIFO queue of the orders resting at one price.
//!
//! ```text
//! head (lowest sequence) <-> ... <-> tail (highest sequence)
//! ```
//!
//! Orders join at the tail and are matched from the head, which is exactly
//! time priority within a price. Removing an order from the middle relinks
//! its neighbours and leaves every other order's position untouched.

use slab::Slab;

use crate::orderbook::OrderNode;

/// Queue metadata for one price. Order data lives in the book's slab.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: u64,

    /// Sum of `remaining()` over the queued orders
    pub total_quantity: u64,

    pub head: Option<usize>,
    pub tail: Option<usize>,

    pub order_count: usize,
}

impl PriceLevel {
    pub fn new(price: u64) -> Self {
        Self {
            price,
            total_quantity: 0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Append the node at `key` to the tail of the queue.
    ///
    /// # Arguments
    ///
    /// * `key` - slab key of an unlinked node at this level's price
    /// * `slab` - the book's node storage, used to relink neighbours
    ///
    /// The level total saturates; the book refuses orders that would push it
    /// past `u64::MAX` before they reach this point.
    ///
    /// # Panics
    ///
    /// Panics if `key` (or the current tail) is not a live slab entry.
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let quantity = {
            let node = &mut slab[key];
            node.prev = self.tail;
            node.next = None;
            node.remaining()
        };

        match self.tail {
            Some(tail) => slab[tail].next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantity = self.total_quantity.saturating_add(quantity);
    }

    /// Unlink the node at `key` wherever it sits in the queue.
    ///
    /// The node stays in the slab; freeing it is up to the caller.
    ///
    /// # Returns
    ///
    /// The remaining quantity the node contributed to the level.
    ///
    /// # Panics
    ///
    /// Panics if `key` or either of its neighbours is not a live slab entry.
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> u64 {
        let (prev, next, quantity) = {
            let node = &mut slab[key];
            (node.prev.take(), node.next.take(), node.remaining())
        };

        match prev {
            Some(p) => slab[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => slab[n].prev = prev,
            None => self.tail = prev,
        }

        self.order_count -= 1;
        self.total_quantity = self.total_quantity.saturating_sub(quantity);
        quantity
    }

    /// Key of the oldest order, the next one to match at this price.
    #[inline]
    pub fn peek_head(&self) -> Option<usize> {
        self.head
    }

    /// Account for a partial fill of one of the queued orders.
    ///
    /// # Arguments
    ///
    /// * `filled` - quantity just executed against an order of this level
    #[inline]
    pub fn reduce_quantity(&mut self, filled: u64) {
        self.total_quantity = self.total_quantity.saturating_sub(filled);
    }

    /// Slab keys from head to tail.
    ///
    /// Stops early, without panicking, if a link points at a vacant entry.
    pub fn keys<'a>(&self, slab: &'a Slab<OrderNode>) -> LevelKeys<'a> {
        LevelKeys {
            slab,
            cursor: self.head,
        }
    }
}

/// Iterator over the slab keys of a level in priority order.
pub struct LevelKeys<'a> {
    slab: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelKeys<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let key = self.cursor?;
        self.cursor = self.slab.get(key).and_then(|node| node.next);
        Some(key)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
