//! Continuous double-auction matching with price-time priority.
//!
//! ## Matching Rules
//!
//! - A Buy matches against asks (lowest price first), a Sell against bids
//!   (highest price first); within a price the oldest order goes first.
//! - The loop stops at the first resting order that does not cross. The
//!   opposite side is priority-ordered, so no deeper level could cross.
//! - Every trade executes at the resting (maker) order's price.
//! - A Limit remainder rests on its own side; a Market remainder is dropped.
//!
//! ## Example
//!
//! ```
//! use matchbook::orderbook::OrderBook;
//! use matchbook::types::{Order, OrderStatus, Side};
//!
//! let mut book = OrderBook::new(1);
//! book.submit(Order::limit(1, 1, Side::Sell, 100, 10)).unwrap();
//!
//! let trades = book.submit(Order::limit(2, 1, Side::Buy, 105, 4)).unwrap();
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].price, 100); // maker's price
//! assert_eq!(book.order_status(1), Some(OrderStatus::PartiallyFilled));
//! ```

use tracing::{debug, warn};

use crate::error::RejectReason;
use crate::orderbook::OrderBook;
use crate::types::{Order, OrderKind, Side, Trade};

impl OrderBook {
    /// Match `order` against the book, then rest or drop the remainder.
    ///
    /// Returns the trades produced by this submission, in execution order.
    /// A rejected order leaves the book exactly as it was.
    pub fn submit(&mut self, mut order: Order) -> Result<Vec<Trade>, RejectReason> {
        if let Err(reason) = self.validate(&order) {
            warn!(
                instrument = self.instrument,
                order_id = order.id,
                %reason,
                "order rejected"
            );
            return Err(reason);
        }

        order.filled = 0;
        order.set_sequence(self.next_sequence);
        order.refresh_status();
        self.next_sequence += 1;

        let trades = self.match_incoming(&mut order);

        let order_id = order.id;
        let remaining = order.remaining();
        if remaining > 0 && order.kind() == OrderKind::Limit {
            debug!(
                instrument = self.instrument,
                order_id,
                trades = trades.len(),
                remaining,
                "order resting"
            );
            self.rest(order);
        } else {
            debug!(
                instrument = self.instrument,
                order_id,
                trades = trades.len(),
                dropped = remaining,
                "order done"
            );
            self.history.insert(order_id, order);
        }

        debug_assert!(self.ensure_uncrossed().is_ok(), "book crossed after submit");
        Ok(trades)
    }

    /// Preconditions, checked before anything is touched.
    ///
    /// Raw side and kind tags are checked here because the typed accessors
    /// fall back to a default for unknown values.
    fn validate(&self, order: &Order) -> Result<(), RejectReason> {
        if order.quantity == 0 {
            return Err(RejectReason::InvalidQuantity);
        }
        let side = Side::from_u8(order.side_raw).ok_or(RejectReason::InvalidSide(order.side_raw))?;
        let kind =
            OrderKind::from_u8(order.kind_raw).ok_or(RejectReason::InvalidKind(order.kind_raw))?;
        if kind == OrderKind::Limit && order.price == 0 {
            return Err(RejectReason::InvalidPrice);
        }
        if self.order_index.contains_key(&order.id) || self.history.contains_key(&order.id) {
            return Err(RejectReason::DuplicateOrderId(order.id));
        }
        if order.instrument != self.instrument {
            return Err(RejectReason::WrongInstrument {
                expected: self.instrument,
                actual: order.instrument,
            });
        }
        // Whatever part of a limit order rests joins the level at its own
        // price, and that level's total must stay representable.
        if kind == OrderKind::Limit
            && self
                .level_total(side, order.price)
                .checked_add(order.quantity)
                .is_none()
        {
            return Err(RejectReason::QuantityOverflow { price: order.price });
        }
        Ok(())
    }

    /// The matching loop proper. Fills `incoming` in place.
    fn match_incoming(&mut self, incoming: &mut Order) -> Vec<Trade> {
        let maker_side = incoming.side().opposite();
        let mut trades = Vec::new();

        while incoming.remaining() > 0 {
            let Some((price, key)) = self.best_resting(maker_side) else {
                break;
            };
            if !incoming.crosses(price) {
                break;
            }

            let (maker_id, quantity, maker_done) = {
                let maker = &mut self.orders[key].order;
                let quantity = incoming.remaining().min(maker.remaining());
                maker.fill(quantity);
                (maker.id, quantity, maker.is_filled())
            };
            incoming.fill(quantity);

            if let Some(level) = self.level_mut(maker_side, price) {
                level.reduce_quantity(quantity);
            }

            let trade = Trade::new(
                self.next_trade_id,
                self.instrument,
                maker_id,
                incoming.id,
                incoming.side(),
                price,
                quantity,
                incoming.sequence,
            );
            self.next_trade_id += 1;
            self.trades.push(trade.clone());
            trades.push(trade);

            if maker_done {
                let maker = self.remove_resting(key);
                self.history.insert(maker.id, maker);
            }
        }

        trades
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::error::RejectReason;
    use crate::orderbook::OrderBook;
    use crate::types::{Order, OrderStatus, Side};

    fn buy(id: u64, price: u64, quantity: u64) -> Order {
        Order::limit(id, 1, Side::Buy, price, quantity)
    }

    fn sell(id: u64, price: u64, quantity: u64) -> Order {
        Order::limit(id, 1, Side::Sell, price, quantity)
    }

    #[test]
    fn test_full_match_single_trade() {
        let mut book = OrderBook::new(1);
        assert!(book.submit(sell(1, 100, 10)).unwrap().is_empty());

        let trades = book.submit(buy(2, 100, 10)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, 100);
        assert_eq!(trades[0].quantity, 10);
        assert_eq!(trades[0].buy_order_id, 2);
        assert_eq!(trades[0].sell_order_id, 1);
        assert_eq!(book.order_status(1), Some(OrderStatus::Filled));
        assert_eq!(book.order_status(2), Some(OrderStatus::Filled));
        assert!(book.is_empty());
    }

    #[test]
    fn test_sweep_multiple_levels_best_first() {
        let mut book = OrderBook::new(1);
        book.submit(sell(1, 101, 5)).unwrap();
        book.submit(sell(2, 100, 5)).unwrap();

        let trades = book.submit(buy(3, 101, 10)).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!((trades[0].sell_order_id, trades[0].price), (2, 100));
        assert_eq!((trades[1].sell_order_id, trades[1].price), (1, 101));
        assert!(trades[0].id < trades[1].id);
        assert!(book.is_empty());
    }

    #[test]
    fn test_sell_taker_gets_bid_price() {
        let mut book = OrderBook::new(1);
        book.submit(buy(1, 105, 3)).unwrap();

        let trades = book.submit(sell(2, 100, 3)).unwrap();
        assert_eq!(trades[0].price, 105);
        assert_eq!(trades[0].maker_order_id, 1);
        assert_eq!(trades[0].taker_order_id, 2);
    }

    #[test]
    fn test_partial_fill_rests_remainder() {
        let mut book = OrderBook::new(1);
        book.submit(sell(1, 100, 4)).unwrap();

        let trades = book.submit(buy(2, 100, 10)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(book.order_status(2), Some(OrderStatus::PartiallyFilled));
        assert_eq!(book.best_bid(), Some(100));
        assert_eq!(book.depth(1).bids[0].quantity, 6);
        assert!(book.best_ask().is_none());
    }

    #[test]
    fn test_non_crossing_limit_rests() {
        let mut book = OrderBook::new(1);
        book.submit(sell(1, 101, 4)).unwrap();

        assert!(book.submit(buy(2, 100, 4)).unwrap().is_empty());
        assert_eq!(book.spread(), Some(1));
        assert_eq!(book.order_status(2), Some(OrderStatus::Pending));
    }

    #[test]
    fn test_time_priority_within_level() {
        let mut book = OrderBook::new(1);
        book.submit(buy(1, 100, 2)).unwrap();
        book.submit(buy(2, 100, 2)).unwrap();
        book.submit(buy(3, 100, 2)).unwrap();

        let trades = book.submit(sell(4, 100, 3)).unwrap();
        let makers: Vec<(u64, u64)> = trades.iter().map(|t| (t.maker_order_id, t.quantity)).collect();
        assert_eq!(makers, vec![(1, 2), (2, 1)]);
        assert_eq!(book.order_status(2), Some(OrderStatus::PartiallyFilled));
        assert_eq!(book.order_status(3), Some(OrderStatus::Pending));
    }

    #[test]
    fn test_market_order_sweeps_and_drops_remainder() {
        let mut book = OrderBook::new(1);
        book.submit(sell(1, 100, 3)).unwrap();
        book.submit(sell(2, 150, 3)).unwrap();

        let trades = book.submit(Order::market(3, 1, Side::Buy, 10)).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[1].price, 150);

        let market = book.order(3).unwrap();
        assert_eq!(market.filled, 6);
        assert_eq!(market.status(), OrderStatus::PartiallyFilled);
        assert!(!book.contains_order(3));
        assert!(book.is_empty());
        assert_eq!(book.cancel(3), Err(RejectReason::OrderNotFound(3)));
    }

    #[test]
    fn test_market_order_empty_book() {
        let mut book = OrderBook::new(1);

        assert!(book.submit(Order::market(1, 1, Side::Sell, 10)).unwrap().is_empty());
        assert_eq!(book.order(1).unwrap().filled, 0);
        assert_eq!(book.order_status(1), Some(OrderStatus::Pending));
        assert!(book.is_empty());
    }

    #[test]
    fn test_rejections_do_not_mutate() {
        let mut book = OrderBook::new(1);
        book.submit(sell(1, 100, 5)).unwrap();
        let before = book.snapshot();

        assert_eq!(book.submit(buy(2, 100, 0)), Err(RejectReason::InvalidQuantity));
        assert_eq!(book.submit(buy(3, 0, 5)), Err(RejectReason::InvalidPrice));
        assert_eq!(book.submit(buy(1, 100, 5)), Err(RejectReason::DuplicateOrderId(1)));
        assert_eq!(
            book.submit(Order::limit(4, 9, Side::Buy, 100, 5)),
            Err(RejectReason::WrongInstrument { expected: 1, actual: 9 })
        );

        assert_eq!(book.snapshot(), before);
        assert!(book.trades().is_empty());
        assert_eq!(book.order_status(2), None);
    }

    #[test]
    fn test_level_total_overflow_rejected() {
        let mut book = OrderBook::new(1);
        book.submit(sell(1, 100, u64::MAX - 1)).unwrap();
        let before = book.snapshot();

        assert_eq!(
            book.submit(sell(2, 100, 10)),
            Err(RejectReason::QuantityOverflow { price: 100 })
        );
        assert_eq!(book.snapshot(), before);
        assert_eq!(book.depth(1).asks[0].quantity, u64::MAX - 1);

        // Other prices and the opposite side are unaffected
        book.submit(sell(3, 101, u64::MAX)).unwrap();
        let trades = book.submit(buy(4, 100, 10)).unwrap();
        assert_eq!(trades[0].quantity, 10);
        assert_eq!(book.depth(1).asks[0].quantity, u64::MAX - 11);
        book.check_invariants().unwrap();
    }

    #[test]
    fn test_unknown_tags_rejected() {
        let mut book = OrderBook::new(1);

        let mut bad_side = sell(1, 100, 5);
        bad_side.side_raw = 7;
        assert_eq!(book.submit(bad_side), Err(RejectReason::InvalidSide(7)));

        let mut bad_kind = sell(2, 100, 5);
        bad_kind.kind_raw = 9;
        assert_eq!(book.submit(bad_kind), Err(RejectReason::InvalidKind(9)));

        assert!(book.is_empty());
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.order_status(1), None);

        // Everything that does rest can be rebuilt from its snapshot
        book.submit(sell(3, 100, 5)).unwrap();
        let restored = OrderBook::restore(&book.snapshot()).unwrap();
        assert_eq!(restored.depth(5), book.depth(5));
    }

    #[test]
    fn test_terminal_ids_cannot_be_reused() {
        let mut book = OrderBook::new(1);
        book.submit(sell(1, 100, 5)).unwrap();
        book.cancel(1).unwrap();

        assert_eq!(book.submit(sell(1, 100, 5)), Err(RejectReason::DuplicateOrderId(1)));
    }

    #[test]
    fn test_sequence_is_stamped_by_book() {
        let mut book = OrderBook::new(1);
        let mut order = sell(1, 100, 5);
        order.sequence = 999;
        book.submit(order).unwrap();
        book.submit(sell(2, 100, 5)).unwrap();

        assert_eq!(book.order(1).unwrap().sequence, 1);
        assert_eq!(book.order(2).unwrap().sequence, 2);
    }
}
