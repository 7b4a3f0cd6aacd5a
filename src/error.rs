//! Error taxonomy.
//!
//! - [`RejectReason`]: caller-facing, returned synchronously by `submit` and
//!   `cancel`. A rejected request never changes book state.
//! - [`BookError`]: broken internal invariant. Unreachable with a correct
//!   book; reported by `OrderBook::check_invariants`.
//! - [`SnapshotError`]: encoding, decoding or restoring a book snapshot.
//! - [`EngineError`]: failures of the actor layer wrapping the above.

use thiserror::Error;

/// Why an order-entry request was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    #[error("order quantity must be greater than zero")]
    InvalidQuantity,

    #[error("limit price must be greater than zero")]
    InvalidPrice,

    #[error("unknown side tag {0}")]
    InvalidSide(u8),

    #[error("unknown order kind tag {0}")]
    InvalidKind(u8),

    #[error("resting quantity at price {price} would exceed u64::MAX")]
    QuantityOverflow { price: u64 },

    #[error("order id {0} already exists in the book")]
    DuplicateOrderId(u64),

    #[error("order {0} is not resting in the book")]
    OrderNotFound(u64),

    #[error("order for instrument {actual} sent to book {expected}")]
    WrongInstrument { expected: u64, actual: u64 },
}

impl RejectReason {
    /// Validation failures, as opposed to lookups of unknown orders.
    pub fn is_validation(&self) -> bool {
        !matches!(self, RejectReason::OrderNotFound(_))
    }
}

/// Internal book invariant violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("crossed book: best bid {bid} >= best ask {ask}")]
    CrossedBook { bid: u64, ask: u64 },

    #[error("price level {price} totals do not match its orders")]
    LevelMismatch { price: u64 },

    #[error("order index out of sync for order {order_id}")]
    IndexMismatch { order_id: u64 },
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("SSZ encode failed: {0}")]
    Encode(String),

    #[error("SSZ decode failed: {0}")]
    Decode(String),

    #[error("snapshot length {actual} does not match header (expected {expected})")]
    Length { expected: usize, actual: usize },

    #[error("unknown side tag {0} in snapshot record")]
    UnknownSide(u8),

    #[error("snapshot record rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("restored book is inconsistent: {0}")]
    Invariant(#[from] BookError),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] RejectReason),

    #[error("book actor for instrument {0} has shut down")]
    ActorClosed(u64),

    #[error("no book registered for instrument {0}")]
    UnknownInstrument(u64),

    #[error("instrument {0} is already registered")]
    DuplicateInstrument(u64),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl EngineError {
    /// The reject reason, if this error is a rejected request.
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            EngineError::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}
