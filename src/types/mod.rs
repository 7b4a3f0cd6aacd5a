//! Core data types.
//!
//! Order, Trade and snapshot records implement SSZ serialization for
//! deterministic encoding. Prices use fixed-point representation
//! (scaled by 10^8); quantities are plain integer units.
//!
//! ## Types
//!
//! - [`Order`]: an order-entry instruction and its fill state
//! - [`Side`], [`OrderKind`], [`OrderStatus`]
//! - [`Trade`]: an executed match between a maker and a taker
//! - [`BookSnapshot`]: resting orders of one book, for restore

mod order;
mod trade;
pub mod price;
pub mod snapshot;

pub use order::{Order, OrderKind, OrderStatus, Side};
pub use trade::Trade;
pub use snapshot::{BookSnapshot, RestingOrder};
