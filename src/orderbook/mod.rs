//! Order book for one instrument.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: O(1) order insertion, removal, and lookup
//! - **Price levels**: orders grouped by price in `BTreeMap`s
//! - **Price-time priority**: FIFO queue at each price level
//!
//! ## Components
//!
//! - [`OrderNode`]: an `Order` plus its queue links
//! - [`PriceLevel`]: FIFO of the orders at one price
//! - [`OrderBook`]: both sides, matching, cancellation, queries
//! - [`DepthSnapshot`]: aggregated read-only view
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Rest order | O(log P) |
//! | Cancel order by ID | O(log P) |
//! | Best bid/ask | O(log P) |
//! | Submit | O(k log P), k = trades produced |
//! | Depth(n) | O(n) |
//!
//! P is the number of distinct prices on a side.

pub mod node;
pub mod level;
pub mod book;
pub mod matching;
pub mod depth;

pub use node::OrderNode;
pub use level::PriceLevel;
pub use book::OrderBook;
pub use depth::{DepthLevel, DepthSnapshot};
