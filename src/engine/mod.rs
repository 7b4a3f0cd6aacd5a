//! Concurrent access to order books.
//!
//! Matching itself is synchronous and lives in [`crate::orderbook`]. This
//! module puts each book behind a single-writer task so any number of
//! callers can share it:
//!
//! - [`BookActor`]: owns one book, applies requests one at a time
//! - [`BookHandle`]: cloneable async client of one actor
//! - [`Registry`]: instrument id → handle
//!
//! ## Example
//!
//! ```
//! use matchbook::config::EngineConfig;
//! use matchbook::engine::Registry;
//! use matchbook::types::{Order, Side};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), matchbook::error::EngineError> {
//! let mut registry = Registry::new(&EngineConfig::default());
//! let book = registry.register(1, Some("ABC".into()))?;
//!
//! book.submit(Order::limit(1, 1, Side::Sell, 100, 10)).await?;
//! let trades = book.submit(Order::limit(2, 1, Side::Buy, 100, 10)).await?;
//! assert_eq!(trades.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod registry;

pub use actor::{BookActor, BookCommand, BookHandle};
pub use registry::Registry;
