//! # Matchbook
//!
//! Limit order book and matching engine for a continuous double auction.
//!
//! ## Architecture
//!
//! - **Types**: Order, Trade, snapshot records (SSZ-encoded)
//! - **OrderBook**: slab-backed price levels, matching, cancellation, depth
//! - **Engine**: one single-writer task per instrument, plus a registry
//! - **Config**: layered engine settings
//!
//! ## Design Principles
//!
//! 1. **Determinism**: the same request sequence always yields the same
//!    trades and the same book. Time priority comes from a per-book
//!    sequence counter, never from a clock.
//! 2. **No Floating Point**: prices are fixed-point integers (10^8 scaling)
//! 3. **Pre-allocated Memory**: slab allocation for O(1) order operations
//! 4. **Synchronous Matching**: the book itself has no async; concurrency is
//!    layered on top by serializing requests per book

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Trade, BookSnapshot
pub mod types;

/// Rejection and failure types
pub mod error;

/// Order book: storage, matching, depth
pub mod orderbook;

/// Per-instrument actors and routing
pub mod engine;

/// Engine settings
pub mod config;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use types::{BookSnapshot, Order, OrderKind, OrderStatus, Side, Trade};
pub use error::{EngineError, RejectReason};
pub use orderbook::{DepthLevel, DepthSnapshot, OrderBook};
pub use engine::{BookHandle, Registry};
pub use crate::config::EngineConfig;
