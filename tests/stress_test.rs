//! Stress tests for the matching engine.
//!
//! These tests verify:
//! 1. Throughput under a large random order flow
//! 2. Determinism: same order flow, same final state root
//! 3. Snapshot/restore mid-stream does not change the outcome
//! 4. The resting book stays bounded under balanced flow
//!
//! Throughput targets are only asserted in release builds.
//!
//! ```bash
//! cargo test --release --test stress_test -- --nocapture
//! ```

use std::time::Instant;

use matchbook::{BookSnapshot, Order, OrderBook, Side};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

const STRESS_ORDER_COUNT: usize = 1_000_000;

/// Target throughput (orders per second), release builds only
const TARGET_THROUGHPUT: f64 = 100_000.0;

const INSTRUMENT: u64 = 1;

/// 50000.00000000 in fixed-point
const BASE_PRICE: u64 = 5_000_000_000_000;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Seeded order flow. Same seed, same orders. Roughly one in twenty orders
/// is a Market order.
fn generate_deterministic_orders(count: usize, seed: u64) -> Vec<Order> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut orders = Vec::with_capacity(count);

    for i in 0..count {
        let id = (i + 1) as u64;
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        // ±1000.00000000 around the base
        let offset: i64 = rng.gen_range(-100_000_000_000i64..=100_000_000_000i64);
        let price = (BASE_PRICE as i64 + offset) as u64;
        let quantity: u64 = rng.gen_range(1..=1_000);

        let order = if rng.gen_ratio(1, 20) {
            Order::market(id, INSTRUMENT, side, quantity)
        } else {
            Order::limit(id, INSTRUMENT, side, price, quantity)
        };
        orders.push(order);
    }

    orders
}

fn run_orders(book: &mut OrderBook, orders: impl IntoIterator<Item = Order>) -> usize {
    let mut trade_count = 0;
    for order in orders {
        trade_count += book.submit(order).expect("generated orders are valid").len();
    }
    trade_count
}

fn state_root(book: &OrderBook) -> [u8; 32] {
    book.snapshot().state_root().expect("snapshot encodes")
}

fn run_deterministic_sequence(seed: u64, count: usize) -> [u8; 32] {
    let mut book = OrderBook::with_capacity(INSTRUMENT, count);
    run_orders(&mut book, generate_deterministic_orders(count, seed));
    state_root(&book)
}

// ============================================================================
// STRESS TESTS
// ============================================================================

#[test]
fn stress_1m_orders() {
    println!("\n=== STRESS TEST: 1 Million Orders ===\n");

    let orders = generate_deterministic_orders(STRESS_ORDER_COUNT, 42);
    let mut book = OrderBook::with_capacity(INSTRUMENT, STRESS_ORDER_COUNT);

    let start = Instant::now();
    let trade_count = run_orders(&mut book, orders);
    let elapsed = start.elapsed();

    let throughput = STRESS_ORDER_COUNT as f64 / elapsed.as_secs_f64();
    let avg_latency_us = elapsed.as_micros() as f64 / STRESS_ORDER_COUNT as f64;
    let root = state_root(&book);

    println!("  Orders processed:  {:>12}", STRESS_ORDER_COUNT);
    println!("  Trades generated:  {:>12}", trade_count);
    println!("  Final book size:   {:>12}", book.order_count());
    println!("  Bid levels:        {:>12}", book.bid_levels());
    println!("  Ask levels:        {:>12}", book.ask_levels());
    println!("  Elapsed time:      {:>12.2?}", elapsed);
    println!("  Throughput:        {:>12.0} orders/sec", throughput);
    println!("  Avg latency:       {:>12.2} μs/order", avg_latency_us);
    println!("  State root:        {}", hex::encode(root));

    assert!(trade_count > 0, "Expected some trades to occur");
    assert_eq!(book.trades().len(), trade_count);
    book.check_invariants().expect("book consistent after stress run");

    if !cfg!(debug_assertions) {
        assert!(
            throughput >= TARGET_THROUGHPUT,
            "Throughput {:.0} orders/sec below target {:.0}",
            throughput,
            TARGET_THROUGHPUT
        );
    }
}

/// Same sequence, same state root; a different sequence, a different one.
#[test]
fn verify_determinism() {
    const TEST_COUNT: usize = 10_000;
    const SEED: u64 = 12345;

    let root1 = run_deterministic_sequence(SEED, TEST_COUNT);
    let root2 = run_deterministic_sequence(SEED, TEST_COUNT);
    println!("  Run 1 state root: {}", hex::encode(root1));
    println!("  Run 2 state root: {}", hex::encode(root2));
    assert_eq!(root1, root2, "State roots must match for determinism");

    let root3 = run_deterministic_sequence(SEED + 1, TEST_COUNT);
    assert_ne!(root1, root3, "Different seeds should produce different roots");
}

/// Stopping halfway, snapshotting through bytes, restoring and carrying on
/// must end in the same state as an uninterrupted run.
#[test]
fn verify_restore_mid_stream() {
    const TEST_COUNT: usize = 20_000;
    let orders = generate_deterministic_orders(TEST_COUNT, 7);
    let (first, second) = orders.split_at(TEST_COUNT / 2);

    let mut straight = OrderBook::new(INSTRUMENT);
    let straight_trades = run_orders(&mut straight, orders.iter().cloned());

    let mut interrupted = OrderBook::new(INSTRUMENT);
    let mut trades = run_orders(&mut interrupted, first.iter().cloned());
    let bytes = interrupted.snapshot().encode().unwrap();

    let decoded = BookSnapshot::decode(&bytes).unwrap();
    let mut restored = OrderBook::restore(&decoded).unwrap();
    trades += run_orders(&mut restored, second.iter().cloned());

    assert_eq!(trades, straight_trades);
    assert_eq!(state_root(&restored), state_root(&straight));
    assert_eq!(restored.depth(10), straight.depth(10));
}

#[test]
fn stress_scaling() {
    println!("{:>12} {:>12} {:>12} {:>12}", "Orders", "Time", "Throughput", "Latency");
    println!("{:-<12} {:-<12} {:-<12} {:-<12}", "", "", "", "");

    for &size in &[1_000, 10_000, 100_000] {
        let orders = generate_deterministic_orders(size, 42);
        let mut book = OrderBook::with_capacity(INSTRUMENT, size);

        let start = Instant::now();
        run_orders(&mut book, orders);
        let elapsed = start.elapsed();

        let throughput = size as f64 / elapsed.as_secs_f64();
        let latency_us = elapsed.as_micros() as f64 / size as f64;
        println!(
            "{:>12} {:>12.2?} {:>12.0} {:>12.2}μs",
            size, elapsed, throughput, latency_us
        );
    }
}

/// Mixed submit/cancel flow.
#[test]
fn stress_cancellations() {
    const ORDER_COUNT: usize = 100_000;
    const CANCEL_RATE: f64 = 0.3;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut book = OrderBook::with_capacity(INSTRUMENT, ORDER_COUNT);

    let mut orders_cancelled = 0;
    let mut cancel_misses = 0;
    let mut resting_order_ids: Vec<u64> = Vec::new();

    let start = Instant::now();

    for i in 0..ORDER_COUNT {
        if !resting_order_ids.is_empty() && rng.gen_bool(CANCEL_RATE) {
            let idx = rng.gen_range(0..resting_order_ids.len());
            let order_id = resting_order_ids.swap_remove(idx);
            // The order may have been filled since it rested
            match book.cancel(order_id) {
                Ok(order) => {
                    assert!(order.remaining() > 0);
                    orders_cancelled += 1;
                }
                Err(_) => cancel_misses += 1,
            }
        }

        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let offset: i64 = rng.gen_range(-100_000_000_000i64..=100_000_000_000i64);
        let price = (BASE_PRICE as i64 + offset) as u64;
        let quantity: u64 = rng.gen_range(1..=1_000);

        let order_id = (i + 1) as u64;
        book.submit(Order::limit(order_id, INSTRUMENT, side, price, quantity))
            .unwrap();
        if book.contains_order(order_id) {
            resting_order_ids.push(order_id);
        }
    }

    let elapsed = start.elapsed();
    let ops_count = ORDER_COUNT + orders_cancelled;
    let throughput = ops_count as f64 / elapsed.as_secs_f64();

    println!("  Orders placed:     {:>12}", ORDER_COUNT);
    println!("  Orders cancelled:  {:>12}", orders_cancelled);
    println!("  Cancel misses:     {:>12}", cancel_misses);
    println!("  Final book size:   {:>12}", book.order_count());
    println!("  Throughput:        {:>12.0} ops/sec", throughput);

    assert!(orders_cancelled > 0);
    book.check_invariants().unwrap();

    if !cfg!(debug_assertions) {
        assert!(
            throughput >= 50_000.0,
            "Mixed operations throughput too low: {:.0}",
            throughput
        );
    }
}

/// With balanced buys and sells at overlapping prices the resting book
/// should not grow without bound, and periodic pruning bounds the history.
#[test]
fn stress_memory_stability() {
    const ITERATIONS: usize = 100_000;
    const MAX_BOOK_SIZE: usize = 50_000;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut book = OrderBook::with_capacity(INSTRUMENT, MAX_BOOK_SIZE);
    let mut max_size_seen = 0;
    let mut max_history_seen = 0;

    for i in 0..ITERATIONS {
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        // Tighter spread for more matching
        let offset: i64 = rng.gen_range(-10_000_000_000i64..=10_000_000_000i64);
        let price = (BASE_PRICE as i64 + offset) as u64;
        let quantity: u64 = rng.gen_range(100_000..=10_000_000);

        book.submit(Order::limit((i + 1) as u64, INSTRUMENT, side, price, quantity))
            .unwrap();
        max_size_seen = max_size_seen.max(book.order_count());
        max_history_seen = max_history_seen.max(book.history_len());

        // Every order here is accepted, so order i carries sequence i + 1
        if (i + 1) % 10_000 == 0 {
            book.prune_history((i + 1).saturating_sub(5_000) as u64);
        }
    }

    println!("  Max book size:     {:>12}", max_size_seen);
    println!("  Final book size:   {:>12}", book.order_count());
    println!("  Max history size:  {:>12}", max_history_seen);

    assert!(
        max_size_seen < MAX_BOOK_SIZE,
        "Book grew too large: {} (max {})",
        max_size_seen,
        MAX_BOOK_SIZE
    );
    assert!(
        max_history_seen <= 16_000,
        "History grew too large between prunes: {}",
        max_history_seen
    );
}
