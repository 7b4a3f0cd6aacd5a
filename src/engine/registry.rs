//! Instrument → book actor routing.
//!
//! Each instrument gets its own actor, so books never share state and
//! orders for different instruments proceed in parallel. The registry is
//! an explicit value owned by the caller; there is no process-wide table.

use std::collections::HashMap;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::engine::actor::{BookActor, BookHandle};
use crate::error::EngineError;
use crate::orderbook::{DepthSnapshot, OrderBook};
use crate::types::{BookSnapshot, Order, OrderStatus, Trade};

struct BookEntry {
    symbol: Option<String>,
    handle: BookHandle,
    task: JoinHandle<OrderBook>,
}

pub struct Registry {
    books: HashMap<u64, BookEntry>,
    book_capacity: usize,
    channel_capacity: usize,
    depth_levels: usize,
}

impl Registry {
    /// Empty registry using `config`'s sizing. Books are added with
    /// [`Registry::register`].
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            books: HashMap::new(),
            book_capacity: config.book_capacity,
            channel_capacity: config.channel_capacity,
            depth_levels: config.depth_levels,
        }
    }

    /// Registry with a book spawned for every configured instrument.
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut registry = Self::new(config);
        for instrument in &config.instruments {
            registry.register(instrument.id, Some(instrument.symbol.clone()))?;
        }
        info!(books = registry.books.len(), "registry ready");
        Ok(registry)
    }

    /// Spawn an empty book for `instrument`.
    pub fn register(
        &mut self,
        instrument: u64,
        symbol: Option<String>,
    ) -> Result<BookHandle, EngineError> {
        if self.books.contains_key(&instrument) {
            return Err(EngineError::DuplicateInstrument(instrument));
        }
        let book = OrderBook::with_capacity(instrument, self.book_capacity);
        Ok(self.spawn(book, symbol))
    }

    /// Spawn a book rebuilt from `snapshot`.
    pub fn restore(
        &mut self,
        snapshot: &BookSnapshot,
        symbol: Option<String>,
    ) -> Result<BookHandle, EngineError> {
        if self.books.contains_key(&snapshot.instrument) {
            return Err(EngineError::DuplicateInstrument(snapshot.instrument));
        }
        let book = OrderBook::restore(snapshot)?;
        info!(
            instrument = snapshot.instrument,
            resting = book.order_count(),
            "book restored"
        );
        Ok(self.spawn(book, symbol))
    }

    fn spawn(&mut self, book: OrderBook, symbol: Option<String>) -> BookHandle {
        let instrument = book.instrument();
        let (handle, task) = BookActor::spawn(book, self.channel_capacity, self.depth_levels);
        self.books.insert(
            instrument,
            BookEntry {
                symbol,
                handle: handle.clone(),
                task,
            },
        );
        handle
    }

    pub fn handle(&self, instrument: u64) -> Result<&BookHandle, EngineError> {
        self.books
            .get(&instrument)
            .map(|entry| &entry.handle)
            .ok_or(EngineError::UnknownInstrument(instrument))
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&BookHandle> {
        self.books
            .values()
            .find(|entry| entry.symbol.as_deref() == Some(symbol))
            .map(|entry| &entry.handle)
    }

    pub fn symbol(&self, instrument: u64) -> Option<&str> {
        self.books.get(&instrument)?.symbol.as_deref()
    }

    /// Registered instrument ids, ascending.
    pub fn instruments(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.books.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Route `order` to the book named by its instrument.
    pub async fn submit(&self, order: Order) -> Result<Vec<Trade>, EngineError> {
        self.handle(order.instrument)?.submit(order).await
    }

    pub async fn cancel(&self, instrument: u64, order_id: u64) -> Result<Order, EngineError> {
        self.handle(instrument)?.cancel(order_id).await
    }

    pub async fn depth(&self, instrument: u64, levels: usize) -> Result<DepthSnapshot, EngineError> {
        self.handle(instrument)?.depth(levels).await
    }

    pub async fn order_status(
        &self,
        instrument: u64,
        order_id: u64,
    ) -> Result<Option<OrderStatus>, EngineError> {
        self.handle(instrument)?.order_status(order_id).await
    }

    /// Stop every actor and collect the final books, ordered by instrument.
    ///
    /// Requests already queued are applied first. A book whose task
    /// panicked is reported as [`EngineError::ActorClosed`].
    pub async fn shutdown(self) -> Result<Vec<OrderBook>, EngineError> {
        let mut entries: Vec<(u64, BookEntry)> = self.books.into_iter().collect();
        entries.sort_unstable_by_key(|(id, _)| *id);

        for (_, entry) in &entries {
            // An actor that already stopped has nothing left to drain.
            let _ = entry.handle.shutdown().await;
        }

        let mut books = Vec::with_capacity(entries.len());
        for (instrument, entry) in entries {
            match entry.task.await {
                Ok(book) => books.push(book),
                Err(err) => {
                    warn!(instrument, error = %err, "book actor failed");
                    return Err(EngineError::ActorClosed(instrument));
                }
            }
        }
        info!(books = books.len(), "registry shut down");
        Ok(books)
    }
}
