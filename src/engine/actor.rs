//! Single-writer task owning one instrument's book.
//!
//! Requests reach the task through a bounded mpsc queue and are applied one
//! at a time, each to completion, in arrival order. Replies travel back on
//! a oneshot channel. After every request that can change the book the task
//! publishes a fresh depth view on a watch channel, so dashboards can read
//! a recent (possibly slightly stale) depth without queueing behind orders.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{EngineError, RejectReason};
use crate::orderbook::{DepthSnapshot, OrderBook};
use crate::types::{BookSnapshot, Order, OrderStatus, Trade};

type Reply<T> = oneshot::Sender<T>;

/// Requests understood by a book actor.
#[derive(Debug)]
pub enum BookCommand {
    Submit {
        order: Order,
        reply: Reply<Result<Vec<Trade>, RejectReason>>,
    },
    Cancel {
        order_id: u64,
        reply: Reply<Result<Order, RejectReason>>,
    },
    Depth {
        levels: usize,
        reply: Reply<DepthSnapshot>,
    },
    OrderStatus {
        order_id: u64,
        reply: Reply<Option<OrderStatus>>,
    },
    Order {
        order_id: u64,
        reply: Reply<Option<Order>>,
    },
    TradesSince {
        trade_id: u64,
        reply: Reply<Vec<Trade>>,
    },
    Snapshot {
        reply: Reply<BookSnapshot>,
    },
    /// Stop after the requests queued before this one.
    Shutdown,
}

pub struct BookActor {
    book: OrderBook,
    receiver: mpsc::Receiver<BookCommand>,
    depth_tx: watch::Sender<DepthSnapshot>,
    depth_levels: usize,
}

impl BookActor {
    /// Move `book` onto a new task and return a handle to it.
    ///
    /// The task hands the book back through the `JoinHandle` when it stops,
    /// either on [`BookCommand::Shutdown`] or once every handle is dropped.
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        book: OrderBook,
        channel_capacity: usize,
        depth_levels: usize,
    ) -> (BookHandle, JoinHandle<OrderBook>) {
        let instrument = book.instrument();
        let (sender, receiver) = mpsc::channel(channel_capacity.max(1));
        let (depth_tx, depth_rx) = watch::channel(book.depth(depth_levels));

        let actor = Self {
            book,
            receiver,
            depth_tx,
            depth_levels,
        };
        let task = tokio::spawn(actor.run());

        let handle = BookHandle {
            instrument,
            sender,
            depth: depth_rx,
        };
        (handle, task)
    }

    async fn run(mut self) -> OrderBook {
        info!(instrument = self.book.instrument(), "book actor started");

        while let Some(command) = self.receiver.recv().await {
            if matches!(command, BookCommand::Shutdown) {
                break;
            }
            self.handle(command);
        }

        info!(
            instrument = self.book.instrument(),
            resting = self.book.order_count(),
            trades = self.book.trades().len(),
            "book actor stopped"
        );
        self.book
    }

    fn handle(&mut self, command: BookCommand) {
        // A dropped reply receiver just means the caller stopped waiting;
        // the request has still been applied.
        match command {
            BookCommand::Submit { order, reply } => {
                let result = self.book.submit(order);
                if result.is_ok() {
                    self.publish_depth();
                }
                let _ = reply.send(result);
            }
            BookCommand::Cancel { order_id, reply } => {
                let result = self.book.cancel(order_id);
                if result.is_ok() {
                    self.publish_depth();
                }
                let _ = reply.send(result);
            }
            BookCommand::Depth { levels, reply } => {
                let _ = reply.send(self.book.depth(levels));
            }
            BookCommand::OrderStatus { order_id, reply } => {
                let _ = reply.send(self.book.order_status(order_id));
            }
            BookCommand::Order { order_id, reply } => {
                let _ = reply.send(self.book.order(order_id).cloned());
            }
            BookCommand::TradesSince { trade_id, reply } => {
                let _ = reply.send(self.book.trades_since(trade_id).to_vec());
            }
            BookCommand::Snapshot { reply } => {
                let _ = reply.send(self.book.snapshot());
            }
            BookCommand::Shutdown => {}
        }
    }

    fn publish_depth(&self) {
        let depth = self.book.depth(self.depth_levels);
        debug!(
            instrument = depth.instrument,
            best_bid = ?depth.best_bid().map(|l| l.price),
            best_ask = ?depth.best_ask().map(|l| l.price),
            "depth published"
        );
        self.depth_tx.send_replace(depth);
    }
}

/// Cloneable client of one book actor.
#[derive(Debug, Clone)]
pub struct BookHandle {
    instrument: u64,
    sender: mpsc::Sender<BookCommand>,
    depth: watch::Receiver<DepthSnapshot>,
}

impl BookHandle {
    pub fn instrument(&self) -> u64 {
        self.instrument
    }

    pub async fn submit(&self, order: Order) -> Result<Vec<Trade>, EngineError> {
        Ok(self.request(|reply| BookCommand::Submit { order, reply }).await??)
    }

    pub async fn cancel(&self, order_id: u64) -> Result<Order, EngineError> {
        Ok(self.request(|reply| BookCommand::Cancel { order_id, reply }).await??)
    }

    /// Authoritative depth, ordered after every request sent before it.
    pub async fn depth(&self, levels: usize) -> Result<DepthSnapshot, EngineError> {
        self.request(|reply| BookCommand::Depth { levels, reply }).await
    }

    pub async fn order_status(&self, order_id: u64) -> Result<Option<OrderStatus>, EngineError> {
        self.request(|reply| BookCommand::OrderStatus { order_id, reply }).await
    }

    pub async fn order(&self, order_id: u64) -> Result<Option<Order>, EngineError> {
        self.request(|reply| BookCommand::Order { order_id, reply }).await
    }

    pub async fn trades_since(&self, trade_id: u64) -> Result<Vec<Trade>, EngineError> {
        self.request(|reply| BookCommand::TradesSince { trade_id, reply }).await
    }

    pub async fn snapshot(&self) -> Result<BookSnapshot, EngineError> {
        self.request(|reply| BookCommand::Snapshot { reply }).await
    }

    /// Ask the actor to stop once the requests already queued are done.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.sender
            .send(BookCommand::Shutdown)
            .await
            .map_err(|_| EngineError::ActorClosed(self.instrument))
    }

    /// Last published depth. Cheap, never waits, may lag the book.
    pub fn latest_depth(&self) -> DepthSnapshot {
        self.depth.borrow().clone()
    }

    /// Receiver notified each time a new depth view is published.
    pub fn subscribe_depth(&self) -> watch::Receiver<DepthSnapshot> {
        self.depth.clone()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> BookCommand,
    ) -> Result<T, EngineError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(command(reply))
            .await
            .map_err(|_| EngineError::ActorClosed(self.instrument))?;
        response
            .await
            .map_err(|_| EngineError::ActorClosed(self.instrument))
    }
}
