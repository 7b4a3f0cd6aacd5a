//! Resting-order snapshot of one book.
//!
//! The book's state can be rebuilt from its resting orders alone, so the
//! snapshot holds only those (in priority order) plus the counters needed
//! to keep sequence numbers and trade ids monotonic after a restore.
//!
//! ## Encoding
//!
//! ```text
//! header (32 bytes SSZ) || record_0 (41 bytes SSZ) || ... || record_{n-1}
//! ```
//!
//! The state root is the SHA-256 of that encoding, so two books with the
//! same resting orders in the same priority order share a root.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::error::SnapshotError;
use crate::types::Side;

/// Encoded size of [`SnapshotHeader`].
pub const HEADER_LEN: usize = 32;

/// Encoded size of [`RestingOrder`].
pub const RECORD_LEN: usize = 41;

/// One resting order as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct RestingOrder {
    pub order_id: u64,
    pub side_raw: u8,
    pub price: u64,
    /// Originally requested quantity
    pub quantity: u64,
    pub remaining: u64,
    pub sequence: u64,
}

impl RestingOrder {
    pub fn side(&self) -> Result<Side, SnapshotError> {
        Side::from_u8(self.side_raw).ok_or(SnapshotError::UnknownSide(self.side_raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
struct SnapshotHeader {
    instrument: u64,
    next_sequence: u64,
    next_trade_id: u64,
    order_count: u64,
}

/// Snapshot of the resting orders of one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookSnapshot {
    pub instrument: u64,
    /// Sequence the next accepted order will receive
    pub next_sequence: u64,
    /// Id the next trade will receive
    pub next_trade_id: u64,
    /// Bids best-first, then asks best-first
    pub orders: Vec<RestingOrder>,
}

impl BookSnapshot {
    /// Encode as header followed by fixed-size records.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        let header = SnapshotHeader {
            instrument: self.instrument,
            next_sequence: self.next_sequence,
            next_trade_id: self.next_trade_id,
            order_count: self.orders.len() as u64,
        };

        let mut bytes = Vec::with_capacity(HEADER_LEN + RECORD_LEN * self.orders.len());
        bytes.extend(ssz_rs::serialize(&header).map_err(|e| SnapshotError::Encode(format!("{e:?}")))?);
        for record in &self.orders {
            bytes.extend(
                ssz_rs::serialize(record).map_err(|e| SnapshotError::Encode(format!("{e:?}")))?,
            );
        }
        Ok(bytes)
    }

    /// Decode bytes produced by [`BookSnapshot::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < HEADER_LEN {
            return Err(SnapshotError::Length {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }

        let header: SnapshotHeader = ssz_rs::deserialize(&bytes[..HEADER_LEN])
            .map_err(|e| SnapshotError::Decode(format!("{e:?}")))?;

        let body = &bytes[HEADER_LEN..];
        let expected = (header.order_count as usize)
            .checked_mul(RECORD_LEN)
            .ok_or(SnapshotError::Length {
                expected: usize::MAX,
                actual: body.len(),
            })?;
        if body.len() != expected {
            return Err(SnapshotError::Length {
                expected: HEADER_LEN + expected,
                actual: bytes.len(),
            });
        }

        let orders = body
            .chunks_exact(RECORD_LEN)
            .map(|chunk| {
                ssz_rs::deserialize::<RestingOrder>(chunk)
                    .map_err(|e| SnapshotError::Decode(format!("{e:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            instrument: header.instrument,
            next_sequence: header.next_sequence,
            next_trade_id: header.next_trade_id,
            orders,
        })
    }

    /// SHA-256 of the encoded snapshot.
    pub fn state_root(&self) -> Result<[u8; 32], SnapshotError> {
        let bytes = self.encode()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);

        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        Ok(root)
    }

    pub fn state_root_hex(&self) -> Result<String, SnapshotError> {
        Ok(hex::encode(self.state_root()?))
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
