// Record ID Generator - Snowflake-like IDs for server-assigned record identifiers

use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::EntityId;

const SEQUENCE_BITS: u64 = 12;
const NODE_BITS: u64 = 10;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_MASK: u64 = 0x3FF_FFFF_FFFF;

/// ID generator producing monotonically increasing IDs
/// 64-bit ID format: [timestamp:42][node_id:10][sequence:12]
/// Allows 1024 nodes and 4096 IDs per millisecond per node
#[derive(Debug)]
pub struct IdGenerator {
    node_id: u16,
    /// Packed `[timestamp:52][sequence:12]` of the last issued ID
    state: AtomicU64,
}

impl IdGenerator {
    /// Create new ID generator for the given node
    pub fn new(node_id: u16) -> Self {
        assert!(node_id < 1024, "Node ID must be less than 1024");

        Self {
            node_id,
            state: AtomicU64::new(0),
        }
    }

    /// Generate next unique ID
    pub fn next_id(&self) -> EntityId {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let now = current_time_millis();
            let last_ts = current >> SEQUENCE_BITS;
            let last_seq = current & SEQUENCE_MASK;

            // Never go backwards: reuse the last timestamp if the clock lags
            // and borrow the next millisecond once the sequence is exhausted
            let (ts, seq) = if now > last_ts {
                (now, 0)
            } else if last_seq < SEQUENCE_MASK {
                (last_ts, last_seq + 1)
            } else {
                (last_ts + 1, 0)
            };

            let next = (ts << SEQUENCE_BITS) | seq;
            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let id = ((ts & TIMESTAMP_MASK) << (NODE_BITS + SEQUENCE_BITS))
                        | ((self.node_id as u64) << SEQUENCE_BITS)
                        | seq;
                    return EntityId(id as i64);
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Extract node ID from a generated ID
    pub fn extract_node_id(id: EntityId) -> u16 {
        ((id.0 as u64) >> SEQUENCE_BITS & 0x3FF) as u16
    }

    /// Extract timestamp from a generated ID
    pub fn extract_timestamp(id: EntityId) -> u64 {
        (id.0 as u64) >> (NODE_BITS + SEQUENCE_BITS)
    }

    /// Extract sequence from a generated ID
    pub fn extract_sequence(id: EntityId) -> u16 {
        ((id.0 as u64) & SEQUENCE_MASK) as u16
    }

    pub fn node_id(&self) -> u16 {
        self.node_id
    }
}

fn current_time_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
