use crate::common::get_current_time_or_zero;
use log::{info, warn};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::Rng;

const NODE_ID_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const EPOCH: u64 = 1288834974657;

struct SnowflakeState {
    last_timestamp: u64,
    sequence: u64,
}

/// Time-ordered 64-bit id source backing [crate::collection::DocId].
///
/// Layout: milliseconds since [EPOCH] in the high bits, then a 10-bit node id
/// and a 12-bit per-millisecond sequence. A 4-byte process salt is appended by
/// `DocId` to form the full 12-byte identifier.
pub struct SnowflakeIdGenerator {
    node_id: u64,
    salt: [u8; 4],
    state: Mutex<SnowflakeState>,
}

impl SnowflakeIdGenerator {
    pub fn new() -> Self {
        let max_node_id = (1 << NODE_ID_BITS) - 1;
        let mut node_id = OsRng.gen::<u64>() & max_node_id;
        if node_id == 0 {
            warn!("Generated node id is zero, picking a random non-zero node id");
            node_id = OsRng.gen_range(1..=max_node_id);
        }
        info!("Initialized id generator with node id: {}", node_id);

        SnowflakeIdGenerator {
            node_id,
            salt: OsRng.gen(),
            state: Mutex::new(SnowflakeState {
                last_timestamp: 0,
                sequence: 0,
            }),
        }
    }

    /// Per-process random bytes appended to every generated id.
    pub fn salt(&self) -> [u8; 4] {
        self.salt
    }

    pub fn get_id(&self) -> u64 {
        let sequence_mask = (1 << SEQUENCE_BITS) - 1;
        let mut state = self.state.lock();

        let mut timestamp = get_current_time_or_zero().max(EPOCH);
        if timestamp < state.last_timestamp {
            // clock moved backwards, stay on the last issued millisecond
            timestamp = state.last_timestamp;
        }

        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & sequence_mask;
            if state.sequence == 0 {
                // sequence exhausted for this millisecond, borrow the next one
                timestamp = state.last_timestamp + 1;
            }
        } else {
            state.sequence = 0;
        }

        state.last_timestamp = timestamp;
        ((timestamp - EPOCH) << (NODE_ID_BITS + SEQUENCE_BITS))
            | (self.node_id << SEQUENCE_BITS)
            | state.sequence
    }
}

impl Default for SnowflakeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
