//! Time and id sources injected into services.
//!
//! # Responsibility
//! - Provide wall-clock time as epoch milliseconds.
//! - Provide the random suffix of generated entity ids.
//!
//! # Invariants
//! - Generated ids have the shape `<prefix>-<epoch ms>-<9 base36 chars>`.
//! - Deterministic implementations exist for tests (`ManualClock`, `SeededIds`).

use crate::model::{EntityId, EntityKind};
use chrono::Utc;
use std::cell::Cell;
use uuid::Uuid;

/// Length of the random id suffix.
pub const ID_SUFFIX_LEN: usize = 9;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Source of the current time.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Settable clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<i64>,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

/// Source of random id suffixes.
pub trait IdGenerator {
    /// Returns `ID_SUFFIX_LEN` lowercase base36 characters.
    fn next_suffix(&self) -> String;
}

/// Suffixes drawn from UUID v4 randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_suffix(&self) -> String {
        encode_base36(Uuid::new_v4().as_u128())
    }
}

/// Deterministic suffixes (xorshift64*), for reproducible tests.
#[derive(Debug)]
pub struct SeededIds {
    state: Cell<u64>,
}

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Self {
            state: Cell::new(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed }),
        }
    }
}

impl IdGenerator for SeededIds {
    fn next_suffix(&self) -> String {
        let mut x = self.state.get();
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state.set(x);
        encode_base36(u128::from(x.wrapping_mul(0x2545_F491_4F6C_DD1D)))
    }
}

/// Builds `<prefix>-<now_ms>-<suffix>` for `kind`.
pub fn compose_id(kind: EntityKind, now_ms: i64, suffix: &str) -> EntityId {
    EntityId::new(format!("{}-{now_ms}-{suffix}", kind.id_prefix()))
}

fn encode_base36(mut value: u128) -> String {
    let mut out = [0u8; ID_SUFFIX_LEN];
    for slot in out.iter_mut().rev() {
        *slot = BASE36_DIGITS[(value % 36) as usize];
        value /= 36;
    }
    out.iter().map(|byte| char::from(*byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::{compose_id, Clock, IdGenerator, ManualClock, RandomIds, SeededIds, ID_SUFFIX_LEN};
    use crate::model::EntityKind;
    use std::collections::HashSet;

    #[test]
    fn suffixes_are_nine_base36_chars() {
        let suffix = RandomIds.next_suffix();
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn seeded_ids_are_reproducible_and_distinct() {
        let a = SeededIds::new(42);
        let b = SeededIds::new(42);
        let first: Vec<_> = (0..50).map(|_| a.next_suffix()).collect();
        let second: Vec<_> = (0..50).map(|_| b.next_suffix()).collect();
        assert_eq!(first, second);
        assert_eq!(first.iter().collect::<HashSet<_>>().len(), 50);
    }

    #[test]
    fn compose_id_uses_kind_prefix() {
        let id = compose_id(EntityKind::Project, 1_700, "abc123xyz");
        assert_eq!(id.as_str(), "proj-1700-abc123xyz");
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(10);
        clock.advance(5);
        assert_eq!(clock.now_ms(), 15);
        clock.set(3);
        assert_eq!(clock.now_ms(), 3);
    }
}
