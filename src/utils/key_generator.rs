//! Time-ordered push key generation for new collection children.
//!
//! Keys are 20 characters: 8 encode the millisecond timestamp, 12 are random.
//! The alphabet is in ASCII order, so keys sort lexicographically in creation
//! order. Keys generated within the same millisecond increment the random
//! part instead of drawing a new one, which keeps them strictly increasing.

use chrono::Utc;
use rand::Rng;
use std::sync::{Mutex, PoisonError};

use crate::domain::entities::EntryId;

/// Ordered 64-symbol alphabet used for every key character.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIMESTAMP_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

/// Total key length.
pub const PUSH_KEY_LENGTH: usize = TIMESTAMP_CHARS + RANDOM_CHARS;

#[derive(Debug, Default)]
struct LastKey {
    timestamp_ms: i64,
    random: [u8; RANDOM_CHARS],
}

/// Generates push keys. One generator per store keeps its keys monotonic.
#[derive(Debug, Default)]
pub struct PushKeyGenerator {
    last: Mutex<LastKey>,
}

impl PushKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new key for the current time.
    pub fn next_key(&self) -> EntryId {
        self.key_at(Utc::now().timestamp_millis())
    }

    fn key_at(&self, timestamp_ms: i64) -> EntryId {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        if timestamp_ms == last.timestamp_ms {
            increment(&mut last.random);
        } else {
            let mut rng = rand::rng();
            for digit in last.random.iter_mut() {
                *digit = rng.random_range(0..64);
            }
            last.timestamp_ms = timestamp_ms;
        }

        let mut key = String::with_capacity(PUSH_KEY_LENGTH);
        key.push_str(&encode_timestamp(timestamp_ms));
        key.extend(last.random.iter().map(|&d| PUSH_CHARS[d as usize] as char));

        EntryId::new(key)
    }
}

fn encode_timestamp(mut timestamp_ms: i64) -> String {
    let mut chars = [0u8; TIMESTAMP_CHARS];
    for slot in chars.iter_mut().rev() {
        *slot = PUSH_CHARS[(timestamp_ms % 64) as usize];
        timestamp_ms /= 64;
    }
    chars.iter().map(|&c| c as char).collect()
}

/// Adds one to a base-64 digit string, carrying from the right.
fn increment(digits: &mut [u8; RANDOM_CHARS]) {
    for digit in digits.iter_mut().rev() {
        if *digit == 63 {
            *digit = 0;
        } else {
            *digit += 1;
            return;
        }
    }
}
