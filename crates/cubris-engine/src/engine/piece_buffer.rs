use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies pieces using the 7-bag randomization algorithm.
///
/// # 7-Bag System
///
/// 1. Put all 7 piece kinds into a "bag"
/// 2. Shuffle the bag
/// 3. Draw pieces in order
/// 4. Append a freshly shuffled bag when 7 or fewer pieces remain
///
/// Every kind therefore appears exactly once in each consecutive group of 7
/// draws, and the next piece is always available for preview.
///
/// # Example
///
/// ```
/// use cubris_engine::PieceBuffer;
///
/// let mut buffer = PieceBuffer::new();
/// let next = buffer.peek_next();
/// assert_eq!(buffer.pop_next(), next);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the piece generator's RNG. Equal seeds produce equal
/// piece sequences, which makes games reproducible for tests and replays.
/// Serialized as a 32-character hex string.
///
/// # Example
///
/// ```
/// use cubris_engine::PieceSeed;
///
/// let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// assert_eq!(seed.to_string(), "0123456789abcdef0123456789abcdef");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: {reason}")]
pub struct ParsePieceSeedError {
    #[error(not(source))]
    reason: String,
}

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParsePieceSeedError {
                reason: format!("expected 32 characters, got {}", s.len()),
            });
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ParsePieceSeedError {
                reason: format!("{s} (unexpected character {c:?})"),
            });
        }
        let num = u128::from_str_radix(s, 16).map_err(|e| ParsePieceSeedError {
            reason: format!("{s} ({e})"),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBuffer {
    /// Creates a new piece buffer with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let bag = VecDeque::with_capacity(PieceKind::LEN * 2);
        let mut this = Self { rng, bag };
        this.fill_bag();
        this
    }

    /// Refills when the bag has 7 or fewer pieces remaining, so at least 8
    /// are queued between pops.
    fn fill_bag(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Draws the next piece from the bag.
    ///
    /// # Panics
    ///
    /// Panics if the bag is empty (should never happen with proper refill logic).
    pub fn pop_next(&mut self) -> PieceKind {
        let piece = self
            .bag
            .pop_front()
            .expect("Piece bag should never be empty");
        self.fill_bag();
        piece
    }

    /// The piece the next [`Self::pop_next`] will return.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.bag[0]
    }

    /// Upcoming pieces in draw order; always at least 8 long.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn seed_from_bytes(bytes: [u8; 16]) -> PieceSeed {
        PieceSeed(bytes)
    }

    #[test]
    fn test_each_bag_contains_every_kind_once() {
        let mut buffer = PieceBuffer::with_seed(seed_from_bytes([7; 16]));
        for _ in 0..5 {
            let bag: BTreeSet<_> = (0..PieceKind::LEN)
                .map(|_| buffer.pop_next().color_id())
                .collect();
            assert_eq!(bag.len(), PieceKind::LEN);
        }
    }

    #[test]
    fn test_queue_stays_above_one_bag() {
        let mut buffer = PieceBuffer::with_seed(seed_from_bytes([1; 16]));
        for _ in 0..50 {
            buffer.pop_next();
            assert!(buffer.next_pieces().count() > PieceKind::LEN);
        }
    }

    #[test]
    fn test_peek_matches_pop() {
        let mut buffer = PieceBuffer::new();
        for _ in 0..20 {
            let peeked = buffer.peek_next();
            assert!(buffer.next_pieces().count() > PieceKind::LEN);
            assert_eq!(buffer.pop_next(), peeked);
        }
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let seed = seed_from_bytes([
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ]);

        let mut buffer1 = PieceBuffer::with_seed(seed);
        let mut buffer2 = PieceBuffer::with_seed(seed);

        for _ in 0..20 {
            assert_eq!(buffer1.pop_next(), buffer2.pop_next());
        }
    }

    mod piece_seed_serialization {
        use super::*;

        #[test]
        fn test_roundtrip_random_seed() {
            let seed: PieceSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(seed, deserialized);
        }

        #[test]
        fn test_known_value_sequential_bytes() {
            // Big-endian: first byte appears first in the hex string
            let seed = seed_from_bytes([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
        }

        #[test]
        fn test_deserialize_uppercase_hex() {
            let json = "\"0123456789ABCDEFFEDCBA9876543210\"";
            let deserialized: PieceSeed = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized.to_bytes()[..4], [0x01, 0x23, 0x45, 0x67]);
        }

        #[test]
        fn test_error_invalid_hex_characters() {
            let result = "ghijklmnopqrstuvwxyzghijklmnopqr".parse::<PieceSeed>();
            assert!(result.unwrap_err().to_string().contains("invalid hex"));
        }

        #[test]
        fn test_error_sign_prefix() {
            for input in [
                "+0123456789abcdef0123456789abcde",
                "-0123456789abcdef0123456789abcde",
            ] {
                let result = input.parse::<PieceSeed>();
                assert!(result.unwrap_err().to_string().contains("unexpected character"));
            }
        }

        #[test]
        fn test_parsed_seed_prints_back_unchanged() {
            let input = "00000000000000000000000000000abc";
            let seed: PieceSeed = input.parse().unwrap();
            assert_eq!(seed.to_string(), input);
        }

        #[test]
        fn test_error_wrong_length() {
            for json in ["\"0123456789abcdef0123456789abcde\"", "\"\""] {
                let result: Result<PieceSeed, _> = serde_json::from_str(json);
                assert!(result.unwrap_err().to_string().contains("invalid hex"));
            }
        }
    }
}
