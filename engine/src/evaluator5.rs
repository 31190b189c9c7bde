//! Five-card hand evaluator: perfect-hash scheme over prime-coded cards.
//!
//! Builds two dense maps once at process startup — a flush table and a
//! non-flush table, both keyed by the product of the five card primes —
//! and looks up ranks in O(1) thereafter. Replaces the teacher's
//! `CactusKevEvaluator` placeholder formulas (`engine/src/evaluator.rs`,
//! whose own doc comment admits "This is a placeholder") with the real
//! enumeration, ported from `evaluator.py`'s `LookupTable5Card`.

use crate::card::{Card, PRIMES};
use crate::error::EngineError;
use itertools::Itertools;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const MAX_STRAIGHT_FLUSH: u16 = 10;
pub const MAX_FOUR_OF_A_KIND: u16 = 166;
pub const MAX_FULL_HOUSE: u16 = 322;
pub const MAX_FLUSH: u16 = 1599;
pub const MAX_STRAIGHT: u16 = 1609;
pub const MAX_THREE_OF_A_KIND: u16 = 2467;
pub const MAX_TWO_PAIR: u16 = 3325;
pub const MAX_PAIR: u16 = 6185;
pub const MAX_HIGH_CARD: u16 = 7462;

/// Straight-flush (and straight) rank-bit patterns, royal-down-to-wheel.
const STRAIGHT_RANK_BITS: [u16; 10] = [
    0b1_1111_0000_0000,
    0b0_1111_1000_0000,
    0b0_0111_1100_0000,
    0b0_0011_1110_0000,
    0b0_0001_1111_0000,
    0b0_0000_1111_1000,
    0b0_0000_0111_1100,
    0b0_0000_0011_1110,
    0b0_0000_0001_1111,
    0b1_0000_0000_1111,
];

/// Dense hand rank. Lower values are stronger hands: 1 is the royal flush,
/// 7462 is the worst high card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandRank(pub u16);

impl HandRank {
    pub fn value(self) -> u16 {
        self.0
    }

    pub fn class(self) -> HandClass {
        let v = self.0;
        if v <= MAX_STRAIGHT_FLUSH {
            HandClass::StraightFlush
        } else if v <= MAX_FOUR_OF_A_KIND {
            HandClass::FourOfAKind
        } else if v <= MAX_FULL_HOUSE {
            HandClass::FullHouse
        } else if v <= MAX_FLUSH {
            HandClass::Flush
        } else if v <= MAX_STRAIGHT {
            HandClass::Straight
        } else if v <= MAX_THREE_OF_A_KIND {
            HandClass::ThreeOfAKind
        } else if v <= MAX_TWO_PAIR {
            HandClass::TwoPair
        } else if v <= MAX_PAIR {
            HandClass::Pair
        } else {
            HandClass::HighCard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandClass {
    StraightFlush,
    FourOfAKind,
    FullHouse,
    Flush,
    Straight,
    ThreeOfAKind,
    TwoPair,
    Pair,
    HighCard,
}

impl HandClass {
    /// User-facing label. Not used for any internal comparison.
    pub fn label(self) -> &'static str {
        match self {
            HandClass::StraightFlush => "Straight Flush",
            HandClass::FourOfAKind => "Four of a Kind",
            HandClass::FullHouse => "Full House",
            HandClass::Flush => "Flush",
            HandClass::Straight => "Straight",
            HandClass::ThreeOfAKind => "Three of a Kind",
            HandClass::TwoPair => "Two Pair",
            HandClass::Pair => "Pair",
            HandClass::HighCard => "High Card",
        }
    }
}

struct Tables {
    flush: HashMap<u32, u16>,
    nonflush: HashMap<u32, u16>,
}

fn prime_product_from_rank_bits(bits: u16) -> u32 {
    let mut product = 1u32;
    for i in 0..13 {
        if bits & (1 << i) != 0 {
            product *= PRIMES[i];
        }
    }
    product
}

fn build_tables() -> Tables {
    let mut flush = HashMap::with_capacity(1287);
    let mut nonflush = HashMap::with_capacity(7462);

    let straight_set: std::collections::HashSet<u16> = STRAIGHT_RANK_BITS.iter().copied().collect();
    let all_five_rank_combos: Vec<u16> = (0..13u16)
        .combinations(5)
        .map(|combo| combo.iter().map(|&i| 1u16 << i).sum())
        .collect();
    let mut normal_flush_bits: Vec<u16> = all_five_rank_combos
        .into_iter()
        .filter(|bits| !straight_set.contains(bits))
        .collect();
    normal_flush_bits.sort_unstable_by(|a, b| b.cmp(a));

    // Straight flushes: ranks 1-10, royal down to the wheel.
    let mut rank = 1u16;
    for &bits in STRAIGHT_RANK_BITS.iter() {
        flush.insert(prime_product_from_rank_bits(bits), rank);
        rank += 1;
    }
    // Regular flushes: ranks 323-1599.
    let mut rank = MAX_FULL_HOUSE + 1;
    for &bits in normal_flush_bits.iter() {
        flush.insert(prime_product_from_rank_bits(bits), rank);
        rank += 1;
    }

    // Straights: ranks 1600-1609.
    let mut rank = MAX_FLUSH + 1;
    for &bits in STRAIGHT_RANK_BITS.iter() {
        nonflush.insert(prime_product_from_rank_bits(bits), rank);
        rank += 1;
    }
    // High card: ranks 6186-7462.
    let mut rank = MAX_PAIR + 1;
    for &bits in normal_flush_bits.iter() {
        nonflush.insert(prime_product_from_rank_bits(bits), rank);
        rank += 1;
    }

    let backwards: Vec<usize> = (0..13).rev().collect();

    // Four of a kind: ranks 11-166.
    let mut rank = MAX_STRAIGHT_FLUSH + 1;
    for &quad in &backwards {
        for &kick in backwards.iter().filter(|&&k| k != quad) {
            let product = PRIMES[quad].pow(4) * PRIMES[kick];
            nonflush.insert(product, rank);
            rank += 1;
        }
    }

    // Full house: ranks 167-322.
    let mut rank = MAX_FOUR_OF_A_KIND + 1;
    for &trip in &backwards {
        for &pair in backwards.iter().filter(|&&p| p != trip) {
            let product = PRIMES[trip].pow(3) * PRIMES[pair].pow(2);
            nonflush.insert(product, rank);
            rank += 1;
        }
    }

    // Three of a kind: ranks 1610-2467.
    let mut rank = MAX_STRAIGHT + 1;
    for &trip in &backwards {
        let kickers: Vec<usize> = backwards.iter().copied().filter(|&k| k != trip).collect();
        for combo in kickers.into_iter().combinations(2) {
            let product = PRIMES[trip].pow(3) * PRIMES[combo[0]] * PRIMES[combo[1]];
            nonflush.insert(product, rank);
            rank += 1;
        }
    }

    // Two pair: ranks 2468-3325.
    let mut rank = MAX_THREE_OF_A_KIND + 1;
    for combo in backwards.iter().copied().combinations(2) {
        let (p1, p2) = (combo[0], combo[1]);
        for kick in backwards.iter().copied().filter(|&k| k != p1 && k != p2) {
            let product = PRIMES[p1].pow(2) * PRIMES[p2].pow(2) * PRIMES[kick];
            nonflush.insert(product, rank);
            rank += 1;
        }
    }

    // One pair: ranks 3326-6185.
    let mut rank = MAX_TWO_PAIR + 1;
    for &pair in &backwards {
        let kickers: Vec<usize> = backwards.iter().copied().filter(|&k| k != pair).collect();
        for combo in kickers.into_iter().combinations(3) {
            let product = PRIMES[pair].pow(2) * PRIMES[combo[0]] * PRIMES[combo[1]] * PRIMES[combo[2]];
            nonflush.insert(product, rank);
            rank += 1;
        }
    }

    Tables { flush, nonflush }
}

static TABLES: Lazy<Tables> = Lazy::new(build_tables);

/// Evaluate exactly 5 cards. Infallible by construction (the array length
/// is fixed at compile time); kept `Result`-returning for symmetry with
/// `evaluate5_slice`, which does need the arity check.
pub fn evaluate5(cards: [Card; 5]) -> Result<HandRank, EngineError> {
    let suit_mask = cards.iter().fold(0xF, |acc, c| acc & c.suit_bit());
    if suit_mask != 0 {
        let rank_bits: u16 = cards.iter().fold(0u16, |acc, c| acc | (1 << c.rank_index()));
        let product = prime_product_from_rank_bits(rank_bits);
        TABLES
            .flush
            .get(&product)
            .copied()
            .map(HandRank)
            .ok_or_else(|| EngineError::LookupMiss(format!("flush product {product}")))
    } else {
        let product: u32 = cards.iter().map(|c| c.prime()).product();
        TABLES
            .nonflush
            .get(&product)
            .copied()
            .map(HandRank)
            .ok_or_else(|| EngineError::LookupMiss(format!("non-flush product {product}")))
    }
}

/// Evaluate a slice that must contain exactly 5 cards.
pub fn evaluate5_slice(cards: &[Card]) -> Result<HandRank, EngineError> {
    if cards.len() != 5 {
        return Err(EngineError::ArityError {
            expected: 5,
            got: cards.len(),
        });
    }
    evaluate5([cards[0], cards[1], cards[2], cards[3], cards[4]])
}
