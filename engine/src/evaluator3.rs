//! Three-card (top row) evaluator: fixed enumeration over all 455
//! rank-triples. Straights and flushes do not exist in this row under the
//! Pineapple top-row convention, so only Trips/Pair/High Card appear.
//!
//! Ported from `evaluator.py`'s `three_card_lookup`, generated rather than
//! transcribed by hand.

use crate::card::Card;
use crate::error::EngineError;
use itertools::Itertools;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const MAX_TRIPS: u16 = 13;
pub const MAX_PAIR: u16 = 169;
pub const MAX_HIGH_CARD: u16 = 455;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreeCardRank(pub u16);

impl ThreeCardRank {
    pub fn value(self) -> u16 {
        self.0
    }

    pub fn class(self) -> ThreeCardClass {
        if self.0 <= MAX_TRIPS {
            ThreeCardClass::Trips
        } else if self.0 <= MAX_PAIR {
            ThreeCardClass::Pair
        } else {
            ThreeCardClass::HighCard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreeCardClass {
    Trips,
    Pair,
    HighCard,
}

/// Keyed by the descending-sorted rank-index triple.
static TABLE: Lazy<HashMap<(u8, u8, u8), u16>> = Lazy::new(build_table);

fn build_table() -> HashMap<(u8, u8, u8), u16> {
    let mut table = HashMap::with_capacity(455);
    let descending: Vec<u8> = (0..13u8).rev().collect();

    let mut rank = 1u16;
    for &r in &descending {
        table.insert((r, r, r), rank);
        rank += 1;
    }

    let mut rank = MAX_TRIPS + 1;
    for &pair in &descending {
        for &kicker in descending.iter().filter(|&&k| k != pair) {
            let mut triple = [pair, pair, kicker];
            triple.sort_unstable_by(|a, b| b.cmp(a));
            table.insert((triple[0], triple[1], triple[2]), rank);
            rank += 1;
        }
    }

    let mut rank = MAX_PAIR + 1;
    for combo in descending.iter().copied().combinations(3) {
        table.insert((combo[0], combo[1], combo[2]), rank);
        rank += 1;
    }

    table
}

/// Evaluate a 3-card row. Suits are irrelevant; only rank indices matter.
pub fn evaluate3(cards: [Card; 3]) -> Result<ThreeCardRank, EngineError> {
    let mut ranks = [
        cards[0].rank_index(),
        cards[1].rank_index(),
        cards[2].rank_index(),
    ];
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    TABLE
        .get(&(ranks[0], ranks[1], ranks[2]))
        .copied()
        .map(ThreeCardRank)
        .ok_or_else(|| EngineError::LookupMiss(format!("three-card triple {ranks:?}")))
}

/// Evaluate a slice that must contain exactly 3 cards.
pub fn evaluate3_slice(cards: &[Card]) -> Result<ThreeCardRank, EngineError> {
    if cards.len() != 3 {
        return Err(EngineError::ArityError {
            expected: 3,
            got: cards.len(),
        });
    }
    evaluate3([cards[0], cards[1], cards[2]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(s: &[&str]) -> [Card; 3] {
        let v: Vec<Card> = s.iter().map(|x| Card::from_str(x).unwrap()).collect();
        [v[0], v[1], v[2]]
    }

    #[test]
    fn trips_are_the_strongest_class() {
        let aaa = evaluate3(cards(&["As", "Ah", "Ad"])).unwrap();
        assert_eq!(aaa.value(), 1);
        assert_eq!(aaa.class(), ThreeCardClass::Trips);

        let two22 = evaluate3(cards(&["2s", "2h", "2d"])).unwrap();
        assert_eq!(two22.value(), 13);
    }

    #[test]
    fn pair_beats_high_card() {
        let pair = evaluate3(cards(&["2s", "2h", "3d"])).unwrap();
        let high = evaluate3(cards(&["As", "Kh", "Qd"])).unwrap();
        assert!(pair < high);
        assert_eq!(pair.class(), ThreeCardClass::Pair);
        assert_eq!(high.class(), ThreeCardClass::HighCard);
    }

    #[test]
    fn order_and_suit_independence() {
        let base = evaluate3(cards(&["Ks", "Kh", "9d"])).unwrap();
        let reordered = evaluate3(cards(&["9d", "Ks", "Kh"])).unwrap();
        let other_suits = evaluate3(cards(&["Kc", "Kd", "9s"])).unwrap();
        assert_eq!(base, reordered);
        assert_eq!(base, other_suits);
    }

    #[test]
    fn table_has_exactly_455_entries() {
        assert_eq!(TABLE.len(), 455);
    }

    #[test]
    fn wrong_arity_rejected() {
        let c = Card::from_str("As").unwrap();
        assert!(matches!(
            evaluate3_slice(&[c, c]),
            Err(EngineError::ArityError { expected: 3, got: 2 })
        ));
    }
}
