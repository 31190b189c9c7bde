//! Board and deck state: three fixed-capacity rows per player, and the
//! shuffled-once deck they are dealt from.
//!
//! Grounded in `ofc_game.py`'s `Board`/`Deck`, re-expressed with fixed-size
//! arrays in the teacher's `node.rs` style (`Node::Decision`'s `board:
//! Vec<Card>` field shows the same "cards as a plain container" idiom).

use crate::card::{full_deck, Card};
use crate::error::EngineError;
use rand::seq::SliceRandom;
use rand::Rng;

pub const TOP_CAPACITY: usize = 3;
pub const MIDDLE_CAPACITY: usize = 5;
pub const BOTTOM_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Row {
    Top,
    Middle,
    Bottom,
}

impl Row {
    pub const ALL: [Row; 3] = [Row::Top, Row::Middle, Row::Bottom];

    pub fn capacity(self) -> usize {
        match self {
            Row::Top => TOP_CAPACITY,
            Row::Middle => MIDDLE_CAPACITY,
            Row::Bottom => BOTTOM_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Board {
    top: [Option<Card>; TOP_CAPACITY],
    middle: [Option<Card>; MIDDLE_CAPACITY],
    bottom: [Option<Card>; BOTTOM_CAPACITY],
}

impl Default for Board {
    fn default() -> Self {
        Board {
            top: [None; TOP_CAPACITY],
            middle: [None; MIDDLE_CAPACITY],
            bottom: [None; BOTTOM_CAPACITY],
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Board::default()
    }

    fn slots(&self, row: Row) -> &[Option<Card>] {
        match row {
            Row::Top => &self.top,
            Row::Middle => &self.middle,
            Row::Bottom => &self.bottom,
        }
    }

    fn slots_mut(&mut self, row: Row) -> &mut [Option<Card>] {
        match row {
            Row::Top => &mut self.top,
            Row::Middle => &mut self.middle,
            Row::Bottom => &mut self.bottom,
        }
    }

    pub fn row_cards(&self, row: Row) -> Vec<Card> {
        self.slots(row).iter().filter_map(|s| *s).collect()
    }

    pub fn available_slots(&self) -> Vec<(Row, usize)> {
        let mut out = Vec::new();
        for row in Row::ALL {
            for (i, slot) in self.slots(row).iter().enumerate() {
                if slot.is_none() {
                    out.push((row, i));
                }
            }
        }
        out
    }

    pub fn all_cards(&self) -> Vec<Card> {
        Row::ALL.iter().flat_map(|&r| self.row_cards(r)).collect()
    }

    /// Place `card` at `(row, index)`. The slot must be empty.
    pub fn place(&mut self, row: Row, index: usize, card: Card) -> Result<(), EngineError> {
        let slots = self.slots_mut(row);
        let slot = slots
            .get_mut(index)
            .ok_or_else(|| EngineError::IllegalAction(format!("slot {row:?}[{index}] out of range")))?;
        if slot.is_some() {
            return Err(EngineError::IllegalAction(format!(
                "slot {row:?}[{index}] already occupied"
            )));
        }
        *slot = Some(card);
        Ok(())
    }

    /// Remove and return the card at `(row, index)`, undoing a prior
    /// `place`. Used by the apply/undo game-state realization.
    pub fn remove(&mut self, row: Row, index: usize) -> Option<Card> {
        self.slots_mut(row).get_mut(index).and_then(|s| s.take())
    }

    pub fn is_complete(&self) -> bool {
        Row::ALL.iter().all(|&r| self.row_cards(r).len() == r.capacity())
    }
}

/// The remaining, shuffled-once deck. Dealing removes from the tail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut cards = full_deck().to_vec();
        cards.shuffle(rng);
        Deck { cards }
    }

    /// Deal up to `n` cards from the tail. Returns fewer than `n` (never
    /// errors) if the deck runs out — `DeckExhausted` drives the game's
    /// terminal transition, it is not an error condition.
    pub fn deal(&mut self, n: usize) -> Vec<Card> {
        let take = n.min(self.cards.len());
        self.cards.split_off(self.cards.len() - take)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Put cards back at the tail, in the order they were dealt. Used by
    /// the apply/undo game-state realization to restore deck order exactly.
    pub fn undo_deal(&mut self, mut cards: Vec<Card>) {
        self.cards.append(&mut cards);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn deck_has_52_cards_and_deals_from_tail() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        let mut deck = Deck::new(&mut rng);
        assert_eq!(deck.remaining(), 52);
        let hand = deck.deal(5);
        assert_eq!(hand.len(), 5);
        assert_eq!(deck.remaining(), 47);
    }

    #[test]
    fn deal_past_exhaustion_returns_fewer_cards() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        let mut deck = Deck::new(&mut rng);
        let _ = deck.deal(50);
        assert_eq!(deck.remaining(), 2);
        let rest = deck.deal(5);
        assert_eq!(rest.len(), 2);
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn board_place_and_complete() {
        let mut board = Board::new();
        let c = Card::from_str("As").unwrap();
        board.place(Row::Top, 0, c).unwrap();
        assert_eq!(board.row_cards(Row::Top), vec![c]);
        assert!(!board.is_complete());
    }

    #[test]
    fn board_rejects_occupied_slot() {
        let mut board = Board::new();
        let c1 = Card::from_str("As").unwrap();
        let c2 = Card::from_str("Ks").unwrap();
        board.place(Row::Top, 0, c1).unwrap();
        assert!(board.place(Row::Top, 0, c2).is_err());
    }

    #[test]
    fn remove_undoes_place() {
        let mut board = Board::new();
        let c = Card::from_str("As").unwrap();
        board.place(Row::Top, 0, c).unwrap();
        assert_eq!(board.remove(Row::Top, 0), Some(c));
        assert_eq!(board.row_cards(Row::Top), Vec::<Card>::new());
    }
}
