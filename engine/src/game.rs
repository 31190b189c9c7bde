//! The OFC-Pineapple state machine: deal schedule, legal-action
//! enumeration under an action abstraction, state transition (both the
//! functional and apply/undo realizations), terminal payoff, and the
//! structural information-set key.
//!
//! Generalizes the teacher's `node.rs` (`Player`, a fixed `Street` enum,
//! `Node`/`GameTree` built once for a static postflop tree) into a state
//! built incrementally street by street, grounded in `ofc_game.py`'s
//! `GameState`.

use crate::abstraction::{AbstractionConfig, DiscardPolicy};
use crate::board::{Board, Deck, Row};
use crate::card::Card;
use crate::error::EngineError;
use crate::royalty;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Player {
    P0,
    P1,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::P0 => Player::P1,
            Player::P1 => Player::P0,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::P0 => 0,
            Player::P1 => 1,
        }
    }
}

/// 1..=5. Street 1 deals 5 cards with no discard; streets 2-5 deal 3 with
/// a mandatory single discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Street(pub u8);

impl Street {
    pub fn deal_size(self) -> usize {
        if self.0 == 1 {
            5
        } else {
            3
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Action {
    pub placement: Vec<(Card, (Row, usize))>,
    pub discard: Option<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DealtHandKey {
    Visible(Vec<Card>),
    Hidden(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct InfoSetKey {
    pub street: Street,
    pub actor: Player,
    pub dealer: Player,
    pub my_board: Board,
    pub opponent_board: Board,
    pub my_dealt_hand: DealtHandKey,
    pub my_discards: Vec<Card>,
}

/// Captures exactly what one `apply_mut` touched, so `undo` can restore
/// the pre-image bit-for-bit: deck contents and order included.
pub struct UndoRecord {
    actor_before: Player,
    placed_slots: Vec<(Row, usize)>,
    discard_appended: bool,
    prev_street: Street,
    prev_actor: Player,
    prev_dealt_hand: Vec<Card>,
    prev_terminal: bool,
    dealt_for_next_turn: Vec<Card>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub boards: [Board; 2],
    pub discards: [Vec<Card>; 2],
    pub deck: Deck,
    pub street: Street,
    pub dealer: Player,
    pub actor: Player,
    pub dealt_hand: Vec<Card>,
    pub terminal: bool,
}

impl GameState {
    /// Shuffle a fresh deck, pick a dealer uniformly, and deal the first
    /// actor's opening 5 cards.
    pub fn new(rng: &mut impl Rng) -> GameState {
        let mut deck = Deck::new(rng);
        let dealer = if rng.gen_bool(0.5) { Player::P0 } else { Player::P1 };
        let actor = dealer.other();
        let street = Street(1);
        let dealt_hand = deck.deal(street.deal_size());
        GameState {
            boards: [Board::new(), Board::new()],
            discards: [Vec::new(), Vec::new()],
            deck,
            street,
            dealer,
            actor,
            dealt_hand,
            terminal: false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn discard_choices(&self, cfg: &AbstractionConfig) -> Vec<Option<Card>> {
        if self.street.0 == 1 {
            return vec![None];
        }
        match cfg.discard_policy {
            DiscardPolicy::AllDiscards => self.dealt_hand.iter().map(|c| Some(*c)).collect(),
            DiscardPolicy::BestHeuristic => {
                let lowest = self
                    .dealt_hand
                    .iter()
                    .min_by_key(|c| c.rank_index())
                    .copied()
                    .expect("dealt hand is never empty on a non-terminal street 2-5 turn");
                vec![Some(lowest)]
            }
        }
    }

    fn abstraction_seed(&self, discard: Option<Card>) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.street.hash(&mut hasher);
        self.actor.hash(&mut hasher);
        self.dealt_hand.hash(&mut hasher);
        discard.hash(&mut hasher);
        hasher.finish()
    }

    /// Enumerate legal actions under the configured abstraction: every
    /// (discard choice, slot assignment) pair for the cards-to-place,
    /// canonically sorted and deduplicated, then capped at
    /// `max_permutations_per_discard` per discard choice via a
    /// key-seeded RNG so identical info sets always yield identical
    /// action lists regardless of traversal order.
    pub fn legal_actions(&self, cfg: &AbstractionConfig) -> Vec<Action> {
        let available = self.boards[self.actor.index()].available_slots();
        let mut actions = Vec::new();

        for discard in self.discard_choices(cfg) {
            let cards_to_place: Vec<Card> = self
                .dealt_hand
                .iter()
                .copied()
                .filter(|c| Some(*c) != discard)
                .collect();
            let n = cards_to_place.len();

            let mut candidates: Vec<Action> = available
                .iter()
                .copied()
                .permutations(n)
                .map(|slots| Action {
                    placement: cards_to_place.iter().copied().zip(slots).collect(),
                    discard,
                })
                .collect();
            candidates.sort();
            candidates.dedup();

            if candidates.len() > cfg.max_permutations_per_discard {
                let seed = self.abstraction_seed(discard);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let sampled: Vec<Action> = rand::seq::index::sample(
                    &mut rng,
                    candidates.len(),
                    cfg.max_permutations_per_discard,
                )
                .into_iter()
                .map(|i| candidates[i].clone())
                .collect();
                actions.extend(sampled);
            } else {
                actions.extend(candidates);
            }
        }

        actions
    }

    /// Functional realization: clone, then mutate the clone.
    pub fn apply(&self, action: &Action) -> GameState {
        let mut next = self.clone();
        next.apply_mut(action)
            .expect("apply called with an action not drawn from legal_actions");
        next
    }

    fn validate_action(&self, action: &Action) -> Result<(), EngineError> {
        let mut used: Vec<Card> = action.placement.iter().map(|(c, _)| *c).collect();
        if let Some(d) = action.discard {
            used.push(d);
        }
        used.sort();
        let mut dealt = self.dealt_hand.clone();
        dealt.sort();
        if used != dealt {
            return Err(EngineError::IllegalAction(
                "action's placement+discard does not match the dealt hand".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply/undo realization: mutate in place, returning an undo record
    /// whose `undo` restores the exact pre-image, deck order included.
    pub fn apply_mut(&mut self, action: &Action) -> Result<UndoRecord, EngineError> {
        self.validate_action(action)?;

        let actor_before = self.actor;
        let actor_idx = actor_before.index();
        let prev_street = self.street;
        let prev_actor = self.actor;
        let prev_dealt_hand = self.dealt_hand.clone();
        let prev_terminal = self.terminal;

        let mut placed_slots = Vec::with_capacity(action.placement.len());
        for (card, (row, index)) in &action.placement {
            self.boards[actor_idx].place(*row, *index, *card)?;
            placed_slots.push((*row, *index));
        }

        let discard_appended = if let Some(d) = action.discard {
            self.discards[actor_idx].push(d);
            true
        } else {
            false
        };

        let dealer_just_acted = actor_before == self.dealer;
        self.actor = actor_before.other();
        if dealer_just_acted {
            self.street = Street(self.street.0 + 1);
        }

        let both_boards_full = self.boards.iter().all(|b| b.is_complete());
        self.terminal = self.street.0 > 5 || both_boards_full;

        let mut dealt_for_next_turn = Vec::new();
        if !self.terminal {
            let want = self.street.deal_size();
            let dealt = self.deck.deal(want);
            if dealt.len() < want {
                self.terminal = true;
            }
            dealt_for_next_turn = dealt.clone();
            self.dealt_hand = dealt;
        } else {
            self.dealt_hand = Vec::new();
        }

        Ok(UndoRecord {
            actor_before,
            placed_slots,
            discard_appended,
            prev_street,
            prev_actor,
            prev_dealt_hand,
            prev_terminal,
            dealt_for_next_turn,
        })
    }

    pub fn undo(&mut self, record: UndoRecord) {
        self.deck.undo_deal(record.dealt_for_next_turn);
        self.dealt_hand = record.prev_dealt_hand;
        self.terminal = record.prev_terminal;
        self.street = record.prev_street;
        self.actor = record.prev_actor;

        let actor_idx = record.actor_before.index();
        if record.discard_appended {
            self.discards[actor_idx].pop();
        }
        for (row, index) in record.placed_slots.iter().rev() {
            self.boards[actor_idx].remove(*row, *index);
        }
    }

    /// Valid only once `is_terminal()`. Combines the base royalty/foul
    /// payoff with each board's Fantasy bonus, awarded additively rather
    /// than as an early short-circuit.
    pub fn payoffs(&self) -> Result<[f64; 2], EngineError> {
        if !self.boards[0].is_complete() || !self.boards[1].is_complete() {
            return Ok([0.0, 0.0]);
        }
        let (p0, p1) = royalty::payoff(&self.boards[0], &self.boards[1])?;
        let fantasy0 = royalty::fantasy_bonus(&self.boards[0])?;
        let fantasy1 = royalty::fantasy_bonus(&self.boards[1])?;
        Ok([
            (p0 + fantasy0 - fantasy1) as f64,
            (p1 + fantasy1 - fantasy0) as f64,
        ])
    }

    pub fn infoset_key(&self, observer: Player) -> InfoSetKey {
        let my_idx = observer.index();
        let opp_idx = observer.other().index();
        let my_dealt_hand = if observer == self.actor {
            DealtHandKey::Visible(self.dealt_hand.clone())
        } else {
            DealtHandKey::Hidden(self.dealt_hand.len())
        };
        InfoSetKey {
            street: self.street,
            actor: self.actor,
            dealer: self.dealer,
            my_board: self.boards[my_idx].clone(),
            opponent_board: self.boards[opp_idx].clone(),
            my_dealt_hand,
            my_discards: self.discards[my_idx].clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn new_game_deals_five_to_the_first_actor() {
        let state = GameState::new(&mut rng(1));
        assert_eq!(state.dealt_hand.len(), 5);
        assert_eq!(state.street, Street(1));
        assert_eq!(state.actor, state.dealer.other());
        assert!(!state.terminal);
    }

    #[test]
    fn street_one_has_a_single_discard_choice() {
        let cfg = AbstractionConfig::default();
        let state = GameState::new(&mut rng(2));
        let actions = state.legal_actions(&cfg);
        assert!(actions.iter().all(|a| a.discard.is_none()));
        assert!(actions.iter().all(|a| a.placement.len() == 5));
        assert!(!actions.is_empty());
    }

    #[test]
    fn legal_actions_are_capped_and_deterministic() {
        let cfg = AbstractionConfig::new(10, DiscardPolicy::AllDiscards);
        let state = GameState::new(&mut rng(3));
        let a = state.legal_actions(&cfg);
        let b = state.legal_actions(&cfg);
        assert_eq!(a, b);
        assert!(a.len() <= 10);
    }

    #[test]
    fn apply_then_undo_restores_state() {
        let cfg = AbstractionConfig::default();
        let mut state = GameState::new(&mut rng(4));
        let before = state.clone();
        let action = state.legal_actions(&cfg).into_iter().next().unwrap();
        let record = state.apply_mut(&action).unwrap();
        assert_ne!(state.dealt_hand, before.dealt_hand);
        state.undo(record);
        assert_eq!(state.boards, before.boards);
        assert_eq!(state.discards, before.discards);
        assert_eq!(state.street, before.street);
        assert_eq!(state.actor, before.actor);
        assert_eq!(state.dealt_hand, before.dealt_hand);
        assert_eq!(state.terminal, before.terminal);
        assert_eq!(state.deck, before.deck);
    }

    #[test]
    fn functional_apply_does_not_mutate_receiver() {
        let cfg = AbstractionConfig::default();
        let state = GameState::new(&mut rng(5));
        let action = state.legal_actions(&cfg).into_iter().next().unwrap();
        let next = state.apply(&action);
        assert_ne!(next.dealt_hand, state.dealt_hand);
        assert_eq!(state.street, Street(1));
    }

    #[test]
    fn infoset_key_hides_opponent_dealt_hand() {
        let state = GameState::new(&mut rng(6));
        let actor_key = state.infoset_key(state.actor);
        let other_key = state.infoset_key(state.actor.other());
        assert!(matches!(actor_key.my_dealt_hand, DealtHandKey::Visible(_)));
        assert!(matches!(other_key.my_dealt_hand, DealtHandKey::Hidden(_)));
    }

    #[test]
    fn infoset_key_is_deterministic_for_identical_histories() {
        let state_a = GameState::new(&mut rng(7));
        let state_b = state_a.clone();
        assert_eq!(state_a.infoset_key(Player::P0), state_b.infoset_key(Player::P0));
    }

    #[test]
    fn a_full_hand_reaches_a_terminal_state_with_complete_boards() {
        let cfg = AbstractionConfig::new(8, DiscardPolicy::AllDiscards);
        let mut state = GameState::new(&mut rng(8));
        let mut guard = 0;
        while !state.is_terminal() {
            let action = state.legal_actions(&cfg).into_iter().next().unwrap();
            state.apply_mut(&action).unwrap();
            guard += 1;
            assert!(guard < 200, "game did not terminate");
        }
        assert!(state.boards[0].is_complete());
        assert!(state.boards[1].is_complete());
    }
}
