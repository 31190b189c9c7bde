//! Row royalties, the foul check, and the head-to-head payoff/scoop/
//! fantasy arbitration between two completed boards.
//!
//! Point tables follow spec.md's literal numbers rather than
//! `evaluator.py`'s `ROYALTY_TOP_PAIRS` dict, which disagrees with the spec
//! at the top of the range (AA there is worth 12, not 9) — see DESIGN.md.
//! Trips and the middle/bottom tables agree with the Python original and
//! are carried over unchanged.

use crate::board::{Board, Row};
use crate::card::Card;
use crate::error::EngineError;
use crate::evaluator3::{self, ThreeCardClass};
use crate::evaluator5::{self, HandClass};

pub const SCOOP_BONUS: i64 = 3;

const FANTASY_RANK_QUEEN: u8 = 10;
const FANTASY_RANK_KING: u8 = 11;
const FANTASY_RANK_ACE: u8 = 12;
const FANTASY_TRIPS_BASE: i64 = 30;

/// Royalty points for a completed top row. Zero for anything below 66.
fn top_row_royalty(cards: &[Card]) -> Result<u32, EngineError> {
    if cards.len() != 3 {
        return Ok(0);
    }
    let rank = evaluator3::evaluate3_slice(cards)?;
    Ok(match rank.class() {
        ThreeCardClass::Trips => {
            let trips_rank = cards[0].rank_index();
            trips_rank as u32 + 10
        }
        ThreeCardClass::Pair => match pair_rank_index(cards) {
            Some(r) if r >= 4 => r as u32 - 3,
            _ => 0,
        },
        ThreeCardClass::HighCard => 0,
    })
}

fn pair_rank_index(cards: &[Card]) -> Option<u8> {
    let mut counts = [0u8; 13];
    for c in cards {
        counts[c.rank_index() as usize] += 1;
    }
    counts.iter().position(|&n| n == 2).map(|i| i as u8)
}

const MIDDLE_TRIPS: u32 = 2;
const MIDDLE_STRAIGHT: u32 = 4;
const MIDDLE_FLUSH: u32 = 8;
const MIDDLE_FULL_HOUSE: u32 = 12;
const MIDDLE_QUADS: u32 = 20;
const MIDDLE_STRAIGHT_FLUSH: u32 = 30;
const MIDDLE_ROYAL_FLUSH: u32 = 50;

const BOTTOM_STRAIGHT: u32 = 2;
const BOTTOM_FLUSH: u32 = 4;
const BOTTOM_FULL_HOUSE: u32 = 6;
const BOTTOM_QUADS: u32 = 10;
const BOTTOM_STRAIGHT_FLUSH: u32 = 15;
const BOTTOM_ROYAL_FLUSH: u32 = 25;

fn five_card_row_royalty(row: Row, cards: &[Card]) -> Result<u32, EngineError> {
    if cards.len() != 5 {
        return Ok(0);
    }
    let rank = evaluator5::evaluate5_slice(cards)?;
    let is_royal = rank.value() == 1;
    let points = match row {
        Row::Middle => match rank.class() {
            HandClass::StraightFlush if is_royal => MIDDLE_ROYAL_FLUSH,
            HandClass::StraightFlush => MIDDLE_STRAIGHT_FLUSH,
            HandClass::FourOfAKind => MIDDLE_QUADS,
            HandClass::FullHouse => MIDDLE_FULL_HOUSE,
            HandClass::Flush => MIDDLE_FLUSH,
            HandClass::Straight => MIDDLE_STRAIGHT,
            HandClass::ThreeOfAKind => MIDDLE_TRIPS,
            _ => 0,
        },
        Row::Bottom => match rank.class() {
            HandClass::StraightFlush if is_royal => BOTTOM_ROYAL_FLUSH,
            HandClass::StraightFlush => BOTTOM_STRAIGHT_FLUSH,
            HandClass::FourOfAKind => BOTTOM_QUADS,
            HandClass::FullHouse => BOTTOM_FULL_HOUSE,
            HandClass::Flush => BOTTOM_FLUSH,
            HandClass::Straight => BOTTOM_STRAIGHT,
            _ => 0,
        },
        Row::Top => unreachable!("five-card royalty called on the top row"),
    };
    Ok(points)
}

/// Royalty points for a single row. An incomplete row is worth 0.
pub fn row_royalty(row: Row, cards: &[Card]) -> Result<u32, EngineError> {
    match row {
        Row::Top => top_row_royalty(cards),
        Row::Middle | Row::Bottom => five_card_row_royalty(row, cards),
    }
}

/// Sum of royalties across all three rows. Callers should only trust this
/// once `board.is_complete()`, since incomplete rows silently contribute 0.
pub fn total_royalty(board: &Board) -> Result<u32, EngineError> {
    let mut total = 0;
    for row in Row::ALL {
        total += row_royalty(row, &board.row_cards(row))?;
    }
    Ok(total)
}

/// A completed board is fouled if its rows do not satisfy top <= middle <=
/// bottom in strength. Evaluator ranks are lower-is-stronger, so the
/// ordering check is on raw rank values, not `Ord` on hand class alone.
pub fn is_fouled(board: &Board) -> Result<bool, EngineError> {
    if !board.is_complete() {
        return Ok(false);
    }
    let top = evaluator3::evaluate3_slice(&board.row_cards(Row::Top))?;
    let middle = evaluator5::evaluate5_slice(&board.row_cards(Row::Middle))?;
    let bottom = evaluator5::evaluate5_slice(&board.row_cards(Row::Bottom))?;

    let top_vs_middle_ok = top_not_stronger_than_middle(top, middle);
    let middle_vs_bottom_ok = bottom <= middle; // bottom must be at least as strong
    Ok(!(top_vs_middle_ok && middle_vs_bottom_ok))
}

/// Whether a 3-card top row is legal under a 5-card middle row: the raw
/// dense ranks of the two evaluators live on incompatible scales (1..455
/// vs. 1..7462), so a literal numeric comparison is meaningless across
/// row widths. Hand *class* is compared instead, which is what the foul
/// check actually needs cross-width — a pair on top is legal beneath any
/// pair-or-better in the middle, regardless of the specific pair ranks.
///
/// A high-card top is the one exception: it is always a foul beneath a
/// pair-or-better middle, regardless of top's rank within the high-card
/// class. This reproduces the original evaluator's cross-scale
/// comparison, where the 3-card dense rank never exceeds 455 while the
/// 5-card pair band alone starts above 3325 — so a high-card top always
/// compares as weaker there too, not just by class tier.
fn top_not_stronger_than_middle(top: evaluator3::ThreeCardRank, middle: evaluator5::HandRank) -> bool {
    let top_class_rank = match top.class() {
        ThreeCardClass::HighCard => 0,
        ThreeCardClass::Pair => 1,
        ThreeCardClass::Trips => 2,
    };
    let middle_class_rank = match middle.class() {
        HandClass::HighCard => 0,
        HandClass::Pair => 1,
        HandClass::TwoPair | HandClass::ThreeOfAKind => 2,
        _ => 3,
    };
    if top_class_rank == 0 && middle_class_rank > 0 {
        return false;
    }
    top_class_rank <= middle_class_rank
}

/// Fantasy bonus earned by this board alone: a pair of queens/kings/aces
/// on top awards 15/20/25, trips award 30 plus the trip rank index. Zero
/// on a fouled or incomplete board, or a top row weaker than QQ.
///
/// `GameState` applies this additively at terminal time, never as a
/// short-circuit that ends the hand early — the short-circuit variant in
/// `ofc_game.py`'s `is_terminal` skips the remaining streets and is a bug,
/// not a rule, per DESIGN.md.
pub fn fantasy_bonus(board: &Board) -> Result<i64, EngineError> {
    if !board.is_complete() || is_fouled(board)? {
        return Ok(0);
    }
    let top = board.row_cards(Row::Top);
    let rank = evaluator3::evaluate3_slice(&top)?;
    Ok(match rank.class() {
        ThreeCardClass::Trips => FANTASY_TRIPS_BASE + top[0].rank_index() as i64,
        ThreeCardClass::Pair => match pair_rank_index(&top) {
            Some(FANTASY_RANK_QUEEN) => 15,
            Some(FANTASY_RANK_KING) => 20,
            Some(FANTASY_RANK_ACE) => 25,
            _ => 0,
        },
        ThreeCardClass::HighCard => 0,
    })
}

/// Head-to-head payoff between two completed boards, in line points.
///
/// A single fouled board loses all three rows to the non-fouler (so the
/// non-fouler's `6 + their own royalty` falls out of the same line-score
/// plus scoop-bonus plus royalty-differential arithmetic used for the
/// no-foul case, rather than needing a special-cased formula), and
/// forfeits its own royalty while the opponent's still counts.
pub fn payoff(a: &Board, b: &Board) -> Result<(i64, i64), EngineError> {
    let a_foul = is_fouled(a)?;
    let b_foul = is_fouled(b)?;

    if a_foul && b_foul {
        return Ok((0, 0));
    }

    let mut a_score = 0i64;
    let mut a_lines_won = 0i64;
    let mut b_lines_won = 0i64;

    for row in Row::ALL {
        let line = if a_foul {
            -1
        } else if b_foul {
            1
        } else {
            compare_row(row, &a.row_cards(row), &b.row_cards(row))?
        };
        a_score += line;
        match line {
            l if l > 0 => a_lines_won += 1,
            l if l < 0 => b_lines_won += 1,
            _ => {}
        }
    }

    let a_royalty = if a_foul { 0 } else { total_royalty(a)? as i64 };
    let b_royalty = if b_foul { 0 } else { total_royalty(b)? as i64 };
    a_score += a_royalty - b_royalty;

    if a_lines_won == 3 {
        a_score += SCOOP_BONUS;
    } else if b_lines_won == 3 {
        a_score -= SCOOP_BONUS;
    }

    Ok((a_score, -a_score))
}

fn compare_row(row: Row, a: &[Card], b: &[Card]) -> Result<i64, EngineError> {
    let ordering = match row {
        Row::Top => evaluator3::evaluate3_slice(a)?.cmp(&evaluator3::evaluate3_slice(b)?),
        Row::Middle | Row::Bottom => {
            evaluator5::evaluate5_slice(a)?.cmp(&evaluator5::evaluate5_slice(b)?)
        }
    };
    Ok(match ordering {
        std::cmp::Ordering::Less => 1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => -1,
    })
}
