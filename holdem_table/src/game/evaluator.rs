//! Hand ranking capability.
//!
//! The engine only needs two things from a hand ranker: turn seven cards into
//! a totally ordered score, and describe a score for humans. Anything that
//! implements [`HandEvaluator`] can be plugged into a table.

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

use super::entities::Card;

/// Opaque, totally ordered hand strength. Higher is better, equal scores
/// split the pot. Zero means "not ranked" (folded or incomplete board).
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandScore(pub i32);

pub trait HandEvaluator: Send + Sync {
    fn evaluate(&self, cards: &[Card; 7]) -> HandScore;
    fn describe(&self, score: HandScore) -> String;
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Rank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl Rank {
    const ALL: [Rank; 9] = [
        Rank::HighCard,
        Rank::OnePair,
        Rank::TwoPair,
        Rank::ThreeOfAKind,
        Rank::Straight,
        Rank::Flush,
        Rank::FullHouse,
        Rank::FourOfAKind,
        Rank::StraightFlush,
    ];
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
        };
        write!(f, "{repr}")
    }
}

// Score layout: rank category in bits 20.., then up to five 4-bit card
// values ordered by significance.
const CATEGORY_SHIFT: u32 = 20;

fn pack(rank: Rank, values: &[u8]) -> HandScore {
    let mut score = (rank as i32 + 1) << CATEGORY_SHIFT;
    for (i, value) in values.iter().take(5).enumerate() {
        score |= i32::from(*value) << (16 - 4 * i as u32);
    }
    HandScore(score)
}

fn unpack(score: HandScore) -> Option<(Rank, [u8; 5])> {
    let category = (score.0 >> CATEGORY_SHIFT) - 1;
    let rank = *Rank::ALL.get(usize::try_from(category).ok()?)?;
    let mut values = [0u8; 5];
    for (i, value) in values.iter_mut().enumerate() {
        *value = ((score.0 >> (16 - 4 * i as u32)) & 0xF) as u8;
    }
    Some((rank, values))
}

fn value_name(value: u8) -> &'static str {
    match value {
        2 => "2",
        3 => "3",
        4 => "4",
        5 => "5",
        6 => "6",
        7 => "7",
        8 => "8",
        9 => "9",
        10 => "T",
        11 => "J",
        12 => "Q",
        13 => "K",
        14 => "A",
        _ => "?",
    }
}

/// Best-five-of-seven ranker. Tries all 21 five card subsets.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardEvaluator;

impl StandardEvaluator {
    /// Score exactly five cards.
    #[must_use]
    pub fn evaluate_five(cards: &[Card; 5]) -> HandScore {
        let mut values: Vec<u8> = cards.iter().map(Card::rank).collect();
        values.sort_unstable_by(|a, b| b.cmp(a));

        let is_flush = cards.iter().all(|c| c.suit() == cards[0].suit());
        let mut distinct = values.clone();
        distinct.dedup();
        let straight_high = if distinct.len() == 5 {
            if distinct[0] - distinct[4] == 4 {
                Some(distinct[0])
            } else if distinct == [14, 5, 4, 3, 2] {
                Some(5)
            } else {
                None
            }
        } else {
            None
        };

        // (count, value) groups, biggest group first, then highest value.
        let mut groups: Vec<(usize, u8)> = distinct
            .iter()
            .map(|v| (values.iter().filter(|x| *x == v).count(), *v))
            .collect();
        groups.sort_unstable_by(|a, b| match b.0.cmp(&a.0) {
            Ordering::Equal => b.1.cmp(&a.1),
            other => other,
        });
        let ordered: Vec<u8> = groups.iter().map(|(_, v)| *v).collect();
        let shape: Vec<usize> = groups.iter().map(|(n, _)| *n).collect();

        match (straight_high, is_flush, shape.as_slice()) {
            (Some(high), true, _) => pack(Rank::StraightFlush, &[high]),
            (_, _, [4, 1]) => pack(Rank::FourOfAKind, &ordered),
            (_, _, [3, 2]) => pack(Rank::FullHouse, &ordered),
            (_, true, _) => pack(Rank::Flush, &values),
            (Some(high), false, _) => pack(Rank::Straight, &[high]),
            (_, _, [3, 1, 1]) => pack(Rank::ThreeOfAKind, &ordered),
            (_, _, [2, 2, 1]) => pack(Rank::TwoPair, &ordered),
            (_, _, [2, 1, 1, 1]) => pack(Rank::OnePair, &ordered),
            _ => pack(Rank::HighCard, &values),
        }
    }

    #[must_use]
    pub fn rank_of(score: HandScore) -> Option<Rank> {
        unpack(score).map(|(rank, _)| rank)
    }
}

impl HandEvaluator for StandardEvaluator {
    fn evaluate(&self, cards: &[Card; 7]) -> HandScore {
        if cards.iter().any(|c| !c.is_valid()) {
            return HandScore::default();
        }
        let mut best = HandScore::default();
        for skip_a in 0..7 {
            for skip_b in (skip_a + 1)..7 {
                let mut five = [Card::BLANK; 5];
                let mut n = 0;
                for (i, card) in cards.iter().enumerate() {
                    if i != skip_a && i != skip_b {
                        five[n] = *card;
                        n += 1;
                    }
                }
                best = best.max(Self::evaluate_five(&five));
            }
        }
        best
    }

    fn describe(&self, score: HandScore) -> String {
        let Some((rank, values)) = unpack(score) else {
            return "unranked".to_string();
        };
        let [a, b, ..] = values.map(value_name);
        match rank {
            Rank::HighCard | Rank::Flush | Rank::Straight | Rank::StraightFlush => {
                format!("{rank}, {a} high")
            }
            Rank::OnePair => format!("pair of {a}s"),
            Rank::TwoPair => format!("two pair, {a}s and {b}s"),
            Rank::ThreeOfAKind => format!("three {a}s"),
            Rank::FullHouse => format!("full house, {a}s full of {b}s"),
            Rank::FourOfAKind => format!("four {a}s"),
        }
    }
}
