use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::constants::DECK_SIZE;

/// Type alias for whole chips. Stacks, bets and pots are all counted in
/// chips and travel as `i32` on the wire.
pub type Chips = i32;

/// Type alias for a player's identity as assigned by the session layer.
pub type PlayerId = i32;

/// Type alias for a stable seat number. It's assigned at sit-down and never
/// changes until the seat is vacated, unlike a seat's position in the seat list.
pub type SeatIndex = i32;

/// A card is a rank (2..=14, ace high) and a suit (0..=3).
///
/// The default card is a blank placeholder. It is never valid and renders as
/// `??`, which is also how masked hole cards look to other viewers.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    rank: u8,
    suit: u8,
}

impl Card {
    pub const RANK_MIN: u8 = 2;
    pub const RANK_MAX: u8 = 14;
    pub const SUIT_COUNT: u8 = 4;

    /// Blank placeholder card.
    pub const BLANK: Card = Card { rank: 0, suit: 0 };

    #[must_use]
    pub const fn new(rank: u8, suit: u8) -> Self {
        Self { rank, suit }
    }

    #[must_use]
    pub const fn rank(&self) -> u8 {
        self.rank
    }

    #[must_use]
    pub const fn suit(&self) -> u8 {
        self.suit
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.rank >= Self::RANK_MIN && self.rank <= Self::RANK_MAX && self.suit < Self::SUIT_COUNT
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "??");
        }
        let rank = match self.rank {
            10 => "T".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            14 => "A".to_string(),
            v => v.to_string(),
        };
        let suit = match self.suit {
            0 => "♠",
            1 => "♥",
            2 => "♦",
            _ => "♣",
        };
        write!(f, "{rank}{suit}")
    }
}

#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Put all 52 rank/suit combinations back into the deck, in order.
    pub fn reset_52(&mut self) {
        self.cards.clear();
        for suit in 0..Card::SUIT_COUNT {
            for rank in Card::RANK_MIN..=Card::RANK_MAX {
                self.cards.push(Card::new(rank, suit));
            }
        }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Take the top card. Returns `None` once the deck is exhausted.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut deck = Self {
            cards: Vec::with_capacity(DECK_SIZE),
        };
        deck.reset_52();
        deck
    }
}

/// Betting stages of a hand. `Waiting` is the resting state between hands.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[repr(u8)]
pub enum Stage {
    #[default]
    Waiting = 0,
    PreFlop = 1,
    Flop = 2,
    Turn = 3,
    River = 4,
    Showdown = 5,
}

impl TryFrom<u8> for Stage {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Waiting),
            1 => Ok(Self::PreFlop),
            2 => Ok(Self::Flop),
            3 => Ok(Self::Turn),
            4 => Ok(Self::River),
            5 => Ok(Self::Showdown),
            other => Err(other),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// Player intents understood by the engine.
///
/// The amount that accompanies an action means a different thing per
/// variant: the desired total for `Bet`, the increment over the current bet
/// for `Raise`, and nothing at all for the others.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[repr(u8)]
pub enum Action {
    CheckCall = 0,
    Bet = 1,
    Raise = 2,
    AllIn = 3,
    Fold = 4,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::CheckCall => "checks/calls",
            Self::Bet => "bets",
            Self::Raise => "raises",
            Self::AllIn => "goes all-in",
            Self::Fold => "folds",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ActionResult {
    Success,
    Invalid,
    /// The table was waiting between hands. A hand may have been started as
    /// a side effect.
    Ignored,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SetBlindsResult {
    Success,
    GameInProgress,
    PlayersSeated,
    InvalidValue,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BuyInResult {
    Success,
    BelowMinimum,
    PlayerNotFound,
    AlreadyInHand,
    /// The table would hold more than `MAX_TABLE_CHIPS`.
    ExceedsTableLimit,
}

/// Errors from seat management outside of betting.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum SeatError {
    #[error("player already has a seat")]
    AlreadySeated,
    #[error("blinds are not set")]
    BlindsNotSet,
    #[error("table is full")]
    TableFull,
    #[error("player is not seated")]
    PlayerNotFound,
    #[error("need >= {big_blind} chips for the big blind")]
    InsufficientChips { big_blind: Chips },
    #[error("player is in a hand")]
    InHand,
}

/// One player's state at the table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Seat {
    pub seat_index: SeatIndex,
    pub player_id: Option<PlayerId>,
    pub chips: Chips,
    /// Chips put in during the current betting round.
    pub current_bet: Chips,
    pub total_bet_this_hand: Chips,
    pub hole: [Card; 2],
    pub in_hand: bool,
    pub folded: bool,
    pub all_in: bool,
    pub sitting_out: bool,
    pub auto_mode: bool,
    pub pending_leave: bool,
    pub acted_this_round: bool,
}

impl Seat {
    #[must_use]
    pub fn new(seat_index: SeatIndex, player_id: PlayerId) -> Self {
        Self {
            seat_index,
            player_id: Some(player_id),
            sitting_out: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.player_id.is_some()
    }

    #[must_use]
    pub fn can_act(&self) -> bool {
        self.is_occupied() && self.in_hand && !self.folded && !self.all_in
    }

    /// In the hand and not folded. All-in seats are live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.is_occupied() && self.in_hand && !self.folded
    }

    /// The largest total this seat could have in front of it this round.
    #[must_use]
    pub fn max_total(&self) -> Chips {
        self.current_bet + self.chips
    }

    /// Move chips from the stack into the current bet, flagging all-in when
    /// the stack runs dry.
    pub(crate) fn commit(&mut self, amount: Chips) {
        let amount = amount.clamp(0, self.chips);
        self.chips -= amount;
        self.current_bet += amount;
        self.total_bet_this_hand += amount;
        if self.chips == 0 {
            self.all_in = true;
        }
    }

    /// Clear everything that only lives for one hand.
    pub fn reset_hand(&mut self) {
        self.current_bet = 0;
        self.total_bet_this_hand = 0;
        self.hole = [Card::BLANK; 2];
        self.in_hand = false;
        self.folded = false;
        self.all_in = false;
        self.acted_this_round = false;
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.player_id {
            Some(player_id) => write!(
                f,
                "seat {}: player {player_id}, {} chips",
                self.seat_index, self.chips
            )?,
            None => write!(f, "seat {}: empty", self.seat_index)?,
        }
        if self.current_bet > 0 {
            write!(f, ", bet {}", self.current_bet)?;
        }
        for (flag, repr) in [
            (self.in_hand, "in hand"),
            (self.folded, "folded"),
            (self.all_in, "all-in"),
            (self.sitting_out, "sitting out"),
            (self.auto_mode, "auto"),
            (self.pending_leave, "leaving"),
        ] {
            if flag {
                write!(f, " [{repr}]")?;
            }
        }
        Ok(())
    }
}

/// A pot and the players that can win it. Eligibility is fixed when the pot
/// is formed.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SidePot {
    pub amount: Chips,
    pub eligible_player_ids: Vec<PlayerId>,
}

impl fmt::Display for SidePot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let eligible = self
            .eligible_player_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} chips ({eligible})", self.amount)
    }
}
