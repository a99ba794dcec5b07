//! Settled outcome of a hand, detached from live table state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    entities::{Card, Chips, PlayerId},
    evaluator::{HandEvaluator, HandScore},
};
use crate::net::{
    errors::Result,
    pack::{PackReader, PackWriter},
};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerHandResult {
    pub player_id: PlayerId,
    /// Zero for folded players and for hands that never reached a full board.
    pub hand_rank: HandScore,
    pub chips_won: Chips,
    pub hole_cards: [Card; 2],
    pub folded: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandResult {
    pub total_pot: Chips,
    pub community_cards: Vec<Card>,
    pub player_results: Vec<PlayerHandResult>,
}

impl HandResult {
    /// Players that took chips from the pot.
    pub fn winners(&self) -> impl Iterator<Item = &PlayerHandResult> {
        self.player_results.iter().filter(|pr| pr.chips_won > 0)
    }

    #[must_use]
    pub fn result_for(&self, player_id: PlayerId) -> Option<&PlayerHandResult> {
        self.player_results
            .iter()
            .find(|pr| pr.player_id == player_id)
    }

    /// Folded players' hole cards are never written.
    pub fn write(&self, writer: &mut PackWriter) -> Result<()> {
        writer.write_i32(self.total_pot);

        writer.write_count(self.community_cards.len())?;
        for card in &self.community_cards {
            card.write(writer);
        }

        writer.write_count(self.player_results.len())?;
        for pr in &self.player_results {
            writer.write_i32(pr.player_id);
            writer.write_i32(pr.hand_rank.0);
            writer.write_i32(pr.chips_won);
            writer.write_bool(pr.folded);
            let hole = if pr.folded {
                [Card::BLANK; 2]
            } else {
                pr.hole_cards
            };
            for card in &hole {
                card.write(writer);
            }
        }
        Ok(())
    }

    pub fn read(reader: &mut PackReader) -> Result<Self> {
        let total_pot = reader.read_i32()?;

        let community_count = reader.read_u8()?;
        let community_cards = (0..community_count)
            .map(|_| Card::read(reader))
            .collect::<Result<Vec<_>>>()?;

        let player_count = reader.read_u8()?;
        let mut player_results = Vec::with_capacity(player_count.into());
        for _ in 0..player_count {
            player_results.push(PlayerHandResult {
                player_id: reader.read_i32()?,
                hand_rank: HandScore(reader.read_i32()?),
                chips_won: reader.read_i32()?,
                folded: reader.read_bool()?,
                hole_cards: [Card::read(reader)?, Card::read(reader)?],
            });
        }

        Ok(Self {
            total_pot,
            community_cards,
            player_results,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = PackWriter::new();
        self.write(&mut writer)?;
        Ok(writer.into_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = PackReader::new(bytes);
        let result = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(result)
    }

    /// Render with hand descriptions from `evaluator`.
    #[must_use]
    pub fn display<'a>(&'a self, evaluator: &'a dyn HandEvaluator) -> HandResultDisplay<'a> {
        HandResultDisplay {
            result: self,
            evaluator,
        }
    }
}

pub struct HandResultDisplay<'a> {
    result: &'a HandResult,
    evaluator: &'a dyn HandEvaluator,
}

impl fmt::Display for HandResultDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        writeln!(f, "=== hand result: pot {} ===", result.total_pot)?;
        let board = result
            .community_cards
            .iter()
            .filter(|c| c.is_valid())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(f, "board: {board}")?;
        for pr in &result.player_results {
            write!(f, "  player {}: ", pr.player_id)?;
            if pr.folded {
                write!(f, "folded")?;
            } else {
                write!(f, "{} {}", pr.hole_cards[0], pr.hole_cards[1])?;
                if pr.hand_rank > HandScore::default() {
                    write!(f, " ({})", self.evaluator.describe(pr.hand_rank))?;
                }
            }
            if pr.chips_won > 0 {
                write!(f, " won {}", pr.chips_won)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
