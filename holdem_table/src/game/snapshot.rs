//! Per-viewer view of a table.
//!
//! A snapshot is what one player is allowed to know: every seat's public
//! state plus their own hole cards (and everyone's live cards at showdown).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    engine::HoldemPokerGame,
    entities::{Card, Chips, PlayerId, Seat, SidePot, Stage},
    wire::NO_PLAYER,
};
use crate::net::{
    errors::{Result, SerializationError},
    pack::{PackReader, PackWriter},
};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatSnapshot {
    pub seat: Seat,
    /// Whether `seat.hole` is real or blanked for this viewer.
    pub show_hole: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub stage: Stage,
    pub total_pot: Chips,
    pub acting_player_id: Option<PlayerId>,
    pub last_bet: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub side_pots: Vec<SidePot>,
    pub community: Vec<Card>,
    pub seats: Vec<SeatSnapshot>,
}

impl TableSnapshot {
    /// Build the view of `game` as seen by `viewer`.
    #[must_use]
    pub fn build(game: &HoldemPokerGame, viewer: PlayerId) -> Self {
        let stage = game.stage();
        let seats = game
            .seats()
            .iter()
            .map(|seat| {
                let own = seat.player_id == Some(viewer);
                let revealed = stage == Stage::Showdown && seat.in_hand && !seat.folded;
                let show_hole = own || revealed;
                let mut seat = seat.clone();
                if !show_hole {
                    seat.hole = [Card::BLANK; 2];
                }
                SeatSnapshot { seat, show_hole }
            })
            .collect();

        Self {
            stage,
            total_pot: game.total_pot(),
            acting_player_id: game.acting_player_id(),
            last_bet: game.last_bet(),
            small_blind: game.small_blind(),
            big_blind: game.big_blind(),
            side_pots: game.side_pots().to_vec(),
            community: game.community().to_vec(),
            seats,
        }
    }

    #[must_use]
    pub fn seat_of(&self, player_id: PlayerId) -> Option<&Seat> {
        self.seats
            .iter()
            .map(|s| &s.seat)
            .find(|s| s.player_id == Some(player_id))
    }

    pub fn write(&self, writer: &mut PackWriter) -> Result<()> {
        writer.write_u8(self.stage as u8);
        writer.write_i32(self.total_pot);
        writer.write_i32(self.acting_player_id.unwrap_or(NO_PLAYER));
        writer.write_i32(self.last_bet);
        writer.write_i32(self.small_blind);
        writer.write_i32(self.big_blind);

        writer.write_count(self.side_pots.len())?;
        for pot in &self.side_pots {
            writer.write_i32(pot.amount);
            writer.write_count(pot.eligible_player_ids.len())?;
            for player_id in &pot.eligible_player_ids {
                writer.write_i32(*player_id);
            }
        }

        writer.write_count(self.community.len())?;
        for card in &self.community {
            card.write(writer);
        }

        writer.write_count(self.seats.len())?;
        for seat in &self.seats {
            seat.seat.write(writer, seat.show_hole);
        }
        Ok(())
    }

    pub fn read(reader: &mut PackReader) -> Result<Self> {
        let stage_byte = reader.read_u8()?;
        let stage = Stage::try_from(stage_byte).map_err(|b| {
            SerializationError::InvalidFormat(format!("unknown stage {b}"))
        })?;
        let total_pot = reader.read_i32()?;
        let acting_player_id = Some(reader.read_i32()?).filter(|id| *id >= 0);
        let last_bet = reader.read_i32()?;
        let small_blind = reader.read_i32()?;
        let big_blind = reader.read_i32()?;

        let pot_count = reader.read_u8()?;
        let mut side_pots = Vec::with_capacity(pot_count.into());
        for _ in 0..pot_count {
            let amount = reader.read_i32()?;
            let eligible_count = reader.read_u8()?;
            let eligible_player_ids = (0..eligible_count)
                .map(|_| reader.read_i32())
                .collect::<Result<Vec<_>>>()?;
            side_pots.push(SidePot {
                amount,
                eligible_player_ids,
            });
        }

        let community_count = reader.read_u8()?;
        let community = (0..community_count)
            .map(|_| Card::read(reader))
            .collect::<Result<Vec<_>>>()?;

        let seat_count = reader.read_u8()?;
        let mut seats = Vec::with_capacity(seat_count.into());
        for _ in 0..seat_count {
            let seat = Seat::read(reader)?;
            let show_hole = seat.hole.iter().any(Card::is_valid);
            seats.push(SeatSnapshot { seat, show_hole });
        }

        Ok(Self {
            stage,
            total_pot,
            acting_player_id,
            last_bet,
            small_blind,
            big_blind,
            side_pots,
            community,
            seats,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = PackWriter::new();
        self.write(&mut writer)?;
        Ok(writer.into_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = PackReader::new(bytes);
        let snapshot = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(snapshot)
    }
}

impl fmt::Display for TableSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | blinds {}/{} | pot {}",
            self.stage, self.small_blind, self.big_blind, self.total_pot
        )?;
        if self.last_bet > 0 {
            write!(f, " | to call {}", self.last_bet)?;
        }
        writeln!(f)?;

        if !self.community.is_empty() {
            let board = self
                .community
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "board: {board}")?;
        }
        for pot in &self.side_pots {
            writeln!(f, "{pot}")?;
        }
        for SeatSnapshot { seat, .. } in &self.seats {
            let marker = if seat.player_id.is_some() && seat.player_id == self.acting_player_id {
                ">"
            } else {
                " "
            };
            writeln!(f, "{marker} {seat}")?;
        }
        Ok(())
    }
}
