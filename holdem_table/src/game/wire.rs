//! Wire layout of the leaf entities: cards and seat records.

use super::entities::{Card, Seat};
use crate::net::{
    errors::Result,
    pack::{PackReader, PackWriter},
};

const FLAG_IN_HAND: u8 = 1 << 0;
const FLAG_FOLDED: u8 = 1 << 1;
const FLAG_ALL_IN: u8 = 1 << 2;
const FLAG_SITTING_OUT: u8 = 1 << 3;
const FLAG_AUTO_MODE: u8 = 1 << 4;
const FLAG_PENDING_LEAVE: u8 = 1 << 5;
const FLAG_ACTED: u8 = 1 << 6;

/// Player id written for an empty seat or "nobody".
pub const NO_PLAYER: i32 = -1;

impl Card {
    pub fn write(&self, writer: &mut PackWriter) {
        writer.write_u8(self.rank());
        writer.write_u8(self.suit());
    }

    /// Read a card as-is. Blank placeholders are accepted; callers check
    /// [`Card::is_valid`] before showing one.
    pub fn read(reader: &mut PackReader) -> Result<Self> {
        let rank = reader.read_u8()?;
        let suit = reader.read_u8()?;
        Ok(Self::new(rank, suit))
    }
}

impl Seat {
    /// Write the seat record. Hole cards are blanked unless `show_hole` is set.
    pub fn write(&self, writer: &mut PackWriter, show_hole: bool) {
        writer.write_i32(self.seat_index);
        writer.write_i32(self.player_id.unwrap_or(NO_PLAYER));
        writer.write_i32(self.chips);
        writer.write_i32(self.current_bet);
        writer.write_i32(self.total_bet_this_hand);

        let mut flags = 0u8;
        for (set, bit) in [
            (self.in_hand, FLAG_IN_HAND),
            (self.folded, FLAG_FOLDED),
            (self.all_in, FLAG_ALL_IN),
            (self.sitting_out, FLAG_SITTING_OUT),
            (self.auto_mode, FLAG_AUTO_MODE),
            (self.pending_leave, FLAG_PENDING_LEAVE),
            (self.acted_this_round, FLAG_ACTED),
        ] {
            if set {
                flags |= bit;
            }
        }
        writer.write_u8(flags);

        let hole = if show_hole {
            self.hole
        } else {
            [Card::BLANK; 2]
        };
        for card in &hole {
            card.write(writer);
        }
    }

    pub fn read(reader: &mut PackReader) -> Result<Self> {
        let seat_index = reader.read_i32()?;
        let player_id = Some(reader.read_i32()?).filter(|id| *id >= 0);
        let chips = reader.read_i32()?;
        let current_bet = reader.read_i32()?;
        let total_bet_this_hand = reader.read_i32()?;
        let flags = reader.read_u8()?;
        let hole = [Card::read(reader)?, Card::read(reader)?];
        Ok(Self {
            seat_index,
            player_id,
            chips,
            current_bet,
            total_bet_this_hand,
            hole,
            in_hand: flags & FLAG_IN_HAND != 0,
            folded: flags & FLAG_FOLDED != 0,
            all_in: flags & FLAG_ALL_IN != 0,
            sitting_out: flags & FLAG_SITTING_OUT != 0,
            auto_mode: flags & FLAG_AUTO_MODE != 0,
            pending_leave: flags & FLAG_PENDING_LEAVE != 0,
            acted_this_round: flags & FLAG_ACTED != 0,
        })
    }
}
