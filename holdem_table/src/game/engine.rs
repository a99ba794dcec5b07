//! The Hold'em table engine.
//!
//! [`HoldemPokerGame`] owns every seat, the deck, the board and the pots of a
//! single table and enforces the betting rules. It isn't synchronized; one
//! owner (see [`crate::table::TableActor`]) feeds it one command at a time.
//!
//! Every mutating operation validates first and mutates second, so a rejected
//! command leaves the table exactly as it was.

use log::{debug, error, info};
use rand::{SeedableRng, rngs::StdRng};
use std::{collections::HashMap, fmt, sync::Arc};

use super::{
    constants::{BOARD_SIZE, MAX_SEATS, MAX_TABLE_CHIPS, MIN_BUY_IN_BIG_BLINDS},
    entities::{
        Action, ActionResult, BuyInResult, Card, Chips, Deck, PlayerId, Seat, SeatError,
        SeatIndex, SetBlindsResult, SidePot, Stage,
    },
    evaluator::{HandEvaluator, HandScore, StandardEvaluator},
    result::{HandResult, PlayerHandResult},
    snapshot::TableSnapshot,
};
use crate::net::{errors::Result, pack::PackWriter};

/// An accepted action, resolved to the seat's new total bet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Move {
    Fold,
    Call(Chips),
    /// First bet of the round.
    Open(Chips),
    Raise(Chips),
}

pub struct HoldemPokerGame {
    max_seats: usize,
    /// Sorted by `seat_index`.
    seats: Vec<Seat>,
    deck: Deck,
    community: Vec<Card>,
    side_pots: Vec<SidePot>,
    stage: Stage,
    small_blind: Chips,
    big_blind: Chips,
    min_buy_in: Chips,
    last_bet: Chips,
    last_raise: Chips,
    /// Dealer and acting seat, by stable seat index rather than list position.
    button: Option<SeatIndex>,
    acting: Option<SeatIndex>,
    lock_blinds_when_seated: bool,
    last_hand_result: Option<HandResult>,
    hand_result_pending: bool,
    evaluator: Arc<dyn HandEvaluator>,
    rng: StdRng,
}

impl fmt::Debug for HoldemPokerGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoldemPokerGame")
            .field("stage", &self.stage)
            .field("seats", &self.seats)
            .field("community", &self.community)
            .field("side_pots", &self.side_pots)
            .field("blinds", &(self.small_blind, self.big_blind))
            .field("last_bet", &self.last_bet)
            .field("last_raise", &self.last_raise)
            .field("button", &self.button)
            .field("acting", &self.acting)
            .finish_non_exhaustive()
    }
}

impl HoldemPokerGame {
    /// `max_seats` is clamped so that a single deck always covers every hole
    /// card plus the board.
    #[must_use]
    pub fn new(max_seats: usize, evaluator: Arc<dyn HandEvaluator>, rng: StdRng) -> Self {
        let max_seats = max_seats.clamp(2, MAX_SEATS);
        Self {
            max_seats,
            seats: Vec::with_capacity(max_seats),
            deck: Deck::default(),
            community: Vec::with_capacity(BOARD_SIZE),
            side_pots: Vec::new(),
            stage: Stage::Waiting,
            small_blind: 0,
            big_blind: 0,
            min_buy_in: 0,
            last_bet: 0,
            last_raise: 0,
            button: None,
            acting: None,
            lock_blinds_when_seated: false,
            last_hand_result: None,
            hand_result_pending: false,
            evaluator,
            rng,
        }
    }

    #[must_use]
    pub fn with_seed(max_seats: usize, seed: u64) -> Self {
        Self::new(
            max_seats,
            Arc::new(StandardEvaluator),
            StdRng::seed_from_u64(seed),
        )
    }

    #[must_use]
    pub fn with_entropy(max_seats: usize) -> Self {
        Self::new(max_seats, Arc::new(StandardEvaluator), StdRng::from_os_rng())
    }

    /// Refuse blind changes while anyone is seated.
    pub fn set_lock_blinds_when_seated(&mut self, lock: bool) {
        self.lock_blinds_when_seated = lock;
    }

    // === Lookups ===

    fn position_of(&self, seat_index: SeatIndex) -> Option<usize> {
        self.seats.iter().position(|s| s.seat_index == seat_index)
    }

    fn position_of_player(&self, player_id: PlayerId) -> Option<usize> {
        self.seats
            .iter()
            .position(|s| s.player_id == Some(player_id))
    }

    fn button_pos(&self) -> Option<usize> {
        self.button.and_then(|idx| self.position_of(idx))
    }

    fn acting_pos(&self) -> Option<usize> {
        self.acting.and_then(|idx| self.position_of(idx))
    }

    fn seat_mut(&mut self, player_id: PlayerId) -> std::result::Result<&mut Seat, SeatError> {
        self.seats
            .iter_mut()
            .find(|s| s.player_id == Some(player_id))
            .ok_or(SeatError::PlayerNotFound)
    }

    /// First position at or after `start` (circularly) whose seat is in the
    /// hand.
    #[must_use]
    pub fn find_next_valid_blind_position(&self, start: usize) -> Option<usize> {
        let n = self.seats.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&pos| self.seats[pos].in_hand)
    }

    /// First position at or after `start` (circularly) whose seat can act.
    fn next_active_index(&self, start: usize) -> Option<usize> {
        let n = self.seats.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&pos| self.seats[pos].can_act())
    }

    fn blind_positions(&self) -> Option<(usize, usize)> {
        let button = self.button_pos()?;
        let sb = self.find_next_valid_blind_position(button + 1)?;
        let bb = self.find_next_valid_blind_position(sb + 1)?;
        Some((sb, bb))
    }

    fn is_seat_active(&self, seat: &Seat) -> bool {
        seat.is_occupied() && !seat.sitting_out && seat.chips >= self.big_blind
    }

    fn active_seat_count(&self) -> usize {
        self.seats.iter().filter(|s| self.is_seat_active(s)).count()
    }

    fn are_blinds_set(&self) -> bool {
        self.small_blind > 0 && self.big_blind > 0
    }

    // === Seat and session management ===

    /// Seat `player_id` at the lowest free seat index.
    pub fn sit_down(&mut self, player_id: PlayerId) -> std::result::Result<SeatIndex, SeatError> {
        if self.position_of_player(player_id).is_some() {
            return Err(SeatError::AlreadySeated);
        }
        if !self.are_blinds_set() {
            return Err(SeatError::BlindsNotSet);
        }
        let seat_index = (0..self.max_seats)
            .filter_map(|i| SeatIndex::try_from(i).ok())
            .find(|i| self.position_of(*i).is_none())
            .ok_or(SeatError::TableFull)?;

        let at = self.seats.partition_point(|s| s.seat_index < seat_index);
        self.seats.insert(at, Seat::new(seat_index, player_id));
        info!("player {player_id} sat down at seat {seat_index}");
        Ok(seat_index)
    }

    pub fn buy_in(&mut self, player_id: PlayerId, amount: Chips) -> BuyInResult {
        let min_buy_in = self.min_buy_in;
        let big_blind = self.big_blind;
        let on_table = self.chips_on_table();
        let Ok(seat) = self.seat_mut(player_id) else {
            return BuyInResult::PlayerNotFound;
        };
        if amount <= 0 || amount < min_buy_in {
            return BuyInResult::BelowMinimum;
        }
        if seat.in_hand {
            return BuyInResult::AlreadyInHand;
        }
        if on_table + i64::from(amount) > i64::from(MAX_TABLE_CHIPS) {
            return BuyInResult::ExceedsTableLimit;
        }

        seat.chips += amount;
        if seat.chips >= big_blind && seat.sitting_out {
            seat.sitting_out = false;
        }
        info!("player {player_id} bought in for {amount}");
        BuyInResult::Success
    }

    /// Sit out from the next hand. A seat still in a hand switches to
    /// auto-play instead of being pulled out.
    pub fn stand_up(&mut self, player_id: PlayerId) -> std::result::Result<(), SeatError> {
        let seat = self.seat_mut(player_id)?;
        seat.sitting_out = true;
        if seat.in_hand {
            seat.auto_mode = true;
        }
        Ok(())
    }

    pub fn sit_back(&mut self, player_id: PlayerId) -> std::result::Result<(), SeatError> {
        let big_blind = self.big_blind;
        let seat = self.seat_mut(player_id)?;
        if seat.chips < big_blind {
            return Err(SeatError::InsufficientChips { big_blind });
        }
        seat.sitting_out = false;
        seat.auto_mode = false;
        Ok(())
    }

    /// Queue the seat for removal between hands. Until then it auto-plays.
    pub fn mark_pending_leave(&mut self, player_id: PlayerId) -> std::result::Result<(), SeatError> {
        let seat = self.seat_mut(player_id)?;
        seat.pending_leave = true;
        seat.auto_mode = true;
        info!("player {player_id} will leave after the hand");
        Ok(())
    }

    /// Delete seats that are empty or waiting to leave and not in a hand.
    /// Returns the players that were removed.
    pub fn remove_pending_leavers(&mut self) -> Vec<PlayerId> {
        fn vacated(seat: &Seat) -> bool {
            !seat.is_occupied() || (seat.pending_leave && !seat.in_hand)
        }

        if !self.seats.iter().any(vacated) {
            return Vec::new();
        }

        // Keep the button where it was. If its seat goes away, anchor it on
        // the nearest surviving seat before it so rotation carries on.
        if let Some(pos) = self.button_pos() {
            if vacated(&self.seats[pos]) {
                let n = self.seats.len();
                self.button = (1..n)
                    .map(|k| (pos + n - k) % n)
                    .find(|&p| !vacated(&self.seats[p]))
                    .map(|p| self.seats[p].seat_index);
            }
        }
        if let Some(pos) = self.acting_pos() {
            if vacated(&self.seats[pos]) {
                self.acting = None;
            }
        }

        let removed: Vec<PlayerId> = self
            .seats
            .iter()
            .filter(|s| vacated(s))
            .filter_map(|s| s.player_id)
            .collect();
        self.seats.retain(|s| !vacated(s));

        if self.seats.is_empty() {
            self.button = None;
            self.acting = None;
        }
        for player_id in &removed {
            info!("player {player_id} left the table");
        }
        removed
    }

    /// Take the whole stack off the table. Refused (returns 0) mid-hand.
    pub fn cash_out(&mut self, player_id: PlayerId) -> Chips {
        let Ok(seat) = self.seat_mut(player_id) else {
            return 0;
        };
        if seat.in_hand {
            return 0;
        }
        let chips = seat.chips;
        seat.chips = 0;
        seat.sitting_out = true;
        info!("player {player_id} cashed out {chips}");
        chips
    }

    // === Blinds ===

    pub fn set_blinds(&mut self, small_blind: Chips, big_blind: Chips) -> SetBlindsResult {
        if self.stage != Stage::Waiting {
            return SetBlindsResult::GameInProgress;
        }
        if self.lock_blinds_when_seated && self.seats.iter().any(Seat::is_occupied) {
            return SetBlindsResult::PlayersSeated;
        }
        if small_blind <= 0 || big_blind <= 0 {
            return SetBlindsResult::InvalidValue;
        }

        self.small_blind = small_blind;
        self.big_blind = big_blind;
        self.min_buy_in = big_blind.saturating_mul(MIN_BUY_IN_BIG_BLINDS);
        info!("blinds set to {small_blind}/{big_blind}");
        SetBlindsResult::Success
    }

    // === Hand lifecycle ===

    #[must_use]
    pub fn can_start(&self) -> bool {
        self.are_blinds_set() && self.stage == Stage::Waiting && self.active_seat_count() >= 2
    }

    fn check_and_sit_out_broke_players(&mut self) {
        let big_blind = self.big_blind;
        for seat in &mut self.seats {
            if seat.is_occupied() && seat.chips < big_blind && !seat.sitting_out {
                seat.sitting_out = true;
            }
        }
    }

    /// Start a new hand. Returns false if the table can't start one.
    pub fn start_hand(&mut self) -> bool {
        if !self.can_start() {
            return false;
        }
        self.check_and_sit_out_broke_players();
        if self.active_seat_count() < 2 {
            return false;
        }

        self.stage = Stage::PreFlop;
        self.community.clear();
        self.side_pots.clear();
        self.deck.reset_52();
        self.deck.shuffle(&mut self.rng);

        let big_blind = self.big_blind;
        for seat in &mut self.seats {
            seat.reset_hand();
            seat.in_hand = seat.is_occupied() && !seat.sitting_out && seat.chips >= big_blind;
        }

        let start = self.button_pos().map_or(0, |pos| pos + 1);
        self.button = self
            .find_next_valid_blind_position(start)
            .map(|pos| self.seats[pos].seat_index);

        self.post_blinds();
        for seat in &mut self.seats {
            seat.acted_this_round = false;
        }
        self.deal_hole_cards();

        self.acting = self
            .blind_positions()
            .and_then(|(_, bb)| self.next_active_index(bb + 1))
            .map(|pos| self.seats[pos].seat_index);

        info!(
            "hand started: dealer seat {:?}, {} players, blinds {}/{}",
            self.button,
            self.seats.iter().filter(|s| s.in_hand).count(),
            self.small_blind,
            self.big_blind
        );

        // Blinds alone can leave nobody able to bet.
        self.resolve_if_needed();
        true
    }

    fn post_blinds(&mut self) {
        let Some((sb_pos, bb_pos)) = self.blind_positions() else {
            error!("no blind positions with a hand in progress");
            return;
        };

        let sb_seat = &mut self.seats[sb_pos];
        let sb_amount = self.small_blind.min(sb_seat.chips);
        sb_seat.commit(sb_amount);

        let bb_seat = &mut self.seats[bb_pos];
        let bb_amount = self.big_blind.min(bb_seat.chips);
        bb_seat.commit(bb_amount);

        self.last_bet = sb_amount.max(bb_amount);
        self.last_raise = self.big_blind;
    }

    fn draw_card(&mut self) -> Card {
        self.deck.draw().unwrap_or_else(|| {
            error!("deck exhausted");
            Card::BLANK
        })
    }

    fn deal_hole_cards(&mut self) {
        for pos in 0..self.seats.len() {
            if !self.seats[pos].in_hand {
                continue;
            }
            let hole = [self.draw_card(), self.draw_card()];
            self.seats[pos].hole = hole;
        }
    }

    fn deal_community(&mut self, count: usize) {
        for _ in 0..count {
            let card = self.draw_card();
            self.community.push(card);
        }
    }

    // === Betting ===

    /// The most this seat may have in front of it: its own stack, capped to
    /// the deepest other live seat so nobody bets what can't be called.
    fn max_allowed_total(&self, pos: usize) -> Chips {
        let own = self.seats[pos].max_total();
        self.seats
            .iter()
            .enumerate()
            .filter(|(i, s)| *i != pos && s.is_live())
            .map(|(_, s)| s.max_total())
            .max()
            .map_or(own, |deepest| own.min(deepest))
    }

    fn plan_move(&self, pos: usize, action: Action, amount: Chips) -> Option<Move> {
        let seat = &self.seats[pos];
        let current = seat.current_bet;
        let own_max = seat.max_total();
        let cap = self.max_allowed_total(pos);

        match action {
            Action::CheckCall => {
                let to_call = (self.last_bet - current).max(0);
                Some(Move::Call(current + seat.chips.min(to_call)))
            }
            Action::Bet => {
                if self.last_bet != 0 {
                    return None;
                }
                let total = amount.min(cap);
                if total <= current || total > own_max {
                    return None;
                }
                let all_in_amount = total == own_max || total == cap;
                if !all_in_amount && total < self.big_blind {
                    return None;
                }
                Some(Move::Open(total))
            }
            Action::Raise => {
                if self.last_bet <= 0 || amount < 0 {
                    return None;
                }
                let total = self.last_bet.saturating_add(amount).min(cap);
                let is_all_in = total == own_max;
                let is_capped = total == cap && cap < own_max;
                if total <= current || (!is_all_in && total < self.last_bet) {
                    return None;
                }
                let increment = total - self.last_bet;
                if !is_all_in && !is_capped && (increment <= 0 || increment < self.last_raise) {
                    return None;
                }
                Some(Move::Raise(total))
            }
            Action::AllIn => {
                let total = own_max.min(cap);
                if total <= current || (total < self.last_bet && total < own_max) {
                    return None;
                }
                if self.last_bet == 0 {
                    Some(Move::Open(total))
                } else {
                    Some(Move::Raise(total))
                }
            }
            Action::Fold => Some(Move::Fold),
        }
    }

    /// Apply a validated move. Returns whether it reopens the action.
    fn apply_move(&mut self, pos: usize, mv: Move) -> bool {
        let seat = &mut self.seats[pos];
        match mv {
            Move::Fold => {
                seat.folded = true;
                false
            }
            Move::Call(total) => {
                seat.commit(total - seat.current_bet);
                false
            }
            Move::Open(total) => {
                seat.commit(total - seat.current_bet);
                self.last_bet = total;
                self.last_raise = self.big_blind.max(total);
                true
            }
            Move::Raise(total) => {
                seat.commit(total - seat.current_bet);
                let previous = self.last_bet;
                if total > previous {
                    self.last_bet = total;
                }
                let increment = total - previous;
                if increment >= self.last_raise {
                    self.last_raise = increment;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Feed one player intent into the table.
    ///
    /// While waiting between hands the action is ignored, but a hand is
    /// started if one can be.
    pub fn handle_action(&mut self, player_id: PlayerId, action: Action, amount: Chips) -> ActionResult {
        if self.stage == Stage::Waiting {
            if self.can_start() {
                self.start_hand();
            }
            return ActionResult::Ignored;
        }

        let Some(pos) = self.position_of_player(player_id) else {
            return ActionResult::Invalid;
        };
        if self.acting_pos() != Some(pos) || !self.seats[pos].can_act() {
            return ActionResult::Invalid;
        }
        let Some(mv) = self.plan_move(pos, action, amount) else {
            debug!("player {player_id} {action} {amount} rejected");
            return ActionResult::Invalid;
        };

        let reopens = self.apply_move(pos, mv);
        self.seats[pos].acted_this_round = true;
        if reopens {
            for (i, other) in self.seats.iter_mut().enumerate() {
                if i != pos && other.is_live() && !other.all_in {
                    other.acted_this_round = false;
                }
            }
        }
        debug!(
            "player {player_id} {action} ({mv:?}), last bet {}, last raise {}",
            self.last_bet, self.last_raise
        );

        self.resolve_if_needed();
        if self.stage != Stage::Waiting {
            self.advance_turn();
        }
        ActionResult::Success
    }

    /// Act for the acting seat if it's on auto-play: check when it's free,
    /// fold otherwise. Returns whether an action was taken.
    pub fn process_auto_mode_player(&mut self) -> bool {
        if self.stage == Stage::Waiting {
            return false;
        }
        let Some(pos) = self.acting_pos() else {
            return false;
        };
        let seat = &self.seats[pos];
        if !seat.can_act() || !(seat.auto_mode || seat.pending_leave) {
            return false;
        }
        let Some(player_id) = seat.player_id else {
            return false;
        };
        let action = if self.last_bet - seat.current_bet <= 0 {
            Action::CheckCall
        } else {
            Action::Fold
        };
        self.handle_action(player_id, action, 0) == ActionResult::Success
    }

    fn betting_round_complete(&self) -> bool {
        let mut active = self.seats.iter().filter(|s| s.can_act()).peekable();
        active.peek().is_some()
            && active.all(|s| s.acted_this_round && s.current_bet == self.last_bet)
    }

    fn advance_turn(&mut self) {
        if self.stage == Stage::Waiting || self.seats.is_empty() {
            return;
        }
        if self.betting_round_complete() {
            self.advance_stage();
            return;
        }
        let start = self.acting_pos().map_or(0, |pos| pos + 1);
        match self.next_active_index(start) {
            Some(next) => self.acting = Some(self.seats[next].seat_index),
            None => self.advance_stage(),
        }
    }

    fn reset_bets_for_new_round(&mut self) {
        self.last_bet = 0;
        self.last_raise = self.big_blind;
        for seat in &mut self.seats {
            seat.current_bet = 0;
            seat.acted_this_round = false;
        }
    }

    fn advance_stage(&mut self) {
        self.collect_bets_to_side_pots();

        match self.stage {
            Stage::PreFlop => {
                self.stage = Stage::Flop;
                self.deal_community(3);
            }
            Stage::Flop => {
                self.stage = Stage::Turn;
                self.deal_community(1);
            }
            Stage::Turn => {
                self.stage = Stage::River;
                self.deal_community(1);
            }
            Stage::River => {
                self.stage = Stage::Showdown;
                self.handle_showdown();
                self.finish_hand();
                return;
            }
            Stage::Waiting | Stage::Showdown => return,
        }
        debug!("dealt {}: {:?}", self.stage, self.community);

        self.reset_bets_for_new_round();
        let start = self.button_pos().map_or(0, |pos| pos + 1);
        self.acting = self
            .next_active_index(start)
            .map(|pos| self.seats[pos].seat_index);

        // Fewer than two seats left to bet: run the board out.
        self.resolve_if_needed();
    }

    fn push_pot(&mut self, pot: SidePot) {
        match self.side_pots.last_mut() {
            Some(last)
                if pot.eligible_player_ids.is_empty()
                    || last.eligible_player_ids == pot.eligible_player_ids =>
            {
                last.amount += pot.amount;
            }
            _ => self.side_pots.push(pot),
        }
    }

    /// Sweep this round's bets into pots, one pot per bet tier. Folded seats
    /// pay into the tiers they reached but can't win them. Adjacent tiers with
    /// the same contenders collapse into one pot.
    fn collect_bets_to_side_pots(&mut self) {
        let mut levels: Vec<Chips> = self
            .seats
            .iter()
            .filter(|s| s.is_occupied() && s.in_hand && s.current_bet > 0)
            .map(|s| s.current_bet)
            .collect();
        levels.sort_unstable();
        levels.dedup();

        let mut previous = 0;
        for level in levels {
            let mut pot = SidePot::default();
            for seat in &self.seats {
                if !seat.is_occupied() || !seat.in_hand || seat.current_bet <= previous {
                    continue;
                }
                pot.amount += seat.current_bet.min(level) - previous;
                if !seat.folded {
                    if let Some(player_id) = seat.player_id {
                        pot.eligible_player_ids.push(player_id);
                    }
                }
            }
            if pot.amount > 0 {
                self.push_pot(pot);
            }
            previous = level;
        }

        for seat in &mut self.seats {
            seat.current_bet = 0;
        }
    }

    fn resolve_if_needed(&mut self) {
        let live: Vec<usize> = (0..self.seats.len())
            .filter(|&pos| self.seats[pos].is_live())
            .collect();

        match live.as_slice() {
            [] => {
                self.finish_hand();
                return;
            }
            [survivor] => {
                self.award_single_survivor(*survivor);
                return;
            }
            _ => {}
        }

        let with_chips: Vec<&Seat> = live
            .iter()
            .map(|&pos| &self.seats[pos])
            .filter(|s| !s.all_in)
            .collect();
        let no_more_betting = match with_chips.as_slice() {
            [] => true,
            [only] => only.current_bet >= self.last_bet,
            _ => false,
        };

        if no_more_betting {
            let missing = BOARD_SIZE.saturating_sub(self.community.len());
            self.deal_community(missing);
            self.stage = Stage::Showdown;
            self.handle_showdown();
            self.finish_hand();
        } else if self.stage == Stage::Showdown {
            self.handle_showdown();
            self.finish_hand();
        }
    }

    fn award_single_survivor(&mut self, pos: usize) {
        self.collect_bets_to_side_pots();
        let total_win = self.total_pot();
        self.seats[pos].chips += total_win;

        let player_results = self
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.in_hand)
            .filter_map(|(i, s)| {
                Some(PlayerHandResult {
                    player_id: s.player_id?,
                    hand_rank: if s.folded {
                        HandScore::default()
                    } else {
                        self.evaluate_seat(s)
                    },
                    chips_won: if i == pos { total_win } else { 0 },
                    hole_cards: s.hole,
                    folded: s.folded,
                })
            })
            .collect();
        self.record_hand_result(total_win, player_results);
        info!(
            "player {:?} wins {total_win} uncontested",
            self.seats[pos].player_id
        );

        self.side_pots.clear();
        self.finish_hand();
    }

    fn evaluate_seat(&self, seat: &Seat) -> HandScore {
        if self.community.len() < BOARD_SIZE {
            return HandScore::default();
        }
        let mut cards = [Card::BLANK; 7];
        cards[..2].copy_from_slice(&seat.hole);
        cards[2..].copy_from_slice(&self.community[..BOARD_SIZE]);
        self.evaluator.evaluate(&cards)
    }

    fn handle_showdown(&mut self) {
        self.collect_bets_to_side_pots();
        self.distribute_pots();
    }

    /// Order `winners` for odd chips: clockwise distance from the seat after
    /// the button, then player id.
    fn odd_chip_order(&self, winners: &mut [PlayerId]) {
        let n = self.seats.len().max(1);
        let start = self.button_pos().map_or(0, |pos| (pos + 1) % n);
        let distance = |player_id: PlayerId| {
            self.position_of_player(player_id)
                .map_or(n, |pos| (pos + n - start) % n)
        };
        winners.sort_by_key(|&player_id| (distance(player_id), player_id));
    }

    fn distribute_pots(&mut self) {
        let scores: HashMap<PlayerId, HandScore> = self
            .seats
            .iter()
            .filter(|s| s.is_live())
            .filter_map(|s| Some((s.player_id?, self.evaluate_seat(s))))
            .collect();

        let mut chips_won: HashMap<PlayerId, Chips> = HashMap::new();
        let mut total_pot = 0;
        let pots = std::mem::take(&mut self.side_pots);
        for pot in &pots {
            total_pot += pot.amount;
            if pot.amount <= 0 {
                continue;
            }

            let mut contenders: Vec<(PlayerId, HandScore)> = pot
                .eligible_player_ids
                .iter()
                .filter_map(|id| scores.get(id).map(|score| (*id, *score)))
                .collect();
            if contenders.is_empty() {
                // Everybody who could win this pot folded later on; it goes
                // to whoever is still standing.
                contenders = scores.iter().map(|(id, score)| (*id, *score)).collect();
            }
            let Some(best) = contenders.iter().map(|(_, score)| *score).max() else {
                error!("pot of {} has no contenders", pot.amount);
                continue;
            };
            let mut winners: Vec<PlayerId> = contenders
                .iter()
                .filter(|(_, score)| *score == best)
                .map(|(id, _)| *id)
                .collect();
            self.odd_chip_order(&mut winners);

            let count = Chips::try_from(winners.len()).unwrap_or(Chips::MAX);
            let share = pot.amount / count;
            let remainder = pot.amount % count;
            for (i, player_id) in winners.iter().enumerate() {
                let odd_chip = Chips::from(Chips::try_from(i).unwrap_or(Chips::MAX) < remainder);
                let amount = share + odd_chip;
                if let Some(pos) = self.position_of_player(*player_id) {
                    self.seats[pos].chips += amount;
                }
                *chips_won.entry(*player_id).or_default() += amount;
            }
        }

        let player_results = self
            .seats
            .iter()
            .filter(|s| s.in_hand)
            .filter_map(|s| {
                let player_id = s.player_id?;
                Some(PlayerHandResult {
                    player_id,
                    hand_rank: if s.folded {
                        HandScore::default()
                    } else {
                        scores.get(&player_id).copied().unwrap_or_default()
                    },
                    chips_won: chips_won.get(&player_id).copied().unwrap_or_default(),
                    hole_cards: s.hole,
                    folded: s.folded,
                })
            })
            .collect();
        self.record_hand_result(total_pot, player_results);
        info!("showdown settled, pot {total_pot}, winners {chips_won:?}");
    }

    fn record_hand_result(&mut self, total_pot: Chips, player_results: Vec<PlayerHandResult>) {
        self.last_hand_result = Some(HandResult {
            total_pot,
            community_cards: self.community.clone(),
            player_results,
        });
        self.hand_result_pending = true;
    }

    fn finish_hand(&mut self) {
        self.stage = Stage::Waiting;
        self.community.clear();
        self.side_pots.clear();
        self.last_bet = 0;
        self.last_raise = 0;
        self.acting = None;
        for seat in &mut self.seats {
            seat.reset_hand();
        }
    }

    // === Queries ===

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Everything in the middle: collected pots plus this round's bets.
    #[must_use]
    pub fn total_pot(&self) -> Chips {
        self.side_pots.iter().map(|p| p.amount).sum::<Chips>()
            + self.seats.iter().map(|s| s.current_bet).sum::<Chips>()
    }

    /// Widened total of every chip at the table, used to keep it under
    /// `MAX_TABLE_CHIPS`.
    fn chips_on_table(&self) -> i64 {
        let stacks: i64 = self
            .seats
            .iter()
            .map(|s| i64::from(s.chips) + i64::from(s.current_bet))
            .sum();
        let pots: i64 = self.side_pots.iter().map(|p| i64::from(p.amount)).sum();
        stacks + pots
    }

    /// Stacks plus everything in the middle. Constant within a hand.
    #[must_use]
    pub fn chips_in_play(&self) -> Chips {
        self.seats.iter().map(|s| s.chips).sum::<Chips>() + self.total_pot()
    }

    #[must_use]
    pub fn acting_player_id(&self) -> Option<PlayerId> {
        if self.stage == Stage::Waiting {
            return None;
        }
        let seat = &self.seats[self.acting_pos()?];
        if seat.in_hand && !seat.folded {
            seat.player_id
        } else {
            None
        }
    }

    #[must_use]
    pub fn dealer_seat_index(&self) -> Option<SeatIndex> {
        self.button_pos().map(|pos| self.seats[pos].seat_index)
    }

    #[must_use]
    pub fn small_blind_seat_index(&self) -> Option<SeatIndex> {
        self.blind_positions()
            .map(|(sb, _)| self.seats[sb].seat_index)
    }

    #[must_use]
    pub fn big_blind_seat_index(&self) -> Option<SeatIndex> {
        self.blind_positions()
            .map(|(_, bb)| self.seats[bb].seat_index)
    }

    #[must_use]
    pub fn player_chips(&self, player_id: PlayerId) -> Chips {
        self.seat_of(player_id).map_or(0, |s| s.chips)
    }

    #[must_use]
    pub fn has_available_seat(&self) -> bool {
        self.seats.len() < self.max_seats
    }

    #[must_use]
    pub fn seat_of(&self, player_id: PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|s| s.player_id == Some(player_id))
    }

    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    #[must_use]
    pub fn side_pots(&self) -> &[SidePot] {
        &self.side_pots
    }

    #[must_use]
    pub fn community(&self) -> &[Card] {
        &self.community
    }

    #[must_use]
    pub fn last_bet(&self) -> Chips {
        self.last_bet
    }

    #[must_use]
    pub fn last_raise(&self) -> Chips {
        self.last_raise
    }

    #[must_use]
    pub fn small_blind(&self) -> Chips {
        self.small_blind
    }

    #[must_use]
    pub fn big_blind(&self) -> Chips {
        self.big_blind
    }

    #[must_use]
    pub fn min_buy_in(&self) -> Chips {
        self.min_buy_in
    }

    #[must_use]
    pub fn max_seats(&self) -> usize {
        self.max_seats
    }

    #[must_use]
    pub fn evaluator(&self) -> &dyn HandEvaluator {
        self.evaluator.as_ref()
    }

    #[must_use]
    pub fn last_hand_result(&self) -> Option<&HandResult> {
        self.last_hand_result.as_ref()
    }

    /// The latest hand result, once. Later calls return `None` until another
    /// hand settles.
    pub fn take_hand_result(&mut self) -> Option<HandResult> {
        if !self.hand_result_pending {
            return None;
        }
        self.hand_result_pending = false;
        self.last_hand_result.clone()
    }

    // === Snapshots ===

    #[must_use]
    pub fn snapshot(&self, viewer: PlayerId) -> TableSnapshot {
        TableSnapshot::build(self, viewer)
    }

    pub fn write_table(&self, writer: &mut PackWriter, viewer: PlayerId) -> Result<()> {
        self.snapshot(viewer).write(writer)
    }

    /// Mirror a snapshot received from the authoritative table. The result is
    /// only good for queries and rendering; the deck is not part of it.
    pub fn load_snapshot(&mut self, snapshot: TableSnapshot) {
        self.stage = snapshot.stage;
        self.last_bet = snapshot.last_bet;
        self.small_blind = snapshot.small_blind;
        self.big_blind = snapshot.big_blind;
        self.last_raise = snapshot.big_blind;
        self.min_buy_in = snapshot.big_blind.saturating_mul(MIN_BUY_IN_BIG_BLINDS);
        self.side_pots = snapshot.side_pots;
        self.community = snapshot.community;

        self.seats = snapshot.seats.into_iter().map(|s| s.seat).collect();
        self.seats.sort_by_key(|s| s.seat_index);
        self.acting = snapshot.acting_player_id.and_then(|player_id| {
            self.seat_of(player_id).map(|s| s.seat_index)
        });
        self.button = None;
    }
}
