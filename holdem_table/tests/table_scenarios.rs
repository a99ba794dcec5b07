//! End-to-end hand scenarios driven through the public table API.
//!
//! Each test seats players, plays a hand by sending actions for whoever is
//! acting, and checks positions, pots and stacks along the way.

use holdem_table::{
    HoldemPokerGame,
    entities::{Action, ActionResult, BuyInResult, Card, SetBlindsResult, SidePot, Stage},
    game::HandResult,
};

const A: i32 = 1;
const B: i32 = 2;
const C: i32 = 3;

fn three_handed() -> HoldemPokerGame {
    let mut game = HoldemPokerGame::with_seed(9, 2024);
    assert_eq!(game.set_blinds(5, 10), SetBlindsResult::Success);
    for player_id in [A, B, C] {
        game.sit_down(player_id).unwrap();
        assert_eq!(game.buy_in(player_id, 1000), BuyInResult::Success);
    }
    game
}

// === Basic Round ===

#[test]
fn test_basic_round_reaches_flop() {
    let mut game = three_handed();
    assert!(game.start_hand());

    assert_eq!(game.dealer_seat_index(), Some(0));
    assert_eq!(game.small_blind_seat_index(), Some(1));
    assert_eq!(game.big_blind_seat_index(), Some(2));
    assert_eq!(game.seat_of(B).unwrap().current_bet, 5);
    assert_eq!(game.player_chips(B), 995);
    assert_eq!(game.seat_of(C).unwrap().current_bet, 10);
    assert_eq!(game.player_chips(C), 990);
    assert_eq!(game.acting_player_id(), Some(A));

    assert_eq!(game.handle_action(A, Action::CheckCall, 0), ActionResult::Success);
    assert_eq!(game.handle_action(B, Action::CheckCall, 0), ActionResult::Success);
    assert_eq!(game.handle_action(C, Action::CheckCall, 0), ActionResult::Success);

    assert_eq!(game.stage(), Stage::Flop);
    assert_eq!(
        game.side_pots(),
        &[SidePot {
            amount: 30,
            eligible_player_ids: vec![A, B, C],
        }]
    );
    assert!(game.seats().iter().all(|s| s.current_bet == 0));
    assert_eq!(game.last_bet(), 0);
    assert_eq!(game.community().len(), 3);
    assert!(game.community().iter().all(Card::is_valid));
    // First to act after the flop is left of the button.
    assert_eq!(game.acting_player_id(), Some(B));
}

#[test]
fn test_streets_deal_one_card_each() {
    let mut game = three_handed();
    game.start_hand();
    let mut boards = Vec::new();
    while game.stage() != Stage::Waiting {
        let stage = game.stage();
        let acting = game.acting_player_id().unwrap();
        game.handle_action(acting, Action::CheckCall, 0);
        if game.stage() != stage && game.stage() != Stage::Waiting {
            boards.push(game.community().len());
        }
    }
    assert_eq!(boards, vec![3, 4, 5]);
}

// === Single Survivor ===

#[test]
fn test_two_folds_award_pot_without_showdown() {
    let mut game = three_handed();
    game.start_hand();

    assert_eq!(game.handle_action(A, Action::Fold, 0), ActionResult::Success);
    assert_eq!(game.handle_action(B, Action::Fold, 0), ActionResult::Success);

    assert_eq!(game.stage(), Stage::Waiting);
    assert_eq!(game.player_chips(A), 1000);
    assert_eq!(game.player_chips(B), 995);
    assert_eq!(game.player_chips(C), 1005);

    let result = game.take_hand_result().unwrap();
    assert_eq!(result.total_pot, 15);
    assert!(result.community_cards.is_empty());
    let winners: Vec<_> = result.winners().map(|pr| pr.player_id).collect();
    assert_eq!(winners, vec![C]);
    assert_eq!(result.result_for(C).unwrap().hand_rank.0, 0);

    // Folded hole cards never leave the table.
    let decoded = HandResult::from_bytes(&result.to_bytes().unwrap()).unwrap();
    for player_id in [A, B] {
        let pr = decoded.result_for(player_id).unwrap();
        assert!(pr.folded);
        assert_eq!(pr.hole_cards, [Card::BLANK; 2]);
    }
    assert!(decoded.result_for(C).unwrap().hole_cards.iter().all(Card::is_valid));
}

#[test]
fn test_fold_on_later_street_keeps_board() {
    let mut game = three_handed();
    game.start_hand();
    for player_id in [A, B, C] {
        game.handle_action(player_id, Action::CheckCall, 0);
    }
    assert_eq!(game.stage(), Stage::Flop);
    assert_eq!(game.handle_action(B, Action::Bet, 50), ActionResult::Success);
    assert_eq!(game.handle_action(C, Action::Fold, 0), ActionResult::Success);
    assert_eq!(game.handle_action(A, Action::Fold, 0), ActionResult::Success);

    assert_eq!(game.player_chips(B), 1020);
    let result = game.take_hand_result().unwrap();
    assert_eq!(result.total_pot, 80);
    assert_eq!(result.community_cards.len(), 3);
}

// === All-in and Side Pots ===

#[test]
fn test_short_all_in_builds_side_pot() {
    let mut game = HoldemPokerGame::with_seed(9, 99);
    game.set_blinds(1, 2);
    game.sit_down(A).unwrap();
    game.sit_down(B).unwrap();
    game.sit_down(C).unwrap();
    game.buy_in(A, 200);
    game.buy_in(B, 1000);
    game.buy_in(C, 1000);
    game.start_hand();

    assert_eq!(game.handle_action(A, Action::AllIn, 0), ActionResult::Success);
    assert_eq!(game.handle_action(B, Action::CheckCall, 0), ActionResult::Success);
    assert_eq!(game.handle_action(C, Action::CheckCall, 0), ActionResult::Success);
    assert_eq!(game.stage(), Stage::Flop);

    assert_eq!(game.handle_action(B, Action::Bet, 100), ActionResult::Success);
    assert_eq!(game.handle_action(C, Action::CheckCall, 0), ActionResult::Success);
    assert_eq!(game.stage(), Stage::Turn);
    assert_eq!(
        game.side_pots(),
        &[
            SidePot {
                amount: 600,
                eligible_player_ids: vec![A, B, C],
            },
            SidePot {
                amount: 200,
                eligible_player_ids: vec![B, C],
            },
        ]
    );
    let contributed: i32 = game.seats().iter().map(|s| s.total_bet_this_hand).sum();
    assert_eq!(contributed, 800);

    // C folds the turn: B is the only one left who can bet, so the river
    // comes without another betting round.
    assert_eq!(game.handle_action(B, Action::Bet, 50), ActionResult::Success);
    assert_eq!(game.handle_action(C, Action::Fold, 0), ActionResult::Success);
    assert_eq!(game.stage(), Stage::Waiting);

    let result = game.take_hand_result().unwrap();
    assert_eq!(result.total_pot, 850);
    assert_eq!(result.community_cards.len(), 5);
    assert_eq!(result.result_for(C).unwrap().chips_won, 0);
    // B always wins the side pot; A can only share in the main pot.
    let won_a = result.result_for(A).unwrap().chips_won;
    let won_b = result.result_for(B).unwrap().chips_won;
    assert!(won_b >= 250);
    assert!(won_a <= 600);
    assert_eq!(won_a + won_b, 850);
    assert_eq!(game.player_chips(A) + game.player_chips(B) + game.player_chips(C), 2200);
}

#[test]
fn test_everyone_all_in_runs_out_board() {
    let mut game = three_handed();
    game.start_hand();
    assert_eq!(game.handle_action(A, Action::AllIn, 0), ActionResult::Success);
    assert_eq!(game.handle_action(B, Action::AllIn, 0), ActionResult::Success);
    assert_eq!(game.handle_action(C, Action::CheckCall, 0), ActionResult::Success);

    assert_eq!(game.stage(), Stage::Waiting);
    let result = game.take_hand_result().unwrap();
    assert_eq!(result.total_pot, 3000);
    assert_eq!(result.community_cards.len(), 5);
    assert!(result.player_results.iter().all(|pr| pr.hand_rank.0 > 0));
    assert_eq!(game.seats().iter().map(|s| s.chips).sum::<i32>(), 3000);
}

// === Rejections ===

#[test]
fn test_rejected_actions_change_nothing() {
    let mut game = three_handed();
    game.start_hand();
    let before = game.seats().to_vec();
    let pot = game.total_pot();

    let attempts = [
        (B, Action::CheckCall, 0),
        (A, Action::Bet, 100),
        (A, Action::Raise, 3),
        (A, Action::Raise, -20),
        (99, Action::Fold, 0),
    ];
    for (player_id, action, amount) in attempts {
        assert_eq!(
            game.handle_action(player_id, action, amount),
            ActionResult::Invalid,
            "{player_id} {action} {amount}"
        );
        assert_eq!(game.seats(), before.as_slice());
        assert_eq!(game.total_pot(), pot);
        assert_eq!(game.acting_player_id(), Some(A));
    }
}

#[test]
fn test_leaver_is_auto_played_then_removed() {
    let mut game = three_handed();
    game.start_hand();
    game.mark_pending_leave(A).unwrap();
    assert!(game.process_auto_mode_player());
    assert!(game.seat_of(A).unwrap().folded);
    assert!(game.remove_pending_leavers().is_empty());

    game.handle_action(B, Action::Fold, 0);
    assert_eq!(game.stage(), Stage::Waiting);
    assert_eq!(game.remove_pending_leavers(), vec![A]);
    assert!(game.seat_of(A).is_none());
    // The dealer's seat is gone: the button falls back to the seat before it
    // and the next hand moves it on from there.
    assert_eq!(game.dealer_seat_index(), Some(2));
    assert!(game.start_hand());
    assert_eq!(game.dealer_seat_index(), Some(1));
}
