//! Coordinator logic (spec §4.5, "Coordinator additions"), active only
//! for peer 0. P0 is both a player (driven through the same `PeerState`
//! as everyone else) and the dealer/scorer: this module holds only the
//! extra bookkeeping that role needs — the deal, the 2♣ holder as it
//! moves through the pass, and hand/game scoring decisions.
//!
//! Grounded on the teacher's `CrapsGame` floor-manager role: one struct
//! that both participates in and adjudicates the same round.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::protocol::constants::{CARDS_PASSED, CARDS_PER_HAND, GAME_OVER_SCORE, PLAYERS};
use crate::protocol::types::{Card, PassDirection, PlayerId, Suit};
use crate::protocol::Message;
use crate::rules::{self, Trick};

fn fresh_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for suit in [Suit::Diamonds, Suit::Clubs, Suit::Hearts, Suit::Spades] {
        for rank in 1..=13u8 {
            deck.push(Card::new(rank, suit));
        }
    }
    deck
}

pub struct Coordinator {
    pass_direction: PassDirection,
    two_of_clubs_holder: PlayerId,
    pass_origins_seen: HashSet<PlayerId>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            pass_direction: PassDirection::Left,
            two_of_clubs_holder: 0,
            pass_origins_seen: HashSet::new(),
        }
    }

    pub fn pass_direction(&self) -> PassDirection {
        self.pass_direction
    }

    /// Shuffle a fresh deck and deal 13 cards to each player. Returns one
    /// DEAL_HAND message per destination peer. Also resets the per-hand
    /// pass-barrier tracking and records the pre-pass 2♣ holder.
    pub fn deal(&mut self) -> [Message; PLAYERS] {
        let mut deck = fresh_deck();
        deck.shuffle(&mut rand::thread_rng());

        self.pass_origins_seen.clear();

        let mut messages: [Message; PLAYERS] = std::array::from_fn(|_| Message::GameStart);
        for (player, chunk) in deck.chunks(CARDS_PER_HAND).enumerate() {
            let mut cards = [Card::TWO_OF_CLUBS; CARDS_PER_HAND];
            cards.copy_from_slice(chunk);
            if cards.contains(&Card::TWO_OF_CLUBS) {
                self.two_of_clubs_holder = player as PlayerId;
            }
            messages[player] = Message::DealHand { cards };
        }
        messages
    }

    /// No pass this hand: the 2♣ holder from the deal is the trick leader
    /// with no further tracking needed.
    pub fn barrier_trivially_complete(&self) -> bool {
        self.pass_direction == PassDirection::None
    }

    /// Record one peer's PASS_CARDS (its own, or one seen forwarded
    /// through this node) and update the 2♣ holder if it moved. Returns
    /// `true` once all four peers' passes have been observed.
    pub fn observe_pass_cards(&mut self, origin: PlayerId, cards: [Card; CARDS_PASSED]) -> bool {
        if cards.contains(&Card::TWO_OF_CLUBS) {
            if let Some(target) = rules::pass_target(origin, self.pass_direction) {
                self.two_of_clubs_holder = target;
            }
        }
        self.pass_origins_seen.insert(origin);
        self.pass_origins_seen.len() == PLAYERS
    }

    pub fn two_of_clubs_holder(&self) -> PlayerId {
        self.two_of_clubs_holder
    }

    /// Called once a hand's tricks are all played and scored: advances
    /// to the next hand's pass direction (spec §9: rotates indefinitely,
    /// `left → right → across → none → left → ...`).
    pub fn rotate_pass_direction(&mut self) {
        self.pass_direction = self.pass_direction.next();
    }

    pub fn decide_trick(trick: &Trick) -> (PlayerId, u8) {
        (rules::trick_winner(trick), rules::trick_points(trick))
    }

    /// Apply the shoot-the-moon adjustment and fold into the running
    /// cumulative score.
    pub fn decide_hand(
        scores_hand: [u16; PLAYERS],
        scores_total_so_far: [u16; PLAYERS],
    ) -> ([u8; PLAYERS], [u8; PLAYERS], Option<PlayerId>) {
        let (adjusted, shooter) = rules::hand_points(scores_hand);
        let mut new_total = scores_total_so_far;
        for i in 0..PLAYERS {
            new_total[i] += adjusted[i];
        }
        let to_u8 = |arr: [u16; PLAYERS]| -> [u8; PLAYERS] {
            std::array::from_fn(|i| arr[i] as u8)
        };
        (to_u8(adjusted), to_u8(new_total), shooter)
    }

    /// Game ends once any player's cumulative score reaches
    /// `GAME_OVER_SCORE`; the winner is the lowest score, ties broken by
    /// lowest peer id.
    pub fn decide_game_over(scores_total: [u16; PLAYERS]) -> Option<PlayerId> {
        if !scores_total.iter().any(|&s| s as u32 >= GAME_OVER_SCORE) {
            return None;
        }
        scores_total
            .iter()
            .enumerate()
            .min_by_key(|(_, &s)| s)
            .map(|(id, _)| id as PlayerId)
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::CARDS_PER_HAND;

    #[test]
    fn deal_distributes_every_card_exactly_once() {
        let mut coordinator = Coordinator::new();
        let messages = coordinator.deal();
        let mut all_cards: Vec<Card> = Vec::with_capacity(52);
        for message in &messages {
            match message {
                Message::DealHand { cards } => {
                    assert_eq!(cards.len(), CARDS_PER_HAND);
                    all_cards.extend_from_slice(cards);
                }
                _ => panic!("deal() must only produce DealHand messages"),
            }
        }
        all_cards.sort();
        let mut expected = fresh_deck();
        expected.sort();
        assert_eq!(all_cards, expected);
    }

    #[test]
    fn deal_records_the_two_of_clubs_holder() {
        let mut coordinator = Coordinator::new();
        let messages = coordinator.deal();
        let holder = coordinator.two_of_clubs_holder();
        match &messages[holder as usize] {
            Message::DealHand { cards } => assert!(cards.contains(&Card::TWO_OF_CLUBS)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn observing_all_four_passes_completes_the_barrier() {
        let mut coordinator = Coordinator::new();
        coordinator.deal();
        let filler = [
            Card::new(3, Suit::Diamonds),
            Card::new(4, Suit::Diamonds),
            Card::new(5, Suit::Diamonds),
        ];
        assert!(!coordinator.observe_pass_cards(0, filler));
        assert!(!coordinator.observe_pass_cards(1, filler));
        assert!(!coordinator.observe_pass_cards(2, filler));
        assert!(coordinator.observe_pass_cards(3, filler));
    }

    #[test]
    fn two_of_clubs_moves_with_the_pass() {
        let mut coordinator = Coordinator::new();
        // Force a known starting holder via direct field access through deal();
        // instead, exercise the tracking logic directly.
        coordinator.pass_direction = PassDirection::Left;
        coordinator.two_of_clubs_holder = 0;
        let cards = [
            Card::TWO_OF_CLUBS,
            Card::new(4, Suit::Diamonds),
            Card::new(5, Suit::Diamonds),
        ];
        coordinator.observe_pass_cards(0, cards);
        assert_eq!(coordinator.two_of_clubs_holder(), 1);
    }

    #[test]
    fn shoot_the_moon_awards_zero_to_the_shooter() {
        let (adjusted, total, shooter) = Coordinator::decide_hand([0, 0, 26, 0], [10, 10, 10, 10]);
        assert_eq!(adjusted, [26, 26, 0, 26]);
        assert_eq!(total, [36, 36, 10, 36]);
        assert_eq!(shooter, Some(2));
    }

    #[test]
    fn game_over_picks_lowest_score_breaking_ties_by_lowest_id() {
        assert_eq!(Coordinator::decide_game_over([100, 100, 50, 200]), Some(2));
        assert_eq!(Coordinator::decide_game_over([50, 50, 99, 10]), None);
        assert_eq!(Coordinator::decide_game_over([100, 100, 200, 300]), Some(0));
    }
}
