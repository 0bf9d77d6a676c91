//! The Hearts rules engine: pure, side-effect-free functions shared by
//! every peer (to validate a candidate play) and by the coordinator (to
//! score tricks and hands). Nothing here touches the network or any
//! mutable peer state — see spec §4.4.

use std::collections::HashSet;

use crate::protocol::constants::{PLAYERS, POINTS_TO_WIN_HAND};
use crate::protocol::types::{Card, PassDirection, PlayerId, Suit};

/// One trick so far: the `(player, card)` pairs played, in play order.
pub type Trick = Vec<(PlayerId, Card)>;

/// The set of cards from `hand` that may legally be played next.
///
/// `trick` is the trick so far (empty means this peer is leading).
/// `is_first_trick_of_hand` covers both the mandatory-2♣ lead and the
/// no-points-on-the-first-trick discard restriction.
pub fn legal_plays(
    hand: &[Card],
    trick: &Trick,
    hearts_broken: bool,
    is_first_trick_of_hand: bool,
) -> HashSet<Card> {
    if trick.is_empty() {
        return legal_leads(hand, hearts_broken, is_first_trick_of_hand);
    }

    let lead_suit = trick[0].1.suit();
    let follow_suit: Vec<Card> = hand.iter().copied().filter(|c| c.suit() == lead_suit).collect();
    if !follow_suit.is_empty() {
        return follow_suit.into_iter().collect();
    }

    if is_first_trick_of_hand {
        let safe: Vec<Card> = hand
            .iter()
            .copied()
            .filter(|c| !is_point_card(*c))
            .collect();
        if !safe.is_empty() {
            return safe.into_iter().collect();
        }
    }

    hand.iter().copied().collect()
}

fn legal_leads(hand: &[Card], hearts_broken: bool, is_first_trick_of_hand: bool) -> HashSet<Card> {
    if is_first_trick_of_hand {
        return [Card::TWO_OF_CLUBS].into_iter().collect();
    }

    if hearts_broken {
        return hand.iter().copied().collect();
    }

    let non_hearts: Vec<Card> = hand.iter().copied().filter(|c| !c.is_heart()).collect();
    if non_hearts.is_empty() {
        hand.iter().copied().collect()
    } else {
        non_hearts.into_iter().collect()
    }
}

fn is_point_card(card: Card) -> bool {
    card.is_heart() || card == Card::QUEEN_OF_SPADES
}

/// The winner of a completed trick: the player whose card matches
/// `lead_suit` and has the highest ace-high rank. Off-suit cards never win.
pub fn trick_winner(trick: &Trick) -> PlayerId {
    let lead_suit = trick
        .first()
        .expect("trick_winner called on an empty trick")
        .1
        .suit();

    trick
        .iter()
        .filter(|(_, card)| card.suit() == lead_suit)
        .max_by_key(|(_, card)| card.rank_order())
        .map(|(player, _)| *player)
        .expect("the lead card always matches the lead suit")
}

/// 1 point per heart in the trick, plus 13 if the Queen of Spades is present.
pub fn trick_points(trick: &Trick) -> u8 {
    let hearts = trick.iter().filter(|(_, c)| c.is_heart()).count() as u8;
    let queen = trick.iter().any(|(_, c)| *c == Card::QUEEN_OF_SPADES);
    hearts + if queen { 13 } else { 0 }
}

/// Apply the shoot-the-moon adjustment: if any player took all 26 points,
/// that player scores 0 and the other three each score 26. Otherwise the
/// raw per-player totals (which sum to 26) are returned unchanged.
pub fn hand_points(scores_hand: [u16; PLAYERS]) -> ([u16; PLAYERS], Option<PlayerId>) {
    let shooter = scores_hand
        .iter()
        .position(|&points| points == POINTS_TO_WIN_HAND)
        .map(|idx| idx as PlayerId);

    match shooter {
        Some(shooter_id) => {
            let mut adjusted = [POINTS_TO_WIN_HAND; PLAYERS];
            adjusted[shooter_id as usize] = 0;
            (adjusted, Some(shooter_id))
        }
        None => (scores_hand, None),
    }
}

/// The peer that receives `self_id`'s passed cards this hand, or `None`
/// when the direction is `PassDirection::None` (no pass this hand).
pub fn pass_target(self_id: PlayerId, direction: PassDirection) -> Option<PlayerId> {
    let offset = match direction {
        PassDirection::Left => 1,
        PassDirection::Across => 2,
        PassDirection::Right => 3,
        PassDirection::None => return None,
    };
    Some((self_id + offset) % PLAYERS as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(rank: u8, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn first_trick_lead_must_be_two_of_clubs() {
        let hand = vec![Card::TWO_OF_CLUBS, card(5, Suit::Diamonds)];
        let legal = legal_plays(&hand, &Trick::new(), false, true);
        assert_eq!(legal, [Card::TWO_OF_CLUBS].into_iter().collect());
    }

    #[test]
    fn hearts_illegal_lead_before_broken() {
        let hand = vec![card(4, Suit::Hearts), card(9, Suit::Clubs)];
        let legal = legal_plays(&hand, &Trick::new(), false, false);
        assert_eq!(legal, [card(9, Suit::Clubs)].into_iter().collect());
    }

    #[test]
    fn hearts_legal_lead_when_hand_is_all_hearts() {
        let hand = vec![card(4, Suit::Hearts), card(9, Suit::Hearts)];
        let legal = legal_plays(&hand, &Trick::new(), false, false);
        assert_eq!(legal, hand.into_iter().collect());
    }

    #[test]
    fn hearts_legal_lead_once_broken() {
        let hand = vec![card(4, Suit::Hearts), card(9, Suit::Clubs)];
        let legal = legal_plays(&hand, &Trick::new(), true, false);
        assert_eq!(legal, hand.into_iter().collect());
    }

    #[test]
    fn must_follow_suit_when_possible() {
        let hand = vec![card(3, Suit::Clubs), card(9, Suit::Diamonds)];
        let trick = vec![(0u8, card(5, Suit::Diamonds))];
        let legal = legal_plays(&hand, &trick, true, false);
        assert_eq!(legal, [card(9, Suit::Diamonds)].into_iter().collect());
    }

    #[test]
    fn first_trick_discard_avoids_points_when_possible() {
        let hand = vec![card(4, Suit::Hearts), card(9, Suit::Clubs)];
        let trick = vec![(0u8, card(5, Suit::Diamonds))];
        let legal = legal_plays(&hand, &trick, true, true);
        assert_eq!(legal, [card(9, Suit::Clubs)].into_iter().collect());
    }

    #[test]
    fn first_trick_discard_allows_points_if_forced() {
        let hand = vec![card(4, Suit::Hearts), Card::QUEEN_OF_SPADES];
        let trick = vec![(0u8, card(5, Suit::Diamonds))];
        let legal = legal_plays(&hand, &trick, true, true);
        assert_eq!(legal, hand.into_iter().collect());
    }

    #[test]
    fn trick_winner_is_highest_of_lead_suit_ace_high() {
        let trick = vec![
            (0u8, card(1, Suit::Diamonds)),
            (1u8, card(13, Suit::Diamonds)),
            (2u8, card(5, Suit::Clubs)),
            (3u8, card(9, Suit::Diamonds)),
        ];
        assert_eq!(trick_winner(&trick), 0);
    }

    #[test]
    fn off_suit_cards_cannot_win() {
        let trick = vec![
            (0u8, card(2, Suit::Diamonds)),
            (1u8, Card::QUEEN_OF_SPADES),
        ];
        assert_eq!(trick_winner(&trick), 0);
    }

    #[test]
    fn trick_points_counts_hearts_and_queen_of_spades() {
        let trick = vec![
            (0u8, card(4, Suit::Hearts)),
            (1u8, card(9, Suit::Hearts)),
            (2u8, Card::QUEEN_OF_SPADES),
            (3u8, card(2, Suit::Clubs)),
        ];
        assert_eq!(trick_points(&trick), 15);
    }

    #[test]
    fn hand_points_passes_through_without_shooter() {
        let (adjusted, shooter) = hand_points([5, 6, 2, 13]);
        assert_eq!(adjusted, [5, 6, 2, 13]);
        assert_eq!(shooter, None);
    }

    #[test]
    fn hand_points_applies_shoot_the_moon() {
        let (adjusted, shooter) = hand_points([0, 0, 26, 0]);
        assert_eq!(adjusted, [26, 26, 0, 26]);
        assert_eq!(shooter, Some(2));
    }

    #[test]
    fn pass_target_directions() {
        assert_eq!(pass_target(0, PassDirection::Left), Some(1));
        assert_eq!(pass_target(0, PassDirection::Right), Some(3));
        assert_eq!(pass_target(0, PassDirection::Across), Some(2));
        assert_eq!(pass_target(0, PassDirection::None), None);
    }
}
