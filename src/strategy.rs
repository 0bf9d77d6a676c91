//! The external Player Strategy seam (spec §4.6). The core treats
//! whatever a strategy returns as untrusted: [`lowest_legal`] is the
//! deterministic fallback applied whenever a strategy's answer turns out
//! not to be legal.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::protocol::constants::CARDS_PASSED;
use crate::protocol::types::{Card, PassDirection};
use crate::rules::Trick;

/// Card-selection capability a peer delegates to. Implementations must
/// not assume anything about being called from an async context; the
/// phase state machine invokes these synchronously on its event loop.
pub trait PlayerStrategy: Send + Sync {
    /// Choose 3 cards to pass, direction-aware. The result must be a
    /// subset of `hand`; if it isn't, the core substitutes the 3
    /// lexicographically smallest cards instead.
    fn choose_pass(&self, hand: &[Card], direction: PassDirection) -> [Card; CARDS_PASSED];

    /// Choose one card to play. The result must be a member of `legal`;
    /// if it isn't, the core substitutes [`lowest_legal`].
    fn choose_play(
        &self,
        hand: &[Card],
        legal: &HashSet<Card>,
        trick_so_far: &Trick,
        hearts_broken: bool,
    ) -> Card;
}

/// The lexicographically (suit-then-rank) smallest card in `legal`.
///
/// Used both as the deterministic fallback for an illegal strategy
/// answer and as the whole policy of [`AutomaticStrategy`].
pub fn lowest_legal(legal: &HashSet<Card>) -> Card {
    *legal
        .iter()
        .min()
        .expect("legal_plays never returns an empty set for a non-empty hand")
}

/// Deterministic strategy: always passes its 3 highest cards and always
/// plays its lowest legal card. Requires no randomness and no human
/// input, matching spec §1's "default may be fully automatic".
#[derive(Debug, Default, Clone, Copy)]
pub struct AutomaticStrategy;

impl PlayerStrategy for AutomaticStrategy {
    fn choose_pass(&self, hand: &[Card], _direction: PassDirection) -> [Card; CARDS_PASSED] {
        let mut sorted: Vec<Card> = hand.to_vec();
        sorted.sort();
        let mut chosen = [Card::TWO_OF_CLUBS; CARDS_PASSED];
        for (slot, card) in chosen.iter_mut().zip(sorted.iter().rev()) {
            *slot = *card;
        }
        chosen
    }

    fn choose_play(
        &self,
        _hand: &[Card],
        legal: &HashSet<Card>,
        _trick_so_far: &Trick,
        _hearts_broken: bool,
    ) -> Card {
        lowest_legal(legal)
    }
}

/// Strategy that samples uniformly among legal choices, useful for
/// exercising the protocol without a human in the loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomStrategy;

impl PlayerStrategy for RandomStrategy {
    fn choose_pass(&self, hand: &[Card], _direction: PassDirection) -> [Card; CARDS_PASSED] {
        let mut rng = rand::thread_rng();
        let mut shuffled: Vec<Card> = hand.to_vec();
        shuffled.shuffle(&mut rng);
        let mut chosen = [Card::TWO_OF_CLUBS; CARDS_PASSED];
        chosen.copy_from_slice(&shuffled[..CARDS_PASSED]);
        chosen
    }

    fn choose_play(
        &self,
        _hand: &[Card],
        legal: &HashSet<Card>,
        _trick_so_far: &Trick,
        _hearts_broken: bool,
    ) -> Card {
        let options: Vec<Card> = legal.iter().copied().collect();
        let mut rng = rand::thread_rng();
        *options
            .choose(&mut rng)
            .expect("legal_plays never returns an empty set for a non-empty hand")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::Suit;

    #[test]
    fn automatic_pass_is_a_subset_of_the_hand() {
        let hand = vec![
            Card::new(2, Suit::Clubs),
            Card::new(13, Suit::Spades),
            Card::new(4, Suit::Hearts),
            Card::new(9, Suit::Diamonds),
        ];
        let strat = AutomaticStrategy;
        let chosen = strat.choose_pass(&hand, PassDirection::Left);
        for c in chosen {
            assert!(hand.contains(&c));
        }
    }

    #[test]
    fn automatic_play_picks_lowest_legal() {
        let legal: HashSet<Card> = [Card::new(9, Suit::Clubs), Card::new(2, Suit::Clubs)]
            .into_iter()
            .collect();
        let strat = AutomaticStrategy;
        let chosen = strat.choose_play(&[], &legal, &Trick::new(), false);
        assert_eq!(chosen, Card::new(2, Suit::Clubs));
    }

    #[test]
    fn random_play_stays_within_legal_set() {
        let legal: HashSet<Card> = [Card::new(9, Suit::Clubs), Card::new(2, Suit::Clubs)]
            .into_iter()
            .collect();
        let strat = RandomStrategy;
        for _ in 0..20 {
            let chosen = strat.choose_play(&[], &legal, &Trick::new(), false);
            assert!(legal.contains(&chosen));
        }
    }

    #[test]
    fn random_pass_is_a_subset_of_the_hand() {
        let hand = vec![
            Card::new(2, Suit::Clubs),
            Card::new(13, Suit::Spades),
            Card::new(4, Suit::Hearts),
            Card::new(9, Suit::Diamonds),
        ];
        let strat = RandomStrategy;
        for _ in 0..20 {
            let chosen = strat.choose_pass(&hand, PassDirection::Left);
            for c in chosen {
                assert!(hand.contains(&c));
            }
        }
    }
}
