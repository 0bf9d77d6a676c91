//! Per-peer phase state machine (spec §4.5): deal → pass → barrier →
//! play 13 tricks → hand summary → next hand or game over. `PeerState`
//! is the single owned value the event loop in `app` mutates; every
//! method here is synchronous and side-effect-free beyond `self`, so it
//! can be unit-tested without a socket in sight.

use crate::protocol::constants::{CARDS_PASSED, CARDS_PER_HAND, PLAYERS};
use crate::protocol::types::{Card, PassDirection, PlayerId};
use crate::protocol::HandPhase;
use crate::rules::Trick;
use crate::token::TokenArbiter;

/// Where this peer currently sits in the per-hand lifecycle (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dealing,
    Passing,
    PassingBarrier,
    Playing,
    HandSummary,
    GameOver,
}

/// Everything one peer knows about the game, from its own vantage point.
pub struct PeerState {
    pub self_id: PlayerId,
    pub phase: Phase,
    pub hand: Vec<Card>,
    pub pass_direction: PassDirection,
    pub hearts_broken: bool,
    pub current_trick: Trick,
    pub tricks_played: u8,
    pub scores_hand: [u16; PLAYERS],
    pub scores_total: [u16; PLAYERS],
    pub token: TokenArbiter,
    pub winner: Option<PlayerId>,

    /// Set once this peer has emitted its own PASS_CARDS this hand.
    sent_pass_this_hand: bool,
    /// Set once this peer's own PASS_CARDS has lapped back to it.
    own_pass_lap_complete: bool,
    /// Cards addressed to this peer by its pass-phase sender, held until
    /// the barrier (both halves of it) is clear to merge them in.
    pending_incoming_pass: Option<[Card; CARDS_PASSED]>,
}

impl PeerState {
    pub fn new(self_id: PlayerId) -> Self {
        Self {
            self_id,
            phase: Phase::Idle,
            hand: Vec::with_capacity(CARDS_PER_HAND),
            pass_direction: PassDirection::Left,
            hearts_broken: false,
            current_trick: Trick::new(),
            tricks_played: 0,
            scores_hand: [0; PLAYERS],
            scores_total: [0; PLAYERS],
            token: TokenArbiter::new(self_id),
            winner: None,
            sent_pass_this_hand: false,
            own_pass_lap_complete: false,
            pending_incoming_pass: None,
        }
    }

    /// GAME_START: a broadcast that only matters to the other three peers
    /// (P0 drives its own idle→dealing transition directly, since a
    /// self-originated broadcast is never handed back through the
    /// process-locally path — see spec §4.2 and `app::Peer::start_game`).
    pub fn on_game_start(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Dealing;
        }
    }

    /// DEAL_HAND addressed to this peer.
    pub fn on_deal_hand(&mut self, cards: [Card; CARDS_PER_HAND]) {
        self.hand = cards.to_vec();
        self.phase = Phase::Dealing;
    }

    /// START_PHASE: begins either the pass phase or the play phase.
    pub fn on_start_phase(&mut self, phase: HandPhase, direction: Option<PassDirection>) {
        // Whatever this peer believed about the token before a phase
        // boundary is moot: the only authoritative holder going forward
        // is whoever next receives an explicit TOKEN_PASS (or, for P0 at
        // the very start of a hand, a direct self-assignment).
        self.token.forget();

        match phase {
            HandPhase::Pass => {
                self.pass_direction = direction.expect("START_PHASE(Pass) always carries a direction");
                self.hearts_broken = false;
                self.current_trick.clear();
                self.tricks_played = 0;
                self.scores_hand = [0; PLAYERS];
                self.sent_pass_this_hand = false;
                self.own_pass_lap_complete = false;
                self.pending_incoming_pass = None;

                self.phase = if self.pass_direction == PassDirection::None {
                    Phase::PassingBarrier
                } else {
                    Phase::Passing
                };
            }
            HandPhase::Play => {
                self.phase = Phase::Playing;
            }
        }
    }

    /// Whether this peer still needs to emit its own PASS_CARDS. Gated
    /// on actually bearing the token: STARTPHASE(Pass) reaches every peer
    /// before the TOKEN_PASS addressed to it does, so phase alone would
    /// have every peer try to act the instant its phase flips.
    pub fn needs_to_pass(&self) -> bool {
        self.phase == Phase::Passing
            && self.pass_direction != PassDirection::None
            && !self.sent_pass_this_hand
            && self.token.hold()
    }

    /// Record that this peer has just sent its PASS_CARDS. Per spec a
    /// peer enters the barrier as soon as it has emitted its own pass,
    /// independent of whether the incoming pass has arrived yet.
    pub fn on_own_pass_sent(&mut self, cards: [Card; CARDS_PASSED]) {
        for c in cards {
            if let Some(pos) = self.hand.iter().position(|h| *h == c) {
                self.hand.remove(pos);
            }
        }
        self.sent_pass_this_hand = true;
        self.phase = Phase::PassingBarrier;
    }

    /// This peer's own originated PASS_CARDS has completed a full lap.
    pub fn on_own_pass_lap_complete(&mut self) {
        self.own_pass_lap_complete = true;
        self.try_complete_pass_barrier();
    }

    /// A PASS_CARDS addressed to this peer has arrived.
    pub fn on_pass_cards_incoming(&mut self, cards: [Card; CARDS_PASSED]) {
        self.pending_incoming_pass = Some(cards);
        self.try_complete_pass_barrier();
    }

    fn try_complete_pass_barrier(&mut self) {
        let own_send_done = self.pass_direction == PassDirection::None || self.own_pass_lap_complete;
        if own_send_done {
            if let Some(cards) = self.pending_incoming_pass.take() {
                self.hand.extend_from_slice(&cards);
            }
        }
    }

    /// Whether this peer still needs to play in the current trick. Gated
    /// on actually bearing the token for the same reason as
    /// [`Self::needs_to_pass`]: the STARTPHASE(Play)/TRICK_SUMMARY
    /// broadcast that flips phase always precedes the TOKEN_PASS that
    /// hands this peer the right to act.
    pub fn needs_to_play(&self) -> bool {
        self.phase == Phase::Playing
            && self.token.hold()
            && self.current_trick.len() < PLAYERS
            && !self.current_trick.iter().any(|(p, _)| *p == self.self_id)
    }

    /// Whether this hand is on its very first trick (2♣ lead mandatory).
    pub fn is_first_trick_of_hand(&self) -> bool {
        self.tricks_played == 0
    }

    /// Record this peer's own PLAY_CARD, removing it from hand and
    /// updating `hearts_broken`/lead tracking just as an observed play
    /// from any other peer would (spec §4.5's "any PLAY_CARD received,
    /// including own lap-complete" is applied synchronously here so the
    /// trick-completion check used by token handoff stays accurate).
    pub fn on_play_card(&mut self, player: PlayerId, card: Card) {
        if player == self.self_id {
            if let Some(pos) = self.hand.iter().position(|h| *h == card) {
                self.hand.remove(pos);
            }
        }
        self.current_trick.push((player, card));
        if card.is_heart() {
            self.hearts_broken = true;
        }
    }

    /// TRICK_SUMMARY from the coordinator: authoritative, adopted as-is
    /// (spec §7: trust the coordinator over a locally recomputed view).
    pub fn on_trick_summary(&mut self, winner: PlayerId, points: u8) {
        if let (true, local_winner, local_points) = (
            self.current_trick.len() == PLAYERS,
            crate::rules::trick_winner(&self.current_trick),
            crate::rules::trick_points(&self.current_trick),
        ) {
            if local_winner != winner || local_points != points {
                tracing::warn!(
                    local_winner,
                    local_points,
                    coordinator_winner = winner,
                    coordinator_points = points,
                    "trick summary disagrees with local view; trusting coordinator"
                );
            }
        }

        self.scores_hand[winner as usize] += points as u16;
        self.current_trick.clear();
        self.tricks_played += 1;
        // A stray token belief from the ordinary self+1 handoff chain
        // must not survive into the next trick's setup.
        self.token.forget();
    }

    /// HAND_SUMMARY from the coordinator: adopt its scores wholesale.
    pub fn on_hand_summary(&mut self, scores_hand: [u8; PLAYERS], scores_total: [u8; PLAYERS]) {
        for i in 0..PLAYERS {
            self.scores_hand[i] = scores_hand[i] as u16;
            self.scores_total[i] = scores_total[i] as u16;
        }
        self.phase = Phase::HandSummary;
    }

    pub fn on_game_over(&mut self, winner: PlayerId) {
        self.winner = Some(winner);
        self.phase = Phase::GameOver;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::Suit;

    fn dealt(self_id: PlayerId) -> PeerState {
        let mut state = PeerState::new(self_id);
        let mut cards = [Card::TWO_OF_CLUBS; CARDS_PER_HAND];
        for (i, c) in cards.iter_mut().enumerate() {
            *c = Card::new((i % 13) as u8 + 1, Suit::Hearts);
        }
        state.on_deal_hand(cards);
        state
    }

    #[test]
    fn no_pass_hand_skips_directly_to_the_barrier() {
        let mut state = dealt(0);
        state.on_start_phase(HandPhase::Pass, Some(PassDirection::None));
        assert_eq!(state.phase, Phase::PassingBarrier);
        assert!(!state.needs_to_pass());
    }

    #[test]
    fn passing_hand_enters_barrier_once_own_pass_is_sent() {
        let mut state = dealt(0);
        state.on_start_phase(HandPhase::Pass, Some(PassDirection::Left));
        state.token.assume_self();
        assert!(state.needs_to_pass());
        let cards = [
            Card::new(1, Suit::Hearts),
            Card::new(2, Suit::Hearts),
            Card::new(3, Suit::Hearts),
        ];
        state.on_own_pass_sent(cards);
        assert_eq!(state.phase, Phase::PassingBarrier);
        assert!(!state.needs_to_pass());
        for c in cards {
            assert!(!state.hand.contains(&c));
        }
    }

    #[test]
    fn needs_to_pass_is_false_until_the_token_arrives() {
        let mut state = dealt(1);
        state.on_start_phase(HandPhase::Pass, Some(PassDirection::Left));
        // STARTPHASE(Pass) has flipped the phase, but no TOKEN_PASS has
        // reached this peer yet.
        assert!(!state.needs_to_pass());
        state.token.observe(1);
        assert!(state.needs_to_pass());
    }

    #[test]
    fn needs_to_play_is_false_until_the_token_arrives() {
        let mut state = dealt(1);
        state.phase = Phase::Playing;
        assert!(!state.needs_to_play());
        state.token.observe(1);
        assert!(state.needs_to_play());
    }

    #[test]
    fn incoming_pass_merges_only_after_own_send_completes_a_lap() {
        let mut state = dealt(1);
        state.on_start_phase(HandPhase::Pass, Some(PassDirection::Left));
        let incoming = [
            Card::new(5, Suit::Clubs),
            Card::new(6, Suit::Clubs),
            Card::new(7, Suit::Clubs),
        ];
        state.on_pass_cards_incoming(incoming);
        // Own send hasn't lapped yet: not merged.
        assert!(!state.hand.contains(&Card::new(5, Suit::Clubs)));

        state.on_own_pass_lap_complete();
        for c in incoming {
            assert!(state.hand.contains(&c));
        }
    }

    #[test]
    fn entering_play_phase_forgets_a_stale_token_belief() {
        let mut state = dealt(3);
        state.token.assume_self();
        state.on_start_phase(HandPhase::Play, None);
        assert!(!state.token.hold());
    }

    #[test]
    fn needs_to_play_is_false_once_trick_is_full() {
        let mut state = dealt(0);
        state.phase = Phase::Playing;
        for p in 0..4u8 {
            state.on_play_card(p, Card::new(2, Suit::Clubs));
        }
        assert!(!state.needs_to_play());
    }

    #[test]
    fn needs_to_play_is_false_after_self_has_already_played() {
        let mut state = dealt(0);
        state.phase = Phase::Playing;
        state.on_play_card(0, Card::new(2, Suit::Clubs));
        assert!(!state.needs_to_play());
    }

    #[test]
    fn playing_a_heart_breaks_hearts() {
        let mut state = dealt(0);
        state.phase = Phase::Playing;
        assert!(!state.hearts_broken);
        state.on_play_card(1, Card::new(4, Suit::Hearts));
        assert!(state.hearts_broken);
    }

    #[test]
    fn trick_summary_advances_trick_count_and_scores() {
        let mut state = dealt(0);
        state.phase = Phase::Playing;
        for p in 0..4u8 {
            state.on_play_card(p, Card::new(2 + p, Suit::Clubs));
        }
        state.on_trick_summary(2, 5);
        assert_eq!(state.scores_hand[2], 5);
        assert_eq!(state.tricks_played, 1);
        assert!(state.current_trick.is_empty());
    }

    #[test]
    fn hand_summary_adopts_coordinator_scores() {
        let mut state = dealt(0);
        state.on_hand_summary([5, 6, 7, 8], [10, 20, 30, 40]);
        assert_eq!(state.scores_total, [10, 20, 30, 40]);
        assert_eq!(state.phase, Phase::HandSummary);
    }

    #[test]
    fn game_over_records_winner() {
        let mut state = dealt(0);
        state.on_game_over(2);
        assert_eq!(state.winner, Some(2));
        assert_eq!(state.phase, Phase::GameOver);
    }
}
