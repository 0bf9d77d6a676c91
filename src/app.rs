//! Top-level peer wiring: owns the socket, the phase state, and (for
//! peer 0) the coordinator, and runs the cooperative event loop tying
//! `transport` → `phase` → `strategy` → `token` together.
//!
//! Grounded on the teacher's `app::BitCrapsApp`: one struct that owns
//! every subsystem handle and exposes a single `run`-style entrypoint.

use crate::config::PeerConfig;
use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::phase::{Phase, PeerState};
use crate::protocol::constants::{CARDS_PASSED, PLAYERS, TRICKS_PER_HAND};
use crate::protocol::{Card, Frame, HandPhase, Message, PlayerId};
use crate::rules;
use crate::strategy::{self, PlayerStrategy};
use crate::transport::{addressed_to, RingEvent, RingTransport};

pub struct Peer<S: PlayerStrategy> {
    transport: RingTransport,
    state: PeerState,
    coordinator: Option<Coordinator>,
    strategy: S,
}

impl<S: PlayerStrategy> Peer<S> {
    pub async fn bind(config: PeerConfig, strategy: S) -> Result<Self> {
        let transport = RingTransport::bind(config.listen, config.successor, config.self_id).await?;
        let state = PeerState::new(config.self_id);
        let coordinator = if config.self_id == 0 {
            Some(Coordinator::new())
        } else {
            None
        };
        Ok(Self {
            transport,
            state,
            coordinator,
            strategy,
        })
    }

    /// Drive this peer until the game ends. Peer 0 kicks the game off
    /// before entering the shared receive loop; every other peer simply
    /// waits for the ring to bring it events.
    pub async fn run(&mut self) -> Result<()> {
        if self.state.self_id == 0 {
            self.start_game().await?;
        }
        self.maybe_act().await?;

        loop {
            if self.state.phase == Phase::GameOver {
                return Ok(());
            }

            match self.transport.recv_event().await? {
                RingEvent::LapComplete(frame) => self.handle_lap_complete(frame).await?,
                RingEvent::Local { frame, raw } => {
                    let message = Message::decode(frame.msg_type, &frame.payload)?;

                    let pass_barrier_done = match &message {
                        Message::PassCards { cards } => self
                            .coordinator
                            .as_mut()
                            .map(|c| c.observe_pass_cards(frame.origin_id, *cards))
                            .unwrap_or(false),
                        _ => false,
                    };
                    if pass_barrier_done {
                        self.advance_to_play_phase().await?;
                    }

                    if addressed_to(&frame, self.state.self_id) {
                        self.handle_local(frame.origin_id, message).await?;
                    }
                    self.transport.forward(&raw).await?;
                }
            }

            self.maybe_act().await?;
        }
    }

    /// Coordinator-only: kick off the very first hand. A self-originated
    /// broadcast is never handed back to this peer through the normal
    /// process-locally path (spec §4.2), so P0 applies every effect of
    /// its own coordinator messages directly rather than waiting to
    /// "receive" them.
    async fn start_game(&mut self) -> Result<()> {
        self.transport.originate(&Message::GameStart, crate::protocol::BROADCAST).await?;
        self.state.on_game_start();
        self.deal_next_hand().await
    }

    async fn deal_next_hand(&mut self) -> Result<()> {
        let coordinator = self
            .coordinator
            .as_mut()
            .expect("deal_next_hand is coordinator-only");
        let deal = coordinator.deal();

        for (destination, message) in deal.iter().enumerate() {
            self.transport.originate(message, destination as PlayerId).await?;
            if destination as PlayerId == self.state.self_id {
                if let Message::DealHand { cards } = message {
                    self.state.on_deal_hand(*cards);
                }
            }
        }

        let direction = self.coordinator.as_ref().unwrap().pass_direction();
        self.transport
            .originate(
                &Message::StartPhase {
                    phase: HandPhase::Pass,
                    direction: Some(direction),
                },
                crate::protocol::BROADCAST,
            )
            .await?;
        self.state.on_start_phase(HandPhase::Pass, Some(direction));

        if self.coordinator.as_ref().unwrap().barrier_trivially_complete() {
            self.advance_to_play_phase().await?;
        } else {
            self.state.token.assume_self();
        }
        Ok(())
    }

    /// Coordinator-only: announce the play phase and hand the token to
    /// whoever ended up holding the 2♣ after this hand's pass.
    async fn advance_to_play_phase(&mut self) -> Result<()> {
        self.transport
            .originate(
                &Message::StartPhase {
                    phase: HandPhase::Play,
                    direction: None,
                },
                crate::protocol::BROADCAST,
            )
            .await?;
        self.state.on_start_phase(HandPhase::Play, None);

        let holder = self.coordinator.as_ref().unwrap().two_of_clubs_holder();
        if let Some(msg) = self.state.token.coordinator_assign(holder) {
            self.transport.originate(&msg, holder).await?;
        }
        Ok(())
    }

    /// A frame this peer itself originated has completed a full lap.
    /// Every other coordinator-message effect was already applied
    /// directly at origination time; only the pass-phase barrier still
    /// needs this signal.
    async fn handle_lap_complete(&mut self, frame: Frame) -> Result<()> {
        let message = Message::decode(frame.msg_type, &frame.payload)?;
        if let Message::PassCards { cards } = message {
            self.state.on_own_pass_lap_complete();
            let pass_barrier_done = self
                .coordinator
                .as_mut()
                .map(|c| c.observe_pass_cards(frame.origin_id, cards))
                .unwrap_or(false);
            if pass_barrier_done {
                self.advance_to_play_phase().await?;
            }
        }
        Ok(())
    }

    async fn handle_local(&mut self, origin: PlayerId, message: Message) -> Result<()> {
        match message {
            Message::TokenPass { new_bearer } => self.state.token.observe(new_bearer),
            Message::GameStart => self.state.on_game_start(),
            Message::DealHand { cards } => self.state.on_deal_hand(cards),
            Message::StartPhase { phase, direction } => self.state.on_start_phase(phase, direction),
            Message::PassCards { cards } => self.state.on_pass_cards_incoming(cards),
            Message::PlayCard { card } => {
                self.state.on_play_card(origin, card);
                if self.state.current_trick.len() == PLAYERS && self.coordinator.is_some() {
                    self.summarize_trick().await?;
                }
            }
            Message::TrickSummary { winner, points, .. } => {
                self.state.on_trick_summary(winner, points);
            }
            Message::HandSummary {
                scores_hand,
                scores_total,
                ..
            } => {
                self.state.on_hand_summary(scores_hand, scores_total);
            }
            Message::GameOver { winner, .. } => self.state.on_game_over(winner),
        }
        Ok(())
    }

    /// Act on the token if this peer currently bears it and the phase
    /// calls for an action; may perform several actions back to back
    /// (e.g. passing immediately unblocks nothing further, but keeps the
    /// loop uniform for future extension).
    async fn maybe_act(&mut self) -> Result<()> {
        loop {
            if self.state.needs_to_pass() {
                self.act_pass().await?;
                continue;
            }
            if self.state.needs_to_play() {
                self.act_play().await?;
                continue;
            }
            break;
        }
        Ok(())
    }

    async fn act_pass(&mut self) -> Result<()> {
        let cards = self.strategy.choose_pass(&self.state.hand, self.state.pass_direction);
        let cards = if cards.iter().all(|c| self.state.hand.contains(c)) {
            cards
        } else {
            tracing::warn!("strategy returned an illegal pass; substituting lowest cards");
            lowest_three(&self.state.hand)
        };

        let target = rules::pass_target(self.state.self_id, self.state.pass_direction)
            .expect("needs_to_pass implies an active pass direction");
        self.transport.originate(&Message::PassCards { cards }, target).await?;
        self.state.on_own_pass_sent(cards);

        if self.state.self_id != PLAYERS as PlayerId - 1 {
            let next = (self.state.self_id + 1) % PLAYERS as PlayerId;
            let msg = self.state.token.release_to(next);
            self.transport.originate(&msg, next).await?;
        }
        Ok(())
    }

    async fn act_play(&mut self) -> Result<()> {
        let is_first = self.state.is_first_trick_of_hand();
        let legal = rules::legal_plays(
            &self.state.hand,
            &self.state.current_trick,
            self.state.hearts_broken,
            is_first,
        );
        let chosen = self.strategy.choose_play(
            &self.state.hand,
            &legal,
            &self.state.current_trick,
            self.state.hearts_broken,
        );
        let chosen = if legal.contains(&chosen) {
            chosen
        } else {
            tracing::warn!("strategy returned an illegal play; substituting lowest legal card");
            strategy::lowest_legal(&legal)
        };

        self.transport
            .originate(&Message::PlayCard { card: chosen }, crate::protocol::BROADCAST)
            .await?;
        self.state.on_play_card(self.state.self_id, chosen);

        if self.state.current_trick.len() == PLAYERS {
            if self.coordinator.is_some() {
                self.summarize_trick().await?;
            }
        } else {
            let next = (self.state.self_id + 1) % PLAYERS as PlayerId;
            let msg = self.state.token.release_to(next);
            self.transport.originate(&msg, next).await?;
        }
        Ok(())
    }

    /// Coordinator-only: a trick just completed under this peer's watch.
    async fn summarize_trick(&mut self) -> Result<()> {
        let trick = self.state.current_trick.clone();
        let (winner, points) = Coordinator::decide_trick(&trick);
        let mut plays: [(PlayerId, Card); PLAYERS] = [(0, Card::TWO_OF_CLUBS); PLAYERS];
        plays.copy_from_slice(&trick);

        self.transport
            .originate(
                &Message::TrickSummary { winner, plays, points },
                crate::protocol::BROADCAST,
            )
            .await?;
        self.state.on_trick_summary(winner, points);

        if (self.state.tricks_played as usize) < TRICKS_PER_HAND {
            if let Some(msg) = self.state.token.coordinator_assign(winner) {
                self.transport.originate(&msg, winner).await?;
            }
        } else {
            self.summarize_hand().await?;
        }
        Ok(())
    }

    /// Coordinator-only: all 13 tricks of this hand are in.
    async fn summarize_hand(&mut self) -> Result<()> {
        let (scores_hand, scores_total, shooter) =
            Coordinator::decide_hand(self.state.scores_hand, self.state.scores_total);

        self.transport
            .originate(
                &Message::HandSummary {
                    scores_hand,
                    scores_total,
                    shooter,
                },
                crate::protocol::BROADCAST,
            )
            .await?;
        self.state.on_hand_summary(scores_hand, scores_total);

        if let Some(winner) = Coordinator::decide_game_over(self.state.scores_total) {
            self.transport
                .originate(
                    &Message::GameOver {
                        winner,
                        final_scores: scores_total,
                    },
                    crate::protocol::BROADCAST,
                )
                .await?;
            self.state.on_game_over(winner);
        } else {
            if let Some(coordinator) = self.coordinator.as_mut() {
                coordinator.rotate_pass_direction();
            }
            self.deal_next_hand().await?;
        }
        Ok(())
    }
}

fn lowest_three(hand: &[Card]) -> [Card; CARDS_PASSED] {
    let mut sorted: Vec<Card> = hand.to_vec();
    sorted.sort();
    let mut chosen = [Card::TWO_OF_CLUBS; CARDS_PASSED];
    chosen.copy_from_slice(&sorted[..CARDS_PASSED]);
    chosen
}
