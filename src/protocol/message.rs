// src/protocol/message.rs
use crate::error::{Error, Result};
use crate::protocol::constants::*;
use crate::protocol::types::{Card, PassDirection, PlayerId};

/// A decoded wire frame: 5-byte header plus payload bytes, payload shape
/// still opaque (see [`Message`] for the typed view).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u8,
    pub origin_id: PlayerId,
    pub destination_id: u8,
    pub seq_num: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn is_broadcast(&self) -> bool {
        self.destination_id == BROADCAST
    }
}

/// The phase announced by START_PHASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPhase {
    Pass,
    Play,
}

/// Typed view over the 9 message kinds in the catalog (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    TokenPass {
        new_bearer: PlayerId,
    },
    GameStart,
    DealHand {
        cards: [Card; CARDS_PER_HAND],
    },
    StartPhase {
        phase: HandPhase,
        direction: Option<PassDirection>,
    },
    PassCards {
        cards: [Card; CARDS_PASSED],
    },
    PlayCard {
        card: Card,
    },
    TrickSummary {
        winner: PlayerId,
        plays: [(PlayerId, Card); PLAYERS],
        points: u8,
    },
    HandSummary {
        scores_hand: [u8; PLAYERS],
        scores_total: [u8; PLAYERS],
        shooter: Option<PlayerId>,
    },
    GameOver {
        winner: PlayerId,
        final_scores: [u8; PLAYERS],
    },
}

impl Message {
    pub fn msg_type(&self) -> u8 {
        match self {
            Message::TokenPass { .. } => MSG_TOKEN_PASS,
            Message::GameStart => MSG_GAME_START,
            Message::DealHand { .. } => MSG_DEAL_HAND,
            Message::StartPhase { .. } => MSG_START_PHASE,
            Message::PassCards { .. } => MSG_PASS_CARDS,
            Message::PlayCard { .. } => MSG_PLAY_CARD,
            Message::TrickSummary { .. } => MSG_TRICK_SUMMARY,
            Message::HandSummary { .. } => MSG_HAND_SUMMARY,
            Message::GameOver { .. } => MSG_GAME_OVER,
        }
    }

    /// Whether this message kind is always addressed with `destination_id = 0xFF`.
    pub fn is_broadcast_kind(&self) -> bool {
        matches!(
            self,
            Message::GameStart
                | Message::StartPhase { .. }
                | Message::PlayCard { .. }
                | Message::TrickSummary { .. }
                | Message::HandSummary { .. }
                | Message::GameOver { .. }
        )
    }

    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Message::TokenPass { new_bearer } => vec![*new_bearer],
            Message::GameStart => Vec::new(),
            Message::DealHand { cards } => cards.iter().map(|c| c.to_byte()).collect(),
            Message::StartPhase { phase, direction } => {
                let mut buf = vec![match phase {
                    HandPhase::Pass => 0,
                    HandPhase::Play => 1,
                }];
                if let Some(dir) = direction {
                    buf.push(dir.to_byte());
                }
                buf
            }
            Message::PassCards { cards } => cards.iter().map(|c| c.to_byte()).collect(),
            Message::PlayCard { card } => vec![card.to_byte()],
            Message::TrickSummary {
                winner,
                plays,
                points,
            } => {
                let mut buf = Vec::with_capacity(10);
                buf.push(*winner);
                for (player, card) in plays {
                    buf.push(*player);
                    buf.push(card.to_byte());
                }
                buf.push(*points);
                buf
            }
            Message::HandSummary {
                scores_hand,
                scores_total,
                shooter,
            } => {
                let mut buf = Vec::with_capacity(9);
                buf.extend_from_slice(scores_hand);
                buf.extend_from_slice(scores_total);
                buf.push(shooter.unwrap_or(NO_SHOOTER));
                buf
            }
            Message::GameOver {
                winner,
                final_scores,
            } => {
                let mut buf = Vec::with_capacity(5);
                buf.push(*winner);
                buf.extend_from_slice(final_scores);
                buf
            }
        }
    }

    pub fn decode(msg_type: u8, payload: &[u8]) -> Result<Message> {
        match msg_type {
            MSG_TOKEN_PASS => {
                let b = expect_len(payload, 1)?;
                Ok(Message::TokenPass { new_bearer: b[0] })
            }
            MSG_GAME_START => {
                expect_len(payload, 0)?;
                Ok(Message::GameStart)
            }
            MSG_DEAL_HAND => {
                let b = expect_len(payload, CARDS_PER_HAND)?;
                let mut cards = [Card::TWO_OF_CLUBS; CARDS_PER_HAND];
                for (i, byte) in b.iter().enumerate() {
                    cards[i] = decode_card(*byte)?;
                }
                Ok(Message::DealHand { cards })
            }
            MSG_START_PHASE => {
                if payload.is_empty() {
                    return Err(Error::Codec("START_PHASE payload empty".into()));
                }
                let phase = match payload[0] {
                    0 => HandPhase::Pass,
                    1 => HandPhase::Play,
                    other => {
                        return Err(Error::Codec(format!("unknown START_PHASE value {other}")))
                    }
                };
                let direction = match phase {
                    HandPhase::Pass => {
                        let b = expect_len(payload, 2)?;
                        Some(PassDirection::from_byte(b[1]).ok_or_else(|| {
                            Error::Codec(format!("unknown pass direction {}", b[1]))
                        })?)
                    }
                    HandPhase::Play => {
                        expect_len(payload, 1)?;
                        None
                    }
                };
                Ok(Message::StartPhase { phase, direction })
            }
            MSG_PASS_CARDS => {
                let b = expect_len(payload, CARDS_PASSED)?;
                let mut cards = [Card::TWO_OF_CLUBS; CARDS_PASSED];
                for (i, byte) in b.iter().enumerate() {
                    cards[i] = decode_card(*byte)?;
                }
                Ok(Message::PassCards { cards })
            }
            MSG_PLAY_CARD => {
                let b = expect_len(payload, 1)?;
                Ok(Message::PlayCard {
                    card: decode_card(b[0])?,
                })
            }
            MSG_TRICK_SUMMARY => {
                let b = expect_len(payload, 10)?;
                let winner = b[0];
                let mut plays: [(PlayerId, Card); PLAYERS] =
                    [(0, Card::TWO_OF_CLUBS); PLAYERS];
                for i in 0..PLAYERS {
                    let player = b[1 + i * 2];
                    let card = decode_card(b[2 + i * 2])?;
                    plays[i] = (player, card);
                }
                let points = b[9];
                Ok(Message::TrickSummary {
                    winner,
                    plays,
                    points,
                })
            }
            MSG_HAND_SUMMARY => {
                let b = expect_len(payload, 9)?;
                let mut scores_hand = [0u8; PLAYERS];
                scores_hand.copy_from_slice(&b[0..4]);
                let mut scores_total = [0u8; PLAYERS];
                scores_total.copy_from_slice(&b[4..8]);
                let shooter = if b[8] == NO_SHOOTER { None } else { Some(b[8]) };
                Ok(Message::HandSummary {
                    scores_hand,
                    scores_total,
                    shooter,
                })
            }
            MSG_GAME_OVER => {
                let b = expect_len(payload, 5)?;
                let winner = b[0];
                let mut final_scores = [0u8; PLAYERS];
                final_scores.copy_from_slice(&b[1..5]);
                Ok(Message::GameOver {
                    winner,
                    final_scores,
                })
            }
            other => Err(Error::Codec(format!("unknown message type 0x{other:02x}"))),
        }
    }
}

fn expect_len(payload: &[u8], len: usize) -> Result<&[u8]> {
    if payload.len() != len {
        return Err(Error::Codec(format!(
            "expected payload of {len} bytes, got {}",
            payload.len()
        )));
    }
    Ok(payload)
}

fn decode_card(byte: u8) -> Result<Card> {
    Card::from_byte(byte).ok_or_else(|| Error::Codec(format!("invalid card byte 0x{byte:02x}")))
}
