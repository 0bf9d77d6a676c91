// src/protocol/constants.rs
pub const HEADER_SIZE: usize = 5;
pub const MAX_PAYLOAD_SIZE: usize = 255;
pub const BROADCAST: u8 = 0xFF;

// Message type constants (§6 message catalog)
pub const MSG_TOKEN_PASS: u8 = 0x01;
pub const MSG_GAME_START: u8 = 0x02;
pub const MSG_DEAL_HAND: u8 = 0x03;
pub const MSG_START_PHASE: u8 = 0x04;
pub const MSG_PASS_CARDS: u8 = 0x05;
pub const MSG_PLAY_CARD: u8 = 0x06;
pub const MSG_TRICK_SUMMARY: u8 = 0x07;
pub const MSG_HAND_SUMMARY: u8 = 0x08;
pub const MSG_GAME_OVER: u8 = 0x09;

pub const PLAYERS: usize = 4;
pub const CARDS_PER_HAND: usize = 13;
pub const CARDS_PASSED: usize = 3;
pub const TRICKS_PER_HAND: usize = 13;
pub const POINTS_TO_WIN_HAND: u16 = 26;
pub const GAME_OVER_SCORE: u32 = 100;

pub const NO_SHOOTER: u8 = 0xFF;
