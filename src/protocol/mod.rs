//! Wire protocol: the fixed 5-byte header, the 9-message catalog, and the
//! card/player/pass-direction data model shared by every other module.

pub mod binary;
pub mod constants;
pub mod message;
pub mod types;

pub use binary::BinaryProtocol;
pub use constants::*;
pub use message::{Frame, HandPhase, Message};
pub use types::{Card, PassDirection, PlayerId, Suit};
