//! Token-passing mutual exclusion (spec §4.3). Tracks which peer may
//! originate action messages; updated only on the local processing of a
//! TOKEN_PASS frame.

use crate::protocol::{Message, PlayerId};

/// Per-peer view of who currently bears the token.
pub struct TokenArbiter {
    self_id: PlayerId,
    bearer: Option<PlayerId>,
}

impl TokenArbiter {
    pub fn new(self_id: PlayerId) -> Self {
        Self {
            self_id,
            bearer: None,
        }
    }

    /// True iff this peer may originate an action message right now.
    pub fn hold(&self) -> bool {
        self.bearer == Some(self.self_id)
    }

    pub fn bearer(&self) -> Option<PlayerId> {
        self.bearer
    }

    /// Discard whatever this peer believed about the bearer. Used at
    /// phase boundaries (pass→barrier→play, end of each trick) where a
    /// belief picked up from the ordinary self+1 handoff chain must not
    /// outlive the coordinator's next authoritative reassignment.
    pub fn forget(&mut self) {
        self.bearer = None;
    }

    /// Coordinator-only override (spec §4.3/§4.5): hand the token
    /// directly to `holder` regardless of whether this peer currently
    /// believes it holds it. Returns the TOKEN_PASS to send, or `None`
    /// when `holder` is this peer itself (no frame is needed).
    pub fn coordinator_assign(&mut self, holder: PlayerId) -> Option<Message> {
        if holder == self.self_id {
            self.assume_self();
            None
        } else {
            self.bearer = None;
            Some(Message::TokenPass { new_bearer: holder })
        }
    }

    /// P0 self-assigns the token at game start; no TOKEN_PASS is emitted
    /// for this initial assignment (spec §9 open question).
    pub fn assume_self(&mut self) {
        self.bearer = Some(self.self_id);
    }

    /// Apply a locally-processed TOKEN_PASS frame.
    pub fn observe(&mut self, new_bearer: PlayerId) {
        self.bearer = Some(new_bearer);
    }

    /// Build the TOKEN_PASS message handing the token to `peer_id`.
    ///
    /// Originating an action message (including this one) without
    /// holding the token is a programming error, not a protocol error
    /// (spec §4.3): callers must check [`TokenArbiter::hold`] first.
    pub fn release_to(&mut self, peer_id: PlayerId) -> Message {
        assert!(
            self.hold(),
            "release_to called by peer {} which does not hold the token",
            self.self_id
        );
        self.bearer = None;
        Message::TokenPass {
            new_bearer: peer_id,
        }
    }
}
