//! Connection state machine for a stream session.
//!
//! The reference lifecycle is strictly monotonic: a session negotiates
//! once, goes live at most once, and ends in exactly one of two terminal
//! states. Retrying means a new session, never a transition back.

use crate::types::StatusDot;
use serde::{Deserialize, Serialize};

/// Lifecycle state of one stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Peer connection created, negotiation in flight, no media yet.
    Connecting,
    /// First inbound video track arrived; media is flowing.
    Live,
    /// The transport failed or disconnected after negotiation. Terminal.
    Disconnected,
    /// Offer/answer negotiation itself failed. Terminal.
    Error,
}

impl SessionState {
    /// Whether the monotonic lifecycle permits moving to `next`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::Connecting, SessionState::Live)
                | (SessionState::Connecting, SessionState::Disconnected)
                | (SessionState::Connecting, SessionState::Error)
                | (SessionState::Live, SessionState::Disconnected)
        )
    }

    /// Terminal states require a new session instance to leave.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Disconnected | SessionState::Error)
    }

    /// Indicator style for renderers.
    pub fn status_dot(self) -> StatusDot {
        match self {
            SessionState::Live => StatusDot::Live,
            SessionState::Connecting => StatusDot::Pulsing,
            SessionState::Disconnected | SessionState::Error => StatusDot::Failure,
        }
    }

    /// Short human-readable status line for the expanded single-camera view.
    pub fn describe(self) -> &'static str {
        match self {
            SessionState::Connecting => "Connecting...",
            SessionState::Live => "Live",
            SessionState::Disconnected => "Connection lost",
            SessionState::Error => "Could not connect",
        }
    }
}
