//! Session lifecycle state machines.
//!
//! Both ends of a connection track an explicit state with a fixed set of
//! legal transitions. `Closed` is terminal on both sides.
//!
//! ```text
//! client:  Disconnected ──▶ Connecting ──▶ Ready ──▶ Closed
//!               │               │                     ▲
//!               └───────────────┴─────────────────────┘
//!
//! host:    Disconnected ──▶ Listening ──▶ Ready ──▶ Closed
//!                               │                     ▲
//!                               └─────────────────────┘
//! ```

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-side session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Ready,
    Closed,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Disconnected, Closed)
                | (Connecting, Ready)
                | (Connecting, Closed)
                | (Ready, Closed)
        )
    }

    /// Move to `next`, or fail if the transition is not legal.
    pub fn transition(self, next: SessionState) -> Result<SessionState, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    pub fn is_ready(self) -> bool {
        self == SessionState::Ready
    }

    pub fn is_closed(self) -> bool {
        self == SessionState::Closed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Ready => "ready",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-side session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostState {
    #[default]
    Disconnected,
    Listening,
    Ready,
    Closed,
}

impl HostState {
    pub fn can_transition_to(self, next: HostState) -> bool {
        use HostState::*;
        matches!(
            (self, next),
            (Disconnected, Listening)
                | (Disconnected, Closed)
                | (Listening, Ready)
                | (Listening, Closed)
                | (Ready, Closed)
        )
    }

    pub fn transition(self, next: HostState) -> Result<HostState, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HostState::Disconnected => "disconnected",
            HostState::Listening => "listening",
            HostState::Ready => "ready",
            HostState::Closed => "closed",
        }
    }
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
