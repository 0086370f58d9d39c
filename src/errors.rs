use thiserror::Error;

/// Failure taxonomy for the streaming subsystem.
///
/// `Signaling` and `Transport` are surfaced to renderers as session state
/// (`Error` and `Disconnected` respectively), never as raw errors; the
/// remaining variants belong to the gateway/config plumbing around the
/// sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The negotiation HTTP call did not succeed, or the transport rejected
    /// the offer/answer exchange.
    #[error("signaling failure: {0}")]
    Signaling(String),

    /// A negotiated connection reported failure or disconnection.
    #[error("transport disconnected: {0}")]
    Transport(String),

    /// The camera list has no entry for the requested identifier.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// A non-negotiation gateway endpoint failed (list, toggle, snapshot).
    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl StreamError {
    pub fn signaling(msg: impl Into<String>) -> Self {
        StreamError::Signaling(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        StreamError::Transport(msg.into())
    }

    pub fn camera_unavailable(camera_id: &str) -> Self {
        StreamError::CameraUnavailable(format!("no camera with id {}", camera_id))
    }

    pub fn gateway(msg: impl Into<String>) -> Self {
        StreamError::Gateway(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        StreamError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_carry_the_taxonomy() {
        assert_eq!(
            StreamError::signaling("gateway returned 500").to_string(),
            "signaling failure: gateway returned 500"
        );
        assert_eq!(
            StreamError::camera_unavailable("cam-7").to_string(),
            "camera unavailable: no camera with id cam-7"
        );
    }
}
