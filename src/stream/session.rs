//! One stream session per open camera view.
//!
//! A session exclusively owns one peer connection, negotiated receive-only
//! for a single video track. Supervising views (grid, control room,
//! expanded view) observe state through a watch channel and never see raw
//! errors; every exit path of an owning view must call `close()`, which is
//! idempotent and guards the session against late transport callbacks.

use crate::config::StreamSettings;
use crate::errors::StreamError;
use crate::signaling::SignalingClient;
use crate::stream::state::SessionState;
use crate::types::{CameraSource, StatusDot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as SyncMutex, Weak};
use tokio::sync::watch;
use uuid::Uuid;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::track::track_remote::TrackRemote;

/// Per-session transport options, taken from `[stream]` configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub ice_servers: Vec<String>,
}

impl From<&StreamSettings> for SessionOptions {
    fn from(settings: &StreamSettings) -> Self {
        Self {
            ice_servers: settings.ice_servers.clone(),
        }
    }
}

struct SessionInner {
    id: Uuid,
    camera_id: String,
    closed: AtomicBool,
    state_tx: watch::Sender<SessionState>,
    peer: tokio::sync::Mutex<Option<Arc<RTCPeerConnection>>>,
    track: SyncMutex<Option<Arc<TrackRemote>>>,
    status_line: SyncMutex<String>,
}

impl SessionInner {
    fn new(camera_id: String) -> Arc<Self> {
        let (state_tx, _) = watch::channel(SessionState::Connecting);
        Arc::new(Self {
            id: Uuid::new_v4(),
            camera_id,
            closed: AtomicBool::new(false),
            state_tx,
            peer: tokio::sync::Mutex::new(None),
            track: SyncMutex::new(None),
            status_line: SyncMutex::new(SessionState::Connecting.describe().to_string()),
        })
    }

    /// Apply a guarded transition; illegal moves are rejected, not applied.
    fn try_transition(&self, next: SessionState) -> bool {
        let mut applied = false;
        self.state_tx.send_if_modified(|current| {
            if current.can_transition_to(next) {
                *current = next;
                applied = true;
                true
            } else {
                false
            }
        });
        if applied {
            log::info!(
                "Session {} (camera {}) entered state {:?}",
                self.id,
                self.camera_id,
                next
            );
        }
        applied
    }

    fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    fn set_status_line(&self, line: impl Into<String>) {
        *self.status_line.lock().expect("lock poisoned") = line.into();
    }

    /// First inbound video track: publish it and go live.
    fn on_inbound_track(&self, track: Arc<TrackRemote>) {
        if self.closed.load(Ordering::SeqCst) {
            log::debug!("Ignoring track on closed session {}", self.id);
            return;
        }
        if track.kind() != RTPCodecType::Video {
            log::debug!(
                "Ignoring non-video track on session {} (kind {})",
                self.id,
                track.kind()
            );
            return;
        }

        let mut slot = self.track.lock().expect("lock poisoned");
        if slot.is_none() {
            *slot = Some(track);
        }
        drop(slot);

        if self.try_transition(SessionState::Live) {
            self.set_status_line(SessionState::Live.describe());
        }
    }

    /// Transport-level failure after negotiation started.
    fn on_transport_down(&self, reason: String) {
        if self.closed.load(Ordering::SeqCst) {
            log::debug!("Ignoring transport event on closed session {}", self.id);
            return;
        }

        self.track.lock().expect("lock poisoned").take();
        if self.try_transition(SessionState::Disconnected) {
            self.set_status_line(format!("Connection lost ({})", reason));
        }
    }

    /// Negotiation failure: terminal `Error` unless a close already won.
    fn on_negotiation_failed(&self, error: &StreamError) {
        if self.try_transition(SessionState::Error) {
            self.set_status_line(error.to_string());
        }
    }
}

/// Owner handle for one negotiated camera connection.
///
/// Cloning shares the same underlying session; the handle is cheap to pass
/// to renderers and command responses.
#[derive(Clone)]
pub struct StreamSession {
    inner: Arc<SessionInner>,
}

impl StreamSession {
    /// Open a session for `camera`: create the peer connection, negotiate
    /// through the gateway, and wire connectivity observers.
    ///
    /// Failures never escape: the returned session reports them as state
    /// `Error` with a human-readable status line.
    pub async fn open(
        camera: &CameraSource,
        signaling: &SignalingClient,
        options: &SessionOptions,
    ) -> StreamSession {
        let inner = SessionInner::new(camera.id.clone());
        let session = StreamSession {
            inner: Arc::clone(&inner),
        };
        log::info!(
            "Opening stream session {} for camera {} ({})",
            inner.id,
            camera.id,
            camera.name
        );

        if let Err(e) = session.negotiate(signaling, options).await {
            log::warn!(
                "Negotiation failed for session {} (camera {}): {}",
                inner.id,
                camera.id,
                e
            );
            inner.on_negotiation_failed(&e);
        }

        session
    }

    async fn negotiate(
        &self,
        signaling: &SignalingClient,
        options: &SessionOptions,
    ) -> Result<(), StreamError> {
        let inner = &self.inner;

        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| StreamError::signaling(format!("registering codecs: {}", e)))?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| StreamError::signaling(format!("registering interceptors: {}", e)))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: options
                .ice_servers
                .iter()
                .map(|url| RTCIceServer {
                    urls: vec![url.clone()],
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|e| StreamError::signaling(format!("creating peer connection: {}", e)))?,
        );

        // Hand the connection to the session before any await that a
        // concurrent close() could interleave with; holding the lock makes
        // the closed check and the store atomic against teardown.
        {
            let mut slot = inner.peer.lock().await;
            if inner.closed.load(Ordering::SeqCst) {
                drop(slot);
                let _ = peer.close().await;
                return Err(StreamError::transport("session closed during setup"));
            }
            *slot = Some(Arc::clone(&peer));
        }

        self.wire_observers(&peer);

        // Receive-only video; no audio is ever negotiated.
        peer.add_transceiver_from_kind(
            RTPCodecType::Video,
            Some(RTCRtpTransceiverInit {
                direction: RTCRtpTransceiverDirection::Recvonly,
                send_encodings: vec![],
            }),
        )
        .await
        .map_err(|e| StreamError::signaling(format!("adding video transceiver: {}", e)))?;

        let offer = peer
            .create_offer(None)
            .await
            .map_err(|e| StreamError::signaling(format!("creating offer: {}", e)))?;
        peer.set_local_description(offer)
            .await
            .map_err(|e| StreamError::signaling(format!("setting local description: {}", e)))?;

        // The exchange is one-shot (no trickle), so the offer must carry the
        // gathered candidates.
        let mut gathered = peer.gathering_complete_promise().await;
        let _ = gathered.recv().await;

        if inner.closed.load(Ordering::SeqCst) {
            return Err(StreamError::transport("session closed during gathering"));
        }

        let local = peer
            .local_description()
            .await
            .ok_or_else(|| StreamError::signaling("no local description after gathering"))?;

        let answer_sdp = signaling.negotiate(&inner.camera_id, &local.sdp).await?;

        // A close that raced the HTTP round trip wins; the late answer is
        // dropped on the floor.
        if inner.closed.load(Ordering::SeqCst) {
            return Err(StreamError::transport("session closed during signaling"));
        }

        let answer = RTCSessionDescription::answer(answer_sdp)
            .map_err(|e| StreamError::signaling(format!("parsing answer: {}", e)))?;
        peer.set_remote_description(answer)
            .await
            .map_err(|e| StreamError::signaling(format!("setting remote description: {}", e)))?;

        log::debug!(
            "Session {} negotiated; waiting for media from camera {}",
            inner.id,
            inner.camera_id
        );
        Ok(())
    }

    fn wire_observers(&self, peer: &Arc<RTCPeerConnection>) {
        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);

        let on_track_weak = weak.clone();
        peer.on_track(Box::new(move |track, _receiver, _transceiver| {
            let weak = on_track_weak.clone();
            Box::pin(async move {
                if let Some(inner) = weak.upgrade() {
                    inner.on_inbound_track(track);
                }
            })
        }));

        let on_ice_weak = weak.clone();
        peer.on_ice_connection_state_change(Box::new(move |state: RTCIceConnectionState| {
            let weak = on_ice_weak.clone();
            Box::pin(async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                match state {
                    RTCIceConnectionState::Failed | RTCIceConnectionState::Disconnected => {
                        inner.on_transport_down(format!("ICE {}", state));
                    }
                    other => {
                        log::debug!("Session {} ICE state {}", inner.id, other);
                    }
                }
            })
        }));

        let session_id = self.inner.id;
        peer.on_peer_connection_state_change(Box::new(move |state| {
            Box::pin(async move {
                log::debug!("Session {} peer connection state {}", session_id, state);
            })
        }));
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn camera_id(&self) -> &str {
        &self.inner.camera_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    /// Watch channel for renderers; fires on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    pub fn status_dot(&self) -> StatusDot {
        self.state().status_dot()
    }

    /// Short status line for the expanded single-camera view.
    pub fn status_line(&self) -> String {
        self.inner.status_line.lock().expect("lock poisoned").clone()
    }

    /// The negotiated inbound video track, once live.
    pub fn track(&self) -> Option<Arc<TrackRemote>> {
        self.inner.track.lock().expect("lock poisoned").clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Scoped teardown: release the peer connection and drop the track.
    ///
    /// Safe to call multiple times; only the first call closes the
    /// connection. A non-terminal session lands in `Disconnected`, an
    /// errored one stays `Error`.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            log::debug!("Session {} already closed", self.inner.id);
            return;
        }

        if self.inner.try_transition(SessionState::Disconnected) {
            self.inner
                .set_status_line(SessionState::Disconnected.describe());
        }
        self.inner.track.lock().expect("lock poisoned").take();

        let peer = self.inner.peer.lock().await.take();
        if let Some(peer) = peer {
            if let Err(e) = peer.close().await {
                log::warn!(
                    "Error closing peer connection for session {}: {}",
                    self.inner.id,
                    e
                );
            }
        }

        log::info!(
            "Closed stream session {} for camera {}",
            self.inner.id,
            self.inner.camera_id
        );
    }
}
