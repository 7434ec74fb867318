//! SSE parking-update stream with auto-reconnect.
//!
//! Connects to the backend's `/api/parking/stream` push channel and
//! broadcasts decoded events through a [`tokio::sync::broadcast`] channel.
//! Connection health is published on a [`tokio::sync::watch`] channel so
//! consumers can render status without touching the event stream.
//!
//! # Example
//!
//! ```rust,ignore
//! use danpark_api::stream::{ReconnectPolicy, StreamHandle};
//! use danpark_api::transport::TransportConfig;
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let url = Url::parse("https://api.danpark.app/api/parking/stream")?;
//!
//! let handle = StreamHandle::open(
//!     url,
//!     ReconnectPolicy::default(),
//!     &TransportConfig::default(),
//!     cancel.clone(),
//! )?;
//! let mut events = handle.subscribe();
//!
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//!
//! handle.close();
//! ```

mod sse;

use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::models::CongestionLevel;
use crate::transport::TransportConfig;

use self::sse::SseParser;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 1024;

// ── Events ───────────────────────────────────────────────────────────

/// Occupancy update for a single lot, pushed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingUpdate {
    pub id: String,
    pub total_spaces: u32,
    pub current_parked: u32,
    pub congestion_level: CongestionLevel,
}

/// A decoded event from the push channel.
///
/// One variant today; the tag/content serde layout matches the wire shape
/// `{ "type": ..., "data": ... }` so events round-trip for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StreamEvent {
    #[serde(rename = "PARKING_UPDATE")]
    ParkingUpdate(ParkingUpdate),
}

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection lifecycle of the push channel.
///
/// Owned by the stream task; consumers only ever read it through the
/// watch channel. Errors never surface as failures -- this is the whole
/// error reporting surface of the stream layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
            Self::Error => f.write_str("error"),
        }
    }
}

// ── ReconnectPolicy ──────────────────────────────────────────────────

/// Reconnection policy for the push channel.
///
/// The default matches the backend contract: retry forever at a fixed
/// 3-second interval. Raising `max_interval` above `interval` switches to
/// doubling growth clamped at the cap, for deployments where a fleet of
/// reconnecting clients would otherwise hammer the backend in lockstep.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Reconnect at all after a transport error. Default: true.
    pub auto_reconnect: bool,

    /// Delay before each reconnection attempt. Default: 3s.
    pub interval: Duration,

    /// Upper bound on the delay. Default: 3s (fixed interval).
    pub max_interval: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            interval: Duration::from_millis(3000),
            max_interval: Duration::from_millis(3000),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (0-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        if self.max_interval <= self.interval {
            return self.interval;
        }
        let scaled = self.interval.as_secs_f64() * 2.0_f64.powf(f64::from(attempt.min(20)));
        Duration::from_secs_f64(scaled.min(self.max_interval.as_secs_f64()))
    }
}

// ── StreamHandle ─────────────────────────────────────────────────────

/// Handle to a running push-channel subscription.
///
/// The connection itself lives in a background task; the handle only
/// carries the channels and the cancellation token. Call
/// [`close`](Self::close) to tear the task down.
pub struct StreamHandle {
    event_rx: broadcast::Receiver<StreamEvent>,
    state_rx: watch::Receiver<ConnectionState>,
    attempts_rx: watch::Receiver<u32>,
    cancel: CancellationToken,
}

impl StreamHandle {
    /// Open the push channel and spawn the reconnection loop.
    ///
    /// Returns as soon as the background task is spawned; the first
    /// connection attempt happens asynchronously. Watch
    /// [`state`](Self::state) for the outcome.
    pub fn open(
        url: Url,
        policy: ReconnectPolicy,
        transport: &TransportConfig,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        let http = transport.build_stream_client()?;
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (attempts_tx, attempts_rx) = watch::channel(0);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            sse_loop(http, url, event_tx, state_tx, attempts_tx, policy, task_cancel).await;
        });

        Ok(Self { event_rx, state_rx, attempts_rx, cancel })
    }

    /// Get a new broadcast receiver for decoded events.
    ///
    /// Multiple consumers can subscribe concurrently. A consumer that
    /// falls behind receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.event_rx.resubscribe()
    }

    /// Watch the connection state.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Watch the reconnect-attempt counter (reset to 0 on each successful
    /// connection).
    pub fn attempts(&self) -> watch::Receiver<u32> {
        self.attempts_rx.clone()
    }

    /// Tear down the subscription: cancel any pending reconnect sleep and
    /// drop the active transport. Safe to call any number of times.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on error, wait out the policy interval →
/// reconnect. Exactly one attempt is scheduled per error.
async fn sse_loop(
    http: reqwest::Client,
    url: Url,
    event_tx: broadcast::Sender<StreamEvent>,
    state_tx: watch::Sender<ConnectionState>,
    attempts_tx: watch::Sender<u32>,
    policy: ReconnectPolicy,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = connect_and_read(&http, &url, &event_tx, &state_tx, &attempts_tx, &cancel) => {
                match result {
                    // Only returned when cancellation raced the read; the
                    // biased arm above will observe it next iteration.
                    Ok(()) => {}
                    Err(e) => {
                        // A closed stream means the last connect succeeded,
                        // so this failure starts a fresh attempt count.
                        if matches!(e, Error::StreamClosed(_)) {
                            attempt = 0;
                        }

                        let _ = state_tx.send(ConnectionState::Error);
                        tracing::warn!(error = %e, attempt, "parking stream error");

                        if !policy.auto_reconnect {
                            break;
                        }

                        if let Some(max) = policy.max_attempts {
                            if attempt >= max {
                                tracing::error!(
                                    max_attempts = max,
                                    "parking stream reconnection limit reached, giving up"
                                );
                                break;
                            }
                        }

                        let delay = policy.delay_for(attempt);
                        tracing::info!(?delay, attempt, "waiting before reconnect");

                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(delay) => {}
                        }

                        attempt += 1;
                        let _ = attempts_tx.send(attempt);
                    }
                }
            }
        }
    }

    let _ = state_tx.send(ConnectionState::Disconnected);
    tracing::debug!("parking stream loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one SSE connection and read frames until it drops.
///
/// The server ending the response body counts as a transport error: the
/// channel is expected to stay open indefinitely, so an EOF means the
/// connection was lost and the reconnect policy applies.
async fn connect_and_read(
    http: &reqwest::Client,
    url: &Url,
    event_tx: &broadcast::Sender<StreamEvent>,
    state_tx: &watch::Sender<ConnectionState>,
    attempts_tx: &watch::Sender<u32>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let _ = state_tx.send(ConnectionState::Connecting);
    tracing::info!(url = %url, "connecting to parking stream");

    let response = http
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(|e| Error::StreamConnect(e.to_string()))?
        .error_for_status()
        .map_err(|e| Error::StreamConnect(e.to_string()))?;

    let _ = state_tx.send(ConnectionState::Connected);
    let _ = attempts_tx.send(0);
    tracing::info!("parking stream connected");

    let mut body = response.bytes_stream();
    let mut parser = SseParser::new();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            chunk = body.next() => {
                match chunk {
                    Some(Ok(bytes)) => {
                        for payload in parser.feed(&bytes) {
                            decode_and_broadcast(&payload, event_tx);
                        }
                    }
                    Some(Err(e)) => return Err(Error::StreamClosed(e.to_string())),
                    None => return Err(Error::StreamClosed("stream ended".into())),
                }
            }
        }
    }
}

// ── Payload decoding ─────────────────────────────────────────────────

/// Raw envelope the backend pushes on the SSE channel.
#[derive(Debug, Deserialize)]
struct PushEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decode one SSE payload and broadcast the event it carries.
///
/// Malformed JSON and payloads whose `data` does not match the typed
/// event are logged and dropped -- this is an acceptable-loss channel and
/// a bad message must never break the stream. Unknown `type` values are
/// ignored.
fn decode_and_broadcast(payload: &str, event_tx: &broadcast::Sender<StreamEvent>) {
    let envelope: PushEnvelope = match serde_json::from_str(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(error = %e, "dropping malformed stream payload");
            return;
        }
    };

    match envelope.kind.as_str() {
        "PARKING_UPDATE" => match serde_json::from_value::<ParkingUpdate>(envelope.data) {
            Ok(update) => {
                // Ignore send errors -- just means no subscribers right now.
                let _ = event_tx.send(StreamEvent::ParkingUpdate(update));
            }
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed parking update");
            }
        },
        other => {
            tracing::trace!(kind = other, "ignoring unknown stream event type");
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
