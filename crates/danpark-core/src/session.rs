// ── Session orchestration ──
//
// Full lifecycle management for an authenticated app session.
// Handles login, catalog bootstrap, live occupancy streaming into the
// ParkingStore, and the mutations that need server confirmation.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use danpark_api::models::{
    AppSettings, ParkingHistory, ProfileUpdate, SettingsUpdate, TokenPair, UserProfile,
};
use danpark_api::stream::{ConnectionState, StreamEvent, StreamHandle};
use danpark_api::transport::TransportConfig;
use danpark_api::ApiClient;

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::model::{LotId, ParkingLot};
use crate::store::ParkingStore;

// ── Session ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Manages the full session
/// lifecycle: authentication, catalog bootstrap, the SSE stream feeding
/// the [`ParkingStore`], and server-confirmed mutations.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    transport: TransportConfig,
    api: ApiClient,
    store: Arc<ParkingStore>,
    connection: watch::Sender<ConnectionState>,
    /// Lots with a favorite confirmation in flight. A lot present here
    /// rejects further toggles until its entry is removed.
    pending_favorites: DashMap<LotId, ()>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    /// Create a new session from configuration. Does NOT authenticate --
    /// call [`login()`](Self::login) or [`resume()`](Self::resume), then
    /// [`bootstrap()`](Self::bootstrap) to load data and start streaming.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let api = ApiClient::new(config.base_url.clone(), &transport)?;
        let (connection, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            inner: Arc::new(SessionInner {
                config,
                transport,
                api,
                store: Arc::new(ParkingStore::new()),
                connection,
                pending_favorites: DashMap::new(),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Access the underlying ParkingStore.
    pub fn store(&self) -> &Arc<ParkingStore> {
        &self.inner.store
    }

    // ── Authentication ───────────────────────────────────────────

    /// Register a new account. Returns the new user id.
    ///
    /// Registration does not sign in; call [`login()`](Self::login)
    /// afterwards.
    pub async fn signup(
        &self,
        email: &str,
        password: &SecretString,
        name: &str,
        student_id: &str,
    ) -> Result<i64, CoreError> {
        let user_id = self
            .inner
            .api
            .signup(email, password, name, student_id)
            .await?;
        info!(user_id, "account created");
        Ok(user_id)
    }

    /// Authenticate with email and password.
    ///
    /// Installs the access token on the API client and returns the full
    /// token pair so the caller can persist it.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<TokenPair, CoreError> {
        let pair = self.inner.api.login(email, password).await?;
        self.inner
            .api
            .set_token(SecretString::from(pair.access_token.expose_secret().to_owned()));
        info!("login successful");
        Ok(pair)
    }

    /// Install a previously stored access token without a network round
    /// trip.
    ///
    /// The token is not validated here; the first authenticated call
    /// surfaces [`CoreError::SessionExpired`] if it has gone stale.
    pub fn resume(&self, access_token: SecretString) {
        self.inner.api.set_token(access_token);
    }

    /// Whether an access token is installed.
    pub fn is_authenticated(&self) -> bool {
        self.inner.api.has_token()
    }

    // ── Bootstrap and teardown ───────────────────────────────────

    /// Load the catalog and start live streaming.
    ///
    /// Fetches the parking-lot catalog and the favorite list, seeds the
    /// store, and (unless streaming is disabled) opens the SSE stream and
    /// spawns the task that applies pushed updates.
    pub async fn bootstrap(&self) -> Result<(), CoreError> {
        let catalog = self.inner.api.parking_lots().await?;
        let lots: Vec<ParkingLot> = catalog.into_iter().map(ParkingLot::from).collect();
        self.inner.store.seed(lots);

        let favorite_ids: Vec<LotId> = self
            .inner
            .api
            .favorites()
            .await?
            .into_iter()
            .map(LotId::from)
            .collect();
        self.inner.store.seed_favorites(&favorite_ids);

        debug!(
            lots = self.inner.store.len(),
            favorites = favorite_ids.len(),
            "catalog seeded"
        );

        if self.inner.config.stream_enabled {
            let handle = StreamHandle::open(
                self.inner.api.stream_url(),
                self.inner.config.reconnect.clone(),
                &self.inner.transport,
                self.inner.cancel.clone(),
            )?;

            let task = tokio::spawn(apply_task(
                self.inner.store.clone(),
                handle.subscribe(),
                handle.state(),
                self.inner.connection.clone(),
                self.inner.cancel.clone(),
            ));
            self.inner.task_handles.lock().await.push(task);
        }

        Ok(())
    }

    /// Tear down the session.
    ///
    /// Cancels the stream and background tasks, waits for them to finish,
    /// and clears the installed token. Safe to call more than once.
    pub async fn close(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner.api.clear_token();
        let _ = self.inner.connection.send(ConnectionState::Disconnected);
        debug!("session closed");
    }

    // ── Favorites ────────────────────────────────────────────────

    /// Toggle the favorite flag on a lot, confirming with the server.
    ///
    /// Optimistic: the local flag flips first and rolls back if the
    /// server rejects the change. While a confirmation for a lot is in
    /// flight, further toggles of that lot are rejected with
    /// [`CoreError::FavoritePending`]. Returns the new flag value.
    pub async fn toggle_favorite(&self, id: &LotId) -> Result<bool, CoreError> {
        match self.inner.pending_favorites.entry(id.clone()) {
            Entry::Occupied(_) => return Err(CoreError::FavoritePending(id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }

        let result = self.confirm_toggle(id).await;
        self.inner.pending_favorites.remove(id);
        result
    }

    async fn confirm_toggle(&self, id: &LotId) -> Result<bool, CoreError> {
        let Some(new_value) = self.inner.store.toggle_favorite(id) else {
            return Err(CoreError::UnknownLot(id.clone()));
        };

        let confirm = async {
            if new_value {
                self.inner.api.add_favorite(id.as_str()).await
            } else {
                self.inner.api.remove_favorite(id.as_str()).await
            }
        };

        tokio::select! {
            biased;
            _ = self.inner.cancel.cancelled() => {
                // Teardown in progress; the flag stays as flipped and the
                // next bootstrap reseeds it from the server.
                Err(CoreError::Cancelled)
            }
            result = confirm => match result {
                Ok(()) => Ok(new_value),
                Err(e) => {
                    self.inner.store.set_favorite(id, !new_value);
                    warn!(lot = %id, error = %e, "favorite change rejected, rolled back");
                    Err(e.into())
                }
            }
        }
    }

    // ── Parking ──────────────────────────────────────────────────

    /// Claim a parking spot at a lot.
    ///
    /// The store enforces the single-assignment rule. History recording
    /// is advisory and runs in the background without blocking the claim
    /// or failing it; [`Session::close`] waits for it to land.
    pub async fn park(&self, id: &LotId, spot: &str) -> Result<(), CoreError> {
        self.inner.store.assign(id, spot)?;
        info!(lot = %id, spot, "parked");

        // The history endpoint wants the numeric form of the id.
        match id.as_numeric() {
            Some(numeric) => {
                let session = self.clone();
                let task = tokio::spawn(async move {
                    if let Err(e) = session.inner.api.record_parking(numeric).await {
                        warn!(lot = numeric, error = %e, "failed to record parking history");
                    }
                });
                self.inner.task_handles.lock().await.push(task);
            }
            None => warn!(lot = %id, "non-numeric lot id, parking history not recorded"),
        }

        Ok(())
    }

    /// Release the current parking assignment. Returns the lot left.
    pub fn leave(&self) -> Result<LotId, CoreError> {
        let id = self.inner.store.clear_assignment()?;
        info!(lot = %id, "left parking");
        Ok(id)
    }

    // ── Account ──────────────────────────────────────────────────

    /// Fetch the signed-in user's profile.
    pub async fn profile(&self) -> Result<UserProfile, CoreError> {
        Ok(self.inner.api.me().await?)
    }

    /// Update profile fields. Only the fields set on `update` change.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, CoreError> {
        Ok(self.inner.api.update_me(update).await?)
    }

    /// Fetch app settings.
    pub async fn settings(&self) -> Result<AppSettings, CoreError> {
        Ok(self.inner.api.settings().await?)
    }

    /// Update app settings. Only the fields set on `update` change.
    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<(), CoreError> {
        Ok(self.inner.api.update_settings(update).await?)
    }

    /// Fetch the parking history, most recent first.
    pub async fn history(&self) -> Result<Vec<ParkingHistory>, CoreError> {
        Ok(self.inner.api.parking_histories().await?)
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Apply pushed occupancy updates to the store and mirror the stream's
/// connection state onto the session.
async fn apply_task(
    store: Arc<ParkingStore>,
    mut events: broadcast::Receiver<StreamEvent>,
    mut state: watch::Receiver<ConnectionState>,
    connection: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = *state.borrow_and_update();
                let _ = connection.send(next);
            }
            event = events.recv() => match event {
                Ok(StreamEvent::ParkingUpdate(update)) => {
                    store.apply_update(&update);
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "parking updates lagged; occupancy may be briefly stale");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
