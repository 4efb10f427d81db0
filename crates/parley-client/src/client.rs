//! Client state shared by every use-case.
//!
//! Collaborators are injected through [`Client::new`]; [`Client::connect`]
//! builds the production set (SQLite file, REST + WebSocket repositories)
//! from a [`ClientConfig`].

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use tokio::sync::watch;
use tracing::info;
use url::Url;

use parley_net::{
    ApiClient, AuthRepository, ChatRepository, RemoteAuthRepository, RemoteChatRepository,
    RemoteUserRepository, UserRepository,
};
use parley_shared::crypto::derive_session_key;
use parley_shared::models::User;
use parley_store::{Database, Session, SessionStore};
use parley_sync::ChatSync;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

pub struct Client {
    pub(crate) config: ClientConfig,
    pub(crate) session: SessionStore,
    database: Arc<Mutex<Database>>,
    pub(crate) auth: Arc<dyn AuthRepository>,
    pub(crate) chats: Arc<dyn ChatRepository>,
    pub(crate) users: Arc<dyn UserRepository>,
    /// Running while a user is signed in.
    pub(crate) sync: tokio::sync::Mutex<Option<ChatSync>>,
}

impl Client {
    pub fn new(
        config: ClientConfig,
        session: SessionStore,
        database: Database,
        auth: Arc<dyn AuthRepository>,
        chats: Arc<dyn ChatRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            config,
            session,
            database: Arc::new(Mutex::new(database)),
            auth,
            chats,
            users,
            sync: tokio::sync::Mutex::new(None),
        }
    }

    /// Open the local database and build the network repositories.
    /// `device_secret` is host-provided material the at-rest key is derived
    /// from (e.g. a keychain entry).
    pub fn connect(config: ClientConfig, device_secret: &[u8]) -> anyhow::Result<Self> {
        let key = derive_session_key(device_secret);
        let database = match &config.db_path {
            Some(path) => Database::open_at(path, &key),
            None => Database::new(&key),
        }
        .context("failed to open local database")?;

        let session = SessionStore::new();
        let api = ApiClient::new(&config.api_url, session.clone())
            .with_context(|| format!("invalid API url {}", config.api_url))?;
        let ws_base = Url::parse(&config.ws_url)
            .with_context(|| format!("invalid WebSocket url {}", config.ws_url))?;

        info!(api = %config.api_url, ws = %config.ws_url, "client configured");

        Ok(Self::new(
            config,
            session,
            database,
            Arc::new(RemoteAuthRepository::new(api.clone())),
            Arc::new(RemoteChatRepository::new(api.clone(), ws_base)),
            Arc::new(RemoteUserRepository::new(api)),
        ))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_signed_in()
    }

    pub fn observe_session(&self) -> watch::Receiver<Option<Session>> {
        self.session.observe()
    }

    pub(crate) fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.database
            .lock()
            .map_err(|_| ClientError::DatabaseUnavailable)
    }

    /// (Re)start the synchroniser for the signed-in user.
    pub(crate) async fn start_sync(&self) {
        let mut guard = self.sync.lock().await;
        if let Some(previous) = guard.take() {
            previous.shutdown().await;
        }
        *guard = Some(ChatSync::start(
            Arc::clone(&self.chats),
            self.session.current_user_id(),
            self.config.sync_config(),
        ));
    }

    pub(crate) async fn stop_sync(&self) {
        if let Some(sync) = self.sync.lock().await.take() {
            sync.shutdown().await;
        }
    }
}
