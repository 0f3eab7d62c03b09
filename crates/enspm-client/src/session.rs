//! Session state and its persistence.
//!
//! A [`Session`] holds the signed-in user's token pair and a display-only
//! snapshot of their account. The client never reaches for a global: it is
//! handed a [`SessionStore`] at construction and reads the session
//! immediately before each send.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::types::UserDetail;

/// Storage namespace for the persisted session.
pub const STORAGE_KEY: &str = "enspm-auth-storage";

/// Persisted format version.
const STORAGE_VERSION: u32 = 0;

// ============================================================================
// Session
// ============================================================================

/// Access and refresh token, always held together.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Current authentication state.
///
/// The two tokens are set or cleared together; a session with only one of
/// them cannot be constructed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    tokens: Option<TokenPair>,
    user: Option<UserDetail>,
}

impl Session {
    /// A signed-out session.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// A session holding the given tokens and no user snapshot.
    pub fn with_tokens(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            tokens: Some(TokenPair {
                access_token: access_token.into(),
                refresh_token: refresh_token.into(),
            }),
            user: None,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.access_token.as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.refresh_token.as_str())
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    pub fn user(&self) -> Option<&UserDetail> {
        self.user.as_ref()
    }

    /// Whether a token pair is present.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some()
    }

    /// Install a fresh login.
    pub fn set_auth(
        &mut self,
        user: Option<UserDetail>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) {
        self.tokens = Some(TokenPair {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        });
        self.user = user;
    }

    /// Replace both tokens, keeping the user snapshot.
    pub fn set_tokens(&mut self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        self.tokens = Some(TokenPair {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        });
    }

    pub fn set_user(&mut self, user: UserDetail) {
        self.user = Some(user);
    }

    /// Drop tokens and user.
    pub fn clear(&mut self) {
        self.tokens = None;
        self.user = None;
    }
}

// ============================================================================
// Persisted form
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEnvelope {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<UserDetail>,
}

impl From<&Session> for PersistedState {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token().map(str::to_string),
            refresh_token: session.refresh_token().map(str::to_string),
            user: session.user.clone(),
        }
    }
}

impl From<PersistedState> for Session {
    fn from(state: PersistedState) -> Self {
        match (state.access_token, state.refresh_token) {
            (Some(access_token), Some(refresh_token)) => Session {
                tokens: Some(TokenPair {
                    access_token,
                    refresh_token,
                }),
                user: state.user,
            },
            (None, None) => Session {
                tokens: None,
                user: state.user,
            },
            _ => {
                tracing::warn!("Persisted session holds only one token, treating as signed out");
                Session::signed_out()
            }
        }
    }
}

// ============================================================================
// SessionStore Trait
// ============================================================================

/// Mutation applied to a session under the store's write lock.
pub type SessionUpdate = Box<dyn FnOnce(&mut Session) + Send>;

/// Holder of the current session.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Read the current session.
    async fn load(&self) -> Result<Session>;

    /// Apply a mutation atomically and return the resulting session.
    async fn update(&self, f: SessionUpdate) -> Result<Session>;

    /// Record a successful login.
    async fn set_auth(
        &self,
        user: Option<UserDetail>,
        access_token: String,
        refresh_token: String,
    ) -> Result<Session> {
        self.update(Box::new(move |s: &mut Session| s.set_auth(user, access_token, refresh_token)))
            .await
    }

    /// Replace the token pair after a refresh.
    async fn set_tokens(&self, access_token: String, refresh_token: String) -> Result<Session> {
        self.update(Box::new(move |s: &mut Session| s.set_tokens(access_token, refresh_token)))
            .await
    }

    /// Replace the user snapshot.
    async fn set_user(&self, user: UserDetail) -> Result<Session> {
        self.update(Box::new(move |s: &mut Session| s.set_user(user))).await
    }

    /// Sign out locally.
    async fn clear(&self) -> Result<()> {
        self.update(Box::new(Session::clear)).await.map(|_| ())
    }
}

// ============================================================================
// FileSessionStore
// ============================================================================

/// File-backed session store.
///
/// Persists to `<data_dir>/enspm-auth-storage.json` and rehydrates from it on
/// first read.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    cached: RwLock<Option<Session>>,
}

impl FileSessionStore {
    /// Create a store under the given data directory.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_path(data_dir.join(format!("{}.json", STORAGE_KEY)))
    }

    /// Create with a custom file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            cached: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_from_disk(&self) -> Result<Session> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Session::signed_out());
            }
            Err(e) => {
                return Err(Error::Session(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let envelope: PersistedEnvelope = serde_json::from_str(&content).map_err(|e| {
            Error::Session(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        if envelope.version != STORAGE_VERSION {
            tracing::warn!(
                version = envelope.version,
                "Unknown session file version, ignoring stored session"
            );
            return Ok(Session::signed_out());
        }

        Ok(envelope.state.into())
    }

    async fn write_to_disk(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Session(format!("Failed to create session directory: {}", e))
            })?;
        }

        let envelope = PersistedEnvelope {
            state: session.into(),
            version: STORAGE_VERSION,
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| Error::Session(format!("Failed to write session file: {}", e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Session(format!("Failed to replace session file: {}", e)))?;

        tracing::debug!("Session saved to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Session> {
        {
            let cache = self.cached.read().await;
            if let Some(session) = cache.as_ref() {
                return Ok(session.clone());
            }
        }

        let mut cache = self.cached.write().await;
        if let Some(session) = cache.as_ref() {
            return Ok(session.clone());
        }
        let session = self.read_from_disk().await?;
        *cache = Some(session.clone());
        Ok(session)
    }

    async fn update(&self, f: SessionUpdate) -> Result<Session> {
        let mut cache = self.cached.write().await;
        let mut session = match cache.take() {
            Some(session) => session,
            None => self.read_from_disk().await?,
        };

        f(&mut session);

        let written = self.write_to_disk(&session).await;
        *cache = Some(session.clone());
        written?;
        Ok(session)
    }
}

// ============================================================================
// InMemorySessionStore
// ============================================================================

/// In-memory session store, for tests and one-shot use.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: RwLock<Session>,
    writes: AtomicU32,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
            writes: AtomicU32::new(0),
        }
    }

    /// Number of updates applied so far.
    pub fn write_count(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Session> {
        Ok(self.session.read().await.clone())
    }

    async fn update(&self, f: SessionUpdate) -> Result<Session> {
        let mut session = self.session.write().await;
        f(&mut session);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(session.clone())
    }
}

// ============================================================================
// Shared Session Store
// ============================================================================

/// Shared session store for use across async contexts.
pub type SharedSessionStore = Arc<dyn SessionStore>;

/// Create a shared file-based session store.
pub fn create_session_store(data_dir: &Path) -> SharedSessionStore {
    Arc::new(FileSessionStore::new(data_dir))
}

/// Create a shared in-memory session store.
pub fn create_memory_session_store() -> SharedSessionStore {
    Arc::new(InMemorySessionStore::new())
}
