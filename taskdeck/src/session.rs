//! Bearer-token session state.
//!
//! A [`Session`] is an explicitly constructed, cloneable handle — never a
//! process-wide global — so independent sessions can coexist in tests. The
//! token is persisted to a single fixed-name file under the user's config
//! directory, the terminal equivalent of browser storage. Persistence is
//! best-effort: a failed write or delete is logged and the in-memory state
//! stays authoritative.
//!
//! No token introspection happens client-side. An expired-but-present token
//! counts as authenticated until the backend rejects a request with 401, at
//! which point the request layer calls [`Session::clear`].

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

/// File name the token is stored under, inside the config directory.
const TOKEN_FILE_NAME: &str = "token";

/// Shared handle to the current bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    token: Arc<Mutex<Option<String>>>,
    store_path: Option<PathBuf>,
}

impl Session {
    /// Creates a session persisted at `store_path`, loading a previously
    /// saved token if the file exists.
    #[must_use]
    pub fn new(store_path: PathBuf) -> Self {
        let token = match std::fs::read_to_string(&store_path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %store_path.display(), error = %e, "could not read token file");
                None
            }
        };

        Self {
            token: Arc::new(Mutex::new(token)),
            store_path: Some(store_path),
        }
    }

    /// Creates an in-memory session with no persistence.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self {
            token: Arc::new(Mutex::new(None)),
            store_path: None,
        }
    }

    /// The default token file path: `<config dir>/taskdeck/token`.
    ///
    /// Returns `None` when the platform config directory cannot be
    /// determined (the caller should fall back to [`Session::ephemeral`]).
    #[must_use]
    pub fn default_store_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("taskdeck").join(TOKEN_FILE_NAME))
    }

    /// Stores a new bearer token and persists it.
    pub fn set_token(&self, token: &str) {
        *self.token.lock() = Some(token.to_string());
        if let Some(path) = &self.store_path {
            if let Some(parent) = path.parent()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "could not create config directory");
                return;
            }
            if let Err(e) = std::fs::write(path, token) {
                tracing::warn!(path = %path.display(), error = %e, "could not persist token");
            }
        }
    }

    /// Discards the token, in memory and on disk.
    pub fn clear(&self) {
        *self.token.lock() = None;
        if let Some(path) = &self.store_path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not remove token file");
                }
            }
        }
    }

    /// Returns the current token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    /// Whether a non-empty token is present.
    ///
    /// Purely derived from token presence; no expiry or structure checks.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.lock().as_deref().is_some_and(|t| !t.is_empty())
    }
}
