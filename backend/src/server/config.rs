//! Server settings loaded via OrthoConfig, plus the runtime configuration
//! handed to [`super::create_server`].
//!
//! Settings merge defaults, an optional config file, `RECORDKEEPER_*`
//! environment variables and CLI flags.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use recordkeeper::domain::{
    Email, NameField, NewUser, PersonName, PlainPassword, Role, UserValidationError,
};
use recordkeeper::outbound::persistence::{DEFAULT_MAX_CONNECTIONS, DbPool, PoolConfig};
use serde::Deserialize;
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
/// `Key::derive_from` needs at least 32 bytes; 64 keeps signing and
/// encryption halves independent.
const SESSION_KEY_MIN_LEN: usize = 64;
const BOOTSTRAP_FIRST_NAME: &str = "System";
const BOOTSTRAP_LAST_NAME: &str = "Administrator";

/// Settings controlling the HTTP listener, sessions and persistence.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECORDKEEPER")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server runs on in-memory stores.
    pub database_url: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<PathBuf>,
    /// Fall back to a random session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark session cookies `Secure`.
    pub cookie_secure: Option<bool>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Email of an administrator created at startup when no user holds it.
    pub bootstrap_admin_email: Option<String>,
    /// File holding the bootstrap administrator's password.
    pub bootstrap_admin_password_file: Option<PathBuf>,
}

/// Failures turning [`ServerSettings`] into a runnable configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        /// Configured value.
        value: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },
    /// Reading the session key file failed and no fallback is allowed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file location.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The key file holds too little material.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file location.
        path: PathBuf,
        /// Bytes read.
        length: usize,
        /// Required bytes.
        min_len: usize,
    },
    /// A bootstrap email was given without a password file.
    #[error("bootstrap_admin_email is set but bootstrap_admin_password_file is not")]
    BootstrapPasswordMissing,
    /// Reading the bootstrap password file failed.
    #[error("failed to read bootstrap password at {path}: {source}")]
    BootstrapPasswordRead {
        /// Password file location.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The bootstrap email or password fails user validation.
    #[error("invalid bootstrap administrator: {source}")]
    BootstrapInvalid {
        /// Validation failure.
        #[source]
        source: UserValidationError,
    },
}

impl ServerSettings {
    /// Socket address to bind, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] for unparseable values.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Session key file location.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH))
    }

    /// Whether session cookies are `Secure`; on unless disabled.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Pool configuration when a database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_ref().map(|url| {
            PoolConfig::new(url.clone())
                .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
        })
    }

    /// Administrator to seed at startup, if one is configured.
    ///
    /// The password file may end with a newline; it is not part of the
    /// password.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the password file is missing or
    /// unreadable, or when the email or password is invalid.
    pub fn bootstrap_admin(&self) -> Result<Option<NewUser>, SettingsError> {
        let Some(raw_email) = self.bootstrap_admin_email.as_deref() else {
            return Ok(None);
        };
        let path = self
            .bootstrap_admin_password_file
            .as_deref()
            .ok_or(SettingsError::BootstrapPasswordMissing)?;
        let contents = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
            SettingsError::BootstrapPasswordRead {
                path: path.to_path_buf(),
                source,
            }
        })?);
        let invalid = |source| SettingsError::BootstrapInvalid { source };
        Ok(Some(NewUser {
            email: Email::new(raw_email).map_err(invalid)?,
            password: PlainPassword::new(contents.trim_end_matches(['\r', '\n']))
                .map_err(invalid)?,
            role: Role::Admin,
            first_name: PersonName::new(NameField::FirstName, BOOTSTRAP_FIRST_NAME)
                .map_err(invalid)?,
            last_name: PersonName::new(NameField::LastName, BOOTSTRAP_LAST_NAME)
                .map_err(invalid)?,
        }))
    }

    /// Derive the session cookie key.
    ///
    /// Debug builds always tolerate a missing key file; release builds only
    /// when `session_allow_ephemeral` is set.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the key file is unusable.
    pub fn session_key(&self) -> Result<Key, SettingsError> {
        load_session_key(
            &self.session_key_file(),
            cfg!(debug_assertions) || self.session_allow_ephemeral,
        )
    }
}

fn load_session_key(path: &Path, allow_ephemeral: bool) -> Result<Key, SettingsError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SettingsError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(source) if allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %source,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SettingsError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Runtime configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) bootstrap_admin: Option<NewUser>,
}

impl ServerConfig {
    /// Construct a configuration without persistence.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            bootstrap_admin: None,
        }
    }

    /// Attach a database connection pool for the Diesel adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Seed `admin` before the server starts accepting requests.
    #[must_use]
    pub fn with_bootstrap_admin(mut self, admin: NewUser) -> Self {
        self.bootstrap_admin = Some(admin);
        self
    }
}
