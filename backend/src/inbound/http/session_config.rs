//! Session cookie configuration and validation.
//!
//! Raw toggles come from [`crate::settings::AppSettings`]. Debug builds fill
//! gaps with warnings so a developer can start the server with no setup;
//! release builds refuse to start until every toggle is explicit and safe.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;

const COOKIE_SECURE_SETTING: &str = "EMPLOYEES_SESSION_COOKIE_SECURE";
const SAME_SITE_SETTING: &str = "EMPLOYEES_SESSION_SAME_SITE";
const ALLOW_EPHEMERAL_SETTING: &str = "EMPLOYEES_SESSION_ALLOW_EPHEMERAL";
const SAME_SITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Unvalidated session toggles as read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToggles {
    pub key_file: Option<PathBuf>,
    pub cookie_secure: Option<bool>,
    pub same_site: Option<String>,
    pub allow_ephemeral: Option<bool>,
}

/// Validated session settings handed to the server.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required setting: {name}")]
    MissingSetting { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SameSite=None requires EMPLOYEES_SESSION_COOKIE_SECURE=true")]
    InsecureSameSiteNone,
    #[error("EMPLOYEES_SESSION_ALLOW_EPHEMERAL must be false in release builds")]
    EphemeralNotAllowed,
}

/// Validate `toggles` for `mode`.
///
/// # Examples
///
/// ```rust
/// use employee_backend::inbound::http::session_config::{
///     BuildMode, SessionToggles, session_settings,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = session_settings(&SessionToggles::default(), BuildMode::Debug)?;
/// assert!(settings.cookie_secure);
/// # Ok(())
/// # }
/// ```
pub fn session_settings(
    toggles: &SessionToggles,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = required_flag(toggles.cookie_secure, COOKIE_SECURE_SETTING, true, mode)?;
    let same_site = same_site(toggles.same_site.as_deref(), cookie_secure, mode)?;
    let allow_ephemeral =
        required_flag(toggles.allow_ephemeral, ALLOW_EPHEMERAL_SETTING, false, mode)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(toggles.key_file.as_ref(), mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Hex of the first eight bytes of the SHA-256 of the key's signing half.
///
/// Safe to log: it identifies the active key without revealing it.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

fn debug_warn_or_error<T>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
    warn_fn: impl FnOnce(),
) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn_fn();
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn required_flag(
    value: Option<bool>,
    name: &'static str,
    fallback: bool,
    mode: BuildMode,
) -> Result<bool, SessionConfigError> {
    match value {
        Some(flag) => Ok(flag),
        None => debug_warn_or_error(
            mode,
            fallback,
            SessionConfigError::MissingSetting { name },
            || warn!("{name} not set; defaulting to {fallback}"),
        ),
    }
}

fn same_site(
    value: Option<&str>,
    cookie_secure: bool,
    mode: BuildMode,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = value else {
        return debug_warn_or_error(
            mode,
            default_same_site,
            SessionConfigError::MissingSetting {
                name: SAME_SITE_SETTING,
            },
            || warn!("{SAME_SITE_SETTING} not set; using default"),
        );
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => debug_warn_or_error(
            mode,
            SameSite::None,
            SessionConfigError::InsecureSameSiteNone,
            || warn!("SameSite=None without Secure cookies; browsers may reject them"),
        ),
        _ => debug_warn_or_error(
            mode,
            default_same_site,
            SessionConfigError::InvalidSetting {
                name: SAME_SITE_SETTING,
                value: value.to_owned(),
                expected: SAME_SITE_EXPECTED,
            },
            || warn!(value, "invalid {SAME_SITE_SETTING}, using default"),
        ),
    }
}

fn session_key(
    key_file: Option<&PathBuf>,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = key_file
        .cloned()
        .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH));

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path,
            source: error,
        }),
    }
}
