//! Session cookie configuration derived from [`AppSettings`].
//!
//! Debug builds tolerate missing toggles and fall back to development
//! defaults with a warning; release builds require every toggle explicitly
//! and refuse short or missing signing keys.

use std::path::{Path, PathBuf};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite, time::Duration};
use tracing::warn;
use zeroize::Zeroize;

use crate::settings::AppSettings;

const SESSION_KEY_MIN_LEN: usize = 64;
const SESSION_TTL_HOURS: i64 = 2;
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

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

/// Validated session cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Cookie session middleware holding the user id in a private cookie.
    pub fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(self.cookie_secure)
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_same_site(self.same_site)
            .session_lifecycle(
                PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
            )
            .build()
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A toggle release builds require was not configured.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// A setting is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file exists but is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie in release builds.
    #[error("EMS_SAME_SITE=None requires EMS_COOKIE_SECURE=true")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral session keys.
    #[error("EMS_ALLOW_EPHEMERAL_SESSION_KEY must be false in release builds")]
    EphemeralNotAllowed,
}

/// Validate the session toggles in `settings` for the given build mode.
///
/// # Examples
///
/// ```rust
/// use employee_backend::inbound::http::session_config::{BuildMode, session_settings};
/// use employee_backend::settings::AppSettings;
///
/// let settings = AppSettings {
///     bind_addr: None,
///     database_url: None,
///     session_key_file: Some("/nonexistent/session_key".into()),
///     cookie_secure: Some(false),
///     same_site: Some("Lax".into()),
///     allow_ephemeral_session_key: Some(true),
///     notification_webhook_url: None,
/// };
/// let session = session_settings(&settings, BuildMode::Debug).expect("debug defaults");
/// assert!(!session.cookie_secure);
/// ```
pub fn session_settings(
    settings: &AppSettings,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = required_toggle(settings.cookie_secure, "EMS_COOKIE_SECURE", true, mode)?;
    let same_site = same_site(settings.same_site.as_deref(), mode, cookie_secure)?;
    let allow_ephemeral = required_toggle(
        settings.allow_ephemeral_session_key,
        "EMS_ALLOW_EPHEMERAL_SESSION_KEY",
        false,
        mode,
    )?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(&settings.session_key_file(), mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn required_toggle(
    value: Option<bool>,
    name: &'static str,
    debug_default: bool,
    mode: BuildMode,
) -> Result<bool, SessionConfigError> {
    match value {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(setting = name, default = debug_default, "setting not configured; using default");
            Ok(debug_default)
        }
        None => Err(SessionConfigError::Missing { name }),
    }
}

fn same_site(
    value: Option<&str>,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = value else {
        if mode.is_debug() {
            warn!("EMS_SAME_SITE not set; using default");
            return Ok(default);
        }
        return Err(SessionConfigError::Missing {
            name: "EMS_SAME_SITE",
        });
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("EMS_SAME_SITE=None without secure cookies; browsers may reject the cookie");
            Ok(SameSite::None)
        }
        "none" => Err(SessionConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid EMS_SAME_SITE, using default");
            Ok(default)
        }
        _ => Err(SessionConfigError::Invalid {
            name: "EMS_SAME_SITE",
            value: value.to_owned(),
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn session_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                if mode.is_debug() {
                    warn!(path = %path.display(), length, "session key too short; using temporary key");
                    return Ok(Key::generate());
                }
                return Err(SessionConfigError::KeyTooShort {
                    path: path.to_path_buf(),
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
        Err(source) => Err(SessionConfigError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}
