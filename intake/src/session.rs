//! Per-visitor session data.
//!
//! The session holds the pending option between the selection and details
//! steps, plus one-shot flash messages shown on the next start page.
//!
//! Everything lives in a single signed cookie, so any server process holding
//! the same key can serve the next step and nothing is kept server-side. The
//! payload carries its own expiry, refreshed on every write; a replayed cookie
//! past that point reads as an empty session.

use crate::config::SessionConfig;
use crate::options::ProblemOption;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_cookies::cookie::time::{Duration, OffsetDateTime};
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies, Key};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "intake_session";

/// Session operation error.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session payload could not be serialized.
    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Session operation result.
pub type Result<T> = std::result::Result<T, SessionError>;

/// How a flash message is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    /// Neutral notice
    Info,
    /// Something went through
    Success,
    /// Something was refused
    Error,
}

impl FlashLevel {
    /// CSS class used when rendering.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A message stored for the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Styling
    pub level: FlashLevel,
    /// Text shown to the visitor
    pub message: String,
}

impl Flash {
    /// A success flash.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    /// An error flash.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Cookie signing key and lifetime, installed as a request extension by the
/// router.
#[derive(Clone)]
pub struct SessionSettings {
    key: Key,
    secure: bool,
    max_age: Duration,
}

impl SessionSettings {
    /// Settings from explicit values.
    #[must_use]
    pub const fn new(key: Key, secure: bool, max_age: Duration) -> Self {
        Self {
            key,
            secure,
            max_age,
        }
    }

    /// Settings from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.key(),
            config.secure_cookie,
            Duration::minutes(config.max_age_minutes),
        )
    }
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("secure", &self.secure)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

/// Cookie payload.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    problem: Option<ProblemOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    flashes: Vec<Flash>,
    /// Unix timestamp after which the payload is ignored
    #[serde(default)]
    expires: i64,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        self.problem.is_none() && self.flashes.is_empty()
    }

    /// Cookie-safe encoding: base64 over JSON.
    fn encode(&self) -> Result<String> {
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(self)?))
    }

    fn decode(value: &str) -> anyhow::Result<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Typed view over the visitor's session cookie.
#[derive(Debug, Clone)]
pub struct VisitorSession {
    cookies: Cookies,
    settings: SessionSettings,
}

impl VisitorSession {
    /// Session over `cookies`, signed with `settings`.
    #[must_use]
    pub const fn new(cookies: Cookies, settings: SessionSettings) -> Self {
        Self { cookies, settings }
    }

    fn load(&self) -> SessionData {
        let Some(cookie) = self.cookies.signed(&self.settings.key).get(SESSION_COOKIE) else {
            return SessionData::default();
        };

        match SessionData::decode(cookie.value()) {
            Ok(data) if data.expires > OffsetDateTime::now_utc().unix_timestamp() => data,
            Ok(_) => {
                tracing::debug!("Session cookie expired");
                SessionData::default()
            },
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session cookie");
                SessionData::default()
            },
        }
    }

    fn save(&self, mut data: SessionData) -> Result<()> {
        if data.is_empty() {
            if self.cookies.get(SESSION_COOKIE).is_some() {
                let mut removal = Cookie::new(SESSION_COOKIE, "");
                removal.set_path("/");
                self.cookies.remove(removal);
            }
            return Ok(());
        }

        data.expires = (OffsetDateTime::now_utc() + self.settings.max_age).unix_timestamp();
        let mut cookie = Cookie::new(SESSION_COOKIE, data.encode()?);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.settings.secure);
        cookie.set_max_age(self.settings.max_age);
        self.cookies.signed(&self.settings.key).add(cookie);
        Ok(())
    }

    /// The option waiting for details, if any.
    #[must_use]
    pub fn pending_option(&self) -> Option<ProblemOption> {
        self.load().problem
    }

    /// Store or clear the pending option.
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be encoded.
    pub fn set_pending_option(&self, option: Option<ProblemOption>) -> Result<()> {
        let mut data = self.load();
        data.problem = option;
        self.save(data)
    }

    /// Queue a flash for the next start page.
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be encoded.
    pub fn push_flash(&self, flash: Flash) -> Result<()> {
        let mut data = self.load();
        data.flashes.push(flash);
        self.save(data)
    }

    /// Take every queued flash, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be encoded.
    pub fn take_flashes(&self) -> Result<Vec<Flash>> {
        let mut data = self.load();
        if data.flashes.is_empty() {
            return Ok(Vec::new());
        }
        let flashes = std::mem::take(&mut data.flashes);
        self.save(data)?;
        Ok(flashes)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for VisitorSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state).await?;
        let settings = parts.extensions.get::<SessionSettings>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session settings missing from request extensions",
        ))?;
        Ok(Self::new(cookies, settings))
    }
}
