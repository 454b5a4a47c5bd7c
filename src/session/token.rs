use std::fmt;

use base64ct::{Base64UrlUnpadded, Encoding};
use lazy_static::lazy_static;
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use time::Duration;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sessionId";

/// Advisory lifetime handed to the client together with a freshly issued token.
pub const SESSION_MAX_AGE: Duration = Duration::days(7);

const TOKEN_BYTES: usize = 32;

fn is_well_formed(raw: &str) -> bool {
    lazy_static! {
        static ref TOKEN_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{16,128}$").unwrap();
    }
    TOKEN_RE.is_match(raw)
}

/// Opaque identifier of the logical owner of meal records.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Accepts a presented token if it is syntactically acceptable.
    pub fn parse(raw: &str) -> Option<Self> {
        is_well_formed(raw).then(|| Self(raw.to_owned()))
    }

    /// Mints a new token from 256 bits of OS randomness.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(Base64UrlUnpadded::encode_string(&bytes))
    }

    /// Wraps a value read back from storage. Stored tokens were validated on the way in.
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix that is safe to put in logs.
    pub fn redacted(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({}…)", self.redacted())
    }
}

/// Outcome of [`resolve`]: the token to scope the request with, and whether
/// the caller still has to hand it to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSession {
    Presented(SessionToken),
    Issued(SessionToken),
}

impl ResolvedSession {
    pub fn token(&self) -> &SessionToken {
        match self {
            Self::Presented(t) | Self::Issued(t) => t,
        }
    }

    /// The token to persist client-side, if one was minted for this request.
    pub fn issued(&self) -> Option<&SessionToken> {
        match self {
            Self::Issued(t) => Some(t),
            Self::Presented(_) => None,
        }
    }
}

/// Returns the presented token unchanged, or issues a new one.
pub fn resolve(presented: Option<SessionToken>) -> ResolvedSession {
    match presented {
        Some(token) => ResolvedSession::Presented(token),
        None => ResolvedSession::Issued(SessionToken::generate()),
    }
}

/// `Set-Cookie` value persisting `token` for [`SESSION_MAX_AGE`].
pub fn session_cookie(token: &SessionToken, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        token.as_str(),
        SESSION_MAX_AGE.whole_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
