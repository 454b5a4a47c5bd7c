pub(crate) mod extractors;
mod token;

pub use extractors::{OwnerToken, PresentedToken};
pub use token::{resolve, session_cookie, ResolvedSession, SessionToken, SESSION_COOKIE, SESSION_MAX_AGE};
