//! Session cookie middleware.
//!
//! Every request carries a [`SessionId`] in its extensions. It is read from
//! the `maintrack_session` cookie, or minted and set on the response when the
//! cookie is missing or malformed.

use std::str::FromStr;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use maintrack_domain::id::SessionId;

/// Name of the cookie holding the opaque session id.
pub const SESSION_COOKIE: &str = "maintrack_session";

/// Attach the caller's [`SessionId`] to the request, issuing a new cookie on
/// first contact.
pub async fn assign_session(jar: CookieJar, mut request: Request, next: Next) -> (CookieJar, Response) {
    let existing = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| SessionId::from_str(cookie.value()).ok());

    let (session, jar) = match existing {
        Some(session) => (session, jar),
        None => {
            let session = SessionId::new();
            tracing::debug!(%session, "issuing new session cookie");
            let cookie = Cookie::build((SESSION_COOKIE, session.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (session, jar.add(cookie))
        }
    };

    request.extensions_mut().insert(session);
    (jar, next.run(request).await)
}
