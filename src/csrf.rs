//! Signed CSRF tokens.
//!
//! A token is `base64url( nonce || HMAC-SHA256(secret, nonce) )`. It travels
//! both as the `csrftoken` cookie and inside the page's request interceptor, and
//! stays the same across page loads while the browser's cookie still verifies.
//! Unsafe requests must echo it in `X-CSRFToken`; the header has to carry a
//! valid signature and match the cookie, so a token minted by anyone without
//! the secret is rejected.

use axum::extract::{Request, State};
use axum::http::{HeaderName, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrftoken");

const NONCE_LEN: usize = 32;
const TAG_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Keyed token issuer/verifier. Cheap to clone.
#[derive(Clone)]
pub struct CsrfKey {
    mac: HmacSha256,
}

impl std::fmt::Debug for CsrfKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CsrfKey(..)")
    }
}

impl CsrfKey {
    pub fn new(secret: &[u8]) -> Result<Self, String> {
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| format!("invalid CSRF secret: {e}"))?;
        Ok(Self { mac })
    }

    /// Build from the base64 `server.csrf_secret` value.
    pub fn from_base64(secret: &str) -> Result<Self, String> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(secret)
            .map_err(|e| format!("server.csrf_secret is not valid base64: {e}"))?;
        Self::new(&bytes)
    }

    pub fn issue(&self) -> String {
        let nonce: [u8; NONCE_LEN] = rand::random();

        let mut mac = self.mac.clone();
        mac.update(&nonce);
        let tag = mac.finalize().into_bytes();

        let mut blob = Vec::with_capacity(NONCE_LEN + TAG_LEN);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&tag);
        URL_SAFE_NO_PAD.encode(&blob)
    }

    pub fn verify(&self, token: &str) -> Result<(), &'static str> {
        let blob = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| "CSRF token has invalid encoding")?;

        if blob.len() != NONCE_LEN + TAG_LEN {
            return Err("CSRF token has incorrect length");
        }

        let (nonce, tag) = blob.split_at(NONCE_LEN);
        let mut mac = self.mac.clone();
        mac.update(nonce);
        mac.verify_slice(tag)
            .map_err(|_| "CSRF token is invalid or tampered")
    }

    /// The token already held in the browser's cookie if it still verifies,
    /// otherwise a fresh one. Reusing it keeps earlier docs tabs working.
    pub fn reuse_or_issue(&self, cookie: Option<&str>) -> String {
        match cookie {
            Some(token) if self.verify(token).is_ok() => token.to_string(),
            _ => self.issue(),
        }
    }

    /// Check an unsafe request's header token against its cookie.
    pub fn check(&self, header: Option<&str>, cookie: Option<&str>) -> Result<(), &'static str> {
        let cookie = cookie.ok_or("CSRF cookie not set")?;
        let header = header.ok_or("CSRF token missing")?;
        self.verify(header)?;
        if !constant_time_eq(header.as_bytes(), cookie.as_bytes()) {
            return Err("CSRF token incorrect");
        }
        Ok(())
    }
}

/// The cookie the page's token travels in.
pub fn token_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .build()
}

/// Middleware rejecting unsafe requests without a valid token with 403.
pub async fn require_token(
    State(key): State<CsrfKey>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if request.method().is_safe() {
        return next.run(request).await;
    }

    let header = request
        .headers()
        .get(&CSRF_HEADER)
        .and_then(|v| v.to_str().ok());
    let cookie = jar.get(CSRF_COOKIE).map(|c| c.value());

    match key.check(header, cookie) {
        Ok(()) => next.run(request).await,
        Err(reason) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                reason,
                "Rejected request failing CSRF check"
            );
            (StatusCode::FORBIDDEN, reason).into_response()
        }
    }
}
