use crate::db::InventoryStorage;
use crate::error::InventoryError;
use crate::router::InventoryState;
use crate::service::SessionId;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "displaydb_session";

/// Session guard. Resolves the session cookie to the credentials stored at
/// login and hands the handler a storage bound to that session's pool.
/// Without a live session the request is redirected to the login page.
pub struct DbSession {
    pub id: SessionId,
    pub storage: InventoryStorage,
}

impl FromRequestParts<InventoryState> for DbSession {
    type Rejection = InventoryError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &InventoryState,
    ) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        let id = session_id(&jar).ok_or(InventoryError::SessionMissing)?;
        let lease = state
            .sessions
            .get(id)
            .await?
            .ok_or(InventoryError::SessionMissing)?;

        Ok(Self {
            id,
            storage: InventoryStorage::new(lease.pool, state.pool_settings.query_timeout),
        })
    }
}

pub fn session_id(jar: &PrivateCookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
}

/// Browser-session cookie: no max-age, expiry is enforced server side.
pub fn session_cookie(id: SessionId, insecure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .secure(!insecure)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
