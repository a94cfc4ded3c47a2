use crate::db::{DbCredentials, InventoryStorage};
use crate::error::InventoryError;
use crate::middleware::{DbSession, InventoryForm};
use crate::middleware::session::{clear_session_cookie, session_cookie, session_id};
use crate::router::InventoryState;
use crate::views;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use sqlx::AnyPool;
use tracing::{info, warn};
use uuid::Uuid;

/// GET / -> login form.
pub async fn login_page() -> Html<String> {
    views::login_page(None)
}

/// POST /login -> probe the submitted credentials and bind them to a fresh session.
pub async fn login(
    State(state): State<InventoryState>,
    jar: PrivateCookieJar,
    form: Result<InventoryForm<DbCredentials>, InventoryError>,
) -> Result<Response, InventoryError> {
    let InventoryForm(credentials) = form.map_err(|e| {
        warn!(error = %e, "malformed login form");
        InventoryError::LoginFailed
    })?;

    // A new id on every login; the previous session, if any, is replaced.
    let previous = session_id(&jar);
    let id = Uuid::new_v4();

    let mut bound = false;
    if let Some(pool) = state.sessions.cached_pool(&credentials).await? {
        if verify(&state, &credentials, pool).await.is_ok() {
            bound = state
                .sessions
                .bind(id, previous, credentials.clone(), None)
                .await?;
        }
    }
    if !bound {
        let pool = match credentials.open_pool(&state.pool_settings).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!(
                    host = %credentials.host,
                    database = %credentials.database,
                    error = %e,
                    "Error connecting to the database"
                );
                return Err(InventoryError::LoginFailed);
            }
        };
        if let Err(e) = verify(&state, &credentials, pool.clone()).await {
            pool.close().await;
            return Err(e);
        }
        state
            .sessions
            .bind(id, previous, credentials.clone(), Some(pool))
            .await?;
    }

    info!(database = %credentials.database, host = %credentials.host, "Connected to database");
    let jar = jar.add(session_cookie(id, state.insecure_cookie));
    Ok((jar, Redirect::to("/main")).into_response())
}

/// Run the login probe on `pool`, then create the schema when configured to.
async fn verify(
    state: &InventoryState,
    credentials: &DbCredentials,
    pool: AnyPool,
) -> Result<(), InventoryError> {
    let storage = InventoryStorage::new(pool, state.pool_settings.query_timeout);
    if let Err(e) = storage.probe().await {
        warn!(
            host = %credentials.host,
            database = %credentials.database,
            error = %e,
            "login probe failed"
        );
        return Err(InventoryError::LoginFailed);
    }
    if state.bootstrap_schema {
        storage.init_schema().await?;
    }
    Ok(())
}

/// GET|POST /logout -> drop the server-side session and the cookie.
pub async fn logout(
    State(state): State<InventoryState>,
    jar: PrivateCookieJar,
) -> Result<Response, InventoryError> {
    if let Some(id) = session_id(&jar) {
        state.sessions.clear(id).await?;
    }
    let jar = jar.remove(clear_session_cookie());
    Ok((jar, Redirect::to("/")).into_response())
}

/// GET /main
pub async fn main_menu(_session: DbSession) -> Html<String> {
    views::main_menu()
}
