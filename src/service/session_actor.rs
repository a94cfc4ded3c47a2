use crate::config::SessionConfig;
use crate::db::DbCredentials;
use crate::error::InventoryError;
use crate::service::session_registry::{SessionId, SessionLease, SessionRegistry};

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::AnyPool;
use tokio::time::Instant;
use tracing::{debug, info};

/// Messages handled by the session actor.
#[derive(Debug)]
pub enum SessionMessage {
    /// Resolve a session id, refreshing its idle clock.
    Get(SessionId, RpcReplyPort<Option<SessionLease<AnyPool>>>),
    /// Pool already cached for a credential tuple, used to skip reconnecting on login.
    CachedPool(DbCredentials, RpcReplyPort<Option<AnyPool>>),
    /// Bind credentials to a new session id, then drop the session it replaces.
    /// Carries a freshly opened pool, or `None` to reuse the cached one; the
    /// reply is `false` when no pool is cached for the credentials anymore.
    Bind(
        SessionId,
        Option<SessionId>,
        DbCredentials,
        Option<AnyPool>,
        RpcReplyPort<bool>,
    ),
    /// Forget a session (logout).
    Clear(SessionId, RpcReplyPort<()>),
    /// Expire idle sessions; sent periodically by the sweeper task.
    Sweep,
}

/// Handle for the per-process session store. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    actor: ActorRef<SessionMessage>,
}

impl SessionHandle {
    pub async fn get(&self, id: SessionId) -> Result<Option<SessionLease<AnyPool>>, InventoryError> {
        ractor::call!(self.actor, SessionMessage::Get, id)
            .map_err(|e| InventoryError::SessionStore(format!("Get RPC failed: {e}")))
    }

    pub async fn cached_pool(
        &self,
        credentials: &DbCredentials,
    ) -> Result<Option<AnyPool>, InventoryError> {
        ractor::call!(self.actor, SessionMessage::CachedPool, credentials.clone())
            .map_err(|e| InventoryError::SessionStore(format!("CachedPool RPC failed: {e}")))
    }

    /// Returns `false` only when `fresh` is `None` and the cached pool for
    /// `credentials` has been released since it was looked up.
    pub async fn bind(
        &self,
        id: SessionId,
        replaces: Option<SessionId>,
        credentials: DbCredentials,
        fresh: Option<AnyPool>,
    ) -> Result<bool, InventoryError> {
        ractor::call!(
            self.actor,
            SessionMessage::Bind,
            id,
            replaces,
            credentials,
            fresh
        )
        .map_err(|e| InventoryError::SessionStore(format!("Bind RPC failed: {e}")))
    }

    pub async fn clear(&self, id: SessionId) -> Result<(), InventoryError> {
        ractor::call!(self.actor, SessionMessage::Clear, id)
            .map_err(|e| InventoryError::SessionStore(format!("Clear RPC failed: {e}")))
    }
}

struct SessionActor;

struct SessionActorState {
    registry: SessionRegistry<AnyPool>,
}

#[ractor::async_trait]
impl Actor for SessionActor {
    type Msg = SessionMessage;
    type State = SessionActorState;
    type Arguments = SessionConfig;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        cfg: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let period = cfg.sweep_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if ractor::cast!(myself, SessionMessage::Sweep).is_err() {
                    break;
                }
            }
        });

        info!(
            idle_timeout_secs = cfg.idle_timeout_secs,
            sweep_interval_secs = period.as_secs(),
            "SessionActor started"
        );
        Ok(SessionActorState {
            registry: SessionRegistry::new(cfg.idle_timeout()),
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SessionMessage::Get(id, rp) => {
                let _ = rp.send(state.registry.get(id, Instant::now()));
            }
            SessionMessage::CachedPool(credentials, rp) => {
                let _ = rp.send(state.registry.cached_pool(&credentials));
            }
            SessionMessage::Bind(id, replaces, credentials, fresh, rp) => {
                let (host, database) = (credentials.host.clone(), credentials.database.clone());
                match state
                    .registry
                    .bind(id, credentials, fresh, replaces, Instant::now())
                {
                    Some(released) => {
                        let _ = rp.send(true);
                        debug!(
                            session = %id,
                            host = %host,
                            database = %database,
                            pools = state.registry.pool_count(),
                            "session bound"
                        );
                        close_pools(released);
                    }
                    None => {
                        let _ = rp.send(false);
                        debug!(host = %host, database = %database, "cached pool gone; bind refused");
                    }
                }
            }
            SessionMessage::Clear(id, rp) => {
                let released = state.registry.clear(id);
                let _ = rp.send(());
                info!(session = %id, "session cleared");
                close_pools(released);
            }
            SessionMessage::Sweep => {
                let (expired, released) = state.registry.sweep(Instant::now());
                if expired > 0 {
                    info!(
                        expired,
                        pools_closed = released.len(),
                        live = state.registry.session_count(),
                        pools = state.registry.pool_count(),
                        "expired idle sessions"
                    );
                }
                close_pools(released);
            }
        }
        Ok(())
    }
}

/// Closing waits for checked-out connections, so it runs off the actor loop.
fn close_pools(pools: impl IntoIterator<Item = AnyPool>) {
    for pool in pools {
        tokio::spawn(async move {
            pool.close().await;
        });
    }
}

/// Spawn the session actor and its sweeper.
pub async fn spawn(cfg: SessionConfig) -> Result<SessionHandle, InventoryError> {
    let (actor, _jh) = Actor::spawn(None, SessionActor, cfg)
        .await
        .map_err(|e| InventoryError::SessionStore(format!("failed to spawn SessionActor: {e}")))?;
    Ok(SessionHandle { actor })
}
