use crate::db::DbCredentials;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

pub type SessionId = Uuid;

/// What a live session resolves to.
#[derive(Debug, Clone)]
pub struct SessionLease<P> {
    pub credentials: DbCredentials,
    pub pool: P,
}

struct SessionEntry {
    credentials: DbCredentials,
    last_seen: Instant,
}

struct PoolEntry<P> {
    pool: P,
    sessions: usize,
}

/// Session table plus a pool cache keyed by the credential tuple.
///
/// Every method that drops the last session referencing a credential tuple
/// hands the pool back so the caller can close it.
pub struct SessionRegistry<P> {
    sessions: HashMap<SessionId, SessionEntry>,
    pools: HashMap<DbCredentials, PoolEntry<P>>,
    idle_timeout: Duration,
}

impl<P: Clone> SessionRegistry<P> {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            pools: HashMap::new(),
            idle_timeout,
        }
    }

    /// Look up a session and refresh its idle clock. Sessions past their idle
    /// timeout resolve to `None` even before the next sweep.
    pub fn get(&mut self, id: SessionId, now: Instant) -> Option<SessionLease<P>> {
        let entry = self.sessions.get_mut(&id)?;
        if now.saturating_duration_since(entry.last_seen) > self.idle_timeout {
            return None;
        }
        entry.last_seen = now;
        let pool = self.pools.get(&entry.credentials)?.pool.clone();
        Some(SessionLease {
            credentials: entry.credentials.clone(),
            pool,
        })
    }

    /// A pool already cached for these credentials, if any.
    pub fn cached_pool(&self, credentials: &DbCredentials) -> Option<P> {
        self.pools.get(credentials).map(|p| p.pool.clone())
    }

    /// Bind `credentials` to session `id`, then drop session `replaces`.
    ///
    /// The new binding takes its pool reference before the replaced session
    /// releases its own, so re-login with the same credentials keeps the
    /// shared pool alive. `fresh` is a newly opened pool; it is only cached
    /// when no pool exists for the tuple, otherwise it is handed back for
    /// closing. With `fresh == None` and nothing cached, nothing changes and
    /// `None` is returned so the caller can open a pool and retry.
    pub fn bind(
        &mut self,
        id: SessionId,
        credentials: DbCredentials,
        fresh: Option<P>,
        replaces: Option<SessionId>,
        now: Instant,
    ) -> Option<Vec<P>> {
        let mut released = Vec::new();

        match self.pools.entry(credentials.clone()) {
            Entry::Occupied(mut cached) => {
                cached.get_mut().sessions += 1;
                released.extend(fresh);
            }
            Entry::Vacant(slot) => {
                slot.insert(PoolEntry {
                    pool: fresh?,
                    sessions: 1,
                });
            }
        }

        let entry = SessionEntry {
            credentials,
            last_seen: now,
        };
        if let Some(previous) = self.sessions.insert(id, entry) {
            released.extend(self.release(&previous.credentials));
        }
        if let Some(old) = replaces.filter(|old| *old != id) {
            released.extend(self.clear(old));
        }
        Some(released)
    }

    /// Forget a session. Returns its pool if no other session uses it.
    pub fn clear(&mut self, id: SessionId) -> Option<P> {
        let entry = self.sessions.remove(&id)?;
        self.release(&entry.credentials)
    }

    /// Drop every session idle longer than the timeout.
    pub fn sweep(&mut self, now: Instant) -> (usize, Vec<P>) {
        let expired: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|(_, e)| now.saturating_duration_since(e.last_seen) > self.idle_timeout)
            .map(|(id, _)| *id)
            .collect();

        let released = expired.iter().filter_map(|id| self.clear(*id)).collect();
        (expired.len(), released)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    fn release(&mut self, credentials: &DbCredentials) -> Option<P> {
        let Entry::Occupied(mut cached) = self.pools.entry(credentials.clone()) else {
            return None;
        };
        cached.get_mut().sessions -= 1;
        if cached.get().sessions == 0 {
            Some(cached.remove().pool)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Duration = Duration::from_secs(60);

    fn creds(db: &str) -> DbCredentials {
        DbCredentials {
            host: "localhost".to_string(),
            database: db.to_string(),
            username: "root".to_string(),
            password: "pw".to_string(),
        }
    }

    #[test]
    fn bind_then_get_resolves_credentials() {
        let mut reg = SessionRegistry::<u32>::new(IDLE);
        let id = Uuid::new_v4();
        let now = Instant::now();

        let released = reg.bind(id, creds("a"), Some(1), None, now).unwrap();
        assert!(released.is_empty());

        let lease = reg.get(id, now).unwrap();
        assert_eq!(lease.credentials, creds("a"));
        assert_eq!(lease.pool, 1);
    }

    #[test]
    fn unknown_session_resolves_to_none() {
        let mut reg = SessionRegistry::<u32>::new(IDLE);
        assert!(reg.get(Uuid::new_v4(), Instant::now()).is_none());
    }

    #[test]
    fn identical_credentials_share_one_pool() {
        let mut reg = SessionRegistry::<u32>::new(IDLE);
        let now = Instant::now();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        reg.bind(a, creds("x"), Some(1), None, now).unwrap();
        // reusing the cached pool releases nothing
        assert_eq!(reg.bind(b, creds("x"), None, None, now), Some(vec![]));
        // a concurrently opened duplicate is handed back, the cached one wins
        assert_eq!(reg.bind(c, creds("x"), Some(2), None, now), Some(vec![2]));
        assert_eq!(reg.get(c, now).unwrap().pool, 1);
        assert_eq!(reg.pool_count(), 1);

        assert_eq!(reg.clear(a), None);
        assert_eq!(reg.clear(b), None);
        assert_eq!(reg.clear(c), Some(1));
        assert_eq!(reg.pool_count(), 0);
    }

    #[test]
    fn relogin_with_same_credentials_keeps_pool() {
        let mut reg = SessionRegistry::<u32>::new(IDLE);
        let now = Instant::now();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

        reg.bind(first, creds("x"), Some(1), None, now).unwrap();
        let released = reg.bind(second, creds("x"), None, Some(first), now);

        assert_eq!(released, Some(vec![]));
        assert!(reg.get(first, now).is_none());
        assert_eq!(reg.get(second, now).unwrap().pool, 1);
        assert_eq!(reg.session_count(), 1);
        assert_eq!(reg.pool_count(), 1);
    }

    #[test]
    fn relogin_with_other_credentials_releases_old_pool() {
        let mut reg = SessionRegistry::<u32>::new(IDLE);
        let now = Instant::now();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

        reg.bind(first, creds("old"), Some(1), None, now).unwrap();
        let released = reg.bind(second, creds("new"), Some(2), Some(first), now);

        assert_eq!(released, Some(vec![1]));
        assert_eq!(reg.get(second, now).unwrap().credentials, creds("new"));
        assert_eq!(reg.session_count(), 1);
        assert_eq!(reg.pool_count(), 1);
    }

    #[test]
    fn bind_without_pool_fails_once_cache_entry_is_gone() {
        let mut reg = SessionRegistry::<u32>::new(IDLE);
        let start = Instant::now();
        let (old, new) = (Uuid::new_v4(), Uuid::new_v4());
        reg.bind(old, creds("x"), Some(1), None, start).unwrap();

        // the only session using the pool expires between lookup and bind
        let (_, released) = reg.sweep(start + Duration::from_secs(90));
        assert_eq!(released, vec![1]);

        let later = start + Duration::from_secs(91);
        assert_eq!(reg.bind(new, creds("x"), None, None, later), None);
        assert!(reg.get(new, later).is_none());
        assert_eq!(reg.bind(new, creds("x"), Some(2), None, later), Some(vec![]));
        assert_eq!(reg.get(new, later).unwrap().pool, 2);
    }

    #[test]
    fn sweep_expires_idle_sessions_only() {
        let mut reg = SessionRegistry::<u32>::new(IDLE);
        let start = Instant::now();
        let (idle, active) = (Uuid::new_v4(), Uuid::new_v4());

        reg.bind(idle, creds("idle"), Some(1), None, start).unwrap();
        reg.bind(active, creds("active"), Some(2), None, start).unwrap();

        let later = start + Duration::from_secs(45);
        assert!(reg.get(active, later).is_some());

        let (expired, released) = reg.sweep(start + Duration::from_secs(90));
        assert_eq!(expired, 1);
        assert_eq!(released, vec![1]);
        assert!(reg.get(active, start + Duration::from_secs(90)).is_some());
        assert_eq!(reg.session_count(), 1);
    }

    #[test]
    fn expired_session_is_unusable_before_sweep() {
        let mut reg = SessionRegistry::<u32>::new(IDLE);
        let start = Instant::now();
        let id = Uuid::new_v4();
        reg.bind(id, creds("a"), Some(1), None, start).unwrap();

        assert!(reg.get(id, start + Duration::from_secs(61)).is_none());
    }
}
