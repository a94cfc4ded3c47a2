pub mod auth;
pub mod displays;
pub mod models;

/// Liveness probe; not session-gated.
pub async fn health() -> &'static str {
    "ok"
}
