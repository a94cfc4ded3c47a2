use crate::config::Config;
use crate::db::PoolSettings;
use crate::error::InventoryError;
use crate::handlers::{auth, displays, health, models};
use crate::service::SessionHandle;
use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct InventoryState {
    pub sessions: SessionHandle,
    pub pool_settings: Arc<PoolSettings>,
    pub bootstrap_schema: bool,
    pub insecure_cookie: bool,
    cookie_key: Key,
}

impl InventoryState {
    pub fn new(sessions: SessionHandle, cfg: &Config) -> Result<Self, InventoryError> {
        Ok(Self {
            sessions,
            pool_settings: Arc::new(PoolSettings::from(&cfg.database)),
            bootstrap_schema: cfg.database.bootstrap_schema,
            insecure_cookie: cfg.insecure_cookie,
            cookie_key: cfg.cookie_key()?,
        })
    }
}

impl FromRef<InventoryState> for Key {
    fn from_ref(state: &InventoryState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn inventory_router(state: InventoryState) -> Router {
    Router::new()
        .route("/", get(auth::login_page))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/health", get(health))
        .route("/main", get(auth::main_menu))
        .route("/display", get(displays::list_displays))
        .route("/display/{serial_no}/delete", post(displays::delete_display))
        .route("/model/{model_no}", get(models::model_detail))
        .route("/search", get(displays::search_page))
        .route("/search/results", post(displays::search_results))
        .route(
            "/addModel",
            get(models::add_model_page).post(models::add_model),
        )
        .route(
            "/insert",
            get(displays::insert_page).post(displays::insert_display),
        )
        .route(
            "/update/{serial_no}",
            get(displays::update_page).post(displays::update_display),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
