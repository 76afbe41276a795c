use std::sync::Arc;

use crate::{config::Config, lang::Strings};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub strings: Arc<Strings>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let strings = Arc::new(Strings::for_lang(&config.lang));
        Self {
            pool,
            config,
            strings,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<Strings> {
    fn from_ref(state: &AppState) -> Self {
        state.strings.clone()
    }
}
