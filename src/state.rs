use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, store::AptitudeStore};

/// Shared store handle used by every handler.
pub type DynStore = Arc<dyn AptitudeStore>;

#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub config: Config,
}

impl AppState {
    pub fn new(store: DynStore, config: Config) -> Self {
        Self { store, config }
    }
}

impl FromRef<AppState> for DynStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
