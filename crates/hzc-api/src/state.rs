use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use hzc_db::CardStore;
use uuid::Uuid;

use crate::{
    config::Environment,
    error::ApiError,
    review::session::ReviewSession,
    translation::{GlossaryTranslator, Translator},
};

pub type Sessions = HashMap<Uuid, ReviewSession>;

/// Shared application state.
///
/// Lock order is sessions before store. Guards are never held across an
/// `.await`.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<Mutex<CardStore>>,
    pub sessions: Arc<Mutex<Sessions>>,
    pub translator: Arc<dyn Translator>,
    pub environment: Environment,
}

impl ApiState {
    pub fn new(store: CardStore, environment: Environment) -> Self {
        Self::with_translator(store, environment, Arc::new(GlossaryTranslator::new()))
    }

    pub fn with_translator(
        store: CardStore,
        environment: Environment,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            translator,
            environment,
        }
    }

    pub fn store(&self) -> Result<MutexGuard<'_, CardStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::Internal("card store lock poisoned".to_string()))
    }

    pub fn sessions(&self) -> Result<MutexGuard<'_, Sessions>, ApiError> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock poisoned".to_string()))
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("store", &self.store)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}
