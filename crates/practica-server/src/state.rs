//! Server state management.

use std::collections::HashMap;
use std::sync::Arc;

use practica_client::ItemBankFactory;
use practica_core::error::{PracticaError, PracticaResult};
use practica_core::learner::{Learner, LearnerContext};
use practica_core::mastery::MasteryDb;
use practica_core::traits::{Clock, ItemBank, SystemClock};
use practica_core::types::SkillCatalog;
use practica_core::PracticaConfig;
use tokio::sync::RwLock;
use tracing::info;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
}

pub struct AppStateInner {
    pub config: PracticaConfig,
    pub catalog: SkillCatalog,
    pub db: MasteryDb,
    pub bank: Arc<dyn ItemBank>,
    pub clock: Arc<dyn Clock>,
    /// Signed-in learners by user id.
    pub learners: HashMap<String, Arc<LearnerContext>>,
}

impl AppState {
    /// Create state from explicit parts.
    pub fn new(
        config: PracticaConfig,
        catalog: SkillCatalog,
        db: MasteryDb,
        bank: Arc<dyn ItemBank>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                config,
                catalog,
                db,
                bank,
                clock,
                learners: HashMap::new(),
            })),
        }
    }

    /// Open the database and item bank described by `config`.
    pub fn from_config(config: PracticaConfig) -> PracticaResult<Self> {
        let db = MasteryDb::open(&config.db_path)?;
        let bank = ItemBankFactory::create(&config.item_bank)?;
        info!(db_path = %config.db_path.display(), "Opened mastery database");

        Ok(Self::new(
            config,
            SkillCatalog::grade_six(),
            db,
            bank,
            Arc::new(SystemClock),
        ))
    }

    /// In-memory database with the offline item bank.
    pub fn in_memory() -> PracticaResult<Self> {
        Ok(Self::new(
            PracticaConfig::default(),
            SkillCatalog::grade_six(),
            MasteryDb::in_memory()?,
            ItemBankFactory::offline(),
            Arc::new(SystemClock),
        ))
    }

    pub async fn catalog(&self) -> SkillCatalog {
        self.inner.read().await.catalog.clone()
    }

    pub async fn learner_count(&self) -> usize {
        self.inner.read().await.learners.len()
    }

    pub async fn bank_name(&self) -> String {
        self.inner.read().await.bank.name().to_string()
    }

    /// Sign a learner in and open their context.
    pub async fn sign_in(&self, display_name: impl Into<String>) -> Learner {
        let mut guard = self.inner.write().await;
        let learner = Learner::sign_in(display_name, guard.clock.now());
        let context = LearnerContext::open(
            &guard.db,
            learner.clone(),
            guard.bank.clone(),
            guard.clock.clone(),
            guard.config.clone(),
        );
        guard
            .learners
            .insert(learner.user_id.clone(), Arc::new(context));
        learner
    }

    /// Look up a signed-in learner.
    pub async fn learner(&self, user_id: &str) -> PracticaResult<Arc<LearnerContext>> {
        self.inner
            .read()
            .await
            .learners
            .get(user_id)
            .cloned()
            .ok_or_else(|| PracticaError::learner_not_found(user_id))
    }

    /// Sign a learner out, clearing their records. Returns the number of
    /// records removed.
    pub async fn sign_out(&self, user_id: &str) -> PracticaResult<usize> {
        let context = self
            .inner
            .write()
            .await
            .learners
            .remove(user_id)
            .ok_or_else(|| PracticaError::learner_not_found(user_id))?;
        context.sign_out().await
    }

    /// Dispose every active session. Records are kept.
    pub async fn shutdown(&self) {
        let learners: Vec<Arc<LearnerContext>> =
            self.inner.read().await.learners.values().cloned().collect();
        for learner in learners {
            learner.end_session().await;
        }
    }
}
