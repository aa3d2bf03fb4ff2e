//! Factory for creating item banks.

use std::sync::Arc;
use tracing::info;

use practica_core::bank::{FallbackItemBank, OfflineItemBank};
use practica_core::error::PracticaResult;
use practica_core::traits::{ItemBank, ItemBankConfig, ItemBankProvider};

use crate::remote::RemoteItemBank;

/// Factory for creating item banks.
///
/// Every bank it returns is wrapped in a [`FallbackItemBank`], so callers
/// never see a transport error from item delivery or grading.
pub struct ItemBankFactory;

impl ItemBankFactory {
    /// Create the configured item bank.
    pub fn create(config: &ItemBankConfig) -> PracticaResult<Arc<dyn ItemBank>> {
        let primary: Arc<dyn ItemBank> = match config.provider {
            ItemBankProvider::Remote => Arc::new(RemoteItemBank::new(config)?),
            ItemBankProvider::Offline => Arc::new(OfflineItemBank::new()),
        };
        info!(provider = primary.name(), "Created item bank");
        Ok(Arc::new(FallbackItemBank::new(primary)))
    }

    /// Create a remote item bank at `base_url`.
    pub fn remote(base_url: impl Into<String>) -> PracticaResult<Arc<dyn ItemBank>> {
        Self::create(&ItemBankConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    /// Create an offline-only item bank.
    pub fn offline() -> Arc<dyn ItemBank> {
        Arc::new(FallbackItemBank::new(Arc::new(OfflineItemBank::new())))
    }
}
