//! Item bank trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PracticaResult;
use crate::types::{GradeOutcome, GradeRequest, Item};

/// Core ItemBank trait - every source of items implements this.
///
/// Both operations are single-shot; implementations must not retry.
#[async_trait]
pub trait ItemBank: Send + Sync {
    /// Fetch the next item, constrained to `target` when given.
    async fn next_item(&self, target: Option<&str>) -> PracticaResult<Item>;

    /// Grade a submitted response.
    async fn grade(&self, request: &GradeRequest) -> PracticaResult<GradeOutcome>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Item bank provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemBankProvider {
    /// HTTP item bank service.
    #[default]
    Remote,
    /// Built-in offline stub only.
    Offline,
}

/// Item bank configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemBankConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: ItemBankProvider,
    /// Base URL of the item bank API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key (if the item bank requires one).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ItemBankConfig {
    fn default() -> Self {
        Self {
            provider: ItemBankProvider::Remote,
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
