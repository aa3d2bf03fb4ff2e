//! Item bank that degrades to the offline stub on failure.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use super::offline::{OfflineItemBank, SAMPLE_ITEM_ID};
use crate::error::PracticaResult;
use crate::traits::ItemBank;
use crate::types::{GradeOutcome, GradeRequest, Item};

/// Wraps a primary bank and answers from [`OfflineItemBank`] whenever the
/// primary fails.
///
/// This is the only place that decides between the remote and the offline
/// bank. Its operations never return an error, so practice is never
/// blocked by the network. Responses to the offline sample item are always
/// graded offline, since the primary bank has never seen that item.
pub struct FallbackItemBank {
    primary: Arc<dyn ItemBank>,
    offline: OfflineItemBank,
}

impl FallbackItemBank {
    pub fn new(primary: Arc<dyn ItemBank>) -> Self {
        Self {
            primary,
            offline: OfflineItemBank::new(),
        }
    }

    /// Name of the wrapped bank.
    pub fn primary_name(&self) -> &str {
        self.primary.name()
    }
}

#[async_trait]
impl ItemBank for FallbackItemBank {
    async fn next_item(&self, target: Option<&str>) -> PracticaResult<Item> {
        match self.primary.next_item(target).await {
            Ok(item) => Ok(item),
            Err(e) => {
                warn!(
                    bank = self.primary.name(),
                    target = target.unwrap_or("any"),
                    error = %e,
                    "Item fetch failed, serving offline item"
                );
                self.offline.next_item(target).await
            }
        }
    }

    async fn grade(&self, request: &GradeRequest) -> PracticaResult<GradeOutcome> {
        if request.item_id == SAMPLE_ITEM_ID {
            return self.offline.grade(request).await;
        }

        match self.primary.grade(request).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(
                    bank = self.primary.name(),
                    item_id = %request.item_id,
                    error = %e,
                    "Grading failed, using offline grader"
                );
                self.offline.grade(request).await
            }
        }
    }

    fn name(&self) -> &str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PracticaError;
    use crate::types::Response;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DownBank {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ItemBank for DownBank {
        async fn next_item(&self, _target: Option<&str>) -> PracticaResult<Item> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(PracticaError::fetch_failed("connection refused"))
        }

        async fn grade(&self, _request: &GradeRequest) -> PracticaResult<GradeOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(PracticaError::grade_failed("connection refused"))
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    struct UpBank;

    #[async_trait]
    impl ItemBank for UpBank {
        async fn next_item(&self, target: Option<&str>) -> PracticaResult<Item> {
            Ok(Item::numeric("r-1", target.unwrap_or("6.2"), "2 + 2"))
        }

        async fn grade(&self, request: &GradeRequest) -> PracticaResult<GradeOutcome> {
            let correct = request.response.as_number() == Some(4.0);
            Ok(GradeOutcome {
                correct,
                feedback_code: (!correct).then(|| "ADD_ERR".to_string()),
            })
        }

        fn name(&self) -> &str {
            "up"
        }
    }

    #[tokio::test]
    async fn test_falls_back_once_per_call() {
        let down = Arc::new(DownBank {
            calls: AtomicUsize::new(0),
        });
        let bank = FallbackItemBank::new(down.clone());

        let item = bank.next_item(Some("6.4")).await.unwrap();
        assert_eq!(item.id, SAMPLE_ITEM_ID);
        assert_eq!(down.calls.load(Ordering::SeqCst), 1);

        let req = GradeRequest::new("r-9", Response::Number(48.0), false);
        assert!(bank.grade(&req).await.unwrap().correct);
        assert_eq!(down.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sample_item_is_graded_offline() {
        let down = Arc::new(DownBank {
            calls: AtomicUsize::new(0),
        });
        let bank = FallbackItemBank::new(down.clone());

        let req = GradeRequest::new(SAMPLE_ITEM_ID, Response::Number(48.0), false);
        assert!(bank.grade(&req).await.unwrap().correct);
        assert_eq!(down.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_passes_through_primary() {
        let bank = FallbackItemBank::new(Arc::new(UpBank));
        assert_eq!(bank.primary_name(), "up");

        let item = bank.next_item(Some("6.9A")).await.unwrap();
        assert_eq!(item.id, "r-1");
        assert_eq!(item.skill_id, "6.9A");

        let outcome = bank
            .grade(&GradeRequest::new("r-1", Response::Number(5.0), false))
            .await
            .unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.feedback_code.as_deref(), Some("ADD_ERR"));
    }
}
