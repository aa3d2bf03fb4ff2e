//! Integration tests for practice sessions.
//!
//! Drives a session against a scripted item bank and checks what ends up in
//! the mastery store and the review buckets.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use practica_core::{
    Clock, FallbackItemBank, GradeOutcome, GradeRequest, Item, ItemBank, ManualClock,
    MasteryStore, PracticaError, PracticaResult, PracticeSession, RejectReason, ReviewPlan,
    ReviewScheduler, SessionConfig, SessionState, SubmitOutcome,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Numeric items with five hints; correct iff the response equals `answer`.
struct ScriptedBank {
    answer: f64,
    fetches: AtomicUsize,
    grades: AtomicUsize,
    last_request: Mutex<Option<GradeRequest>>,
}

impl ScriptedBank {
    fn new(answer: f64) -> Arc<Self> {
        Arc::new(Self {
            answer,
            fetches: AtomicUsize::new(0),
            grades: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn grades(&self) -> usize {
        self.grades.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemBank for ScriptedBank {
    async fn next_item(&self, target: Option<&str>) -> PracticaResult<Item> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let skill = target.unwrap_or("6.2");
        Ok(
            Item::numeric(format!("{}-{}", skill, n), skill, "Solve for x")
                .with_hints(["h1", "h2", "h3", "h4", "h5"]),
        )
    }

    async fn grade(&self, request: &GradeRequest) -> PracticaResult<GradeOutcome> {
        self.grades.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if request.response.as_number() == Some(self.answer) {
            Ok(GradeOutcome::correct())
        } else {
            Ok(GradeOutcome::incorrect().with_feedback("CHECK_WORK"))
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Item bank that is always unreachable.
struct UnreachableBank;

#[async_trait]
impl ItemBank for UnreachableBank {
    async fn next_item(&self, _target: Option<&str>) -> PracticaResult<Item> {
        Err(PracticaError::fetch_failed("connection refused"))
    }

    async fn grade(&self, _request: &GradeRequest) -> PracticaResult<GradeOutcome> {
        Err(PracticaError::grade_failed("connection refused"))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

struct Fixture {
    bank: Arc<ScriptedBank>,
    store: Arc<MasteryStore>,
    clock: Arc<ManualClock>,
    session: PracticeSession,
}

fn fixture() -> Fixture {
    let bank = ScriptedBank::new(7.0);
    let store = Arc::new(MasteryStore::in_memory("u_test0001").unwrap());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 9, 1, 15, 0, 0).unwrap(),
    ));
    let session = PracticeSession::with_clock(
        bank.clone(),
        store.clone(),
        clock.clone(),
        SessionConfig::default(),
    );
    Fixture {
        bank,
        store,
        clock,
        session,
    }
}

fn graded(outcome: SubmitOutcome) -> practica_core::AttemptResult {
    match outcome {
        SubmitOutcome::Graded(result) => result,
        SubmitOutcome::Rejected(reason) => panic!("submission rejected: {}", reason),
    }
}

#[tokio::test]
async fn test_fresh_correct_attempt_records_mastery() {
    let f = fixture();
    let now = f.clock.now();

    let snap = f.session.ensure_item(Some("6.8B")).await.unwrap();
    assert_eq!(snap.state, SessionState::Presented);
    assert_eq!(snap.item.as_ref().unwrap().skill_id, "6.8B");

    f.session.set_response_text(" 7 ").await.unwrap();
    let result = graded(f.session.submit().await.unwrap());

    assert!(result.correct);
    assert!((result.mastery_delta - 0.03).abs() < 1e-12);
    assert!(result.feedback_code.is_none());

    let record = f.store.get("6.8B").unwrap().unwrap();
    assert!((record.score - 0.03).abs() < 1e-12);
    assert_eq!(record.attempts, 1);
    assert_eq!(record.last_seen_at, now);
    assert_eq!(record.due_review_at, Some(now + ChronoDuration::days(7)));
    assert_eq!(f.session.state().await, SessionState::Graded);
}

#[tokio::test]
async fn test_blank_input_is_rejected_without_grading() {
    let f = fixture();
    f.session.ensure_item(Some("6.2")).await.unwrap();

    let outcome = f.session.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Rejected(RejectReason::EmptyResponse));

    f.session.set_response_text("   ").await.unwrap();
    let outcome = f.session.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Rejected(RejectReason::EmptyResponse));

    assert_eq!(f.bank.grades(), 0);
    assert_eq!(f.store.count().unwrap(), 0);
    assert_eq!(f.session.state().await, SessionState::Presented);
}

#[tokio::test]
async fn test_submit_without_item_is_rejected() {
    let f = fixture();
    let outcome = f.session.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Rejected(RejectReason::NoCurrentItem));
    assert_eq!(f.bank.grades(), 0);
}

#[tokio::test]
async fn test_incorrect_resubmissions_are_each_recorded() {
    let f = fixture();
    f.session.ensure_item(Some("6.4")).await.unwrap();

    f.session.set_response_text("3").await.unwrap();
    let first = graded(f.session.submit().await.unwrap());
    assert!(!first.correct);
    assert_eq!(first.feedback_code.as_deref(), Some("CHECK_WORK"));
    assert!((first.mastery_delta + 0.01).abs() < 1e-12);

    // Stays on the same item and still accepts input
    let snap = f.session.snapshot().await;
    assert_eq!(snap.state, SessionState::Graded);
    assert_eq!(snap.response_text, "3");
    assert!(snap.can_submit);
    assert!(!snap.advance_pending);

    f.session.set_response_text("7").await.unwrap();
    let second = graded(f.session.submit().await.unwrap());
    assert!(second.correct);

    let record = f.store.get("6.4").unwrap().unwrap();
    assert_eq!(record.attempts, 2);
    // 0 - 0.01 clamps to 0, then + 0.03
    assert!((record.score - 0.03).abs() < 1e-12);
    assert_eq!(f.bank.fetches(), 1);
}

#[tokio::test]
async fn test_hints_are_capped_and_flag_the_attempt() {
    let f = fixture();
    assert!(f.session.hints().await.is_err());

    f.session.ensure_item(Some("6.9A")).await.unwrap();
    let hints = f.session.hints().await.unwrap();
    assert_eq!(hints, vec!["h1", "h2", "h3"]);
    assert!(f.session.snapshot().await.hint_used);

    f.session.set_response_text("1").await.unwrap();
    f.session.submit().await.unwrap();

    let request = f.bank.last_request.lock().unwrap().clone().unwrap();
    assert!(request.used_hint);
    assert_eq!(request.item_id, "6.9A-1");
    assert_eq!(request.time_ms, 0);
}

#[tokio::test(start_paused = true)]
async fn test_correct_answer_auto_advances_same_skill() {
    let f = fixture();
    f.session.ensure_item(Some("6.7B")).await.unwrap();
    f.session.set_response_text("7").await.unwrap();
    f.session.hints().await.unwrap();

    graded(f.session.submit().await.unwrap());
    assert!(f.session.snapshot().await.advance_pending);

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(f.bank.fetches(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(f.bank.fetches(), 2);

    let snap = f.session.snapshot().await;
    assert_eq!(snap.state, SessionState::Presented);
    let item = snap.item.unwrap();
    assert_eq!(item.id, "6.7B-2");
    assert_eq!(item.skill_id, "6.7B");
    assert!(snap.response_text.is_empty());
    assert!(snap.last_result.is_none());
    assert!(!snap.hint_used);
    assert!(!snap.advance_pending);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_before_delay_cancels_advance() {
    let f = fixture();
    f.session.ensure_item(Some("6.7B")).await.unwrap();
    f.session.set_response_text("7").await.unwrap();
    graded(f.session.submit().await.unwrap());

    tokio::time::sleep(Duration::from_millis(500)).await;
    f.session.dispose().await;

    tokio::time::sleep(Duration::from_millis(5000)).await;

    assert_eq!(f.bank.fetches(), 1);
    assert_eq!(f.store.get("6.7B").unwrap().unwrap().attempts, 1);
    assert_eq!(f.session.state().await, SessionState::Idle);
    assert!(f.session.current_item().await.is_none());

    let err = f.session.ensure_item(Some("6.7B")).await.unwrap_err();
    assert_eq!(err.code(), practica_core::ErrorCode::SesDisposed);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_advance() {
    let f = fixture();
    f.session.ensure_item(Some("6.7B")).await.unwrap();
    f.session.set_response_text("7").await.unwrap();
    graded(f.session.submit().await.unwrap());

    let bank = f.bank.clone();
    drop(f);

    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert_eq!(bank.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retarget_cancels_advance() {
    let f = fixture();
    f.session.ensure_item(Some("6.2")).await.unwrap();
    f.session.set_response_text("7").await.unwrap();
    graded(f.session.submit().await.unwrap());

    let snap = f.session.ensure_item(Some("6.4")).await.unwrap();
    assert_eq!(snap.item.unwrap().skill_id, "6.4");
    assert!(!snap.advance_pending);

    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert_eq!(f.bank.fetches(), 2);
    assert_eq!(f.session.current_item().await.unwrap().skill_id, "6.4");
}

#[tokio::test]
async fn test_unreachable_bank_falls_back_to_sample() {
    let store = Arc::new(MasteryStore::in_memory("u_offline1").unwrap());
    let bank = Arc::new(FallbackItemBank::new(Arc::new(UnreachableBank)));
    let session = PracticeSession::new(bank, store.clone(), SessionConfig::default());

    let snap = session.ensure_item(Some("6.2")).await.unwrap();
    let item = snap.item.unwrap();
    assert_eq!(item.id, "sample-1");
    assert_eq!(item.prompt, "What is $8 \\times 6$?");

    session.set_response_text("48").await.unwrap();
    assert!(graded(session.submit().await.unwrap()).correct);

    session.set_response_text("49").await.unwrap();
    assert!(!graded(session.submit().await.unwrap()).correct);

    // Attempts count against the skill of the item actually shown
    let record = store.get("6.7B").unwrap().unwrap();
    assert_eq!(record.attempts, 2);
    assert!(store.get("6.2").unwrap().is_none());
}

#[tokio::test]
async fn test_review_queue_walks_skills() {
    let f = fixture();
    let plan = ReviewPlan::custom(["6.2", "6.8B", "6.2", "6.9A"], 10).unwrap();

    let snap = f.session.start_review(plan).await.unwrap();
    assert_eq!(snap.queue, vec!["6.2", "6.8B", "6.9A"]);
    assert_eq!(snap.item.unwrap().skill_id, "6.2");

    assert_eq!(f.session.next_skill().await.unwrap().as_deref(), Some("6.8B"));
    assert_eq!(f.session.current_item().await.unwrap().skill_id, "6.8B");

    assert_eq!(f.session.next_skill().await.unwrap().as_deref(), Some("6.9A"));
    assert_eq!(f.session.next_skill().await.unwrap(), None);

    let snap = f.session.snapshot().await;
    assert!(snap.review.is_none());
    assert!(snap.queue.is_empty());
    assert_eq!(snap.item.unwrap().skill_id, "6.9A");
}

#[tokio::test]
async fn test_buckets_reflect_session_attempts() {
    let f = fixture();
    let scheduler = ReviewScheduler::new(f.store.clone());
    let start = f.clock.now();

    for skill in ["6.2", "6.4"] {
        f.session.ensure_item(Some(skill)).await.unwrap();
        f.session.set_response_text("0").await.unwrap();
        graded(f.session.submit().await.unwrap());
        f.clock.advance(ChronoDuration::days(2));
    }

    // Due: 6.2 at start+7d, 6.4 at start+9d
    let at = start + ChronoDuration::days(8);
    let today = scheduler.due_today(at).unwrap();
    let week = scheduler.due_this_week(at).unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].skill_id, "6.2");
    assert_eq!(week.len(), 2);
    assert!(today.iter().all(|r| week.contains(r)));

    // Idempotent without writes
    assert_eq!(scheduler.due_today(at).unwrap(), today);

    let plan = scheduler.today_plan(at).unwrap();
    f.session.start_review(plan).await.unwrap();
    assert_eq!(f.session.current_item().await.unwrap().skill_id, "6.2");
}

#[tokio::test]
async fn test_empty_plan_cannot_start() {
    let f = fixture();
    let scheduler = ReviewScheduler::new(f.store.clone());
    let plan = scheduler.today_plan(f.clock.now()).unwrap();
    assert!(f.session.start_review(plan).await.is_err());
    assert_eq!(f.bank.fetches(), 0);
}
