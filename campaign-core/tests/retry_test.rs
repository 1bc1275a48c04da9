use async_trait::async_trait;
use campaign_core::{
    submit_with_retry, DispatchEvent, EventSink, NullSink, Recipient, RetryPolicy, Submitter,
    TransferOutcome,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Replays a fixed outcome script, then succeeds forever.
struct ScriptedSubmitter {
    calls: AtomicUsize,
    script: Mutex<Vec<TransferOutcome>>,
}

impl ScriptedSubmitter {
    fn new(script: Vec<TransferOutcome>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(script),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Submitter for ScriptedSubmitter {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn submit(&self, _recipient: &Recipient, amount: f64) -> TransferOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            TransferOutcome::Success {
                hash: "0xok".to_string(),
                amount,
            }
        } else {
            script.remove(0)
        }
    }
}

#[derive(Default)]
struct CollectingSink {
    events: Mutex<Vec<DispatchEvent>>,
}

impl EventSink for CollectingSink {
    fn emit(&self, event: DispatchEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn rate_limited(hint_secs: u64) -> TransferOutcome {
    TransferOutcome::RateLimited {
        retry_after: Duration::from_secs(hint_secs),
        attempts: 1,
    }
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let submitter = ScriptedSubmitter::new(vec![]);
    let recipient = Recipient::new("0xaaa");
    let token = CancellationToken::new();

    let result = submit_with_retry(
        &RetryPolicy::default(),
        &submitter,
        &recipient,
        1.0,
        &token,
        &NullSink,
    )
    .await;

    let (outcome, attempts) = result.unwrap();
    assert!(outcome.is_success());
    assert_eq!(attempts, 1);
    assert_eq!(submitter.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_twice_then_success() {
    let submitter = ScriptedSubmitter::new(vec![rate_limited(0), rate_limited(0)]);
    let recipient = Recipient::new("0xaaa");
    let token = CancellationToken::new();

    let start = tokio::time::Instant::now();
    let result = submit_with_retry(
        &RetryPolicy::default(),
        &submitter,
        &recipient,
        1.0,
        &token,
        &NullSink,
    )
    .await;

    let (outcome, attempts) = result.unwrap();
    assert!(outcome.is_success());
    assert_eq!(attempts, 3);
    assert_eq!(submitter.calls(), 3);

    // Linear schedule: 5s before the first retry, 10s before the second
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(15));
    assert!(elapsed < Duration::from_secs(16));
}

#[tokio::test(start_paused = true)]
async fn test_budget_exhaustion_becomes_failure() {
    let submitter = ScriptedSubmitter::new(vec![
        rate_limited(0),
        rate_limited(0),
        rate_limited(0),
        rate_limited(0),
    ]);
    let recipient = Recipient::new("0xaaa");
    let token = CancellationToken::new();

    let result = submit_with_retry(
        &RetryPolicy::default(),
        &submitter,
        &recipient,
        1.0,
        &token,
        &NullSink,
    )
    .await;

    let (outcome, attempts) = result.unwrap();
    match outcome {
        TransferOutcome::Failure { reason } => assert_eq!(reason, "rate limit exceeded"),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(attempts, 4);
    // max_retries = 3 means the initial attempt plus three retries
    assert_eq!(submitter.calls(), 4);
}

#[tokio::test]
async fn test_plain_failure_is_not_retried() {
    let submitter = ScriptedSubmitter::new(vec![TransferOutcome::failure("insufficient balance")]);
    let recipient = Recipient::new("0xaaa");
    let token = CancellationToken::new();

    let result = submit_with_retry(
        &RetryPolicy::default(),
        &submitter,
        &recipient,
        1.0,
        &token,
        &NullSink,
    )
    .await;

    let (outcome, attempts) = result.unwrap();
    assert!(!outcome.is_success());
    assert_eq!(attempts, 1);
    assert_eq!(submitter.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_server_hint_shortens_wait() {
    let submitter = ScriptedSubmitter::new(vec![rate_limited(2)]);
    let recipient = Recipient::new("0xaaa");
    let token = CancellationToken::new();

    let start = tokio::time::Instant::now();
    let result = submit_with_retry(
        &RetryPolicy::default(),
        &submitter,
        &recipient,
        1.0,
        &token,
        &NullSink,
    )
    .await;

    assert!(result.unwrap().0.is_success());

    // The 2s hint replaces the 5s scheduled wait
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_countdown_ticks_once_per_second() {
    let submitter = ScriptedSubmitter::new(vec![rate_limited(3)]);
    let recipient = Recipient::new("0xaaa");
    let token = CancellationToken::new();
    let sink = CollectingSink::default();

    let result = submit_with_retry(
        &RetryPolicy::default(),
        &submitter,
        &recipient,
        1.0,
        &token,
        &sink,
    )
    .await;
    assert!(result.unwrap().0.is_success());

    let events = sink.events.lock().unwrap();
    let ticks: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            DispatchEvent::RetryWait { remaining_secs, .. } => Some(*remaining_secs),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, vec![3, 2, 1]);
}

/// Returns rate-limited and cancels the token in the same call, so the
/// countdown that follows observes the cancellation on its first tick.
struct CancelOnRateLimit {
    calls: AtomicUsize,
    token: CancellationToken,
}

#[async_trait]
impl Submitter for CancelOnRateLimit {
    fn name(&self) -> &str {
        "cancel-on-rate-limit"
    }

    async fn submit(&self, _recipient: &Recipient, _amount: f64) -> TransferOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token.cancel();
        rate_limited(0)
    }
}

#[tokio::test]
async fn test_cancellation_during_backoff_returns_none() {
    let token = CancellationToken::new();
    let submitter = CancelOnRateLimit {
        calls: AtomicUsize::new(0),
        token: token.clone(),
    };
    let recipient = Recipient::new("0xaaa");

    let result = submit_with_retry(
        &RetryPolicy::default(),
        &submitter,
        &recipient,
        1.0,
        &token,
        &NullSink,
    )
    .await;

    assert!(result.is_none());
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
}
