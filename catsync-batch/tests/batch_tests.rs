use catsync_batch::{chunk, BatchConfig, BatchError, BatchExecutor, RequestError, RetryConfig, RetryPolicy};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn server_error(status: u16) -> RequestError {
    RequestError::Server {
        status,
        message: "boom".to_string(),
    }
}

fn executor(max_retries: u32) -> BatchExecutor {
    BatchExecutor::new(BatchConfig {
        retry: RetryConfig {
            max_retries,
            ..RetryConfig::default()
        },
        ..BatchConfig::default()
    })
}

// ── Chunking ────────────────────────────────────────────────────

#[test]
fn chunk_ten_by_three() {
    let chunks = chunk((1..=10).collect(), 3);
    assert_eq!(chunks, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9], vec![10]]);
}

#[test]
fn chunk_empty_is_empty() {
    assert_eq!(chunk(Vec::<i32>::new(), 4), Vec::<Vec<i32>>::new());
}

#[test]
fn chunk_size_zero_is_one() {
    assert_eq!(chunk(vec!['a', 'b'], 0), vec![vec!['a'], vec!['b']]);
}

proptest! {
    #[test]
    fn chunk_preserves_order_and_sizes(items in prop::collection::vec(any::<u16>(), 0..100), size in 1usize..20) {
        let chunks = chunk(items.clone(), size);
        prop_assert_eq!(chunks.concat(), items.clone());
        prop_assert_eq!(chunks.len(), items.len().div_ceil(size));
        if let Some((last, rest)) = chunks.split_last() {
            prop_assert!(rest.iter().all(|c| c.len() == size));
            prop_assert!(!last.is_empty() && last.len() <= size);
        }
    }
}

// ── Retry policy ────────────────────────────────────────────────

#[test]
fn first_retry_delay_in_base_range() {
    let policy = RetryPolicy::default();
    for _ in 0..200 {
        let delay = policy.delay_for_attempt(1);
        assert!(delay >= Duration::from_millis(200) && delay < Duration::from_millis(400), "{delay:?}");
    }
}

#[test]
fn late_retry_delay_is_capped() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for_attempt(10), Duration::from_millis(30_000));
    assert_eq!(policy.delay_with_jitter(60, 1.0), Duration::from_millis(30_000));
}

#[test]
fn delay_doubles_per_attempt() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_with_jitter(1, 1.0), Duration::from_millis(200));
    assert_eq!(policy.delay_with_jitter(2, 1.0), Duration::from_millis(400));
    assert_eq!(policy.delay_with_jitter(3, 1.5), Duration::from_millis(1200));
}

#[test]
fn retryable_statuses_are_configurable() {
    let default = RetryPolicy::default();
    assert!(default.is_retryable(&server_error(503)));
    assert!(!default.is_retryable(&server_error(429)));
    assert!(!default.is_retryable(&RequestError::NotFound("x".into())));
    assert!(!default.is_retryable(&RequestError::Transport("reset".into())));

    let custom = RetryPolicy::new(RetryConfig {
        retryable_statuses: vec![429],
        ..RetryConfig::default()
    });
    assert!(custom.is_retryable(&server_error(429)));
    assert!(!custom.is_retryable(&server_error(503)));
}

#[test]
fn retry_budget_counts_retries_after_first_attempt() {
    let policy = RetryPolicy::new(RetryConfig {
        max_retries: 2,
        ..RetryConfig::default()
    });
    assert_eq!(policy.retry_context(1).map(|c| c.attempt), Some(1));
    assert!(policy.retry_context(2).is_some());
    assert!(policy.retry_context(3).is_none());
}

#[test]
fn config_deserializes_with_defaults() {
    let config: BatchConfig = serde_json::from_str(r#"{"chunk_size": 5, "retry": {"max_retries": 1}}"#).unwrap();
    assert_eq!(config.chunk_size, 5);
    assert_eq!(config.max_parallel_requests, 10);
    assert_eq!(config.retry.max_retries, 1);
    assert_eq!(config.retry.retryable_statuses, vec![500, 502, 503, 504]);
}

// ── Execute ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn transient_failure_is_retried_after_backoff() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let started = Instant::now();

    let result = executor(5)
        .execute(move || async move {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Err(server_error(502)),
                _ => Ok("done"),
            }
        })
        .await;

    assert_eq!(result, Ok("done"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let waited = started.elapsed();
    assert!(waited >= Duration::from_millis(200) && waited < Duration::from_millis(400), "{waited:?}");
}

#[tokio::test(start_paused = true)]
async fn non_retryable_failure_propagates_immediately() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let started = Instant::now();

    let result: Result<(), _> = executor(5)
        .execute(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(RequestError::Conflict {
                current_version: Some(3),
                message: "stale".into(),
            })
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(err, BatchError::Request(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_keep_last_cause() {
    let calls = AtomicU32::new(0);
    let counter = &calls;

    let result: Result<(), _> = executor(2)
        .execute(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(server_error(503))
        })
        .await;

    assert_eq!(
        result.unwrap_err(),
        BatchError::RetriesExhausted {
            attempts: 3,
            source: server_error(503)
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

// ── Chunked execution ───────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn execute_chunks_keeps_input_order() {
    let exec = BatchExecutor::new(BatchConfig {
        chunk_size: 3,
        ..BatchConfig::default()
    });

    let results = exec
        .execute_chunks((1..=7).collect(), |n: u64| async move {
            tokio::time::sleep(Duration::from_millis(10 * (8 - n))).await;
            Ok(n * 10)
        })
        .await
        .unwrap();

    assert_eq!(results, vec![10, 20, 30, 40, 50, 60, 70]);
}

#[tokio::test(start_paused = true)]
async fn execute_chunks_fails_fast() {
    let exec = BatchExecutor::new(BatchConfig {
        chunk_size: 2,
        ..BatchConfig::default()
    });
    let started = Arc::new(AtomicU32::new(0));

    let counter = started.clone();
    let result = exec
        .execute_chunks(vec![1, 2, 3, 4], move |n: u32| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if n == 2 {
                    Err(RequestError::NotFound(format!("item {n}")))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

    assert!(result.unwrap_err().is_not_found());
    // The failing chunk ran to completion; the next one never started.
    assert_eq!(started.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn parallelism_is_capped() {
    let exec = BatchExecutor::new(BatchConfig {
        chunk_size: 20,
        max_parallel_requests: 3,
        ..BatchConfig::default()
    });
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let (current, max) = (in_flight.clone(), peak.clone());
    let results = exec
        .execute_chunks((0..20).collect(), move |n: usize| {
            let (current, max) = (current.clone(), max.clone());
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok(n)
            }
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 20);
    assert_eq!(peak.load(Ordering::SeqCst), 3);
    assert_eq!(exec.available_permits(), 3);
}

#[tokio::test(start_paused = true)]
async fn queued_requests_start_in_submission_order() {
    let exec = BatchExecutor::new(BatchConfig {
        chunk_size: 8,
        max_parallel_requests: 1,
        ..BatchConfig::default()
    });
    let started = Arc::new(std::sync::Mutex::new(Vec::new()));

    let log = started.clone();
    let results = exec
        .execute_chunks((0..8).collect(), move |n: u64| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(n);
                // Later items finish faster, so only the queue decides who starts next.
                tokio::time::sleep(Duration::from_millis(10 - n)).await;
                Ok(n)
            }
        })
        .await
        .unwrap();

    assert_eq!(results, (0..8).collect::<Vec<_>>());
    assert_eq!(*started.lock().unwrap(), (0..8).collect::<Vec<_>>());
}
