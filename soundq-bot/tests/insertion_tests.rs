//! Queue insertion tests
//!
//! Duration policy in front of a real SessionQueue.

mod helpers;

use helpers::track;
use soundq_bot::policy::DurationPolicy;
use soundq_bot::queue::{BulkInsertion, QueueInserter, QueuePosition, QueueService, SessionQueue};
use soundq_bot::track::Requester;
use soundq_bot::Error;
use std::sync::Arc;

fn inserter(max_ms: Option<u64>) -> (Arc<SessionQueue>, QueueInserter) {
    let queue = Arc::new(SessionQueue::new(1));
    let inserter = QueueInserter::new(queue.clone(), DurationPolicy::new(max_ms));
    (queue, inserter)
}

#[tokio::test]
async fn test_rejected_track_leaves_queue_unchanged() {
    let (queue, inserter) = inserter(Some(600_000));
    let requester = Requester::new(1, "ann");
    inserter.insert_one(&track("ok", 1_000), &requester).await.unwrap();

    for duration in [600_001, 700_000, u64::MAX] {
        let err = inserter
            .insert_one(&track("long", duration), &requester)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DurationExceeded {
                max_duration_ms: 600_000,
                ..
            }
        ));
        assert_eq!(queue.len().await, 1);
    }
}

#[tokio::test]
async fn test_insert_one_reports_position() {
    let (_queue, inserter) = inserter(None);
    let requester = Requester::new(1, "ann");

    let first = inserter.insert_one(&track("a", 1), &requester).await.unwrap();
    let second = inserter.insert_one(&track("b", 1), &requester).await.unwrap();
    let third = inserter.insert_one(&track("c", 1), &requester).await.unwrap();

    assert_eq!(first, QueuePosition::NowPlaying);
    assert_eq!(second, QueuePosition::Queued(0));
    assert_eq!(third, QueuePosition::Queued(1));
}

#[tokio::test]
async fn test_expansion_example_inserts_only_c() {
    let (queue, inserter) = inserter(Some(600_000));
    let requester = Requester::new(1, "ann");
    let a = track("A", 500_000);
    let b = track("B", 700_000);
    let c = track("C", 300_000);

    // A was queued on its own before the expansion
    inserter.insert_one(&a, &requester).await.unwrap();

    let result = inserter
        .insert_many(&[a.clone(), b, c], &requester, Some(&a))
        .await;

    assert_eq!(
        result,
        BulkInsertion {
            total: 3,
            inserted: 1,
            too_long: 1,
            excluded: 1,
        }
    );
    let titles: Vec<String> = queue
        .entries()
        .await
        .into_iter()
        .map(|e| e.track.title)
        .collect();
    assert_eq!(titles, vec!["A", "C"]);
}

#[tokio::test]
async fn test_exclude_never_inserted_even_if_eligible() {
    let (queue, inserter) = inserter(None);
    let requester = Requester::new(1, "ann");
    let a = track("A", 1_000);

    let result = inserter
        .insert_many(&[a.clone(), track("B", 1_000)], &requester, Some(&a))
        .await;

    assert_eq!(result.inserted, 1);
    assert_eq!(result.excluded, 1);
    assert_eq!(queue.len().await, 1);
    assert_eq!(queue.entries().await[0].track.title, "B");
}

#[tokio::test]
async fn test_all_too_long_counts_are_unambiguous() {
    let (queue, inserter) = inserter(Some(10_000));
    let requester = Requester::new(1, "ann");

    let result = inserter
        .insert_many(&[track("x", 20_000), track("y", 30_000)], &requester, None)
        .await;

    assert_eq!(result.inserted, 0);
    assert_eq!(result.too_long, 2);
    assert_eq!(result.skipped(), 2);
    assert_eq!(queue.len().await, 0);
}
