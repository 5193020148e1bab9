//! # Search and Pagination Tests (qc-18)
//!
//! Compares searches over a randomized log against a brute-force filter of
//! everything that was logged, including capped searches that have to be
//! continued page by page.

use std::sync::Arc;
use std::time::Duration;

use qc_18_event_log::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{InstanceId, ObjectId, Roster};

// =============================================================================
// TEST HELPERS
// =============================================================================

const SEC: i64 = 1_000_000_000;
const T0: i64 = 1_700_000_000 * SEC;
const TOPICS: [&str; 3] = ["auth", "billing", "deploy"];

struct Logged {
    id: ObjectId,
    when: i64,
    topic: String,
}

struct Fixture {
    clock: Arc<ManualClock>,
    service: EventLogService<InMemoryLedger, ManualClock>,
    log: InstanceId,
    logged: Vec<Logged>,
    end: i64,
}

/// A log of `count` events with random skew, topics and occasional timestamp ties.
async fn random_log(seed: u64, count: usize, search_max: usize) -> Fixture {
    let clock = Arc::new(ManualClock::new(T0));
    let config = EventLogConfig {
        search_max,
        ..Default::default()
    };
    let service =
        EventLogService::new(Arc::new(InMemoryLedger::new()), Arc::clone(&clock), config)
            .unwrap();
    let log = service
        .init(InitRequest {
            roster: Roster::new(["node-1"]),
            owner: vec![],
            block_interval: Duration::from_secs(1),
        })
        .await
        .unwrap()
        .id;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut logged = Vec::with_capacity(count);
    let mut now = 5 * SEC;
    let mut previous_when = None;
    for _ in 0..count {
        now += rng.gen_range(0..=SEC);
        clock.set(T0 + now);
        let when = match previous_when {
            // Reuse the previous timestamp now and then to create ties.
            Some(prev) if rng.gen_bool(0.2) && prev >= T0 + now - 5 * SEC => prev,
            _ => T0 + now - rng.gen_range(0..=4 * SEC),
        };
        let topic = TOPICS[rng.gen_range(0..TOPICS.len())];
        let id = service
            .log_event(log, &Event::at(when, topic, vec![]))
            .await
            .unwrap();
        logged.push(Logged {
            id,
            when,
            topic: topic.to_string(),
        });
        previous_when = Some(when);
    }

    let end = T0 + now + SEC;
    clock.set(end);
    Fixture {
        clock,
        service,
        log,
        logged,
        end,
    }
}

impl Fixture {
    /// Ids matching the window and topic, in timestamp order.
    fn expected(&self, from: i64, to: i64, topic: Option<&str>) -> Vec<ObjectId> {
        let mut hits: Vec<&Logged> = self
            .logged
            .iter()
            .filter(|e| e.when >= from && e.when < to)
            .filter(|e| topic.map_or(true, |t| e.topic == t))
            .collect();
        hits.sort_by_key(|e| e.when);
        hits.iter().map(|e| e.id).collect()
    }

    fn request(&self, from: i64, to: i64, topic: Option<&str>) -> SearchRequest {
        SearchRequest {
            instance_id: self.log,
            from,
            to,
            topic: topic.unwrap_or_default().to_string(),
        }
    }
}

fn sorted(mut ids: Vec<ObjectId>) -> Vec<ObjectId> {
    ids.sort();
    ids
}

// =============================================================================
// TEST GROUP 1: UNCAPPED SEARCH
// =============================================================================

#[tokio::test]
async fn test_search_matches_brute_force() {
    let f = random_log(7, 250, 10_000).await;
    let mut rng = StdRng::seed_from_u64(70);

    for _ in 0..40 {
        let a = T0 + rng.gen_range(0..f.end - T0);
        let b = T0 + rng.gen_range(0..f.end - T0);
        let (from, to) = (a.min(b), a.max(b));
        let topic = rng.gen_bool(0.5).then(|| TOPICS[rng.gen_range(0..TOPICS.len())]);

        let response = f.service.search(f.request(from, to, topic)).await.unwrap();
        let expected = f.expected(from, to, topic);
        assert!(!response.truncated);

        // Same set of events, in timestamp order.
        let got: Vec<ObjectId> = response.events.iter().map(|h| h.id).collect();
        assert_eq!(sorted(got), sorted(expected.clone()));
        assert!(response
            .events
            .windows(2)
            .all(|w| w[0].event.when <= w[1].event.when));
    }
}

#[tokio::test]
async fn test_zero_to_covers_up_to_now() {
    let f = random_log(8, 60, 10_000).await;
    let response = f.service.search(f.request(0, 0, None)).await.unwrap();
    assert_eq!(response.events.len(), f.logged.len());

    // Moving the clock back hides events that are now "in the future".
    let cutoff = f.logged[30].when;
    f.clock.set(cutoff);
    let response = f.service.search(f.request(0, 0, None)).await.unwrap();
    assert_eq!(
        sorted(response.events.iter().map(|h| h.id).collect()),
        sorted(f.expected(0, cutoff, None))
    );
}

// =============================================================================
// TEST GROUP 2: CAPPED SEARCH
// =============================================================================

#[tokio::test]
async fn test_capped_search_returns_oldest_first() {
    let f = random_log(9, 120, 25).await;
    let response = f.service.search(f.request(0, 0, None)).await.unwrap();

    assert!(response.truncated);
    assert_eq!(response.events.len(), 25);

    let mut all_whens: Vec<i64> = f.logged.iter().map(|e| e.when).collect();
    all_whens.sort_unstable();
    let got: Vec<i64> = response.events.iter().map(|h| h.event.when).collect();
    assert_eq!(got, all_whens[..25].to_vec());
}

#[tokio::test]
async fn test_repeated_search_is_identical() {
    let f = random_log(13, 120, 25).await;
    for request in [
        f.request(0, 0, None),
        f.request(0, f.end, Some("billing")),
        f.request(f.logged[10].when, f.logged[90].when, None),
    ] {
        let first = f.service.search(request.clone()).await.unwrap();
        let second = f.service.search(request).await.unwrap();
        assert_eq!(first, second);
    }

    // The capped full-log search stays truncated on every run.
    let capped = f.service.search(f.request(0, 0, None)).await.unwrap();
    assert!(capped.truncated);
    assert_eq!(capped, f.service.search(f.request(0, 0, None)).await.unwrap());
}

#[tokio::test]
async fn test_manual_continuation_from_last_timestamp() {
    let f = random_log(10, 150, 20).await;
    let mut request = f.request(0, f.end, Some("auth"));
    let mut collected: Vec<ObjectId> = Vec::new();

    loop {
        let response = f.service.search(request.clone()).await.unwrap();
        for hit in &response.events {
            if !collected.contains(&hit.id) {
                collected.push(hit.id);
            }
        }
        if !response.truncated {
            break;
        }
        let last = response.events.last().unwrap().event.when;
        assert!(last > request.from, "page made no progress");
        request.from = last;
    }

    assert_eq!(sorted(collected), sorted(f.expected(0, f.end, Some("auth"))));
}

// =============================================================================
// TEST GROUP 3: PAGER
// =============================================================================

#[tokio::test]
async fn test_pager_delivers_everything_once() {
    let f = random_log(11, 200, 10_000).await;
    for page_size in [1, 2, 7, 50, 500] {
        let all = f
            .service
            .search_all(f.request(0, 0, None), page_size)
            .await
            .unwrap();
        let ids: Vec<ObjectId> = all.iter().map(|h| h.id).collect();
        assert_eq!(ids.len(), f.logged.len(), "page size {page_size}");
        assert_eq!(sorted(ids), sorted(f.expected(0, f.end, None)));
    }
}

#[tokio::test]
async fn test_pager_with_topic_and_window() {
    let f = random_log(12, 200, 10_000).await;
    let from = f.logged[40].when;
    let to = f.logged[160].when;
    let all = f
        .service
        .search_all(f.request(from, to, Some("deploy")), 3)
        .await
        .unwrap();
    assert_eq!(
        all.iter().map(|h| h.id).collect::<Vec<_>>(),
        f.expected(from, to, Some("deploy"))
    );
}

#[tokio::test]
async fn test_pager_survives_many_ties() {
    let clock = Arc::new(ManualClock::new(T0));
    let service = EventLogService::new(
        Arc::new(InMemoryLedger::new()),
        Arc::clone(&clock),
        EventLogConfig::default(),
    )
    .unwrap();
    let log = service
        .init(InitRequest {
            roster: Roster::new(["node-1"]),
            owner: vec![],
            block_interval: Duration::ZERO,
        })
        .await
        .unwrap()
        .id;
    for _ in 0..9 {
        service
            .log_event(log, &Event::at(T0, "burst", vec![]))
            .await
            .unwrap();
    }
    clock.set(T0 + SEC);

    let all = service
        .search_all(
            SearchRequest {
                instance_id: log,
                ..Default::default()
            },
            2,
        )
        .await
        .unwrap();
    let mut ids: Vec<ObjectId> = all.iter().map(|h| h.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 9);
}
