// tests/debounce_properties.rs

use std::time::Duration;

use proptest::prelude::*;
use tokio::time::Instant;

use syncserver::engine::ChangeDebouncer;
use syncserver::types::ChangeKind;
use syncserver::watch::{WatchEvent, WatchFilter};

const DELAY_MS: u64 = 1000;

fn debouncer() -> ChangeDebouncer {
    let filter = WatchFilter::new(
        &["js".to_string()],
        &["**/node_modules/**".to_string()],
    )
    .unwrap();
    ChangeDebouncer::new(filter, Duration::from_millis(DELAY_MS))
}

/// Feed events at `start + offsets`, checking for due restarts right before
/// each one (as the runtime's timer would), then drain. Returns the instants
/// at which restarts fired.
fn simulate(paths: &[(u64, &str)]) -> (Instant, Vec<Instant>) {
    let mut d = debouncer();
    let start = Instant::now();
    let mut fired = Vec::new();

    for (offset, path) in paths {
        let now = start + Duration::from_millis(*offset);
        if let Some(p) = d.pending() {
            if d.fire_due(now) {
                fired.push(p.deadline);
            }
        }
        d.offer(&WatchEvent::new(*path, ChangeKind::Modified, now), now);
    }

    if let Some(p) = d.pending() {
        assert!(d.fire_due(p.deadline));
        fired.push(p.deadline);
    }
    (start, fired)
}

fn offsets(gaps: &[u64]) -> Vec<u64> {
    gaps.iter()
        .scan(0u64, |t, gap| {
            *t += gap;
            Some(*t)
        })
        .collect()
}

proptest! {
    #[test]
    fn close_events_fire_exactly_once_after_the_last(
        gaps in proptest::collection::vec(0..DELAY_MS, 1..40)
    ) {
        let times = offsets(&gaps);
        let events: Vec<_> = times.iter().map(|t| (*t, "src/app.js")).collect();
        let (start, fired) = simulate(&events);

        let last = *times.last().unwrap();
        prop_assert_eq!(fired, vec![start + Duration::from_millis(last + DELAY_MS)]);
    }

    #[test]
    fn spaced_events_each_fire(
        gaps in proptest::collection::vec(DELAY_MS..5 * DELAY_MS, 1..20)
    ) {
        let times = offsets(&gaps);
        let events: Vec<_> = times.iter().map(|t| (*t, "index.js")).collect();
        let (_, fired) = simulate(&events);

        prop_assert_eq!(fired.len(), events.len());
    }

    #[test]
    fn ignored_events_never_change_the_outcome(
        gaps in proptest::collection::vec(0..3 * DELAY_MS, 1..30),
        ignored_mask in proptest::collection::vec(any::<bool>(), 30)
    ) {
        let times = offsets(&gaps);
        let mixed: Vec<_> = times
            .iter()
            .zip(&ignored_mask)
            .map(|(t, ignored)| (*t, if *ignored { "node_modules/x/index.js" } else { "app.js" }))
            .collect();
        let admitted: Vec<_> = mixed
            .iter()
            .copied()
            .filter(|(_, path)| *path == "app.js")
            .collect();

        let (start_a, fired_mixed) = simulate(&mixed);
        let (start_b, fired_admitted) = simulate(&admitted);

        let rel = |start: Instant, fired: Vec<Instant>| -> Vec<Duration> {
            fired.into_iter().map(|f| f - start).collect()
        };
        prop_assert_eq!(rel(start_a, fired_mixed), rel(start_b, fired_admitted));
    }
}
