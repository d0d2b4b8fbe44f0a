use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use draftroom::data::Fighter;
use draftroom::draft::{
    run_batch_draft, CancelHandle, DraftEvent, EventSink, LiveDraft, LiveDraftSession, LiveOptions,
};
use draftroom::volatility::{TopCandidate, VolatilityConfig};
use tokio::sync::mpsc::UnboundedReceiver;

fn league() -> Vec<Fighter> {
    let mut fighters = vec![
        Fighter::new("h1", "Hawk One", [50.0; 4]).with_team("Hawks"),
        Fighter::new("w1", "Wolf One", [50.0; 4]).with_team("Wolves"),
        Fighter::new("w2", "Wolf Two", [50.0; 4]).with_team("Wolves"),
    ];
    for (index, strength) in [90.0, 70.0, 55.0, 40.0, 25.0].iter().enumerate() {
        fighters.push(Fighter::new(
            format!("fa{index}"),
            format!("Free {index}"),
            [*strength, 50.0, 50.0, 50.0],
        ));
    }
    fighters
}

async fn drain(mut receiver: UnboundedReceiver<DraftEvent>) -> Vec<DraftEvent> {
    let mut events = Vec::new();
    while let Some(event) = receiver.recv().await {
        events.push(event);
    }
    events
}

struct FixedFavourite(String);

impl TopCandidate for FixedFavourite {
    fn top_candidate(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[tokio::test]
async fn live_run_matches_batch_allocation_without_override() {
    let (sink, receiver) = EventSink::channel();
    let cancel = CancelHandle::new();
    let outcome = LiveDraft::new(LiveOptions::immediate(), sink, cancel.token())
        .run(league())
        .await;
    let events = drain(receiver).await;

    let batch = run_batch_draft(&league());
    assert!(outcome.completed);
    assert_eq!(outcome.slots, batch.slots);

    let kinds: Vec<&str> = events.iter().map(DraftEvent::kind).collect();
    assert_eq!(kinds.first(), Some(&"init"));
    assert_eq!(kinds.last(), Some(&"complete"));
    assert_eq!(kinds.iter().filter(|kind| **kind == "pick").count(), 5);

    let mut expected_number = 1;
    for event in &events {
        if let DraftEvent::Pick(pick) = event {
            assert_eq!(pick.pick_number, expected_number);
            assert_eq!(pick.remaining, 5 - expected_number as usize);
            assert!(!pick.overridden);
            expected_number += 1;
        }
    }
}

#[tokio::test]
async fn override_takes_board_favourite_and_keeps_displaced_fighters() {
    let (sink, receiver) = EventSink::channel();
    let cancel = CancelHandle::new();
    let outcome = LiveDraft::new(LiveOptions::immediate(), sink, cancel.token())
        .with_override(Arc::new(FixedFavourite("fa4".to_string())))
        .run(league())
        .await;
    let events = drain(receiver).await;

    let picks: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            DraftEvent::Pick(pick) => Some(pick),
            _ => None,
        })
        .collect();
    assert_eq!(picks[0].fighter.id, "fa4");
    assert!(picks[0].overridden);
    // Favourite is gone after the first pick, so the ranked order resumes.
    assert_eq!(picks[1].fighter.id, "fa0");
    assert!(!picks[1].overridden);

    let drafted: HashSet<&str> = outcome
        .slots
        .iter()
        .flat_map(|slot| slot.picks.iter().map(|pick| pick.fighter.id.as_str()))
        .collect();
    assert_eq!(drafted.len(), 5);
}

#[tokio::test]
async fn unknown_favourite_falls_back_to_ranked_order() {
    let (sink, _receiver) = EventSink::channel();
    let cancel = CancelHandle::new();
    let outcome = LiveDraft::new(LiveOptions::immediate(), sink, cancel.token())
        .with_override(Arc::new(FixedFavourite("h1".to_string())))
        .run(league())
        .await;

    assert_eq!(outcome.slots, run_batch_draft(&league()).slots);
}

#[tokio::test]
async fn cancel_stops_the_run_between_picks() {
    let (sink, mut receiver) = EventSink::channel();
    let cancel = CancelHandle::new();
    let options = LiveOptions {
        pick_delay: Duration::from_secs(60),
        start_at: None,
    };
    let run = tokio::spawn(LiveDraft::new(options, sink, cancel.token()).run(league()));

    let mut picks = 0;
    while let Some(event) = receiver.recv().await {
        match event {
            DraftEvent::Pick(_) => {
                picks += 1;
                cancel.cancel();
            }
            DraftEvent::Complete(complete) => {
                assert!(!complete.completed);
                assert_eq!(complete.export.total_picks(), 1);
            }
            DraftEvent::Init(_) => {}
        }
    }

    let outcome = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run should stop promptly")
        .expect("run task should not panic");
    assert_eq!(picks, 1);
    assert!(!outcome.completed);
}

#[tokio::test]
async fn empty_pool_still_announces_init_and_completes() {
    let fighters = vec![Fighter::new("h1", "Hawk", [50.0; 4]).with_team("Hawks")];
    let (sink, receiver) = EventSink::channel();
    let cancel = CancelHandle::new();
    let outcome = LiveDraft::new(LiveOptions::immediate(), sink, cancel.token())
        .run(fighters)
        .await;
    let kinds: Vec<&str> = drain(receiver).await.iter().map(DraftEvent::kind).collect();

    assert!(outcome.completed);
    assert_eq!(kinds, vec!["init", "complete"]);
}

#[tokio::test]
async fn start_time_in_the_past_does_not_wait() {
    let (sink, _receiver) = EventSink::channel();
    let cancel = CancelHandle::new();
    let options = LiveOptions {
        pick_delay: Duration::ZERO,
        start_at: Some(chrono::Utc::now() - chrono::Duration::hours(1)),
    };
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        LiveDraft::new(options, sink, cancel.token()).run(league()),
    )
    .await
    .expect("past start time should not delay the run");
    assert!(outcome.completed);
}

#[tokio::test]
async fn session_with_board_override_drafts_every_fighter_once() {
    let volatility = VolatilityConfig {
        seed: Some(42),
        ..VolatilityConfig::default()
    };
    let session = LiveDraftSession::start(league(), LiveOptions::immediate(), volatility, true);
    let receiver = session.take_events().expect("first subscriber gets the stream");
    assert!(session.take_events().is_none());

    let events = drain(receiver).await;
    let outcome = session.finish().await;

    assert!(outcome.completed);
    let picks = events.iter().filter(|event| event.kind() == "pick").count();
    assert_eq!(picks, 5);
    let drafted: HashSet<String> = outcome
        .slots
        .iter()
        .flat_map(|slot| slot.picks.iter().map(|pick| pick.fighter.id.clone()))
        .collect();
    assert_eq!(drafted.len(), 5);
}

#[tokio::test]
async fn cancelled_session_reports_incomplete_and_stops_board() {
    let options = LiveOptions {
        pick_delay: Duration::from_secs(60),
        start_at: None,
    };
    let session = LiveDraftSession::start(league(), options, VolatilityConfig::default(), false);
    let mut receiver = session.take_events().expect("event stream");
    while let Some(event) = receiver.recv().await {
        if event.kind() == "pick" {
            break;
        }
    }
    session.cancel();
    assert!(!session.board().active);

    let outcome = tokio::time::timeout(Duration::from_secs(5), session.finish())
        .await
        .expect("cancelled session should finish promptly");
    assert!(!outcome.completed);
}

#[tokio::test]
async fn export_start_time_is_taken_after_the_scheduled_wait() {
    let (sink, receiver) = EventSink::channel();
    let cancel = CancelHandle::new();
    let scheduled = chrono::Utc::now() + chrono::Duration::milliseconds(300);
    let options = LiveOptions {
        pick_delay: Duration::ZERO,
        start_at: Some(scheduled),
    };
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        LiveDraft::new(options, sink, cancel.token()).run(league()),
    )
    .await
    .expect("scheduled run should start within the timeout");
    assert!(outcome.completed);

    let export = drain(receiver)
        .await
        .into_iter()
        .find_map(|event| match event {
            DraftEvent::Complete(complete) => Some(complete.export),
            _ => None,
        })
        .expect("complete event");
    assert!(export.started_at >= scheduled, "export start predates the scheduled start");
    assert_eq!(export.start_time, Some(scheduled));
}
