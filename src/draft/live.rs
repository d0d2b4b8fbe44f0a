//! Timed draft run. Teams pick in exactly the order the batch allocator would use, one pick
//! per delay, while the live board may steer which fighter each pick takes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::data::Fighter;
use crate::draft::allocate::{initial_slots, DraftOutcome, DraftSlot, FairScheduler};
use crate::draft::cancel::{sleep_or_cancel, CancelToken};
use crate::draft::classify::classify_fighters;
use crate::draft::clock::{clamp_pick_delay, start_delay};
use crate::draft::events::{CompleteEvent, DraftEvent, EventSink, InitEvent, PickEvent, SlotRef};
use crate::draft::export::DraftExport;
use crate::draft::ranking::rank_pool;
use crate::volatility::{OnClock, TopCandidate, VolatilityHandle};

#[derive(Debug, Clone, PartialEq)]
pub struct LiveOptions {
    pub pick_delay: Duration,
    pub start_at: Option<DateTime<Utc>>,
}

impl LiveOptions {
    /// Options from user-facing settings; the delay is clamped to [1, 3600] seconds.
    pub fn from_settings(pick_delay_secs: Option<f64>, start_at: Option<DateTime<Utc>>) -> Self {
        Self {
            pick_delay: Duration::from_secs_f64(clamp_pick_delay(pick_delay_secs)),
            start_at,
        }
    }

    /// No delay and no start wait. Picks are still emitted in order.
    pub fn immediate() -> Self {
        Self {
            pick_delay: Duration::ZERO,
            start_at: None,
        }
    }
}

pub struct LiveDraft {
    options: LiveOptions,
    sink: EventSink,
    cancel: CancelToken,
    board: Option<VolatilityHandle>,
    override_query: Option<Arc<dyn TopCandidate>>,
}

impl LiveDraft {
    pub fn new(options: LiveOptions, sink: EventSink, cancel: CancelToken) -> Self {
        Self {
            options,
            sink,
            cancel,
            board: None,
            override_query: None,
        }
    }

    /// Keeps the board in step with the draft: revealed pool, drafted fighters, team on the clock.
    pub fn with_board(mut self, board: VolatilityHandle) -> Self {
        self.board = Some(board);
        self
    }

    pub fn with_override(mut self, query: Arc<dyn TopCandidate>) -> Self {
        self.override_query = Some(query);
        self
    }

    pub async fn run(mut self, fighters: Vec<Fighter>) -> DraftOutcome {
        let wait = start_delay(self.options.start_at, Utc::now());
        if !wait.is_zero() {
            info!(wait_secs = wait.as_secs_f64(), "waiting for scheduled draft start");
            if !sleep_or_cancel(wait, &mut self.cancel).await {
                info!("draft cancelled before start");
                return self.finish(Vec::new(), Vec::new(), false, Utc::now());
            }
        }
        let started_at = Utc::now();

        let classification = classify_fighters(&fighters);
        let ranked = rank_pool(&classification.pool);
        let mut slots = initial_slots(classification.roster_groups);
        info!(pool = ranked.len(), teams = slots.len(), "live draft starting");

        self.sink.emit(DraftEvent::Init(InitEvent {
            ranked_pool: ranked.clone(),
            draft_slots: slots.clone(),
        }));
        if let Some(board) = &self.board {
            board.lock().reveal(ranked.clone());
        }
        if ranked.is_empty() || slots.is_empty() {
            return self.finish(ranked, slots, true, started_at);
        }

        let mut remaining = ranked.clone();
        let mut scheduler = FairScheduler::new();
        let mut pick_number = 0u32;
        let mut completed = true;
        self.announce_on_clock(&mut scheduler, &slots);

        while !remaining.is_empty() {
            if self.cancel.is_cancelled() {
                completed = false;
                break;
            }
            let Some(slot_index) = scheduler.next_slot(&slots) else {
                break;
            };
            let (fighter, overridden) = self.select(&mut remaining);
            pick_number += 1;
            slots[slot_index].record(pick_number, fighter.clone());
            if let Some(board) = &self.board {
                board.lock().remove(&fighter.id);
            }

            let slot = &slots[slot_index];
            debug!(
                pick = pick_number,
                team = %slot.name,
                fighter = %fighter.display_name(),
                overridden,
                remaining = remaining.len(),
                "live pick"
            );
            self.sink.emit(DraftEvent::Pick(PickEvent {
                pick_number,
                slot: SlotRef {
                    index: slot_index,
                    name: slot.name.clone(),
                    pre_draft_count: slot.pre_draft_count(),
                    picks: slot.picks.len(),
                },
                fighter,
                remaining: remaining.len(),
                overridden,
            }));

            if remaining.is_empty() {
                break;
            }
            self.announce_on_clock(&mut scheduler, &slots);
            if !sleep_or_cancel(self.options.pick_delay, &mut self.cancel).await {
                completed = false;
                break;
            }
        }

        if !completed {
            info!(picks = pick_number, "live draft cancelled");
        }
        self.finish(ranked, slots, completed, started_at)
    }

    /// Board favourite when it is still undrafted, otherwise the next ranked fighter. A
    /// displaced fighter stays in the queue for a later pick.
    fn select(&self, remaining: &mut Vec<Fighter>) -> (Fighter, bool) {
        if let Some(query) = &self.override_query {
            if let Some(id) = query.top_candidate() {
                if let Some(position) = remaining.iter().position(|fighter| fighter.id == id) {
                    return (remaining.remove(position), position != 0);
                }
            }
        }
        (remaining.remove(0), false)
    }

    fn announce_on_clock(&self, scheduler: &mut FairScheduler, slots: &[DraftSlot]) {
        let Some(board) = &self.board else {
            return;
        };
        let on_clock = scheduler.peek_slot(slots).map(|index| OnClock {
            team: slots[index].name.clone(),
            picks: slots[index].picks.iter().map(|pick| pick.fighter.clone()).collect(),
        });
        board.lock().set_on_clock(on_clock);
    }

    fn finish(
        &self,
        ranked: Vec<Fighter>,
        slots: Vec<DraftSlot>,
        completed: bool,
        started_at: DateTime<Utc>,
    ) -> DraftOutcome {
        if let Some(board) = &self.board {
            board.lock().set_on_clock(None);
        }
        let export = DraftExport::from_slots(
            &slots,
            started_at,
            self.options.pick_delay.as_secs_f64(),
            self.options.start_at,
        );
        info!(picks = export.total_picks(), completed, "live draft finished");
        self.sink
            .emit(DraftEvent::Complete(CompleteEvent { completed, export }));
        DraftOutcome {
            ranked,
            slots,
            completed,
        }
    }
}
