//! One live draft run: the orchestrator, its volatility board and the ticker driving it,
//! all behind a single cancellation handle. Created at run start, dropped at run end.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::data::Fighter;
use crate::draft::allocate::DraftOutcome;
use crate::draft::cancel::{sleep_or_cancel, CancelHandle, CancelToken};
use crate::draft::events::{DraftEvent, EventSink};
use crate::draft::live::{LiveDraft, LiveOptions};
use crate::volatility::{BoardSnapshot, VolatilityConfig, VolatilityEngine, VolatilityHandle};

pub struct LiveDraftSession {
    id: Uuid,
    board: VolatilityHandle,
    cancel: CancelHandle,
    events: Mutex<Option<mpsc::UnboundedReceiver<DraftEvent>>>,
    done: watch::Receiver<bool>,
    run: JoinHandle<DraftOutcome>,
}

impl LiveDraftSession {
    /// Spawns the run on the current tokio runtime. With `use_override`, each pick takes the
    /// board's current favourite instead of the next ranked fighter.
    pub fn start(
        fighters: Vec<Fighter>,
        options: LiveOptions,
        volatility: VolatilityConfig,
        use_override: bool,
    ) -> Self {
        let id = Uuid::new_v4();
        let board = VolatilityHandle::new(VolatilityEngine::new(volatility));
        let cancel = CancelHandle::new();
        let (sink, receiver) = EventSink::channel();

        let ticker = tokio::spawn(run_ticker(board.clone(), cancel.token()));

        let mut draft = LiveDraft::new(options, sink, cancel.token()).with_board(board.clone());
        if use_override {
            draft = draft.with_override(Arc::new(board.clone()));
        }

        let run_board = board.clone();
        let run_cancel = cancel.clone();
        let (done_tx, done) = watch::channel(false);
        let run = tokio::spawn(async move {
            let outcome = draft.run(fighters).await;
            run_board.lock().stop();
            run_cancel.cancel();
            if let Err(err) = ticker.await {
                warn!(session = %id, "volatility ticker ended abnormally: {err}");
            }
            done_tx.send_replace(true);
            outcome
        });

        Self {
            id,
            board,
            cancel,
            events: Mutex::new(Some(receiver)),
            done,
            run,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn board(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    pub fn board_handle(&self) -> &VolatilityHandle {
        &self.board
    }

    /// Takes the event stream. Only the first caller gets it.
    pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<DraftEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Stops picks and board ticks; the run finishes with `completed = false` unless it
    /// had already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.board.lock().stop();
    }

    pub fn is_finished(&self) -> bool {
        self.run.is_finished()
    }

    /// Resolves once the run and its ticker have stopped, whether completed or cancelled.
    pub async fn wait_finished(&self) {
        let mut done = self.done.clone();
        // A dropped sender means the run task is gone, which is also finished.
        let _ = done.wait_for(|finished| *finished).await;
    }

    /// Waits for the run to end. A panicked run reports an empty, incomplete outcome.
    pub async fn finish(self) -> DraftOutcome {
        match self.run.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(session = %self.id, "live draft task failed: {err}");
                DraftOutcome {
                    ranked: Vec::new(),
                    slots: Vec::new(),
                    completed: false,
                }
            }
        }
    }
}

/// Ticks the board on its own randomized cadence until cancelled.
async fn run_ticker(board: VolatilityHandle, mut cancel: CancelToken) {
    loop {
        let wait = board.lock().next_tick_delay();
        if !sleep_or_cancel(wait, &mut cancel).await {
            break;
        }
        board.tick();
    }
    debug!("volatility ticker stopped");
}
