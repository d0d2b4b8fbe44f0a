use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;

use crate::data::Fighter;
use crate::draft::allocate::DraftSlot;
use crate::draft::export::DraftExport;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitEvent {
    pub ranked_pool: Vec<Fighter>,
    pub draft_slots: Vec<DraftSlot>,
}

/// The receiving slot as it stood right after the pick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotRef {
    pub index: usize,
    pub name: String,
    pub pre_draft_count: usize,
    pub picks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickEvent {
    pub pick_number: u32,
    pub slot: SlotRef,
    pub fighter: Fighter,
    /// Fighters still waiting in the ranked sequence.
    pub remaining: usize,
    /// True when the live board chose this fighter instead of the ranked order.
    pub overridden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteEvent {
    pub completed: bool,
    pub export: DraftExport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DraftEvent {
    Init(InitEvent),
    Pick(PickEvent),
    Complete(CompleteEvent),
}

impl DraftEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Pick(_) => "pick",
            Self::Complete(_) => "complete",
        }
    }
}

/// Sending side of a run's event stream. Emission is synchronous; a subscriber that went
/// away is not an error for the run.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<DraftEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DraftEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: DraftEvent) {
        let kind = event.kind();
        if self.tx.send(event).is_err() {
            trace!(kind, "draft event dropped: no subscriber");
        }
    }
}
