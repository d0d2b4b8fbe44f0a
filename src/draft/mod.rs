pub mod allocate;
pub mod cancel;
pub mod classify;
pub mod clock;
pub mod events;
pub mod export;
pub mod live;
pub mod ranking;
pub mod session;

pub use allocate::{
    allocate, initial_slots, run_batch_draft, Allocation, DraftOutcome, DraftPick, DraftSlot,
    FairScheduler,
};
pub use cancel::{sleep_or_cancel, CancelHandle, CancelToken};
pub use classify::{classify_fighters, is_pool_member, Classification, RosterGroup, RosterGroups};
pub use clock::{
    clamp_pick_delay, estimate_run, format_countdown, human_duration, start_delay, DraftEstimate,
};
pub use events::{CompleteEvent, DraftEvent, EventSink, InitEvent, PickEvent, SlotRef};
pub use export::{DraftExport, PickExport, TeamExport};
pub use live::{LiveDraft, LiveOptions};
pub use ranking::{
    power_scores, rank_pool, rank_pool_with_scores, smoothed_record_rate, stat_prob_between,
    RankedFighter,
};
pub use session::LiveDraftSession;
