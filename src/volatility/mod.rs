pub mod engine;
pub mod events;
pub mod fit;
pub mod rng;

pub use engine::{
    BoardEntry, BoardSnapshot, ContestOutcome, OnClock, TickReport, TopCandidate, MIN_TICK_MS,
    VolatilityConfig, VolatilityEngine, VolatilityHandle,
};
pub use events::{Contest, DraftEventKind, EVENT_CATALOGUE};
pub use fit::{best_fit_index, fit_score, need_vector};
pub use rng::Rng;
