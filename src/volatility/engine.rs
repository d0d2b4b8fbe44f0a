use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::data::Fighter;
use crate::volatility::events::DraftEventKind;
use crate::volatility::fit::{best_fit_index, need_vector};
use crate::volatility::rng::Rng;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityConfig {
    /// Multiplicative decay applied to every rating each tick (< 1).
    pub decay: f64,
    /// Rating moved from loser to winner per contest.
    pub rating_step: f64,
    /// Half-width of the uniform display jitter.
    pub jitter: f64,
    pub min_contests: usize,
    pub max_contests: usize,
    /// How many displayed fighters are considered for the best-fit flag.
    pub fit_window: usize,
    pub tick_min_ms: u64,
    pub tick_max_ms: u64,
    pub seed: Option<u64>,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            decay: 0.985,
            rating_step: 1.25,
            jitter: 0.4,
            min_contests: 2,
            max_contests: 3,
            fit_window: 5,
            tick_min_ms: 350,
            tick_max_ms: 900,
            seed: None,
        }
    }
}

/// Shortest allowed gap between board ticks.
pub const MIN_TICK_MS: u64 = 50;

impl VolatilityConfig {
    /// Settings forced into their working ranges: decay in (0, 1), at least one contest per
    /// tick, a non-empty fit window and a tick period of at least [MIN_TICK_MS].
    /// Non-finite numbers fall back to the defaults.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        let decay = if self.decay.is_finite() && self.decay > 0.0 && self.decay < 1.0 {
            self.decay
        } else {
            defaults.decay
        };
        let rating_step = if self.rating_step.is_finite() && self.rating_step >= 0.0 {
            self.rating_step
        } else {
            defaults.rating_step
        };
        let jitter = if self.jitter.is_finite() {
            self.jitter.abs()
        } else {
            defaults.jitter
        };
        let min_contests = self.min_contests.max(1);
        let max_contests = self.max_contests.max(min_contests);
        let tick_min_ms = self.tick_min_ms.max(MIN_TICK_MS);
        let tick_max_ms = self.tick_max_ms.max(tick_min_ms);
        Self {
            decay,
            rating_step,
            jitter,
            min_contests,
            max_contests,
            fit_window: self.fit_window.max(1),
            tick_min_ms,
            tick_max_ms,
            seed: self.seed,
        }
    }
}

/// Team the board recommends for: the next slot in the draft queue and its picks so far.
#[derive(Debug, Clone, PartialEq)]
pub struct OnClock {
    pub team: String,
    pub picks: Vec<Fighter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContestOutcome {
    pub winner: String,
    pub loser: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub event: DraftEventKind,
    pub outcomes: Vec<ContestOutcome>,
    pub top: Option<String>,
    pub best_fit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardEntry {
    pub id: String,
    pub name: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub active: bool,
    pub ticks: u64,
    pub on_clock: Option<String>,
    pub last_event: Option<&'static str>,
    pub best_fit: Option<String>,
    pub order: Vec<BoardEntry>,
}

/// Live "who goes next" board. Keeps its own rating per undrafted fighter, shaken up every
/// tick by a random exhibition event, and never touches the real power ranking.
#[derive(Debug)]
pub struct VolatilityEngine {
    config: VolatilityConfig,
    rng: Rng,
    display: Vec<Fighter>,
    ratings: HashMap<String, f64>,
    needs_seed: bool,
    on_clock: Option<OnClock>,
    best_fit: Option<String>,
    last_event: Option<DraftEventKind>,
    ticks: u64,
    active: bool,
}

impl VolatilityEngine {
    pub fn new(config: VolatilityConfig) -> Self {
        let config = config.clamped();
        let rng = config.seed.map_or_else(Rng::from_entropy, Rng::new);
        Self {
            config,
            rng,
            display: Vec::new(),
            ratings: HashMap::new(),
            needs_seed: true,
            on_clock: None,
            best_fit: None,
            last_event: None,
            ticks: 0,
            active: true,
        }
    }

    pub fn config(&self) -> &VolatilityConfig {
        &self.config
    }

    /// Replaces the displayed order (e.g. with the freshly ranked pool).
    pub fn reveal(&mut self, order: Vec<Fighter>) {
        self.display = order;
        self.needs_seed = true;
    }

    /// Drops a drafted fighter from the board.
    pub fn remove(&mut self, id: &str) {
        let before = self.display.len();
        self.display.retain(|fighter| fighter.id != id);
        if self.display.len() != before {
            self.ratings.remove(id);
            self.needs_seed = true;
            if self.best_fit.as_deref() == Some(id) {
                self.best_fit = None;
            }
        }
    }

    pub fn set_on_clock(&mut self, on_clock: Option<OnClock>) {
        self.on_clock = on_clock;
    }

    pub fn display_order(&self) -> &[Fighter] {
        &self.display
    }

    pub fn rating(&self, id: &str) -> Option<f64> {
        self.ratings.get(id).copied()
    }

    pub fn set_rating(&mut self, id: &str, rating: f64) {
        self.ratings.insert(id.to_string(), rating);
        self.needs_seed = false;
    }

    pub fn top_candidate(&self) -> Option<String> {
        self.display.first().map(|fighter| fighter.id.clone())
    }

    pub fn best_fit(&self) -> Option<String> {
        self.best_fit.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deactivates the board; later ticks do nothing.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Random wait before the next tick, within the configured cadence.
    pub fn next_tick_delay(&mut self) -> Duration {
        let lo = self.config.tick_min_ms.min(self.config.tick_max_ms);
        let hi = self.config.tick_min_ms.max(self.config.tick_max_ms);
        let span = hi - lo;
        let offset = if span == 0 {
            0
        } else {
            self.rng.next_u64() % (span + 1)
        };
        Duration::from_millis(lo + offset)
    }

    /// Highest displayed fighter gets the highest rating: n, n-1, ..., 1.
    fn seed_ratings(&mut self) {
        let n = self.display.len();
        self.ratings = self
            .display
            .iter()
            .enumerate()
            .map(|(index, fighter)| (fighter.id.clone(), (n - index) as f64))
            .collect();
        self.needs_seed = false;
    }

    pub fn apply_decay(&mut self) {
        let decay = self.config.decay;
        for rating in self.ratings.values_mut() {
            *rating *= decay;
        }
    }

    fn run_contests(&mut self, event: DraftEventKind) -> Vec<ContestOutcome> {
        let n = self.display.len();
        if n < 2 {
            return Vec::new();
        }
        let lo = self.config.min_contests.min(self.config.max_contests);
        let hi = self.config.min_contests.max(self.config.max_contests);
        let contests = lo + self.rng.below(hi - lo + 1);
        let step = self.config.rating_step;

        let mut outcomes = Vec::with_capacity(contests);
        for _ in 0..contests {
            let (i, j) = self.rng.distinct_pair(n);
            let (winner, loser) = match event.compare(&self.display[i], &self.display[j], &mut self.rng) {
                Ordering::Greater => (i, j),
                Ordering::Less => (j, i),
                Ordering::Equal => continue,
            };
            let winner_id = self.display[winner].id.clone();
            let loser_id = self.display[loser].id.clone();
            *self.ratings.entry(winner_id.clone()).or_insert(0.0) += step;
            *self.ratings.entry(loser_id.clone()).or_insert(0.0) -= step;
            outcomes.push(ContestOutcome {
                winner: winner_id,
                loser: loser_id,
            });
        }
        outcomes
    }

    fn reorder_with_jitter(&mut self) {
        let jitter = self.config.jitter;
        let mut keyed: Vec<(f64, Fighter)> = std::mem::take(&mut self.display)
            .into_iter()
            .map(|fighter| {
                let rating = self.ratings.get(&fighter.id).copied().unwrap_or(0.0);
                (rating + self.rng.range_f64(-jitter, jitter), fighter)
            })
            .collect();
        keyed.sort_by(|left, right| right.0.total_cmp(&left.0));
        self.display = keyed.into_iter().map(|(_, fighter)| fighter).collect();
    }

    fn compute_best_fit(&self) -> Option<String> {
        let window_len = self.config.fit_window.min(self.display.len());
        let window = &self.display[..window_len];
        let picks = self
            .on_clock
            .as_ref()
            .map(|clock| clock.picks.as_slice())
            .unwrap_or(&[]);
        let need = need_vector(picks);
        best_fit_index(&need, window).map(|index| window[index].id.clone())
    }

    /// One volatility step. Returns None when idle (stopped or nothing left on the board).
    pub fn tick(&mut self) -> Option<TickReport> {
        if !self.active || self.display.is_empty() {
            return None;
        }
        if self.needs_seed {
            self.seed_ratings();
        }
        let event = DraftEventKind::random(&mut self.rng);
        self.apply_decay();
        let outcomes = self.run_contests(event);
        self.reorder_with_jitter();
        self.best_fit = self.compute_best_fit();
        self.last_event = Some(event);
        self.ticks += 1;

        trace!(
            tick = self.ticks,
            event = event.name,
            contests = outcomes.len(),
            top = ?self.display.first().map(|f| f.display_name()),
            "volatility tick"
        );

        Some(TickReport {
            event,
            outcomes,
            top: self.top_candidate(),
            best_fit: self.best_fit.clone(),
        })
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            active: self.active,
            ticks: self.ticks,
            on_clock: self.on_clock.as_ref().map(|clock| clock.team.clone()),
            last_event: self.last_event.map(|event| event.name),
            best_fit: self.best_fit.clone(),
            order: self
                .display
                .iter()
                .map(|fighter| BoardEntry {
                    id: fighter.id.clone(),
                    name: fighter.display_name(),
                    rating: self.ratings.get(&fighter.id).copied().unwrap_or(0.0),
                })
                .collect(),
        }
    }
}

/// Query the live orchestrator uses to steer a pick toward the board's current favourite.
pub trait TopCandidate: Send + Sync {
    fn top_candidate(&self) -> Option<String>;
}

/// Shared handle to a session's board.
#[derive(Debug, Clone)]
pub struct VolatilityHandle {
    inner: Arc<Mutex<VolatilityEngine>>,
}

impl VolatilityHandle {
    pub fn new(engine: VolatilityEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, VolatilityEngine> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn tick(&self) -> Option<TickReport> {
        self.lock().tick()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.lock().snapshot()
    }
}

impl TopCandidate for VolatilityHandle {
    fn top_candidate(&self) -> Option<String> {
        self.lock().top_candidate()
    }
}
