//! Catalogue of exhibition events used to jostle the live board.

use std::cmp::Ordering;

use serde::Serialize;

use crate::data::{Fighter, Stat};
use crate::volatility::rng::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Contest {
    /// Higher value of the stat wins; equal values tie.
    Stat(Stat),
    CoinFlip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DraftEventKind {
    pub name: &'static str,
    pub contest: Contest,
}

pub const EVENT_CATALOGUE: [DraftEventKind; 5] = [
    DraftEventKind {
        name: "Arm Wrestling",
        contest: Contest::Stat(Stat::Strength),
    },
    DraftEventKind {
        name: "Sprint Relay",
        contest: Contest::Stat(Stat::Speed),
    },
    DraftEventKind {
        name: "Iron Lung Hold",
        contest: Contest::Stat(Stat::Endurance),
    },
    DraftEventKind {
        name: "Kata Showdown",
        contest: Contest::Stat(Stat::Technique),
    },
    DraftEventKind {
        name: "Coin Toss",
        contest: Contest::CoinFlip,
    },
];

impl DraftEventKind {
    pub fn random(rng: &mut Rng) -> Self {
        EVENT_CATALOGUE[rng.below(EVENT_CATALOGUE.len())]
    }

    /// `Greater` when `a` wins, `Less` when `b` wins, `Equal` for a tie.
    pub fn compare(&self, a: &Fighter, b: &Fighter, rng: &mut Rng) -> Ordering {
        match self.contest {
            Contest::Stat(stat) => a.stat(stat).total_cmp(&b.stat(stat)),
            Contest::CoinFlip => {
                if rng.coin() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_events_compare_single_stat() {
        let mut rng = Rng::new(1);
        let a = Fighter::new("a", "A", [90.0, 10.0, 50.0, 50.0]);
        let b = Fighter::new("b", "B", [10.0, 90.0, 50.0, 50.0]);
        assert_eq!(EVENT_CATALOGUE[0].compare(&a, &b, &mut rng), Ordering::Greater);
        assert_eq!(EVENT_CATALOGUE[1].compare(&a, &b, &mut rng), Ordering::Less);
        assert_eq!(EVENT_CATALOGUE[2].compare(&a, &b, &mut rng), Ordering::Equal);
    }

    #[test]
    fn coin_toss_never_ties() {
        let mut rng = Rng::new(5);
        let a = Fighter::new("a", "A", [0.0; 4]);
        let coin = EVENT_CATALOGUE[4];
        for _ in 0..50 {
            assert_ne!(coin.compare(&a, &a, &mut rng), Ordering::Equal);
        }
    }
}
