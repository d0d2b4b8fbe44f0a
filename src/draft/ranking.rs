//! Pairwise power-score ranking of the draft pool.
//!
//! Each fighter's power is its mean probability of beating every other pool member, where a
//! single matchup averages `a / (a + b)` over the stats that at least one side has. Ties
//! fall through smoothed record rate, raw stat total, and finally name.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;

use crate::data::{Fighter, Stat};

/// Below this pool size the O(n²) pass is cheaper single-threaded.
const PARALLEL_POOL_THRESHOLD: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct RankedFighter {
    pub fighter: Fighter,
    pub power: f64,
    pub record_rate: f64,
    pub stat_total: f64,
}

/// Probability that `a` beats `b`, averaged over stats where `a + b > 0`; 0.5 if none qualify.
pub fn stat_prob_between(a: &Fighter, b: &Fighter) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for stat in Stat::ALL {
        let (sa, sb) = (a.stat(stat), b.stat(stat));
        if sa + sb > 0.0 {
            sum += sa / (sa + sb);
            count += 1;
        }
    }
    if count == 0 {
        0.5
    } else {
        sum / count as f64
    }
}

/// Laplace-smoothed record: `(wins + draws/2 + 1) / (games + 2)`.
pub fn smoothed_record_rate(fighter: &Fighter) -> f64 {
    let (w, l, d) = (fighter.wins, fighter.losses, fighter.draws);
    (w + 0.5 * d + 1.0) / (w + l + d + 2.0)
}

/// Power score per pool member, index-aligned with `pool`.
pub fn power_scores(pool: &[Fighter]) -> Vec<f64> {
    let n = pool.len();
    let score_one = |i: usize| {
        if n <= 1 {
            return 0.5;
        }
        let total: f64 = (0..n)
            .filter(|&j| j != i)
            .map(|j| stat_prob_between(&pool[i], &pool[j]))
            .sum();
        total / (n - 1) as f64
    };

    if n >= PARALLEL_POOL_THRESHOLD {
        (0..n).into_par_iter().map(score_one).collect()
    } else {
        (0..n).map(score_one).collect()
    }
}

fn compare_ranked(left: &RankedFighter, right: &RankedFighter) -> Ordering {
    right
        .power
        .total_cmp(&left.power)
        .then_with(|| right.record_rate.total_cmp(&left.record_rate))
        .then_with(|| right.stat_total.total_cmp(&left.stat_total))
        .then_with(|| left.fighter.name.cmp(&right.fighter.name))
}

/// Ranks the pool with scores attached. Pools of zero or one keep their order and are not
/// scored (power reported as 0.5).
pub fn rank_pool_with_scores(pool: &[Fighter]) -> Vec<RankedFighter> {
    let powers = if pool.len() <= 1 {
        vec![0.5; pool.len()]
    } else {
        power_scores(pool)
    };
    let mut ranked: Vec<RankedFighter> = pool
        .iter()
        .zip(powers)
        .map(|(fighter, power)| RankedFighter {
            record_rate: smoothed_record_rate(fighter),
            stat_total: fighter.stat_total(),
            fighter: fighter.clone(),
            power,
        })
        .collect();

    if ranked.len() > 1 {
        ranked.sort_by(compare_ranked);
    }
    ranked
}

/// Ranked pool, highest draft priority first.
pub fn rank_pool(pool: &[Fighter]) -> Vec<Fighter> {
    rank_pool_with_scores(pool)
        .into_iter()
        .map(|ranked| ranked.fighter)
        .collect()
}
