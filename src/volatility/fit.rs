//! Best-fit scoring for the team on the clock: weight each stat by how far the team's picks
//! average below 100, then score candidates by the weighted stats.

use crate::data::{Fighter, Stat};

/// Normalized per-stat need, indexed by [Stat::index]. A team without picks averages 0.
pub fn need_vector(picks: &[Fighter]) -> [f64; 4] {
    let mut need = [0.0; 4];
    for stat in Stat::ALL {
        let average = if picks.is_empty() {
            0.0
        } else {
            picks.iter().map(|f| f.stat(stat)).sum::<f64>() / picks.len() as f64
        };
        need[stat.index()] = (100.0 - average).max(0.0);
    }
    let total: f64 = need.iter().sum();
    if total > 0.0 {
        for value in &mut need {
            *value /= total;
        }
    }
    need
}

pub fn fit_score(need: &[f64; 4], fighter: &Fighter) -> f64 {
    Stat::ALL
        .iter()
        .map(|stat| need[stat.index()] * (fighter.stat(*stat) / 100.0))
        .sum()
}

/// Index within `window` of the best fit; earlier entries win ties.
pub fn best_fit_index(need: &[f64; 4], window: &[Fighter]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, fighter) in window.iter().enumerate() {
        let score = fit_score(need, fighter);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_team_needs_everything_equally() {
        assert_eq!(need_vector(&[]), [0.25; 4]);
    }

    #[test]
    fn need_tracks_weak_stats() {
        let picks = vec![Fighter::new("1", "A", [100.0, 100.0, 100.0, 40.0])];
        let need = need_vector(&picks);
        assert_eq!(need, [0.0, 0.0, 0.0, 1.0]);

        let window = vec![
            Fighter::new("x", "Brute", [99.0, 90.0, 90.0, 10.0]),
            Fighter::new("y", "Monk", [20.0, 20.0, 20.0, 95.0]),
        ];
        assert_eq!(best_fit_index(&need, &window), Some(1));
    }

    #[test]
    fn saturated_team_keeps_zero_weights() {
        let picks = vec![Fighter::new("1", "A", [120.0, 100.0, 130.0, 101.0])];
        let need = need_vector(&picks);
        assert_eq!(need, [0.0; 4]);
        let window = vec![
            Fighter::new("x", "X", [1.0; 4]),
            Fighter::new("y", "Y", [99.0; 4]),
        ];
        assert_eq!(best_fit_index(&need, &window), Some(0));
        assert_eq!(best_fit_index(&need, &[]), None);
    }
}
