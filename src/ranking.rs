use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::catalog::TierTable;
use crate::config::ScoringConfig;
use crate::fixture::{FormSnapshot, Match, StandingsSnapshot};
use crate::scoring::{WeightBreakdown, compute_weight};

#[derive(Debug, Clone, Serialize)]
pub struct WeightedMatch {
    pub fixture: Match,
    pub weight: WeightBreakdown,
}

/// Scores every candidate and keeps the `limit` heaviest.
///
/// Order is by `total` descending; equal totals put the more recent kickoff
/// first, and anything still tied keeps its input order.
pub fn top_weighted_matches(
    matches: &[Match],
    standings: &StandingsSnapshot,
    form: &FormSnapshot,
    tiers: &TierTable,
    limit: usize,
    now: DateTime<Utc>,
    cfg: &ScoringConfig,
) -> Vec<WeightedMatch> {
    rank_indices(matches, standings, form, tiers, limit, now, cfg)
        .into_iter()
        .map(|(idx, weight)| WeightedMatch {
            fixture: matches[idx].clone(),
            weight,
        })
        .collect()
}

/// Ranking of [`top_weighted_matches`] as positions into `matches`, for
/// callers that keep per-candidate data alongside the slice.
pub fn rank_indices(
    matches: &[Match],
    standings: &StandingsSnapshot,
    form: &FormSnapshot,
    tiers: &TierTable,
    limit: usize,
    now: DateTime<Utc>,
    cfg: &ScoringConfig,
) -> Vec<(usize, WeightBreakdown)> {
    let mut ranked: Vec<(usize, WeightBreakdown)> = matches
        .par_iter()
        .enumerate()
        .map(|(idx, m)| {
            let weight = compute_weight(
                m,
                tiers.get(&m.competition).copied(),
                standings.get(&m.competition).map(Vec::as_slice),
                form.get(&m.competition).map(Vec::as_slice),
                now,
                cfg,
            );
            (idx, weight)
        })
        .collect();
    ranked.sort_by(|(ia, a), (ib, b)| compare_ranked(&matches[*ia], a, &matches[*ib], b));
    ranked.truncate(limit);
    ranked
}

fn compare_ranked(ma: &Match, a: &WeightBreakdown, mb: &Match, b: &WeightBreakdown) -> Ordering {
    b.total
        .total_cmp(&a.total)
        .then_with(|| mb.kickoff.cmp(&ma.kickoff))
}
