//! Additive significance score for a single match.
//!
//! Five independent components (league tier, stage, table positions, recent
//! form, recency) are each looked up from [`ScoringWeights`] and summed into
//! `total`. Missing snapshots degrade a component to its neutral value rather
//! than failing, so the function is total over its inputs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::competition::Tier;
use crate::config::{ScoringConfig, ScoringWeights};
use crate::fixture::{FormRow, Match, Stage, StandingRow};

/// Where a single team sits in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Band {
    Top6,
    Top10,
    Bottom,
    MidTable,
}

/// Classification of the pair, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PairBand {
    BothTop6,
    OneTop6,
    BothTop10,
    OneTop10,
    BothBottom,
    MidTable,
    /// Standings missing or a team is not in them.
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormClass {
    BothGoodForm,
    PotentialUpset,
    CloseMatch,
    OneGoodForm,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreNotes {
    pub tier: Tier,
    pub stage: Stage,
    pub derby: bool,
    pub team_band: PairBand,
    pub form_class: Option<FormClass>,
    pub age_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightBreakdown {
    pub league: f64,
    pub stage: f64,
    pub team: f64,
    pub form: f64,
    pub time: f64,
    pub total: f64,
    pub notes: ScoreNotes,
}

impl WeightBreakdown {
    fn new(league: f64, stage: f64, team: f64, form: f64, time: f64, notes: ScoreNotes) -> Self {
        Self {
            league,
            stage,
            team,
            form,
            time,
            total: league + stage + team + form + time,
            notes,
        }
    }

    pub fn components(&self) -> [(&'static str, f64); 5] {
        [
            ("league", self.league),
            ("stage", self.stage),
            ("team", self.team),
            ("form", self.form),
            ("time", self.time),
        ]
    }
}

pub fn compute_weight(
    m: &Match,
    tier: Option<Tier>,
    standings: Option<&[StandingRow]>,
    form: Option<&[FormRow]>,
    now: DateTime<Utc>,
    cfg: &ScoringConfig,
) -> WeightBreakdown {
    let w = &cfg.weights;
    let tier = tier.unwrap_or_default();
    let stage = Stage::normalize(&m.stage);
    let derby = is_derby(m, cfg.rivalry_threshold);
    let team_band = standings
        .map(|rows| classify_pair(rows, m.home_team_id, m.away_team_id, cfg.relegation_band))
        .unwrap_or(PairBand::Mixed);
    let form_class =
        form.and_then(|rows| classify_form(rows, m.home_team_id, m.away_team_id, cfg));
    let age_days = days_since_kickoff(m.kickoff, now);

    WeightBreakdown::new(
        league_weight(w, tier),
        stage_weight(w, stage, derby),
        team_weight(w, team_band),
        form_class.map(|c| form_weight(w, c)).unwrap_or(0.0),
        time_weight(w, age_days),
        ScoreNotes {
            tier,
            stage,
            derby,
            team_band,
            form_class,
            age_days,
        },
    )
}

fn league_weight(w: &ScoringWeights, tier: Tier) -> f64 {
    match tier {
        Tier::One => w.league.tier1,
        Tier::Two => w.league.tier2,
        Tier::Three => w.league.tier3,
        Tier::Four => w.league.tier4,
        Tier::Default => w.league.default,
    }
}

fn is_derby(m: &Match, threshold: f64) -> bool {
    m.is_derby == Some(true) || m.rivalry_factor.is_some_and(|r| r > threshold)
}

fn stage_weight(w: &ScoringWeights, stage: Stage, derby: bool) -> f64 {
    let base = match stage {
        Stage::Final => w.stage.final_,
        Stage::SemiFinal => w.stage.semi_final,
        Stage::QuarterFinal => w.stage.quarter_final,
        Stage::RoundOf16 => w.stage.round_of_16,
        Stage::GroupStage => w.stage.group_stage,
        Stage::Playoff => w.stage.playoff,
        Stage::Regular => w.stage.regular,
    };
    if derby {
        base + w.stage.derby_bonus
    } else {
        base
    }
}

fn team_weight(w: &ScoringWeights, band: PairBand) -> f64 {
    match band {
        PairBand::BothTop6 => w.team.both_top6,
        PairBand::OneTop6 => w.team.one_top6,
        PairBand::BothTop10 => w.team.both_top10,
        PairBand::OneTop10 => w.team.one_top10,
        PairBand::BothBottom => w.team.both_bottom,
        PairBand::MidTable => w.team.mid_table,
        PairBand::Mixed => w.team.mixed,
    }
}

fn form_weight(w: &ScoringWeights, class: FormClass) -> f64 {
    match class {
        FormClass::BothGoodForm => w.form.both_good,
        FormClass::PotentialUpset => w.form.potential_upset,
        FormClass::CloseMatch => w.form.close_match,
        FormClass::OneGoodForm => w.form.one_good,
        FormClass::Normal => w.form.normal,
    }
}

fn time_weight(w: &ScoringWeights, age_days: i64) -> f64 {
    let idx = age_days.clamp(0, 4) as usize;
    w.time.by_age[idx]
}

/// Whole days elapsed; kickoffs still in the future count as today.
pub fn days_since_kickoff(kickoff: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - kickoff).num_days().max(0)
}

pub fn band_for(position: u32, table_size: u32, relegation_band: u32) -> Band {
    if position <= 6 {
        Band::Top6
    } else if position <= 10 {
        Band::Top10
    } else if table_size > relegation_band && position > table_size - relegation_band {
        Band::Bottom
    } else {
        Band::MidTable
    }
}

pub fn classify_pair(
    rows: &[StandingRow],
    home_id: u32,
    away_id: u32,
    relegation_band: u32,
) -> PairBand {
    let position_of = |team: u32| {
        rows.iter()
            .find(|r| r.team_id == team)
            .map(|r| r.position)
            .filter(|p| *p > 0)
    };
    let (Some(home), Some(away)) = (position_of(home_id), position_of(away_id)) else {
        return PairBand::Mixed;
    };
    let table_size = rows
        .iter()
        .map(|r| r.position)
        .max()
        .unwrap_or(0)
        .max(rows.len() as u32);

    let a = band_for(home, table_size, relegation_band);
    let b = band_for(away, table_size, relegation_band);
    let top6 = [a, b].iter().filter(|x| **x == Band::Top6).count();
    let top10 = [a, b]
        .iter()
        .filter(|x| matches!(x, Band::Top6 | Band::Top10))
        .count();

    if top6 == 2 {
        PairBand::BothTop6
    } else if top6 == 1 {
        PairBand::OneTop6
    } else if top10 == 2 {
        PairBand::BothTop10
    } else if top10 == 1 {
        PairBand::OneTop10
    } else if a == Band::Bottom && b == Band::Bottom {
        PairBand::BothBottom
    } else {
        PairBand::MidTable
    }
}

pub fn classify_form(
    rows: &[FormRow],
    home_id: u32,
    away_id: u32,
    cfg: &ScoringConfig,
) -> Option<FormClass> {
    let rate_of = |team: u32| rows.iter().find(|r| r.team_id == team).map(FormRow::win_rate);
    let home = rate_of(home_id)?;
    let away = rate_of(away_id)?;
    let gap = (home - away).abs();
    let home_good = home >= cfg.good_form_rate;
    let away_good = away >= cfg.good_form_rate;

    let class = if home_good && away_good {
        FormClass::BothGoodForm
    } else if gap >= cfg.upset_gap {
        FormClass::PotentialUpset
    } else if gap <= cfg.close_gap {
        FormClass::CloseMatch
    } else if home_good || away_good {
        FormClass::OneGoodForm
    } else {
        FormClass::Normal
    };
    Some(class)
}
