use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Points per tier for the league component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueWeights {
    pub tier1: f64,
    pub tier2: f64,
    pub tier3: f64,
    pub tier4: f64,
    pub default: f64,
}

impl Default for LeagueWeights {
    fn default() -> Self {
        Self {
            tier1: 40.0,
            tier2: 30.0,
            tier3: 20.0,
            tier4: 10.0,
            default: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageWeights {
    #[serde(rename = "final")]
    pub final_: f64,
    pub semi_final: f64,
    pub quarter_final: f64,
    pub round_of_16: f64,
    pub group_stage: f64,
    pub playoff: f64,
    pub regular: f64,
    pub derby_bonus: f64,
}

impl Default for StageWeights {
    fn default() -> Self {
        Self {
            final_: 30.0,
            semi_final: 25.0,
            quarter_final: 20.0,
            round_of_16: 15.0,
            group_stage: 10.0,
            playoff: 8.0,
            regular: 5.0,
            derby_bonus: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamWeights {
    pub both_top6: f64,
    pub one_top6: f64,
    pub both_top10: f64,
    pub one_top10: f64,
    pub both_bottom: f64,
    pub mid_table: f64,
    // No usable standings for the pair.
    pub mixed: f64,
}

impl Default for TeamWeights {
    fn default() -> Self {
        Self {
            both_top6: 25.0,
            one_top6: 18.0,
            both_top10: 14.0,
            one_top10: 10.0,
            both_bottom: 12.0,
            mid_table: 5.0,
            mixed: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormWeights {
    pub both_good: f64,
    pub potential_upset: f64,
    pub close_match: f64,
    pub one_good: f64,
    pub normal: f64,
}

impl Default for FormWeights {
    fn default() -> Self {
        Self {
            both_good: 15.0,
            potential_upset: 10.0,
            close_match: 8.0,
            one_good: 6.0,
            normal: 2.0,
        }
    }
}

/// Points by whole days since kickoff; index 4 covers everything older.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeWeights {
    pub by_age: [f64; 5],
}

impl Default for TimeWeights {
    fn default() -> Self {
        Self {
            by_age: [20.0, 15.0, 10.0, 5.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub league: LeagueWeights,
    pub stage: StageWeights,
    pub team: TeamWeights,
    pub form: FormWeights,
    pub time: TimeWeights,
}

impl ScoringWeights {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read weights {}", path.display()))?;
        let weights: ScoringWeights =
            serde_json::from_str(raw.trim()).context("invalid weights json")?;
        Ok(weights.sanitized())
    }

    /// Components must stay non-negative; negative or non-finite entries fall
    /// back to zero.
    pub fn sanitized(mut self) -> Self {
        let fix = |v: &mut f64| {
            if !v.is_finite() || *v < 0.0 {
                *v = 0.0;
            }
        };
        for v in [
            &mut self.league.tier1,
            &mut self.league.tier2,
            &mut self.league.tier3,
            &mut self.league.tier4,
            &mut self.league.default,
            &mut self.stage.final_,
            &mut self.stage.semi_final,
            &mut self.stage.quarter_final,
            &mut self.stage.round_of_16,
            &mut self.stage.group_stage,
            &mut self.stage.playoff,
            &mut self.stage.regular,
            &mut self.stage.derby_bonus,
            &mut self.team.both_top6,
            &mut self.team.one_top6,
            &mut self.team.both_top10,
            &mut self.team.one_top10,
            &mut self.team.both_bottom,
            &mut self.team.mid_table,
            &mut self.team.mixed,
            &mut self.form.both_good,
            &mut self.form.potential_upset,
            &mut self.form.close_match,
            &mut self.form.one_good,
            &mut self.form.normal,
        ] {
            fix(v);
        }
        self.time.by_age.iter_mut().for_each(fix);
        self
    }
}

/// Thresholds and weight tables used by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub rivalry_threshold: f64,
    pub relegation_band: u32,
    pub good_form_rate: f64,
    pub upset_gap: f64,
    pub close_gap: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            rivalry_threshold: 0.7,
            relegation_band: 3,
            good_form_rate: 0.6,
            upset_gap: 0.4,
            close_gap: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySettings {
    pub fallback_limit: usize,
    // Fewer active competitions than this switches to the fallback list.
    pub min_active: usize,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            fallback_limit: 5,
            min_active: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub activity: ActivitySettings,
    pub scoring: ScoringConfig,
    pub top_limit: usize,
    pub catalog_path: Option<PathBuf>,
    pub weights_path: Option<PathBuf>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            activity: ActivitySettings::default(),
            scoring: ScoringConfig::default(),
            top_limit: 10,
            catalog_path: None,
            weights_path: None,
        }
    }
}

impl FeedSettings {
    /// Reads `FEED_*` variables; anything unset or unparsable keeps its default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`FeedSettings::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let activity = ActivitySettings {
            fallback_limit: parse_or(&lookup, "FEED_FALLBACK_LIMIT", 5usize).clamp(1, 32),
            min_active: parse_or(&lookup, "FEED_MIN_ACTIVE", 1usize).clamp(0, 32),
        };
        let defaults = ScoringConfig::default();
        let scoring = ScoringConfig {
            rivalry_threshold: unit_or(&lookup, "FEED_RIVALRY_THRESHOLD", defaults.rivalry_threshold),
            relegation_band: parse_or(&lookup, "FEED_RELEGATION_BAND", defaults.relegation_band)
                .clamp(1, 8),
            good_form_rate: unit_or(&lookup, "FEED_GOOD_FORM_RATE", defaults.good_form_rate),
            ..defaults
        };
        Self {
            activity,
            scoring,
            top_limit: parse_or(&lookup, "FEED_TOP_LIMIT", 10usize).clamp(1, 200),
            catalog_path: opt_value(&lookup, "FEED_CATALOG_PATH").map(PathBuf::from),
            weights_path: opt_value(&lookup, "FEED_WEIGHTS_PATH").map(PathBuf::from),
        }
    }

    /// Applies the weights file named by `FEED_WEIGHTS_PATH`, if any.
    pub fn load_weights(&mut self) -> Result<()> {
        if let Some(path) = &self.weights_path {
            self.scoring.weights = ScoringWeights::load(path)?;
        }
        Ok(())
    }
}

fn opt_value(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).and_then(|val| {
        let val = val.trim();
        if val.is_empty() {
            None
        } else {
            Some(val.to_string())
        }
    })
}

fn parse_or<T: FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    opt_value(lookup, key)
        .and_then(|val| val.parse::<T>().ok())
        .unwrap_or(default)
}

// NaN would survive `clamp`, so non-finite input keeps the default.
fn unit_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    let val = parse_or(lookup, key, default);
    if val.is_finite() {
        val.clamp(0.0, 1.0)
    } else {
        default
    }
}
