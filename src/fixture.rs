use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    /// Catalog id of the competition this match belongs to.
    pub competition: String,
    #[serde(default)]
    pub stage: String,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub kickoff: DateTime<Utc>,
    #[serde(default)]
    pub is_derby: Option<bool>,
    #[serde(default)]
    pub rivalry_factor: Option<f64>,
    #[serde(default)]
    pub score: Option<Score>,
}

/// Known competition stages, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Final,
    SemiFinal,
    QuarterFinal,
    RoundOf16,
    GroupStage,
    Playoff,
    Regular,
}

impl Stage {
    /// Maps provider stage text onto a known stage; anything unrecognised is
    /// a regular fixture.
    pub fn normalize(raw: &str) -> Self {
        let s: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();
        let s = s.split_whitespace().collect::<Vec<_>>().join(" ");

        if s.is_empty() {
            return Stage::Regular;
        }
        if s.contains("semi") || s.starts_with("1/2") {
            return Stage::SemiFinal;
        }
        if s.contains("quarter") || s.starts_with("1/4") {
            return Stage::QuarterFinal;
        }
        if s.contains("round of 16")
            || s.contains("last 16")
            || s == "r16"
            || s.starts_with("1/8")
            || s.contains("eighth")
        {
            return Stage::RoundOf16;
        }
        if s.contains("group") || s.contains("league phase") {
            return Stage::GroupStage;
        }
        if s.contains("play off") || s.contains("playoff") || s.contains("qualif") {
            return Stage::Playoff;
        }
        if s.starts_with("1/") || s.contains("third") || s.contains("3rd place") {
            return Stage::Regular;
        }
        if s == "f"
            || s.starts_with("final")
            || s.ends_with(" final")
            || s.ends_with(" finals")
        {
            return Stage::Final;
        }
        Stage::Regular
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Final => "final",
            Stage::SemiFinal => "semi-final",
            Stage::QuarterFinal => "quarter-final",
            Stage::RoundOf16 => "round-of-16",
            Stage::GroupStage => "group-stage",
            Stage::Playoff => "playoff",
            Stage::Regular => "regular",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub team_id: u32,
    pub position: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRow {
    pub team_id: u32,
    pub matches_played: u32,
    pub wins: u32,
}

impl FormRow {
    /// Share of matches won, clamped to [0, 1].
    pub fn win_rate(&self) -> f64 {
        let played = self.matches_played.max(1) as f64;
        (self.wins as f64 / played).clamp(0.0, 1.0)
    }
}

/// Table positions keyed by competition id.
pub type StandingsSnapshot = HashMap<String, Vec<StandingRow>>;

/// Recent results keyed by competition id.
pub type FormSnapshot = HashMap<String, Vec<FormRow>>;
