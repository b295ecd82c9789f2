//! Building [`Match`] values out of provider JSON.
//!
//! Providers disagree on where fields live (`home.id` vs `teams.home.id` vs
//! `homeTeamId`, ...). Each field has an ordered list of named strategies; the
//! first one that yields a value wins and its name is kept in the trace so a
//! surprising value can be traced back to the payload shape it came from.

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::catalog::Catalog;
use crate::fixture::{Match, Score};

pub struct Strategy<T> {
    pub name: &'static str,
    pub pick: fn(&Value) -> Option<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub value: T,
    pub source: &'static str,
}

/// Runs `strategies` in order and returns the first hit.
pub fn first_hit<T>(payload: &Value, strategies: &[Strategy<T>]) -> Option<Extracted<T>> {
    strategies.iter().find_map(|s| {
        (s.pick)(payload).map(|value| Extracted {
            value,
            source: s.name,
        })
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompetitionRef {
    Id(String),
    External(u32),
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSource {
    pub field: &'static str,
    pub source: &'static str,
}

#[derive(Debug, Clone)]
pub struct ExtractedMatch {
    pub fixture: Match,
    pub sources: Vec<FieldSource>,
}

impl ExtractedMatch {
    pub fn source_of(&self, field: &str) -> Option<&'static str> {
        self.sources
            .iter()
            .find(|s| s.field == field)
            .map(|s| s.source)
    }
}

fn at<'a>(v: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(v, |cur, key| cur.get(*key))
}

fn as_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|x| u32::try_from(x).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_kickoff(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        Value::String(s) => parse_kickoff(s),
        _ => None,
    }
}

pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// "2 - 1" / "2-1" style score strings.
fn parse_score_str(raw: &str) -> Option<Score> {
    let (home, away) = raw.split_once('-')?;
    Some(Score {
        home: home.trim().parse().ok()?,
        away: away.trim().parse().ok()?,
    })
}

fn pair(v: &Value, home: &[&str], away: &[&str]) -> Option<Score> {
    Some(Score {
        home: at(v, home).and_then(as_u32)?,
        away: at(v, away).and_then(as_u32)?,
    })
}

fn match_id_strategies() -> [Strategy<String>; 3] {
    [
        Strategy {
            name: "id",
            pick: |v| v.get("id").and_then(as_text),
        },
        Strategy {
            name: "fixture.id",
            pick: |v| at(v, &["fixture", "id"]).and_then(as_text),
        },
        Strategy {
            name: "matchId",
            pick: |v| v.get("matchId").and_then(as_text),
        },
    ]
}

fn competition_strategies() -> [Strategy<CompetitionRef>; 6] {
    [
        Strategy {
            name: "competition",
            pick: |v| match v.get("competition") {
                Some(Value::String(s)) if !s.trim().is_empty() => {
                    Some(CompetitionRef::Id(s.trim().to_string()))
                }
                _ => None,
            },
        },
        Strategy {
            name: "competition (numeric)",
            pick: |v| match v.get("competition") {
                Some(c) if c.is_number() => as_u32(c).map(CompetitionRef::External),
                _ => None,
            },
        },
        Strategy {
            name: "leagueId",
            pick: |v| v.get("leagueId").and_then(as_u32).map(CompetitionRef::External),
        },
        Strategy {
            name: "tournament.leagueId",
            pick: |v| {
                at(v, &["tournament", "leagueId"])
                    .and_then(as_u32)
                    .map(CompetitionRef::External)
            },
        },
        Strategy {
            name: "league.id",
            pick: |v| {
                at(v, &["league", "id"])
                    .and_then(as_u32)
                    .map(CompetitionRef::External)
            },
        },
        Strategy {
            name: "competition.id",
            pick: |v| {
                at(v, &["competition", "id"])
                    .and_then(as_u32)
                    .map(CompetitionRef::External)
            },
        },
    ]
}

fn stage_strategies() -> [Strategy<String>; 4] {
    [
        Strategy {
            name: "stage",
            pick: |v| v.get("stage").and_then(as_text),
        },
        Strategy {
            name: "tournamentStage",
            pick: |v| v.get("tournamentStage").and_then(as_text),
        },
        Strategy {
            name: "league.round",
            pick: |v| at(v, &["league", "round"]).and_then(as_text),
        },
        Strategy {
            name: "round",
            pick: |v| v.get("round").and_then(as_text),
        },
    ]
}

fn home_team_strategies() -> [Strategy<u32>; 4] {
    [
        Strategy {
            name: "homeTeamId",
            pick: |v| v.get("homeTeamId").and_then(as_u32),
        },
        Strategy {
            name: "home.id",
            pick: |v| at(v, &["home", "id"]).and_then(as_u32),
        },
        Strategy {
            name: "teams.home.id",
            pick: |v| at(v, &["teams", "home", "id"]).and_then(as_u32),
        },
        Strategy {
            name: "homeTeam.id",
            pick: |v| at(v, &["homeTeam", "id"]).and_then(as_u32),
        },
    ]
}

fn away_team_strategies() -> [Strategy<u32>; 4] {
    [
        Strategy {
            name: "awayTeamId",
            pick: |v| v.get("awayTeamId").and_then(as_u32),
        },
        Strategy {
            name: "away.id",
            pick: |v| at(v, &["away", "id"]).and_then(as_u32),
        },
        Strategy {
            name: "teams.away.id",
            pick: |v| at(v, &["teams", "away", "id"]).and_then(as_u32),
        },
        Strategy {
            name: "awayTeam.id",
            pick: |v| at(v, &["awayTeam", "id"]).and_then(as_u32),
        },
    ]
}

fn kickoff_strategies() -> [Strategy<DateTime<Utc>>; 5] {
    [
        Strategy {
            name: "kickoff",
            pick: |v| v.get("kickoff").and_then(as_kickoff),
        },
        Strategy {
            name: "status.utcTime",
            pick: |v| at(v, &["status", "utcTime"]).and_then(as_kickoff),
        },
        Strategy {
            name: "utcDate",
            pick: |v| v.get("utcDate").and_then(as_kickoff),
        },
        Strategy {
            name: "fixture.timestamp",
            pick: |v| at(v, &["fixture", "timestamp"]).and_then(as_kickoff),
        },
        Strategy {
            name: "fixture.date",
            pick: |v| at(v, &["fixture", "date"]).and_then(as_kickoff),
        },
    ]
}

fn score_strategies() -> [Strategy<Score>; 4] {
    [
        Strategy {
            name: "home.score/away.score",
            pick: |v| pair(v, &["home", "score"], &["away", "score"]),
        },
        Strategy {
            name: "goals",
            pick: |v| pair(v, &["goals", "home"], &["goals", "away"]),
        },
        Strategy {
            name: "score.fullTime",
            pick: |v| pair(v, &["score", "fullTime", "home"], &["score", "fullTime", "away"]),
        },
        Strategy {
            name: "status.scoreStr",
            pick: |v| {
                at(v, &["status", "scoreStr"])
                    .and_then(|s| s.as_str())
                    .and_then(parse_score_str)
            },
        },
    ]
}

fn derby_strategies() -> [Strategy<bool>; 2] {
    [
        Strategy {
            name: "isDerby",
            pick: |v| v.get("isDerby").and_then(Value::as_bool),
        },
        Strategy {
            name: "derby",
            pick: |v| v.get("derby").and_then(Value::as_bool),
        },
    ]
}

fn rivalry_strategies() -> [Strategy<f64>; 2] {
    [
        Strategy {
            name: "rivalryFactor",
            pick: |v| v.get("rivalryFactor").and_then(Value::as_f64),
        },
        Strategy {
            name: "rivalry",
            pick: |v| v.get("rivalry").and_then(Value::as_f64),
        },
    ]
}

struct Trace(Vec<FieldSource>);

impl Trace {
    fn take<T>(&mut self, field: &'static str, hit: Option<Extracted<T>>) -> Option<T> {
        let hit = hit?;
        self.0.push(FieldSource {
            field,
            source: hit.source,
        });
        Some(hit.value)
    }

    fn require<T>(&mut self, field: &'static str, hit: Option<Extracted<T>>) -> Result<T> {
        self.take(field, hit)
            .ok_or_else(|| anyhow!("no strategy produced {field}"))
    }
}

/// Builds a [`Match`] from one provider payload. External league ids are
/// mapped onto catalog ids; a competition the catalog does not know is an
/// error since it cannot be tiered or scheduled.
pub fn match_from_payload(payload: &Value, catalog: &Catalog) -> Result<ExtractedMatch> {
    let mut trace = Trace(Vec::new());

    let id = trace.require("id", first_hit(payload, &match_id_strategies()))?;
    let competition = match trace.require(
        "competition",
        first_hit(payload, &competition_strategies()),
    )? {
        CompetitionRef::Id(comp) => catalog
            .get(&comp)
            .map(|c| c.id.clone())
            .ok_or_else(|| anyhow!("match {id}: unknown competition {comp:?}"))?,
        CompetitionRef::External(ext) => catalog
            .by_external_id(ext)
            .map(|c| c.id.clone())
            .ok_or_else(|| anyhow!("match {id}: no competition with external id {ext}"))?,
    };
    let home_team_id = trace.require("homeTeamId", first_hit(payload, &home_team_strategies()))?;
    let away_team_id = trace.require("awayTeamId", first_hit(payload, &away_team_strategies()))?;
    let kickoff = trace.require("kickoff", first_hit(payload, &kickoff_strategies()))?;
    let stage = trace
        .take("stage", first_hit(payload, &stage_strategies()))
        .unwrap_or_default();
    let is_derby = trace.take("isDerby", first_hit(payload, &derby_strategies()));
    let rivalry_factor = trace.take("rivalryFactor", first_hit(payload, &rivalry_strategies()));
    let score = trace.take("score", first_hit(payload, &score_strategies()));

    Ok(ExtractedMatch {
        fixture: Match {
            id,
            competition,
            stage,
            home_team_id,
            away_team_id,
            kickoff,
            is_derby,
            rivalry_factor,
            score,
        },
        sources: trace.0,
    })
}

/// Extracts every payload it can; failures are returned alongside with their
/// index so the caller can report them.
pub fn matches_from_payloads(
    payloads: &[Value],
    catalog: &Catalog,
) -> (Vec<ExtractedMatch>, Vec<(usize, anyhow::Error)>) {
    let mut ok = Vec::new();
    let mut failed = Vec::new();
    for (idx, payload) in payloads.iter().enumerate() {
        match match_from_payload(payload, catalog) {
            Ok(m) => ok.push(m),
            Err(err) => {
                log::debug!("payload {idx} skipped: {err}");
                failed.push((idx, err));
            }
        }
    }
    (ok, failed)
}
