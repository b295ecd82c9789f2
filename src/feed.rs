use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::Catalog;
use crate::config::ScoringConfig;
use crate::extract::{ExtractedMatch, FieldSource, matches_from_payloads};
use crate::fixture::{FormSnapshot, StandingsSnapshot};
use crate::ranking::{WeightedMatch, rank_indices};

/// Raw candidate matches plus the table and form snapshots that go with them,
/// as handed over by the ingestion side.
#[derive(Debug, Default, Deserialize)]
pub struct FeedSnapshot {
    #[serde(default)]
    pub matches: Vec<Value>,
    #[serde(default)]
    pub standings: StandingsSnapshot,
    #[serde(default)]
    pub form: FormSnapshot,
}

impl FeedSnapshot {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::default());
        }
        serde_json::from_str(trimmed).context("invalid feed snapshot json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read snapshot {}", path.display()))?;
        Self::from_json_str(&raw)
    }
}

#[derive(Debug)]
pub struct Feed {
    pub ranked: Vec<WeightedMatch>,
    /// Extraction trace per ranked match, same order as `ranked`.
    pub sources: Vec<Vec<FieldSource>>,
    pub skipped: Vec<(usize, String)>,
}

/// Extracts the snapshot's matches and ranks the top `limit`.
pub fn build_feed(
    catalog: &Catalog,
    snapshot: &FeedSnapshot,
    limit: usize,
    now: DateTime<Utc>,
    cfg: &ScoringConfig,
) -> Feed {
    let (extracted, failed) = matches_from_payloads(&snapshot.matches, catalog);
    let fixtures: Vec<_> = extracted.iter().map(|e| e.fixture.clone()).collect();
    let order = rank_indices(
        &fixtures,
        &snapshot.standings,
        &snapshot.form,
        &catalog.tier_table(),
        limit,
        now,
        cfg,
    );
    let (ranked, sources): (Vec<_>, Vec<_>) = order
        .into_iter()
        .map(|(idx, weight)| {
            let ExtractedMatch { fixture, sources } = extracted[idx].clone();
            (WeightedMatch { fixture, weight }, sources)
        })
        .unzip();
    Feed {
        ranked,
        sources,
        skipped: failed
            .into_iter()
            .map(|(idx, err)| (idx, format!("{err:#}")))
            .collect(),
    }
}
