use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::competition::{CatalogIssue, Competition, CompetitionDef, Tier};

const BUILTIN_CATALOG: &str = include_str!("../data/competitions.json");

static BUILTIN: OnceCell<Catalog> = OnceCell::new();

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    competitions: Vec<CompetitionDef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedCompetition {
    pub id: String,
    pub rank: u32,
    pub issue: String,
}

/// Rank-ordered, validated competition list. Built once and shared by
/// reference; nothing mutates it after construction.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    competitions: Vec<Competition>,
    rejected: Vec<RejectedCompetition>,
}

pub type TierTable = HashMap<String, Tier>;

impl Catalog {
    pub fn from_defs(defs: Vec<CompetitionDef>) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut ranks = HashSet::new();
        for d in &defs {
            if !ids.insert(d.id.as_str()) {
                bail!("duplicate competition id {:?}", d.id);
            }
            if !ranks.insert(d.rank) {
                bail!("duplicate competition rank {} ({})", d.rank, d.id);
            }
        }

        let mut competitions = Vec::with_capacity(defs.len());
        let mut rejected = Vec::new();
        for d in &defs {
            match d.validate() {
                Ok(comp) => competitions.push(comp),
                Err(issue) => {
                    log::warn!("competition {} rejected: {issue}", d.id);
                    rejected.push(reject(d, &issue));
                }
            }
        }
        competitions.sort_by_key(|c| c.rank);

        Ok(Self {
            competitions,
            rejected,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(raw.trim()).context("invalid catalog json")?;
        Self::from_defs(file.competitions)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read catalog {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("load catalog {}", path.display()))
    }

    /// Catalog of major competitions shipped with the crate.
    pub fn builtin() -> Result<&'static Catalog> {
        BUILTIN.get_or_try_init(|| {
            Catalog::from_json_str(BUILTIN_CATALOG).context("builtin catalog")
        })
    }

    pub fn competitions(&self) -> &[Competition] {
        &self.competitions
    }

    pub fn rejected(&self) -> &[RejectedCompetition] {
        &self.rejected
    }

    pub fn get(&self, id: &str) -> Option<&Competition> {
        self.competitions.iter().find(|c| c.id == id)
    }

    pub fn by_external_id(&self, external_id: u32) -> Option<&Competition> {
        self.competitions
            .iter()
            .find(|c| c.external_id == Some(external_id))
    }

    /// Tier lookup keyed by competition id, as consumed by the ranking pass.
    pub fn tier_table(&self) -> TierTable {
        self.competitions
            .iter()
            .map(|c| (c.id.clone(), c.tier))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.competitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitions.is_empty()
    }
}

fn reject(def: &CompetitionDef, issue: &CatalogIssue) -> RejectedCompetition {
    RejectedCompetition {
        id: def.id.clone(),
        rank: def.rank,
        issue: issue.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads_in_rank_order() {
        let catalog = Catalog::builtin().expect("builtin catalog should parse");
        assert!(!catalog.is_empty());
        assert!(catalog.rejected().is_empty());
        let ranks: Vec<u32> = catalog.competitions().iter().map(|c| c.rank).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn invalid_competition_is_rejected_not_fatal() {
        let raw = r#"{"competitions":[
            {"id":"ok","rank":2,"name":"Ok League","tier":1,
             "activePeriods":[{"start":{"month":8},"end":{"month":5}}]},
            {"id":"bad","rank":1,"name":"Bad League","tier":1,
             "activePeriods":[{"start":{"month":0},"end":{"month":5}}]}
        ]}"#;
        let catalog = Catalog::from_json_str(raw).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.competitions()[0].id, "ok");
        assert_eq!(catalog.rejected().len(), 1);
        assert_eq!(catalog.rejected()[0].id, "bad");
        assert!(catalog.get("bad").is_none());
    }

    #[test]
    fn duplicate_rank_fails_the_load() {
        let raw = r#"{"competitions":[
            {"id":"a","rank":1,"name":"A","activePeriods":[{"start":{"month":1},"end":{"month":12}}]},
            {"id":"b","rank":1,"name":"B","activePeriods":[{"start":{"month":1},"end":{"month":12}}]}
        ]}"#;
        let err = Catalog::from_json_str(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate competition rank"));
    }

    #[test]
    fn duplicate_id_fails_the_load() {
        let raw = r#"{"competitions":[
            {"id":"a","rank":1,"name":"A","activePeriods":[{"start":{"month":1},"end":{"month":12}}]},
            {"id":"a","rank":2,"name":"A again","activePeriods":[{"start":{"month":1},"end":{"month":12}}]}
        ]}"#;
        let err = Catalog::from_json_str(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate competition id"));
    }
}
