use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calendar position without a year. Ordering is (month, day), so Feb 29 is
/// just another day value and never needs a leap-year check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u8,
    pub day: u8,
}

impl MonthDay {
    pub const fn new(month: u8, day: u8) -> Self {
        Self { month, day }
    }
}

impl PartialOrd for MonthDay {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MonthDay {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.month, self.day).cmp(&(other.month, other.day))
    }
}

impl From<NaiveDate> for MonthDay {
    fn from(date: NaiveDate) -> Self {
        Self {
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Significance bucket; 1 is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tier {
    One,
    Two,
    Three,
    Four,
    #[default]
    Default,
}

impl Tier {
    pub fn from_level(level: Option<u8>) -> Self {
        match level {
            Some(1) => Tier::One,
            Some(2) => Tier::Two,
            Some(3) => Tier::Three,
            Some(4) => Tier::Four,
            _ => Tier::Default,
        }
    }

    pub fn level(self) -> Option<u8> {
        match self {
            Tier::One => Some(1),
            Tier::Two => Some(2),
            Tier::Three => Some(3),
            Tier::Four => Some(4),
            Tier::Default => None,
        }
    }
}

/// A recurring in-season range with both ends resolved to concrete days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePeriod {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl ActivePeriod {
    /// Aug→May style ranges straddle the year boundary.
    pub fn wraps(&self) -> bool {
        self.start.month > self.end.month
    }

    pub fn contains(&self, on: MonthDay) -> bool {
        if self.wraps() {
            on >= self.start || on <= self.end
        } else {
            on >= self.start && on <= self.end
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Competition {
    pub id: String,
    pub rank: u32,
    pub name: String,
    pub tier: Tier,
    pub external_id: Option<u32>,
    pub periods: Vec<ActivePeriod>,
    pub always_available: bool,
}

/// One end of a period as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRef {
    pub month: u8,
    #[serde(default)]
    pub day: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDef {
    pub start: DayRef,
    pub end: DayRef,
}

/// Competition entry as it appears in a catalog file, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionDef {
    pub id: String,
    pub rank: u32,
    pub name: String,
    #[serde(default)]
    pub tier: Option<u8>,
    #[serde(default, rename = "externalId")]
    pub external_id: Option<u32>,
    #[serde(rename = "activePeriods")]
    pub active_periods: Vec<PeriodDef>,
    #[serde(default, rename = "alwaysAvailable")]
    pub always_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogIssue {
    #[error("competition has no active periods")]
    NoPeriods,
    #[error("period {index}: month {month} is outside 1-12")]
    MonthOutOfRange { index: usize, month: u8 },
    #[error("period {index}: day {day} is not valid for month {month}")]
    DayOutOfRange { index: usize, month: u8, day: u8 },
}

/// Longest the month can be in any year, so Feb is 29.
pub fn last_day_of_month(month: u8) -> Option<u8> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 => Some(29),
        _ => None,
    }
}

fn resolve_day(index: usize, raw: DayRef, default_last: bool) -> Result<MonthDay, CatalogIssue> {
    let Some(last) = last_day_of_month(raw.month) else {
        return Err(CatalogIssue::MonthOutOfRange {
            index,
            month: raw.month,
        });
    };
    let day = match raw.day {
        Some(day) => day,
        None if default_last => last,
        None => 1,
    };
    if day == 0 || day > last {
        return Err(CatalogIssue::DayOutOfRange {
            index,
            month: raw.month,
            day,
        });
    }
    Ok(MonthDay::new(raw.month, day))
}

impl PeriodDef {
    pub fn resolve(&self, index: usize) -> Result<ActivePeriod, CatalogIssue> {
        Ok(ActivePeriod {
            start: resolve_day(index, self.start, false)?,
            end: resolve_day(index, self.end, true)?,
        })
    }
}

impl CompetitionDef {
    pub fn validate(&self) -> Result<Competition, CatalogIssue> {
        if self.active_periods.is_empty() {
            return Err(CatalogIssue::NoPeriods);
        }
        let periods = self
            .active_periods
            .iter()
            .enumerate()
            .map(|(idx, p)| p.resolve(idx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Competition {
            id: self.id.clone(),
            rank: self.rank,
            name: self.name.clone(),
            tier: Tier::from_level(self.tier),
            external_id: self.external_id,
            periods,
            always_available: self.always_available,
        })
    }
}
