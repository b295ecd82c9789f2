use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::competition::{Competition, MonthDay};
use crate::config::ActivitySettings;

const WINDOW_DAYS_BEFORE: u64 = 1;
const WINDOW_DAYS_AFTER: u64 = 5;

pub fn is_active(competition: &Competition, on: impl Into<MonthDay>) -> bool {
    let on = on.into();
    competition.periods.iter().any(|p| p.contains(on))
}

/// In-season competitions, in catalog rank order.
pub fn active_competitions(catalog: &Catalog, on: impl Into<MonthDay>) -> Vec<&Competition> {
    let on = on.into();
    catalog
        .competitions()
        .iter()
        .filter(|c| is_active(c, on))
        .collect()
}

/// Year-round allow-list used when too little is in season. The date plays no
/// part in which competitions qualify.
pub fn fallback_competitions(catalog: &Catalog, limit: usize) -> Vec<&Competition> {
    catalog
        .competitions()
        .iter()
        .filter(|c| c.always_available)
        .take(limit)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|d| *d <= self.end)
    }
}

/// Fixture query window: the day before `reference` through five days after.
pub fn match_date_range(reference: NaiveDate) -> DateWindow {
    DateWindow {
        start: reference
            .checked_sub_days(Days::new(WINDOW_DAYS_BEFORE))
            .unwrap_or(NaiveDate::MIN),
        end: reference
            .checked_add_days(Days::new(WINDOW_DAYS_AFTER))
            .unwrap_or(NaiveDate::MAX),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanSource {
    Active,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryPlan<'a> {
    pub source: PlanSource,
    pub competitions: Vec<&'a Competition>,
    pub window: DateWindow,
}

impl QueryPlan<'_> {
    pub fn external_ids(&self) -> Vec<u32> {
        self.competitions
            .iter()
            .filter_map(|c| c.external_id)
            .collect()
    }
}

/// Which competitions the fixture fetcher should ask for on `date`: the
/// in-season set when it is large enough, otherwise the fallback list, and in
/// both cases only those with an external id.
pub fn query_competitions<'a>(
    catalog: &'a Catalog,
    date: NaiveDate,
    settings: &ActivitySettings,
) -> QueryPlan<'a> {
    let active = active_competitions(catalog, date);
    let (source, picked) = if !active.is_empty() && active.len() >= settings.min_active {
        (PlanSource::Active, active)
    } else {
        log::debug!(
            "{} competitions active on {date}, using fallback list",
            active.len()
        );
        (
            PlanSource::Fallback,
            fallback_competitions(catalog, settings.fallback_limit),
        )
    };
    QueryPlan {
        source,
        competitions: picked
            .into_iter()
            .filter(|c| c.external_id.is_some())
            .collect(),
        window: match_date_range(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::{ActivePeriod, Tier};

    fn comp(periods: &[((u8, u8), (u8, u8))]) -> Competition {
        Competition {
            id: "c".to_string(),
            rank: 1,
            name: "C".to_string(),
            tier: Tier::One,
            external_id: None,
            periods: periods
                .iter()
                .map(|&((sm, sd), (em, ed))| ActivePeriod {
                    start: MonthDay::new(sm, sd),
                    end: MonthDay::new(em, ed),
                })
                .collect(),
            always_available: false,
        }
    }

    #[test]
    fn boundary_days_are_compared_not_just_months() {
        let c = comp(&[((8, 15), (5, 20))]);
        assert!(!is_active(&c, MonthDay::new(8, 14)));
        assert!(is_active(&c, MonthDay::new(8, 15)));
        assert!(is_active(&c, MonthDay::new(5, 20)));
        assert!(!is_active(&c, MonthDay::new(5, 21)));
    }

    #[test]
    fn non_wrapping_period_stays_within_year() {
        let c = comp(&[((2, 15), (12, 10))]);
        assert!(is_active(&c, MonthDay::new(2, 29)));
        assert!(!is_active(&c, MonthDay::new(12, 11)));
        assert!(!is_active(&c, MonthDay::new(1, 5)));
    }

    #[test]
    fn any_matching_period_counts() {
        let c = comp(&[((1, 10), (2, 5)), ((6, 1), (7, 31))]);
        assert!(is_active(&c, MonthDay::new(1, 20)));
        assert!(is_active(&c, MonthDay::new(7, 1)));
        assert!(!is_active(&c, MonthDay::new(4, 1)));
        assert!(!is_active(&comp(&[]), MonthDay::new(4, 1)));
    }

    #[test]
    fn window_is_one_day_back_five_forward() {
        let reference = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let w = match_date_range(reference);
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2024, 12, 29).unwrap());
        assert_eq!(w.end, NaiveDate::from_ymd_opt(2025, 1, 4).unwrap());
        assert_eq!(w.days().count(), 7);
        assert!(w.contains(reference));
    }
}
