use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use matchday_rank::activity::{
    PlanSource, active_competitions, fallback_competitions, is_active, query_competitions,
};
use matchday_rank::catalog::Catalog;
use matchday_rank::competition::MonthDay;
use matchday_rank::config::ActivitySettings;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn small_catalog() -> Catalog {
    Catalog::from_json_str(&read_fixture("catalog_small.json")).expect("catalog should load")
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ids<'a>(comps: impl IntoIterator<Item = &'a matchday_rank::competition::Competition>) -> Vec<&'a str> {
    comps.into_iter().map(|c| c.id.as_str()).collect()
}

#[test]
fn single_league_season_scenario() {
    let raw = r#"{"competitions":[{"id":"league","rank":1,"name":"League","tier":1,
        "activePeriods":[{"start":{"month":8,"day":1},"end":{"month":5,"day":31}}]}]}"#;
    let catalog = Catalog::from_json_str(raw).unwrap();
    assert_eq!(active_competitions(&catalog, MonthDay::new(7, 1)).len(), 0);
    assert_eq!(active_competitions(&catalog, MonthDay::new(9, 1)).len(), 1);
}

#[test]
fn wrapping_period_covers_winter_not_summer() {
    let catalog = small_catalog();
    let league = catalog.get("top-league").unwrap();
    assert!(is_active(league, MonthDay::new(12, 15)));
    assert!(!is_active(league, MonthDay::new(6, 15)));
    assert!(is_active(league, ymd(2025, 1, 1)));
}

#[test]
fn leap_day_is_an_ordinary_day() {
    let catalog = small_catalog();
    let league = catalog.get("top-league").unwrap();
    let feb29 = MonthDay::new(2, 29);
    assert!(is_active(league, feb29));
    // Same answer every time for the same pair.
    assert_eq!(is_active(league, feb29), is_active(league, feb29));
    assert!(!is_active(catalog.get("year-round-league").unwrap(), feb29));
}

#[test]
fn active_set_is_rank_ordered_subset_every_day() {
    let catalog = small_catalog();
    let all = ids(catalog.competitions());
    for date in ymd(2024, 1, 1).iter_days().take(366) {
        let active = ids(active_competitions(&catalog, date));
        let mut cursor = all.iter();
        for id in &active {
            assert!(cursor.any(|c| c == id), "{id} out of order on {date}");
        }
    }
}

#[test]
fn rejected_competition_never_active_or_fallback() {
    let catalog = small_catalog();
    assert_eq!(catalog.rejected().len(), 1);
    assert_eq!(catalog.rejected()[0].id, "broken-league");
    for date in ymd(2025, 1, 1).iter_days().take(365) {
        assert!(!ids(active_competitions(&catalog, date)).contains(&"broken-league"));
    }
    assert!(!ids(fallback_competitions(&catalog, 10)).contains(&"broken-league"));
}

#[test]
fn fallback_is_rank_ordered_and_capped() {
    let catalog = small_catalog();
    assert_eq!(
        ids(fallback_competitions(&catalog, 10)),
        ["qualifiers", "friendlies", "year-round-league"]
    );
    assert_eq!(
        ids(fallback_competitions(&catalog, 2)),
        ["qualifiers", "friendlies"]
    );
}

#[test]
fn fallback_plan_does_not_depend_on_date() {
    let catalog = small_catalog();
    let settings = ActivitySettings {
        fallback_limit: 5,
        min_active: 32,
    };
    let winter = query_competitions(&catalog, ymd(2025, 1, 10), &settings);
    let summer = query_competitions(&catalog, ymd(2025, 7, 10), &settings);
    assert_eq!(winter.source, PlanSource::Fallback);
    assert_eq!(summer.source, PlanSource::Fallback);
    assert_eq!(ids(winter.competitions), ids(summer.competitions));
}

#[test]
fn plan_prefers_active_and_keeps_only_external_ids() {
    let catalog = small_catalog();
    let settings = ActivitySettings::default();

    let plan = query_competitions(&catalog, ymd(2025, 1, 15), &settings);
    assert_eq!(plan.source, PlanSource::Active);
    assert_eq!(plan.external_ids(), [47, 114]);
    assert_eq!(plan.window.start, ymd(2025, 1, 14));
    assert_eq!(plan.window.end, ymd(2025, 1, 20));

    // Four competitions are in season in July, one short of the threshold.
    let strict = ActivitySettings {
        fallback_limit: 5,
        min_active: 5,
    };
    let plan = query_competitions(&catalog, ymd(2025, 7, 1), &strict);
    assert_eq!(plan.source, PlanSource::Fallback);
    assert_eq!(ids(plan.competitions), ["friendlies", "year-round-league"]);
}
