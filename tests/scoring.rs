use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};

use matchday_rank::catalog::TierTable;
use matchday_rank::competition::Tier;
use matchday_rank::config::ScoringConfig;
use matchday_rank::fixture::{FormRow, FormSnapshot, Match, StandingRow, StandingsSnapshot};
use matchday_rank::ranking::top_weighted_matches;
use matchday_rank::scoring::compute_weight;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 31, 21, 0, 0).unwrap()
}

fn fixture(id: &str, competition: &str, stage: &str, home: u32, away: u32, age_days: i64) -> Match {
    Match {
        id: id.to_string(),
        competition: competition.to_string(),
        stage: stage.to_string(),
        home_team_id: home,
        away_team_id: away,
        kickoff: now() - Duration::days(age_days),
        is_derby: None,
        rivalry_factor: None,
        score: None,
    }
}

fn table(positions: &[(u32, u32)]) -> Vec<StandingRow> {
    positions
        .iter()
        .map(|&(team_id, position)| StandingRow { team_id, position })
        .collect()
}

fn form(rows: &[(u32, u32, u32)]) -> Vec<FormRow> {
    rows.iter()
        .map(|&(team_id, matches_played, wins)| FormRow {
            team_id,
            matches_played,
            wins,
        })
        .collect()
}

fn twenty_team_table(offset: u32) -> Vec<StandingRow> {
    (1..=20)
        .map(|p| StandingRow {
            team_id: offset + p,
            position: p,
        })
        .collect()
}

#[test]
fn final_between_top_sides_beats_old_mid_table_game() {
    let a = fixture("A", "cup", "Final", 101, 102, 0);
    let b = fixture("B", "minor", "regular", 212, 213, 10);

    let standings: StandingsSnapshot = HashMap::from([
        ("cup".to_string(), twenty_team_table(100)),
        ("minor".to_string(), twenty_team_table(200)),
    ]);
    let form_snapshot: FormSnapshot = HashMap::from([
        ("cup".to_string(), form(&[(101, 10, 8), (102, 10, 7)])),
        ("minor".to_string(), form(&[(212, 10, 4), (213, 10, 2)])),
    ]);
    let tiers = TierTable::from([("cup".to_string(), Tier::One)]);

    let out = top_weighted_matches(
        &[b.clone(), a.clone()],
        &standings,
        &form_snapshot,
        &tiers,
        1,
        now(),
        &ScoringConfig::default(),
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].fixture.id, "A");
}

#[test]
fn total_never_hides_a_term() {
    let cfg = ScoringConfig::default();
    let rows = twenty_team_table(0);
    let recent = form(&[(1, 6, 6), (2, 6, 0), (19, 0, 0), (20, 4, 2)]);
    let stages = ["final", "semi-final", "Group A", "play-offs", "Matchday 4", ""];
    let pairs = [(1, 2), (7, 9), (19, 20), (12, 14), (1, 99)];
    for (i, stage) in stages.iter().enumerate() {
        for (j, &(home, away)) in pairs.iter().enumerate() {
            for tier in [Some(Tier::One), Some(Tier::Four), None] {
                let mut m = fixture("m", "l", stage, home, away, (i + j) as i64);
                m.rivalry_factor = Some(0.1 * j as f64 + 0.5);
                for (standings, form_rows) in [
                    (Some(rows.as_slice()), Some(recent.as_slice())),
                    (None, None),
                ] {
                    let b = compute_weight(&m, tier, standings, form_rows, now(), &cfg);
                    assert_eq!(b.total, b.league + b.stage + b.team + b.form + b.time);
                    for (name, value) in b.components() {
                        assert!(value >= 0.0, "{name} negative");
                    }
                }
            }
        }
    }
}

#[test]
fn top6_move_never_lowers_team_weight() {
    let cfg = ScoringConfig::default();
    let m = fixture("m", "l", "regular", 1, 2, 0);
    for away_pos in [1, 5, 8, 13, 19] {
        let mid = table(&[(1, 14), (2, away_pos), (3, 20)]);
        let top = table(&[(1, if away_pos == 3 { 4 } else { 3 }), (2, away_pos), (3, 20)]);
        let before = compute_weight(&m, None, Some(&mid), None, now(), &cfg).team;
        let after = compute_weight(&m, None, Some(&top), None, now(), &cfg).team;
        assert!(after >= before, "away at {away_pos}");
    }
}

#[test]
fn ranking_returns_min_of_limit_and_len_sorted_desc() {
    let tiers = TierTable::from([
        ("t1".to_string(), Tier::One),
        ("t2".to_string(), Tier::Two),
        ("t3".to_string(), Tier::Three),
    ]);
    let matches: Vec<Match> = (0..12)
        .map(|i| {
            let comp = ["t1", "t2", "t3", "other"][i % 4];
            let stage = ["final", "regular", "group stage"][i % 3];
            fixture(&format!("m{i}"), comp, stage, 1, 2, (i % 5) as i64)
        })
        .collect();
    let cfg = ScoringConfig::default();
    for limit in [0, 1, 5, 12, 40] {
        let out = top_weighted_matches(
            &matches,
            &StandingsSnapshot::new(),
            &FormSnapshot::new(),
            &tiers,
            limit,
            now(),
            &cfg,
        );
        assert_eq!(out.len(), limit.min(matches.len()));
        assert!(out.windows(2).all(|w| w[0].weight.total >= w[1].weight.total));
    }
}
