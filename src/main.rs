use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};

use matchday_rank::activity::{PlanSource, query_competitions};
use matchday_rank::catalog::Catalog;
use matchday_rank::config::FeedSettings;
use matchday_rank::feed::{FeedSnapshot, build_feed};

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut settings = FeedSettings::from_env();
    settings.load_weights()?;

    let owned;
    let catalog: &Catalog = match &settings.catalog_path {
        Some(path) => {
            owned = Catalog::load(path)?;
            &owned
        }
        None => Catalog::builtin()?,
    };
    for r in catalog.rejected() {
        eprintln!("[WARN] competition {} (rank {}) ignored: {}", r.id, r.rank, r.issue);
    }

    let now = Utc::now();
    let today = match env::var("FEED_DATE").ok().filter(|v| !v.trim().is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("FEED_DATE {raw:?} is not YYYY-MM-DD"))?,
        None => now.date_naive(),
    };

    let plan = query_competitions(catalog, today, &settings.activity);
    let source = match plan.source {
        PlanSource::Active => "in season",
        PlanSource::Fallback => "fallback",
    };
    println!(
        "{today}: {} competitions ({source}), fixtures {} .. {}",
        plan.competitions.len(),
        plan.window.start,
        plan.window.end
    );
    for c in &plan.competitions {
        println!(
            "  #{:<3} {:<28} tier {:<2} ext {}",
            c.rank,
            c.name,
            c.tier.level().map(|l| l.to_string()).unwrap_or_else(|| "-".to_string()),
            c.external_id.map(|id| id.to_string()).unwrap_or_default()
        );
    }

    let Some(path) = env::args().nth(1).map(PathBuf::from) else {
        return Ok(());
    };
    let snapshot = FeedSnapshot::load(&path)?;
    let feed = build_feed(catalog, &snapshot, settings.top_limit, now, &settings.scoring);

    println!();
    for (idx, item) in feed.ranked.iter().enumerate() {
        let w = &item.weight;
        println!(
            "{:>2}. {:<10} {:<20} {:<14} {:>6.1}  league {:.0} stage {:.0} team {:.0} form {:.0} time {:.0}",
            idx + 1,
            item.fixture.id,
            item.fixture.competition,
            w.notes.stage.label(),
            w.total,
            w.league,
            w.stage,
            w.team,
            w.form,
            w.time
        );
    }
    for (idx, reason) in &feed.skipped {
        eprintln!("[WARN] match #{idx} skipped: {reason}");
    }
    Ok(())
}
