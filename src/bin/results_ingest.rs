use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use nba_elo::results_store;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = std::env::args().skip(1).collect();

    let data_dir = flag_value(&args, "--data")
        .map(PathBuf::from)
        .or_else(|| env_path("APP_DATA_DIR"))
        .unwrap_or_else(|| PathBuf::from("data"));
    if !data_dir.is_dir() {
        return Err(anyhow!("data directory not found: {}", data_dir.display()));
    }

    let db_path = flag_value(&args, "--db")
        .map(PathBuf::from)
        .or_else(|| env_path("APP_DB_PATH"))
        .or_else(results_store::default_db_path)
        .context("unable to resolve sqlite path")?;

    let mut conn = results_store::open_db(&db_path)?;
    let summary = results_store::ingest_results_dir(&mut conn, db_path.clone(), &data_dir)?;

    println!("Results ingest complete");
    println!("DB: {}", summary.db_path.display());
    println!("Files: {}/{}", summary.files_succeeded, summary.files_total);
    println!("Games upserted: {}", summary.games_upserted);
    println!("Rows skipped: {}", summary.rows_skipped);

    let mut league_keys = summary.per_league.keys().cloned().collect::<Vec<_>>();
    league_keys.sort();
    for league in league_keys {
        let Some(item) = summary.per_league.get(&league) else {
            continue;
        };
        println!(
            "league {}: files {}/{} games={} latest={}",
            league,
            item.files_succeeded,
            item.files_total,
            item.games_upserted,
            item.latest_played_at.as_deref().unwrap_or("n/a")
        );
        if !item.errors.is_empty() {
            println!("  errors: {}", item.errors.len());
            for err in item.errors.iter().take(6) {
                println!("   - {err}");
            }
        }
    }

    Ok(())
}

fn env_path(key: &str) -> Option<PathBuf> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
