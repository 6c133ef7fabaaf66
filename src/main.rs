use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use nba_elo::calibration::{self, Metrics};
use nba_elo::elo::{self, EloConfig, Game};
use nba_elo::export;
use nba_elo::rankings::{self, LeaderboardRow};
use nba_elo::results_store;

struct LeagueReport {
    league: String,
    rows: Vec<LeaderboardRow>,
    metrics: Metrics,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = resolve_profile(&args)?;

    let db_path = flag_value(&args, "--db")
        .map(PathBuf::from)
        .or_else(|| env_path("APP_DB_PATH"))
        .or_else(results_store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let mut conn = results_store::open_db(&db_path)?;

    if let Some(data_dir) = resolve_data_dir(&args) {
        let summary = results_store::ingest_results_dir(&mut conn, db_path.clone(), &data_dir)?;
        println!(
            "Ingested {} games from {}/{} files ({} rows skipped)",
            summary.games_upserted, summary.files_succeeded, summary.files_total, summary.rows_skipped
        );
        for league in summary.per_league.values() {
            for err in league.errors.iter().take(6) {
                println!("  [{}] {err}", league.league);
            }
        }
        println!();
    }

    let leagues = match flag_value(&args, "--league") {
        Some(league) => vec![league],
        None => results_store::list_leagues(&conn)?,
    };
    if leagues.is_empty() {
        return Err(anyhow!(
            "no game data in {}; pass --data <dir> to ingest result files",
            db_path.display()
        ));
    }

    let mut loaded: Vec<(String, Vec<Game>)> = Vec::new();
    for league in &leagues {
        let games: Vec<Game> = results_store::load_games(&conn, league)?
            .iter()
            .map(|g| g.as_game())
            .collect();
        if games.is_empty() {
            println!("{league}: no games on record");
            continue;
        }
        loaded.push((league.clone(), games));
    }
    if loaded.is_empty() {
        return Err(anyhow!("none of the requested leagues have games on record"));
    }

    let tables = elo::compute_elo_by_league(&loaded, cfg);

    let mut reports = Vec::with_capacity(tables.len());
    for ((league, games), (_, ratings)) in loaded.iter().zip(&tables) {
        let metrics = calibration::evaluate(ratings, games, cfg)
            .with_context(|| format!("evaluate league {league}"))?;
        reports.push(LeagueReport {
            league: league.clone(),
            rows: rankings::leaderboard(ratings),
            metrics,
        });
    }

    for report in &reports {
        print_report(report, reports.len() > 1);
    }

    if let Some(export_arg) = flag_value(&args, "--export") {
        let base = PathBuf::from(export_arg);
        for ((league, games), (_, ratings)) in loaded.iter().zip(&tables) {
            let path = export_path_for(&base, league, loaded.len() > 1);
            let out = export::export_league_report(&path, ratings, games, cfg)?;
            println!(
                "Exported {}: {} teams, {} games -> {}",
                league,
                out.teams,
                out.games,
                path.display()
            );
        }
    }

    Ok(())
}

fn print_report(report: &LeagueReport, multi_league: bool) {
    if multi_league {
        println!("=== {} ===", report.league);
    }
    println!("Team Elo Ratings:");
    for row in &report.rows {
        println!(
            "{:>3}. {:<26} {:>8.2}  ({:+.2})",
            row.rank, row.name, row.rating, row.delta
        );
    }
    println!();
    println!(
        "Brier Score: {:.4}  (n={})",
        report.metrics.brier, report.metrics.samples
    );
    println!(
        "Log loss: {:.4}  Accuracy: {:.1}%",
        report.metrics.log_loss,
        report.metrics.accuracy * 100.0
    );
    println!();
}

fn resolve_profile(args: &[String]) -> Result<EloConfig> {
    let raw = flag_value(args, "--profile")
        .or_else(|| std::env::var("APP_ELO_PROFILE").ok())
        .unwrap_or_else(|| "fixed".to_string());
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "fixed" => Ok(EloConfig::default()),
        "decaying" => Ok(EloConfig::decaying_k()),
        other => Err(anyhow!("unknown elo profile: {other} (fixed|decaying)")),
    }
}

fn resolve_data_dir(args: &[String]) -> Option<PathBuf> {
    if let Some(dir) = flag_value(args, "--data") {
        return Some(PathBuf::from(dir));
    }
    if let Some(dir) = env_path("APP_DATA_DIR") {
        return Some(dir);
    }
    let default = PathBuf::from("data");
    if default.is_dir() { Some(default) } else { None }
}

fn export_path_for(base: &PathBuf, league: &str, multi_league: bool) -> PathBuf {
    if !multi_league {
        return base.clone();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "ratings".to_string());
    base.with_file_name(format!("{stem}_{league}.xlsx"))
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
