use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rayon::prelude::*;
use rusqlite::{Connection, params};
use serde_json::Value;

use crate::elo::Game;

/// Result files sitting directly in the data dir (no league sub-directory)
/// land here.
pub const DEFAULT_LEAGUE: &str = "nba";

const CACHE_DIR: &str = "nba_elo";

#[derive(Debug, Clone)]
pub struct StoredGame {
    pub league: String,
    pub season: String,
    pub played_at: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
}

impl StoredGame {
    pub fn home_win(&self) -> bool {
        self.home_score > self.away_score
    }

    pub fn as_game(&self) -> Game {
        Game {
            played_at: self.played_at.clone(),
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            home_score: self.home_score,
            away_score: self.away_score,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeagueIngestSummary {
    pub league: String,
    pub files_total: usize,
    pub files_succeeded: usize,
    pub games_upserted: usize,
    pub rows_skipped: usize,
    pub latest_played_at: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub db_path: PathBuf,
    pub files_total: usize,
    pub files_succeeded: usize,
    pub games_upserted: usize,
    pub rows_skipped: usize,
    pub per_league: HashMap<String, LeagueIngestSummary>,
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("game_results.sqlite"))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS games (
            league TEXT NOT NULL,
            season TEXT NOT NULL,
            played_at TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_score INTEGER NOT NULL,
            away_score INTEGER NOT NULL,
            home_win INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (league, season, played_at, home_team, away_team)
        );
        CREATE INDEX IF NOT EXISTS idx_games_league ON games(league);
        CREATE INDEX IF NOT EXISTS idx_games_played_at ON games(played_at);

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            data_dir TEXT NOT NULL,
            files_total INTEGER NOT NULL,
            files_succeeded INTEGER NOT NULL,
            games_upserted INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Walk the data directory and upsert every game row it yields. A league is
/// a sub-directory of result files; loose files at the top level fall into
/// `DEFAULT_LEAGUE`. Seasons come from file stems. Files parse in parallel;
/// writes stay on this thread.
pub fn ingest_results_dir(
    conn: &mut Connection,
    db_path: PathBuf,
    data_dir: &Path,
) -> Result<IngestSummary> {
    let files = discover_result_files(data_dir)?;
    if files.is_empty() {
        return Err(anyhow!(
            "no .json result files found under {}",
            data_dir.display()
        ));
    }

    let started_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO ingest_runs(started_at, finished_at, data_dir, files_total, files_succeeded, games_upserted, errors_json)
         VALUES (?1, NULL, ?2, ?3, 0, 0, '[]')",
        params![started_at, data_dir.display().to_string(), files.len() as i64],
    )
    .context("insert ingest run")?;
    let run_id = conn.last_insert_rowid();

    let parsed: Vec<(ResultFile, Result<(Vec<StoredGame>, usize), String>)> = files
        .into_par_iter()
        .map(|file| {
            let outcome = fs::read_to_string(&file.path)
                .map_err(|err| format!("read {}: {err}", file.path.display()))
                .and_then(|raw| {
                    parse_results_json(&raw, &file.league, &file.season)
                        .map_err(|err| format!("parse {}: {err}", file.path.display()))
                });
            (file, outcome)
        })
        .collect();

    let mut per_league: HashMap<String, LeagueIngestSummary> = HashMap::new();
    let mut files_succeeded = 0usize;
    let mut games_upserted = 0usize;
    let mut rows_skipped = 0usize;
    let mut all_errors: Vec<String> = Vec::new();
    let files_total = parsed.len();

    for (file, outcome) in parsed {
        let league = per_league
            .entry(file.league.clone())
            .or_insert_with(|| LeagueIngestSummary {
                league: file.league.clone(),
                files_total: 0,
                files_succeeded: 0,
                games_upserted: 0,
                rows_skipped: 0,
                latest_played_at: None,
                errors: Vec::new(),
            });
        league.files_total += 1;

        match outcome {
            Ok((games, skipped)) => {
                let tx = conn.transaction().context("begin ingest transaction")?;
                for game in &games {
                    upsert_game(&tx, game)?;
                }
                tx.commit().context("commit ingest transaction")?;

                league.files_succeeded += 1;
                league.games_upserted += games.len();
                league.rows_skipped += skipped;
                files_succeeded += 1;
                games_upserted += games.len();
                rows_skipped += skipped;
            }
            Err(err) => {
                league.errors.push(err.clone());
                all_errors.push(err);
            }
        }
    }

    for league in per_league.values_mut() {
        league.latest_played_at = conn
            .query_row(
                "SELECT MAX(played_at) FROM games WHERE league = ?1",
                params![league.league],
                |row| row.get::<_, Option<String>>(0),
            )
            .context("query latest played_at")?;
    }

    let finished_at = Utc::now().to_rfc3339();
    let errors_json = serde_json::to_string(&all_errors).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "UPDATE ingest_runs
         SET finished_at = ?1, files_succeeded = ?2, games_upserted = ?3, errors_json = ?4
         WHERE run_id = ?5",
        params![
            finished_at,
            files_succeeded as i64,
            games_upserted as i64,
            errors_json,
            run_id
        ],
    )
    .context("update ingest run")?;

    Ok(IngestSummary {
        db_path,
        files_total,
        files_succeeded,
        games_upserted,
        rows_skipped,
        per_league,
    })
}

/// Games for one league, in the order the rating engine must see them.
pub fn load_games(conn: &Connection, league: &str) -> Result<Vec<StoredGame>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT league, season, played_at, home_team, away_team, home_score, away_score
            FROM games
            WHERE league = ?1
            ORDER BY played_at ASC, rowid ASC
            "#,
        )
        .context("prepare load games query")?;

    let rows = stmt
        .query_map(params![league], |row| {
            Ok(StoredGame {
                league: row.get(0)?,
                season: row.get(1)?,
                played_at: row.get(2)?,
                home_team: row.get(3)?,
                away_team: row.get(4)?,
                home_score: row.get::<_, i64>(5)?.max(0) as u32,
                away_score: row.get::<_, i64>(6)?.max(0) as u32,
            })
        })
        .context("query load games")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode game row")?);
    }
    Ok(out)
}

pub fn list_leagues(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT league FROM games ORDER BY league ASC")
        .context("prepare list leagues query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query list leagues")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode league row")?);
    }
    Ok(out)
}

/// Parse one season file: a JSON array of game objects, or an object with a
/// `games` array. Malformed rows are skipped and counted, not fatal.
pub fn parse_results_json(
    raw: &str,
    league: &str,
    season: &str,
) -> Result<(Vec<StoredGame>, usize), String> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|err| format!("invalid json: {err}"))?;
    let rows = value
        .as_array()
        .or_else(|| value.get("games").and_then(|v| v.as_array()))
        .ok_or_else(|| "expected a json array of games".to_string())?;

    let mut out = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        match parse_game_row(row, league, season) {
            Some(game) => out.push(game),
            None => skipped += 1,
        }
    }
    Ok((out, skipped))
}

fn parse_game_row(v: &Value, league: &str, season: &str) -> Option<StoredGame> {
    let played_at = str_field(v, &["date", "played_at"])?;
    let home_team = str_field(v, &["home", "home_team"])?;
    let away_team = str_field(v, &["away", "away_team"])?;
    if home_team.is_empty() || away_team.is_empty() {
        return None;
    }
    let home_score = num_field(v, &["home_score", "homeScore"])?;
    let away_score = num_field(v, &["away_score", "awayScore"])?;

    Some(StoredGame {
        league: league.to_string(),
        season: season.to_string(),
        played_at,
        home_team,
        away_team,
        home_score,
        away_score,
    })
}

fn upsert_game(tx: &rusqlite::Transaction<'_>, game: &StoredGame) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO games (
            league, season, played_at, home_team, away_team,
            home_score, away_score, home_win, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(league, season, played_at, home_team, away_team) DO UPDATE SET
            home_score = excluded.home_score,
            away_score = excluded.away_score,
            home_win = excluded.home_win,
            updated_at = excluded.updated_at
        "#,
        params![
            game.league,
            game.season,
            game.played_at,
            game.home_team,
            game.away_team,
            game.home_score as i64,
            game.away_score as i64,
            if game.home_win() { 1i64 } else { 0i64 },
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert game")?;
    Ok(())
}

#[derive(Debug, Clone)]
struct ResultFile {
    league: String,
    season: String,
    path: PathBuf,
}

fn discover_result_files(data_dir: &Path) -> Result<Vec<ResultFile>> {
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("read data directory {}", data_dir.display()))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.context("read data directory entry")?;
        let path = entry.path();
        if path.is_dir() {
            let league = file_stem_lossy(&path);
            for sub in
                fs::read_dir(&path).with_context(|| format!("read league dir {}", path.display()))?
            {
                let sub = sub.context("read league dir entry")?;
                let sub_path = sub.path();
                if is_json_file(&sub_path) {
                    out.push(ResultFile {
                        league: league.clone(),
                        season: file_stem_lossy(&sub_path),
                        path: sub_path,
                    });
                }
            }
        } else if is_json_file(&path) {
            out.push(ResultFile {
                league: DEFAULT_LEAGUE.to_string(),
                season: file_stem_lossy(&path),
                path,
            });
        }
    }

    // Stable ingest order regardless of directory iteration order.
    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

fn is_json_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn file_stem_lossy(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn str_field(v: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = v.get(key).and_then(|x| x.as_str()) {
            return Some(s.trim().to_string());
        }
    }
    None
}

// Scores arrive as numbers or numeric strings depending on the exporter.
fn num_field(v: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        let Some(raw) = v.get(key) else {
            continue;
        };
        if let Some(n) = raw.as_u64() {
            return u32::try_from(n).ok();
        }
        if let Some(s) = raw.as_str() {
            if let Ok(n) = s.trim().parse::<u32>() {
                return Some(n);
            }
        }
    }
    None
}
