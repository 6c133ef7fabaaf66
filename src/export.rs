use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::calibration::{self, calibration_bins};
use crate::elo::{EloConfig, Game, RatingTable};
use crate::rankings;

const RELIABILITY_BINS: usize = 10;

pub struct ExportReport {
    pub teams: usize,
    pub games: usize,
}

/// Write one league's ratings, per-game probabilities, and summary metrics
/// to an xlsx workbook.
pub fn export_league_report(
    path: &Path,
    ratings: &RatingTable,
    games: &[Game],
    cfg: EloConfig,
) -> Result<ExportReport> {
    let mut ratings_rows = vec![vec![
        "Rank".to_string(),
        "Team".to_string(),
        "Rating".to_string(),
        "Delta".to_string(),
    ]];
    for row in rankings::leaderboard(ratings) {
        ratings_rows.push(vec![
            row.rank.to_string(),
            row.name,
            format!("{:.2}", row.rating),
            format!("{:+.2}", row.delta),
        ]);
    }

    let mut games_rows = vec![vec![
        "Date".to_string(),
        "Home".to_string(),
        "Away".to_string(),
        "Home Score".to_string(),
        "Away Score".to_string(),
        "Home Win Prob".to_string(),
        "Home Won".to_string(),
    ]];
    let mut predictions = Vec::with_capacity(games.len());
    let mut outcomes = Vec::with_capacity(games.len());
    for game in games {
        let p = calibration::home_win_probability(ratings, game, cfg)
            .context("probability for exported game")?;
        predictions.push(p);
        outcomes.push(game.home_win());
        games_rows.push(vec![
            game.played_at.clone(),
            game.home_team.clone(),
            game.away_team.clone(),
            game.home_score.to_string(),
            game.away_score.to_string(),
            format!("{p:.4}"),
            if game.home_win() { "yes" } else { "no" }.to_string(),
        ]);
    }

    let mut summary_rows: Vec<Vec<String>> = Vec::new();
    if !games.is_empty() {
        let metrics =
            calibration::evaluate(ratings, games, cfg).context("summary metrics for export")?;
        summary_rows.push(vec!["Samples".to_string(), metrics.samples.to_string()]);
        summary_rows.push(vec!["Brier".to_string(), format!("{:.4}", metrics.brier)]);
        summary_rows.push(vec![
            "Log loss".to_string(),
            format!("{:.4}", metrics.log_loss),
        ]);
        summary_rows.push(vec![
            "Accuracy".to_string(),
            format!("{:.4}", metrics.accuracy),
        ]);
        summary_rows.push(Vec::new());
        summary_rows.push(vec![
            "Bucket".to_string(),
            "Count".to_string(),
            "Avg Pred".to_string(),
            "Actual Rate".to_string(),
        ]);
        for bin in calibration_bins(&predictions, &outcomes, RELIABILITY_BINS) {
            summary_rows.push(vec![
                format!("{:.1}-{:.1}", bin.bucket_start, bin.bucket_end),
                bin.count.to_string(),
                format!("{:.4}", bin.avg_pred),
                format!("{:.4}", bin.actual_rate),
            ]);
        }
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Ratings")?;
        write_rows(sheet, &ratings_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Games")?;
        write_rows(sheet, &games_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        teams: ratings.len(),
        games: games.len(),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
