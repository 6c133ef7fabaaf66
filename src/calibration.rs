use crate::elo::{EloConfig, Game, RatingTable, expected_score};
use crate::error::RatingError;

#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    pub samples: usize,
    pub brier: f64,
    pub log_loss: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CalibrationBin {
    pub bucket_start: f64,
    pub bucket_end: f64,
    pub count: usize,
    pub avg_pred: f64,
    pub actual_rate: f64,
}

/// Probability that the home side wins, from the ratings as they stand at
/// call time. Evaluation never creates teams, so an unknown name is an error.
pub fn home_win_probability(
    ratings: &RatingTable,
    game: &Game,
    cfg: EloConfig,
) -> Result<f64, RatingError> {
    let home = ratings
        .get(&game.home_team)
        .ok_or_else(|| RatingError::MissingTeam {
            name: game.home_team.clone(),
        })?;
    let away = ratings
        .get(&game.away_team)
        .ok_or_else(|| RatingError::MissingTeam {
            name: game.away_team.clone(),
        })?;
    Ok(expected_score(home.rating + cfg.home_adv_pts, away.rating))
}

/// Mean squared error between the home-win probability and the actual
/// outcome over the whole game list. Called after a full `apply_results`
/// pass this scores every historical game with the final ratings — a
/// retrospective fit, not forward forecast calibration.
pub fn brier_score(
    ratings: &RatingTable,
    games: &[Game],
    cfg: EloConfig,
) -> Result<f64, RatingError> {
    if games.is_empty() {
        return Err(RatingError::EmptyGames);
    }

    let mut total_squared_error = 0.0_f64;
    for game in games {
        let p = home_win_probability(ratings, game, cfg)?;
        let actual = if game.home_win() { 1.0 } else { 0.0 };
        total_squared_error += (p - actual).powi(2);
    }
    Ok(total_squared_error / games.len() as f64)
}

/// Brier plus log-loss and argmax accuracy over the same predictions.
pub fn evaluate(
    ratings: &RatingTable,
    games: &[Game],
    cfg: EloConfig,
) -> Result<Metrics, RatingError> {
    if games.is_empty() {
        return Err(RatingError::EmptyGames);
    }

    let mut brier_sum = 0.0_f64;
    let mut log_loss_sum = 0.0_f64;
    let mut correct = 0usize;

    for game in games {
        let p = home_win_probability(ratings, game, cfg)?;
        let home_win = game.home_win();
        let actual = if home_win { 1.0 } else { 0.0 };

        brier_sum += (p - actual).powi(2);

        let actual_prob = if home_win { p } else { 1.0 - p }.clamp(1e-12, 1.0);
        log_loss_sum += -actual_prob.ln();

        if (p >= 0.5) == home_win {
            correct += 1;
        }
    }

    let n = games.len() as f64;
    Ok(Metrics {
        samples: games.len(),
        brier: brier_sum / n,
        log_loss: log_loss_sum / n,
        accuracy: correct as f64 / n,
    })
}

/// Reliability buckets for the home-win probability: how often the home side
/// actually won among games predicted into each bucket.
pub fn calibration_bins(
    predictions: &[f64],
    outcomes: &[bool],
    bins: usize,
) -> Vec<CalibrationBin> {
    let bins = bins.max(2);
    let mut counts = vec![0usize; bins];
    let mut pred_sum = vec![0.0_f64; bins];
    let mut actual_sum = vec![0.0_f64; bins];

    for (p, home_win) in predictions.iter().zip(outcomes) {
        let p = p.clamp(0.0, 1.0);
        let idx = ((p * bins as f64).floor() as usize).min(bins - 1);
        counts[idx] += 1;
        pred_sum[idx] += p;
        if *home_win {
            actual_sum[idx] += 1.0;
        }
    }

    let mut out = Vec::with_capacity(bins);
    for i in 0..bins {
        let start = i as f64 / bins as f64;
        let end = (i + 1) as f64 / bins as f64;
        let count = counts[i];
        let (avg_pred, actual_rate) = if count > 0 {
            (pred_sum[i] / count as f64, actual_sum[i] / count as f64)
        } else {
            (0.0, 0.0)
        };
        out.push(CalibrationBin {
            bucket_start: start,
            bucket_end: end,
            count,
            avg_pred,
            actual_rate,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::calibration_bins;

    #[test]
    fn bins_bucket_by_predicted_probability() {
        let preds = vec![0.05, 0.55, 0.58, 0.95];
        let outcomes = vec![false, true, false, true];
        let bins = calibration_bins(&preds, &outcomes, 10);

        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[5].count, 2);
        assert!((bins[5].actual_rate - 0.5).abs() < 1e-12);
        assert_eq!(bins[9].count, 1);
        assert!((bins[9].actual_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn probability_one_lands_in_the_top_bucket() {
        let bins = calibration_bins(&[1.0], &[true], 10);
        assert_eq!(bins[9].count, 1);
    }
}
