use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use nba_elo::calibration;
use nba_elo::elo::{self, EloConfig, RatingTable};
use nba_elo::fake_season;
use nba_elo::rankings;

// This binary is intentionally simple: it rates one synthetic season and
// prints the model output. No files, no network; meant for quick manual
// inspection of the rating/evaluation path.
fn main() -> Result<()> {
    let seed = std::env::args()
        .nth(1)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(26);
    let rounds = std::env::args()
        .nth(2)
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(4);

    let mut rng = StdRng::seed_from_u64(seed);
    let games = fake_season::generate_season(&mut rng, rounds);

    let mut ratings = RatingTable::new();
    elo::apply_results(&mut ratings, &games, EloConfig::default());

    println!("Synthetic season: seed={seed} rounds={rounds} games={}", games.len());
    println!("Team Elo Ratings:");
    for row in rankings::leaderboard(&ratings) {
        println!(
            "{:>3}. {:<26} {:>8.2}  ({:+.2})",
            row.rank, row.name, row.rating, row.delta
        );
    }

    let metrics = calibration::evaluate(&ratings, &games, EloConfig::default())?;
    println!();
    println!("Brier Score: {:.4}  (n={})", metrics.brier, metrics.samples);
    println!(
        "Log loss: {:.4}  Accuracy: {:.1}%",
        metrics.log_loss,
        metrics.accuracy * 100.0
    );

    Ok(())
}
