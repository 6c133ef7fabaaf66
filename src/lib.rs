//! Elo-style team ratings from historical game logs, with a Brier-score
//! calibration report over the implied home-win probabilities.

pub mod calibration;
pub mod elo;
pub mod error;
pub mod export;
pub mod fake_season;
pub mod rankings;
pub mod results_store;
