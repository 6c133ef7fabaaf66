use std::cmp::Ordering;

use crate::elo::{INITIAL_RATING, RatingTable, Team};

#[derive(Debug, Clone)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    pub rating: f64,
    /// Net movement since the 1500.0 start.
    pub delta: f64,
}

/// All teams ordered by rating descending. Equal ratings break ascending by
/// name so output is stable regardless of map iteration order.
pub fn sorted_teams(ratings: &RatingTable) -> Vec<Team> {
    let mut teams: Vec<Team> = ratings.values().cloned().collect();
    teams.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    teams
}

pub fn leaderboard(ratings: &RatingTable) -> Vec<LeaderboardRow> {
    sorted_teams(ratings)
        .into_iter()
        .enumerate()
        .map(|(idx, team)| LeaderboardRow {
            rank: idx + 1,
            delta: team.rating - INITIAL_RATING,
            name: team.name,
            rating: team.rating,
        })
        .collect()
}
