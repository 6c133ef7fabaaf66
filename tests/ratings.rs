use nba_elo::elo::{
    self, EloConfig, Game, INITIAL_RATING, KFactorPolicy, RatingTable, Team, expected_score,
};

fn game(played_at: &str, home: &str, away: &str, home_score: u32, away_score: u32) -> Game {
    Game {
        played_at: played_at.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_score,
        away_score,
    }
}

fn rating_of(ratings: &RatingTable, name: &str) -> f64 {
    ratings.get(name).map(|t| t.rating).expect("team should exist")
}

#[test]
fn home_win_from_even_ratings_matches_known_numbers() {
    let mut ratings = RatingTable::new();
    let games = vec![game("2023-10-24", "Team A", "Team B", 110, 100)];
    elo::apply_results(&mut ratings, &games, EloConfig::default());

    // Pre-game home probability with the +50 bonus is about 0.5713.
    let p_home = expected_score(1550.0, 1500.0);
    assert!((p_home - 0.5713).abs() < 1e-3);

    let a = rating_of(&ratings, "Team A");
    let b = rating_of(&ratings, "Team B");
    assert!((a - 1506.43).abs() < 1e-2);
    assert!((b - 1493.57).abs() < 1e-2);

    // Each side moved by its own expected/actual pair.
    assert!((a - (1500.0 + 15.0 * (1.0 - p_home))).abs() < 1e-9);
    let p_away = expected_score(1500.0, 1550.0);
    assert!((b - (1500.0 + 15.0 * (0.0 - p_away))).abs() < 1e-9);
}

#[test]
fn teams_are_created_lazily_at_1500() {
    let mut ratings = RatingTable::new();
    assert!(ratings.is_empty());
    elo::apply_results(
        &mut ratings,
        &[game("2023-10-24", "Team A", "Team B", 101, 99)],
        EloConfig::default(),
    );
    assert_eq!(ratings.len(), 2);
    assert!(ratings.contains_key("Team A"));
    assert!(ratings.contains_key("Team B"));
}

#[test]
fn team_with_no_games_keeps_exactly_1500() {
    let mut ratings = RatingTable::new();
    ratings.insert("Idle Team".to_string(), Team::new("Idle Team"));
    elo::apply_results(
        &mut ratings,
        &[game("2023-10-24", "Team A", "Team B", 101, 99)],
        EloConfig::default(),
    );
    assert_eq!(rating_of(&ratings, "Idle Team"), INITIAL_RATING);
}

#[test]
fn empty_game_sequence_leaves_ratings_untouched() {
    let mut ratings = RatingTable::new();
    ratings.insert("Team A".to_string(), Team::new("Team A"));
    elo::apply_results(&mut ratings, &[], EloConfig::default());
    assert_eq!(ratings.len(), 1);
    assert_eq!(rating_of(&ratings, "Team A"), INITIAL_RATING);
}

#[test]
fn applying_the_same_games_is_deterministic() {
    let games = vec![
        game("2023-10-24", "Team A", "Team B", 110, 100),
        game("2023-10-26", "Team B", "Team C", 95, 104),
        game("2023-10-28", "Team C", "Team A", 120, 118),
    ];

    let mut first = RatingTable::new();
    elo::apply_results(&mut first, &games, EloConfig::default());
    let mut second = RatingTable::new();
    elo::apply_results(&mut second, &games, EloConfig::default());

    for name in ["Team A", "Team B", "Team C"] {
        assert_eq!(rating_of(&first, name), rating_of(&second, name));
    }
}

#[test]
fn game_order_changes_the_outcome() {
    let g1 = game("2023-10-24", "Team A", "Team B", 110, 100);
    let g2 = game("2023-10-26", "Team B", "Team A", 103, 97);

    let mut forward = RatingTable::new();
    elo::apply_results(&mut forward, &[g1.clone(), g2.clone()], EloConfig::default());
    let mut reversed = RatingTable::new();
    elo::apply_results(&mut reversed, &[g2, g1], EloConfig::default());

    // One home win each, yet the home-advantage asymmetry makes the order of
    // the two games visible in the final ratings.
    assert!(
        (rating_of(&forward, "Team A") - rating_of(&reversed, "Team A")).abs() > 1e-6,
        "reordering the games should change Team A's final rating"
    );
}

#[test]
fn updates_mirror_exactly_when_home_advantage_is_zero() {
    let cfg = EloConfig {
        k: KFactorPolicy::Fixed(15.0),
        home_adv_pts: 0.0,
    };
    let mut ratings = RatingTable::new();
    elo::apply_results(
        &mut ratings,
        &[game("2023-10-24", "Team A", "Team B", 110, 100)],
        cfg,
    );

    let a_delta = rating_of(&ratings, "Team A") - INITIAL_RATING;
    let b_delta = rating_of(&ratings, "Team B") - INITIAL_RATING;
    assert!(a_delta > 0.0 && b_delta < 0.0);
    assert!((a_delta + b_delta).abs() < 1e-12);
}

#[test]
fn apply_results_mutates_rather_than_recomputes() {
    let games = vec![game("2023-10-24", "Team A", "Team B", 110, 100)];
    let mut ratings = RatingTable::new();
    elo::apply_results(&mut ratings, &games, EloConfig::default());
    let after_one_pass = rating_of(&ratings, "Team A");

    elo::apply_results(&mut ratings, &games, EloConfig::default());
    let after_two_passes = rating_of(&ratings, "Team A");

    // Not idempotent: the second pass starts from the mutated state.
    assert!(after_two_passes > after_one_pass);
}

#[test]
fn equal_scores_classify_as_an_away_win() {
    let tied = game("2023-10-24", "Team A", "Team B", 100, 100);
    assert!(!tied.home_win());

    let mut ratings = RatingTable::new();
    elo::apply_results(&mut ratings, &[tied], EloConfig::default());
    assert!(rating_of(&ratings, "Team A") < INITIAL_RATING);
    assert!(rating_of(&ratings, "Team B") > INITIAL_RATING);
}

#[test]
fn per_league_compute_matches_sequential_apply() {
    let east = vec![
        game("2023-10-24", "Team A", "Team B", 110, 100),
        game("2023-10-26", "Team B", "Team A", 103, 97),
    ];
    let west = vec![game("2023-10-24", "Team C", "Team D", 99, 120)];

    let leagues = vec![("east".to_string(), east.clone()), ("west".to_string(), west.clone())];
    let tables = elo::compute_elo_by_league(&leagues, EloConfig::default());
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].0, "east");

    let mut expected_east = RatingTable::new();
    elo::apply_results(&mut expected_east, &east, EloConfig::default());
    for (name, team) in &expected_east {
        assert_eq!(team.rating, rating_of(&tables[0].1, name));
    }

    // Leagues stay disjoint.
    assert!(!tables[0].1.contains_key("Team C"));
    assert!(!tables[1].1.contains_key("Team A"));
}

#[test]
fn decaying_profile_moves_early_games_harder_than_late_ones() {
    let cfg = EloConfig::decaying_k();
    let k_first = cfg.k.k_for(0);
    let k_late = cfg.k.k_for(500);
    assert!(k_first > k_late);
    assert!((k_first - 32.0).abs() < 1e-12);
    assert!((cfg.home_adv_pts - 70.0).abs() < 1e-12);
}
