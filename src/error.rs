/// Failures in the rating/evaluation core. These are caller configuration
/// errors, never transient: nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("game references a team missing from the rating table: {name}")]
    MissingTeam { name: String },

    #[error("cannot score an empty game sequence")]
    EmptyGames,
}
