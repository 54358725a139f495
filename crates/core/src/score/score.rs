use crate::GameRound;

/// Score for a perfect guess.
pub const MAX_ROUND_SCORE: i32 = 1000;
/// Largest Manhattan distance between two white-band colors: 3 × (255 - 245).
pub const MAX_DISTANCE: i32 = 30;

/// Linear score from 1000 at distance 0 down to 0 at distance 30. Distances outside 0-30 are
/// clamped first.
pub fn calculate_round_score(distance: i32) -> i32 {
    let distance = distance.clamp(0, MAX_DISTANCE);
    let score = MAX_ROUND_SCORE as f64 * (1.0 - distance as f64 / MAX_DISTANCE as f64);
    score.round() as i32
}

/// Sum of the scores of every played round. Unplayed rounds count as zero.
pub fn calculate_total_score(rounds: &[GameRound]) -> i32 {
    rounds.iter().filter_map(|round| round.score).sum()
}
