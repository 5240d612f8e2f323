//! Single-match executor

use serde::{Deserialize, Serialize};

use crate::payoff;
use crate::rng::RandomSource;
use crate::strategy::{GameHistory, Move, Strategy};

/// Result of a single round. Moves are the executed ones, after any
/// environmental noise.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundResult {
    pub move_a: Move,
    pub move_b: Move,
    pub score_a: u8,
    pub score_b: u8,
}

/// Result of a complete match
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameResult {
    pub strategy_a: String,
    pub strategy_b: String,
    pub rounds: Vec<RoundResult>,
    pub total_a: u32,
    pub total_b: u32,
    pub coop_rate_a: f64,
    pub coop_rate_b: f64,
}

/// Flip a decided move with probability `noise`. Draws from the stream only
/// when noise is enabled, so noiseless runs consume no extra entropy.
fn perturb(m: Move, rng: &mut dyn RandomSource, noise: f64) -> Move {
    if noise > 0.0 && rng.next_f64() < noise {
        m.flipped()
    } else {
        m
    }
}

/// Play one fixed-length match between two strategies.
///
/// Both strategies share the supplied RNG stream and advance it only by as
/// much entropy as they consume. Per round the order is fixed: A decides,
/// B decides, then (iff `noise > 0`) one noise draw for A and one for B.
///
/// Noise semantics: the flipped (executed) move is what gets scored, what
/// the opponent observes in its history, and what cooperation rates count.
/// The actor's own history keeps the move it intended.
///
/// `rounds = 0` is a well-defined degenerate match: empty round log, zero
/// totals, cooperation rates 0 by convention.
pub fn play_game(
    strat_a: &dyn Strategy,
    strat_b: &dyn Strategy,
    rounds: u32,
    rng: &mut dyn RandomSource,
    noise: f64,
) -> GameResult {
    let cap = rounds as usize;
    // Intended moves feed each side's own history; executed moves are what
    // the opponent observes and what gets scored.
    let mut intended_a: Vec<Move> = Vec::with_capacity(cap);
    let mut intended_b: Vec<Move> = Vec::with_capacity(cap);
    let mut executed_a: Vec<Move> = Vec::with_capacity(cap);
    let mut executed_b: Vec<Move> = Vec::with_capacity(cap);
    let mut round_log: Vec<RoundResult> = Vec::with_capacity(cap);
    let mut total_a = 0u32;
    let mut total_b = 0u32;

    for _ in 0..rounds {
        let move_a = strat_a.decide(
            GameHistory { mine: &intended_a, opponent: &executed_b },
            rng,
        );
        let move_b = strat_b.decide(
            GameHistory { mine: &intended_b, opponent: &executed_a },
            rng,
        );

        let played_a = perturb(move_a, rng, noise);
        let played_b = perturb(move_b, rng, noise);

        let (score_a, score_b) = payoff(played_a, played_b);
        total_a += u32::from(score_a);
        total_b += u32::from(score_b);

        intended_a.push(move_a);
        intended_b.push(move_b);
        executed_a.push(played_a);
        executed_b.push(played_b);
        round_log.push(RoundResult {
            move_a: played_a,
            move_b: played_b,
            score_a,
            score_b,
        });
    }

    let coop_rate = |moves: &[Move]| {
        if rounds == 0 {
            0.0
        } else {
            moves.iter().filter(|m| m.is_cooperate()).count() as f64 / f64::from(rounds)
        }
    };

    GameResult {
        strategy_a: strat_a.name().to_string(),
        strategy_b: strat_b.name().to_string(),
        coop_rate_a: coop_rate(&executed_a),
        coop_rate_b: coop_rate(&executed_b),
        rounds: round_log,
        total_a,
        total_b,
    }
}
