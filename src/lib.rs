//! Core engine for the Iterated Prisoner's Dilemma
//!
//! Simulates pairwise repeated games between pluggable strategies,
//! aggregates them into round-robin tournaments, repeats tournaments across
//! consecutive seeds for variance analysis, and iterates discrete replicator
//! dynamics over a mixed strategy population.
//!
//! Every seeded entry point is bit-for-bit reproducible: the same seed and
//! parameters produce identical results on every run.

mod error;
mod evolution;
mod game;
mod rng;
mod stats;
mod strategy;
mod tournament;

pub use error::ConfigError;
pub use evolution::{run_evolution, EvolutionResult, GenerationSnapshot};
pub use game::{play_game, GameResult, RoundResult};
pub use rng::{EntropyRng, RandomSource, SeededRng};
pub use stats::{run_many, MultiRunResult, StrategyVariance};
pub use strategy::{
    all_strategies, AlwaysCooperate, AlwaysDefect, ContriteTitForTat, GameHistory,
    GenerousTitForTat, Gradual, Grudger, Move, Pavlov, RandomStrategy, Strategy,
    SuspiciousTitForTat, TitForTat, TitForTwoTats, ZdExtorter,
};
pub use tournament::{run_round_robin, MatchRecord, TournamentEntry, TournamentResult};

/// Payoff matrix for the Prisoner's Dilemma
/// Returns (score_a, score_b)
///
/// R=3 (mutual cooperation), T=5 (temptation), S=0 (sucker), P=1 (mutual
/// defection). T>R>P>S and 2R>T+S, so mutual cooperation beats alternating
/// exploitation.
pub fn payoff(a: Move, b: Move) -> (u8, u8) {
    match (a, b) {
        (Move::Cooperate, Move::Cooperate) => (3, 3),
        (Move::Cooperate, Move::Defect) => (0, 5),
        (Move::Defect, Move::Cooperate) => (5, 0),
        (Move::Defect, Move::Defect) => (1, 1),
    }
}
