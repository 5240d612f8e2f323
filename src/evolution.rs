//! Replicator dynamics over a mixed strategy population
//!
//! Model: each strategy's fitness is its expected per-round score against an
//! opponent drawn from the current population. Shares then update in
//! proportion to relative fitness (discrete replicator equation): strategies
//! above the population mean grow, those below shrink.
//!
//! Rather than resampling opponents every generation, the pairwise payoff
//! matrix is built once from a single seeded tournament and the trajectory
//! is pure arithmetic from there - the deterministic mean-field
//! approximation standard in evolutionary game theory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::strategy::Strategy;
use crate::tournament::run_round_robin;

/// Population shares at one generation, ordered like the input strategies.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationSnapshot {
    /// Generation index (0 = initial equal distribution)
    pub generation: u32,
    pub shares: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Strategy names, index-aligned with every share vector.
    pub strategies: Vec<String>,
    /// Snapshot at every generation including generation 0.
    pub history: Vec<GenerationSnapshot>,
    /// Shares after the final selection step.
    pub final_shares: Vec<f64>,
    pub rounds: u32,
    pub generations: u32,
    pub seed: u32,
    pub noise: f64,
}

/// Simulate `generations` steps of replicator dynamics.
///
/// Step 1 runs one seeded round-robin to obtain the average per-round payoff
/// of every ordered strategy pair. Step 2 starts from uniform shares and
/// iterates the replicator equation; no randomness is consumed after the
/// tournament, so identical inputs always yield identical trajectories.
/// The history always has length `generations + 1`.
pub fn run_evolution(
    strategies: &[Box<dyn Strategy>],
    rounds: u32,
    generations: u32,
    seed: u32,
    noise: f64,
) -> Result<EvolutionResult, ConfigError> {
    let tournament = run_round_robin(strategies, rounds, Some(seed), noise)?;
    let n = strategies.len();

    let index: HashMap<&str, usize> = strategies
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name(), i))
        .collect();

    // avg_payoff[i][j]: average score per round that strategy i earns
    // against strategy j. The tournament's match records cover every
    // ordered pair, self-play included.
    let mut avg_payoff = vec![vec![0.0f64; n]; n];
    for entry in &tournament.entries {
        let i = index[entry.name.as_str()];
        for record in &entry.matches {
            let j = index[record.opponent.as_str()];
            avg_payoff[i][j] = f64::from(record.score) / f64::from(rounds);
        }
    }

    let mut shares = vec![1.0 / n as f64; n];
    let mut history = Vec::with_capacity(generations as usize + 1);
    history.push(GenerationSnapshot {
        generation: 0,
        shares: shares.clone(),
    });

    for g in 1..=generations {
        shares = replicator_step(&shares, &avg_payoff);
        history.push(GenerationSnapshot {
            generation: g,
            shares: shares.clone(),
        });
    }

    Ok(EvolutionResult {
        strategies: strategies.iter().map(|s| s.name().to_string()).collect(),
        history,
        final_shares: shares,
        rounds,
        generations,
        seed,
        noise,
    })
}

/// One discrete replicator step: new share ∝ old share × fitness / mean
/// fitness, renormalized to sum exactly 1. A degenerate payoff matrix with
/// zero mean fitness leaves the shares unchanged instead of dividing by
/// zero.
fn replicator_step(shares: &[f64], avg_payoff: &[Vec<f64>]) -> Vec<f64> {
    let fitness: Vec<f64> = avg_payoff
        .iter()
        .map(|row| row.iter().zip(shares).map(|(p, s)| p * s).sum())
        .collect();

    let mean_fitness: f64 = shares.iter().zip(&fitness).map(|(s, f)| s * f).sum();

    let mut next: Vec<f64> = if mean_fitness > 0.0 {
        shares
            .iter()
            .zip(&fitness)
            .map(|(s, f)| s * f / mean_fitness)
            .collect()
    } else {
        shares.to_vec()
    };

    // Correct floating-point drift.
    let total: f64 = next.iter().sum();
    for s in &mut next {
        *s /= total;
    }
    next
}
