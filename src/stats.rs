//! Multi-run variance aggregation
//!
//! Repeats the same tournament across consecutive seeds and reduces each
//! strategy's per-run results to descriptive statistics, so a single
//! tournament's luck can be separated from a strategy's actual strength.

use serde::{Deserialize, Serialize};

use crate::error::{validate_strategies, ConfigError};
use crate::strategy::Strategy;
use crate::tournament::run_round_robin;

/// Per-strategy descriptive statistics across n independent tournament runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrategyVariance {
    pub name: String,
    /// Mean total score across all runs
    pub mean_score: f64,
    /// Population standard deviation of total score
    pub std_score: f64,
    pub min_score: u32,
    pub max_score: u32,
    /// Mean finish rank (1 = first place)
    pub mean_rank: f64,
    /// Population standard deviation of rank
    pub std_rank: f64,
    /// Mean cooperation rate
    pub mean_coop_rate: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiRunResult {
    /// Sorted by mean score descending.
    pub stats: Vec<StrategyVariance>,
    /// Number of independent tournament runs
    pub n: u32,
    pub rounds: u32,
    /// Seeds used: base_seed, base_seed+1, ..., base_seed+n-1
    pub base_seed: u32,
    pub noise: f64,
}

/// Run the tournament `n` times with consecutive seeds and aggregate
/// variance. The whole experiment is reproducible from `(n, base_seed)`
/// alone; if every strategy in the set is deterministic, every run is
/// byte-identical and all standard deviations are exactly zero.
pub fn run_many(
    strategies: &[Box<dyn Strategy>],
    rounds: u32,
    n: u32,
    base_seed: u32,
    noise: f64,
) -> Result<MultiRunResult, ConfigError> {
    validate_strategies(strategies)?;
    if rounds == 0 {
        return Err(ConfigError::ZeroRounds);
    }
    if n == 0 {
        return Err(ConfigError::ZeroRuns);
    }

    let count = strategies.len();
    let mut scores: Vec<Vec<u32>> = vec![Vec::with_capacity(n as usize); count];
    let mut ranks: Vec<Vec<u32>> = vec![Vec::with_capacity(n as usize); count];
    let mut coop_rates: Vec<Vec<f64>> = vec![Vec::with_capacity(n as usize); count];

    let index_of = |name: &str| strategies.iter().position(|s| s.name() == name);

    for i in 0..n {
        let seed = base_seed.wrapping_add(i);
        let result = run_round_robin(strategies, rounds, Some(seed), noise)?;
        for (rank0, entry) in result.entries.iter().enumerate() {
            // Entries are a permutation of the validated input set.
            let idx = index_of(&entry.name).expect("tournament entry not in strategy set");
            scores[idx].push(entry.total_score);
            ranks[idx].push(rank0 as u32 + 1); // rank is 1-indexed
            coop_rates[idx].push(entry.coop_rate);
        }
    }

    let mut stats: Vec<StrategyVariance> = strategies
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let sc: Vec<f64> = scores[idx].iter().map(|&x| f64::from(x)).collect();
            let rk: Vec<f64> = ranks[idx].iter().map(|&x| f64::from(x)).collect();
            StrategyVariance {
                name: s.name().to_string(),
                mean_score: mean(&sc),
                std_score: std_pop(&sc),
                min_score: scores[idx].iter().copied().min().unwrap_or(0),
                max_score: scores[idx].iter().copied().max().unwrap_or(0),
                mean_rank: mean(&rk),
                std_rank: std_pop(&rk),
                mean_coop_rate: mean(&coop_rates[idx]),
            }
        })
        .collect();

    // Same convention as the tournament leaderboard.
    stats.sort_by(|a, b| b.mean_score.total_cmp(&a.mean_score));

    Ok(MultiRunResult {
        stats,
        n,
        rounds,
        base_seed,
        noise,
    })
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (divide by n, not n-1).
fn std_pop(xs: &[f64]) -> f64 {
    let m = mean(xs);
    (xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64).sqrt()
}
