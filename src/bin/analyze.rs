//! Batch experiment driver
//!
//! Selects one experiment mode, runs the engine with explicit parameters,
//! and renders the result as text tables (or JSON with `--json`). Redirect
//! stdout to keep a run for citation:
//!
//! ```text
//! analyze single --seed 42 --rounds 200 > notes/run-001.txt
//! ```

use std::error::Error;

use clap::{Args, Parser, Subcommand};

use dilemma_engine::{
    all_strategies, run_evolution, run_many, run_round_robin, EvolutionResult, MultiRunResult,
    TournamentResult,
};

#[derive(Parser)]
#[command(name = "analyze", about = "Iterated Prisoner's Dilemma experiment runner")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// One round-robin tournament with a pinned seed
    Single {
        #[command(flatten)]
        common: Common,
        /// RNG seed for the tournament stream
        #[arg(long, default_value_t = 42)]
        seed: u32,
    },
    /// Repeated tournaments across consecutive seeds, with variance stats
    Variance {
        #[command(flatten)]
        common: Common,
        /// Number of independent runs
        #[arg(long, default_value_t = 100)]
        runs: u32,
        /// First seed; runs use base_seed..base_seed+runs-1
        #[arg(long, default_value_t = 0)]
        base_seed: u32,
    },
    /// Replicator dynamics on the full strategy field
    Evolution {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = 42)]
        seed: u32,
        /// Number of selection steps
        #[arg(long, default_value_t = 200)]
        generations: u32,
    },
    /// Targeted comparison: per-round payoffs between named strategies
    Compare {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = 42)]
        seed: u32,
        /// Comma-separated strategy names to compare head-to-head
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "Tit for Tat,Tit for Two Tats,Pavlov,Generous TFT,Gradual"
        )]
        names: Vec<String>,
    },
    /// Variance sweep across a list of noise levels
    NoiseSweep {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = 100)]
        runs: u32,
        #[arg(long, default_value_t = 0)]
        base_seed: u32,
        /// Comma-separated move-flip probabilities
        #[arg(long, value_delimiter = ',', default_value = "0,0.01,0.02,0.05,0.1,0.15")]
        levels: Vec<f64>,
    },
}

#[derive(Args)]
struct Common {
    /// Rounds per match
    #[arg(long, default_value_t = 200)]
    rounds: u32,
    /// Probability that a decided move is flipped before it is scored
    #[arg(long, default_value_t = 0.0)]
    noise: f64,
    /// Emit the raw result as JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let strategies = all_strategies();

    match cli.mode {
        Mode::Single { common, seed } => {
            let result = run_round_robin(&strategies, common.rounds, Some(seed), common.noise)?;
            if common.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_single(&result, seed);
            }
        }
        Mode::Variance { common, runs, base_seed } => {
            let result = run_many(&strategies, common.rounds, runs, base_seed, common.noise)?;
            if common.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_variance(&result);
            }
        }
        Mode::Evolution { common, seed, generations } => {
            let result =
                run_evolution(&strategies, common.rounds, generations, seed, common.noise)?;
            if common.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_evolution(&result);
            }
        }
        Mode::Compare { common, seed, names } => {
            let result = run_round_robin(&strategies, common.rounds, Some(seed), common.noise)?;
            let rows = comparison_rows(&result, &names)?;
            if common.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_compare(&rows, seed, &result);
            }
        }
        Mode::NoiseSweep { common, runs, base_seed, levels } => {
            let mut results = Vec::with_capacity(levels.len());
            for &level in &levels {
                results.push(run_many(&strategies, common.rounds, runs, base_seed, level)?);
            }
            if common.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_noise_sweep(&results);
            }
        }
    }

    Ok(())
}

// ─── Formatting ──────────────────────────────────────────────────────────────

fn pct(x: f64) -> String {
    format!("{:.1}%", x * 100.0)
}

fn print_single(result: &TournamentResult, seed: u32) {
    println!(
        "\n=== Single Tournament (seed={seed}, rounds={}, noise={}) ===\n",
        result.rounds_per_match, result.noise
    );
    println!(
        "{:<3}{:<28}{:>8}{:>8}{:>7}{:>5}{:>4}{:>4}",
        "#", "Strategy", "Score", "Avg/Rd", "Coop%", "W", "D", "L"
    );
    println!("{}", "-".repeat(67));
    for (i, e) in result.entries.iter().enumerate() {
        println!(
            "{:<3}{:<28}{:>8}{:>8.3}{:>7}{:>5}{:>4}{:>4}",
            i + 1,
            e.name,
            e.total_score,
            e.avg_per_round,
            pct(e.coop_rate),
            e.wins,
            e.draws,
            e.losses
        );
    }

    println!("\n--- Head-to-head spotlight ---");
    for e in &result.entries {
        let best = e.matches.iter().max_by_key(|m| m.score);
        let worst = e.matches.iter().min_by_key(|m| m.score);
        if let (Some(best), Some(worst)) = (best, worst) {
            println!(
                "{:<24} best: {:<24} ({})  worst: {:<24} ({})",
                e.name, best.opponent, best.score, worst.opponent, worst.score
            );
        }
    }
}

fn print_variance(result: &MultiRunResult) {
    println!(
        "\n=== Variance Analysis ({} runs, seeds {}-{}, {} rounds/match, noise={}) ===\n",
        result.n,
        result.base_seed,
        result.base_seed.wrapping_add(result.n - 1),
        result.rounds,
        result.noise
    );
    println!(
        "{:<3}{:<28}{:>8}{:>7}{:>7}{:>7}{:>7}{:>8}{:>6}",
        "#", "Strategy", "Mean", "±Std", "Min", "Max", "Range", "MeanRk", "±Rk"
    );
    println!("{}", "-".repeat(81));
    for (i, s) in result.stats.iter().enumerate() {
        println!(
            "{:<3}{:<28}{:>8.1}{:>7.1}{:>7}{:>7}{:>7}{:>8.2}{:>6.2}",
            i + 1,
            s.name,
            s.mean_score,
            s.std_score,
            s.min_score,
            s.max_score,
            s.max_score - s.min_score,
            s.mean_rank,
            s.std_rank
        );
    }

    println!("\nCoefficient of variation (std/mean) — higher = more luck-dependent:\n");
    let mut by_cv: Vec<_> = result.stats.iter().collect();
    by_cv.sort_by(|a, b| {
        (b.std_score / b.mean_score).total_cmp(&(a.std_score / a.mean_score))
    });
    for s in by_cv {
        let cv = s.std_score / s.mean_score;
        let bar = "#".repeat((cv * 400.0).round() as usize);
        println!("  {:<26} CV={:>6.2}%  {bar}", s.name, cv * 100.0);
    }
}

fn print_evolution(result: &EvolutionResult) {
    println!(
        "\n=== Replicator Dynamics ({} generations, seed={}, {} rds/match, noise={}) ===\n",
        result.generations, result.seed, result.rounds, result.noise
    );

    let checkpoints: Vec<u32> = [0, 1, 5, 10, 25, 50, 100, 200]
        .into_iter()
        .filter(|g| *g <= result.generations)
        .collect();

    print!("{:<28}", "Strategy");
    for g in &checkpoints {
        print!("{:>8}", format!("G{g}"));
    }
    println!();
    println!("{}", "-".repeat(28 + checkpoints.len() * 8));

    for (i, name) in result.strategies.iter().enumerate() {
        print!("{name:<28}");
        for &g in &checkpoints {
            let share = result.history[g as usize].shares[i];
            print!("{:>8}", pct(share));
        }
        println!();
    }

    println!("\nFinal shares (sorted):");
    let mut final_shares: Vec<(&String, f64)> = result
        .strategies
        .iter()
        .zip(result.final_shares.iter().copied())
        .collect();
    final_shares.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (name, share) in final_shares {
        let bar = "#".repeat((share * 80.0).round() as usize);
        println!("  {:<26} {:>7}  {bar}", name, pct(share));
    }
}

/// Per-round payoff of every named strategy against every named opponent,
/// drawn from one tournament's match records. Unknown names are rejected
/// rather than silently skipped.
fn comparison_rows(
    result: &TournamentResult,
    names: &[String],
) -> Result<Vec<(String, String, f64)>, String> {
    let mut rows = Vec::with_capacity(names.len() * names.len());
    for name in names {
        let entry = result
            .entries
            .iter()
            .find(|e| &e.name == name)
            .ok_or_else(|| format!("unknown strategy: {name}"))?;
        for opponent in names {
            let record = entry
                .matches
                .iter()
                .find(|m| &m.opponent == opponent)
                .ok_or_else(|| format!("unknown strategy: {opponent}"))?;
            rows.push((
                name.clone(),
                opponent.clone(),
                f64::from(record.score) / f64::from(result.rounds_per_match),
            ));
        }
    }
    Ok(rows)
}

fn print_compare(rows: &[(String, String, f64)], seed: u32, result: &TournamentResult) {
    println!(
        "\n=== Head-to-head payoffs per round (seed={seed}, rounds={}, noise={}) ===\n",
        result.rounds_per_match, result.noise
    );
    let mut last: Option<&str> = None;
    for (name, opponent, per_round) in rows {
        if last.is_some() && last != Some(name.as_str()) {
            println!();
        }
        println!("{name:<24} vs {opponent:<24} {per_round:.3}");
        last = Some(name.as_str());
    }
}

fn print_noise_sweep(results: &[MultiRunResult]) {
    let levels: Vec<f64> = results.iter().map(|r| r.noise).collect();
    let Some(first) = results.first() else {
        return;
    };
    println!(
        "\n=== Noise Sweep (eps in {levels:?}, {} runs each, {} rds/match) ===\n",
        first.n, first.rounds
    );

    // Rows follow the noiseless ranking.
    let base_order: Vec<&str> = first.stats.iter().map(|s| s.name.as_str()).collect();
    let stat_for = |r: &MultiRunResult, name: &str| {
        r.stats
            .iter()
            .find(|s| s.name == name)
            .map(|s| (s.mean_score, s.mean_rank))
    };

    print!("{:<26}", "Strategy");
    for level in &levels {
        print!("{:>9}", format!("ε={level}"));
    }
    println!();
    println!("{}", "-".repeat(26 + levels.len() * 9));
    for name in &base_order {
        print!("{name:<26}");
        for r in results {
            match stat_for(r, name) {
                Some((mean_score, _)) => print!("{mean_score:>9.0}"),
                None => print!("{:>9}", "-"),
            }
        }
        println!();
    }

    println!("\nMean rank across {} seeds:\n", first.n);
    print!("{:<26}", "Strategy");
    for level in &levels {
        print!("{:>9}", format!("ε={level}"));
    }
    println!();
    println!("{}", "-".repeat(26 + levels.len() * 9));
    for name in &base_order {
        print!("{name:<26}");
        for r in results {
            match stat_for(r, name) {
                Some((_, mean_rank)) => print!("{mean_rank:>9.2}"),
                None => print!("{:>9}", "-"),
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_rows_per_round_payoffs() {
        let strategies = all_strategies();
        let result = run_round_robin(&strategies, 10, Some(0), 0.0).unwrap();
        let names = vec!["Tit for Tat".to_string(), "Always Cooperate".to_string()];
        let rows = comparison_rows(&result, &names).unwrap();
        assert_eq!(rows.len(), 4);
        // Mutual cooperation in every pairing of this pair: 3 points per round.
        for (name, opponent, per_round) in &rows {
            assert!(
                (per_round - 3.0).abs() < 1e-12,
                "{name} vs {opponent} averaged {per_round}"
            );
        }
    }

    #[test]
    fn test_comparison_rows_rejects_unknown_name() {
        let strategies = all_strategies();
        let result = run_round_robin(&strategies, 10, Some(0), 0.0).unwrap();
        let names = vec!["Tit for Tat".to_string(), "Nonesuch".to_string()];
        assert_eq!(
            comparison_rows(&result, &names).unwrap_err(),
            "unknown strategy: Nonesuch"
        );
    }
}
