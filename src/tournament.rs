//! Round-robin tournament aggregation

use serde::{Deserialize, Serialize};

use crate::error::{validate_strategies, ConfigError};
use crate::game::play_game;
use crate::rng::{EntropyRng, RandomSource, SeededRng};
use crate::strategy::Strategy;

/// One strategy's result from a single match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchRecord {
    pub opponent: String,
    pub score: u32,
    pub coop_rate: f64,
}

/// One strategy's aggregate state within a tournament.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentEntry {
    pub name: String,
    pub total_score: u32,
    pub avg_per_round: f64,
    pub coop_rate: f64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub matches: Vec<MatchRecord>,
}

/// Immutable snapshot of one tournament run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentResult {
    /// Entries sorted by total score descending; ties keep input order.
    pub entries: Vec<TournamentEntry>,
    pub rounds_per_match: u32,
    pub strategy_count: usize,
    /// Probability that any move was flipped before the opponent observed it.
    pub noise: f64,
}

/// Round-robin tournament: every unordered pair plays once, self-play
/// included, so N strategies produce N(N+1)/2 games.
///
/// A single RNG stream is built from the seed and shared across the whole
/// tournament (not reset per match), making the run one deterministic
/// trajectory. `seed = None` falls back to OS entropy; callers that need
/// reproducibility must pin a seed.
pub fn run_round_robin(
    strategies: &[Box<dyn Strategy>],
    rounds: u32,
    seed: Option<u32>,
    noise: f64,
) -> Result<TournamentResult, ConfigError> {
    validate_strategies(strategies)?;
    if rounds == 0 {
        return Err(ConfigError::ZeroRounds);
    }

    let mut seeded;
    let mut entropy;
    let rng: &mut dyn RandomSource = match seed {
        Some(s) => {
            seeded = SeededRng::new(s);
            &mut seeded
        }
        None => {
            entropy = EntropyRng::new();
            &mut entropy
        }
    };

    let mut entries: Vec<TournamentEntry> = strategies
        .iter()
        .map(|s| TournamentEntry {
            name: s.name().to_string(),
            total_score: 0,
            avg_per_round: 0.0,
            coop_rate: 0.0,
            wins: 0,
            losses: 0,
            draws: 0,
            matches: Vec::with_capacity(strategies.len()),
        })
        .collect();

    for i in 0..strategies.len() {
        for j in i..strategies.len() {
            let result = play_game(&*strategies[i], &*strategies[j], rounds, rng, noise);

            entries[i].total_score += result.total_a;
            entries[i].coop_rate += result.coop_rate_a;
            entries[i].matches.push(MatchRecord {
                opponent: strategies[j].name().to_string(),
                score: result.total_a,
                coop_rate: result.coop_rate_a,
            });

            if i != j {
                entries[j].total_score += result.total_b;
                entries[j].coop_rate += result.coop_rate_b;
                entries[j].matches.push(MatchRecord {
                    opponent: strategies[i].name().to_string(),
                    score: result.total_b,
                    coop_rate: result.coop_rate_b,
                });

                if result.total_a > result.total_b {
                    entries[i].wins += 1;
                    entries[j].losses += 1;
                } else if result.total_b > result.total_a {
                    entries[j].wins += 1;
                    entries[i].losses += 1;
                } else {
                    entries[i].draws += 1;
                    entries[j].draws += 1;
                }
            }
        }
    }

    for e in &mut entries {
        let n = e.matches.len();
        if n > 0 {
            e.avg_per_round = f64::from(e.total_score) / (n as f64 * f64::from(rounds));
            e.coop_rate /= n as f64;
        }
    }

    // Stable sort: tied scores keep input order, which fixes rank ties for
    // every downstream rank computation.
    entries.sort_by(|a, b| b.total_score.cmp(&a.total_score));

    Ok(TournamentResult {
        entries,
        rounds_per_match: rounds,
        strategy_count: strategies.len(),
        noise,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{
        all_strategies, AlwaysCooperate, AlwaysDefect, Grudger, TitForTat, TitForTwoTats,
    };

    fn scores(r: &TournamentResult) -> Vec<(String, u32)> {
        r.entries
            .iter()
            .map(|e| (e.name.clone(), e.total_score))
            .collect()
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let strategies = all_strategies();
        let r1 = run_round_robin(&strategies, 50, Some(42), 0.0).unwrap();
        let r2 = run_round_robin(&strategies, 50, Some(42), 0.0).unwrap();
        assert_eq!(scores(&r1), scores(&r2));
    }

    #[test]
    fn test_different_seeds_change_stochastic_outcomes() {
        let strategies = all_strategies();
        let r1 = run_round_robin(&strategies, 50, Some(1), 0.0).unwrap();
        let r2 = run_round_robin(&strategies, 50, Some(2), 0.0).unwrap();
        assert_ne!(scores(&r1), scores(&r2));
    }

    #[test]
    fn test_match_count_is_n_times_n_plus_one_over_two() {
        let strategies = all_strategies();
        let n = strategies.len();
        let r = run_round_robin(&strategies, 10, Some(0), 0.0).unwrap();
        assert_eq!(r.strategy_count, n);
        // Each strategy plays n-1 opponents plus itself, so the total number
        // of games is n(n+1)/2.
        for e in &r.entries {
            assert_eq!(e.matches.len(), n, "{} played wrong match count", e.name);
        }
        let records: usize = r.entries.iter().map(|e| e.matches.len()).sum();
        let games = (records + n) / 2; // self-play yields one record, others two
        assert_eq!(games, n * (n + 1) / 2);
    }

    #[test]
    fn test_win_loss_draw_excludes_self_play() {
        let strategies = all_strategies();
        let n = strategies.len() as u32;
        let r = run_round_robin(&strategies, 20, Some(5), 0.0).unwrap();
        for e in &r.entries {
            assert_eq!(e.wins + e.losses + e.draws, n - 1, "{}", e.name);
        }
    }

    #[test]
    fn test_all_cooperators_average_three_per_round() {
        let strategies: Vec<Box<dyn Strategy>> =
            vec![Box::new(AlwaysCooperate), Box::new(TitForTat)];
        let r = run_round_robin(&strategies, 10, Some(0), 0.0).unwrap();
        for e in &r.entries {
            assert_eq!(e.total_score, 60); // two matches, 30 points each
            assert!((e.avg_per_round - 3.0).abs() < 1e-12);
            assert!((e.coop_rate - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_defector_does_not_win_mixed_field() {
        let strategies = all_strategies();
        let r = run_round_robin(&strategies, 200, Some(42), 0.0).unwrap();
        assert_ne!(r.entries[0].name, "Always Defect");
    }

    #[test]
    fn test_tft_outranks_the_exploitable_field_when_clean() {
        let strategies = all_strategies();
        let r = run_round_robin(&strategies, 200, Some(42), 0.0).unwrap();
        let rank = |name: &str| r.entries.iter().position(|e| e.name == name).unwrap();
        for loser in ["Always Defect", "Suspicious TFT", "Random"] {
            assert!(
                rank("Tit for Tat") < rank(loser),
                "TFT ranked below {loser}"
            );
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        // Two pure cooperators score identically; the stable sort must keep
        // them in input order.
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(TitForTat),
            Box::new(AlwaysCooperate),
            Box::new(TitForTwoTats),
            Box::new(Grudger),
        ];
        let r = run_round_robin(&strategies, 10, Some(0), 0.0).unwrap();
        let names: Vec<&str> = r.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Tit for Tat", "Always Cooperate", "Tit for Two Tats", "Grudger"]
        );
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let strategies = all_strategies();
        assert_eq!(
            run_round_robin(&strategies, 0, Some(0), 0.0).unwrap_err(),
            ConfigError::ZeroRounds
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let strategies: Vec<Box<dyn Strategy>> =
            vec![Box::new(AlwaysDefect), Box::new(AlwaysDefect)];
        assert_eq!(
            run_round_robin(&strategies, 10, Some(0), 0.0).unwrap_err(),
            ConfigError::DuplicateName("Always Defect".to_string())
        );
    }

    #[test]
    fn test_unseeded_run_completes() {
        let strategies: Vec<Box<dyn Strategy>> =
            vec![Box::new(TitForTat), Box::new(AlwaysDefect)];
        let r = run_round_robin(&strategies, 10, None, 0.0).unwrap();
        assert_eq!(r.strategy_count, 2);
    }

    #[test]
    fn test_noise_recorded_on_result() {
        let strategies = all_strategies();
        let r = run_round_robin(&strategies, 10, Some(0), 0.05).unwrap();
        assert_eq!(r.noise, 0.05);
    }
}
