//! Strategy definitions
//!
//! Each strategy is a pure decision policy: its next move is a function of
//! the two move histories and the supplied random source, nothing else.
//! Strategies that look stateful (`Grudger`, `Gradual`) reconstruct their
//! state by replaying the history on every call, so a strategy value can be
//! shared read-only across any number of matches.

use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    #[serde(rename = "C")]
    Cooperate,
    #[serde(rename = "D")]
    Defect,
}

impl Move {
    pub fn flipped(self) -> Move {
        match self {
            Move::Cooperate => Move::Defect,
            Move::Defect => Move::Cooperate,
        }
    }

    pub fn is_cooperate(self) -> bool {
        self == Move::Cooperate
    }
}

/// One strategy's view of a match in progress.
///
/// `mine` holds the moves this strategy chose; `opponent` holds the moves it
/// observed from the other side. The two slices always have equal length.
#[derive(Clone, Copy, Debug)]
pub struct GameHistory<'a> {
    pub mine: &'a [Move],
    pub opponent: &'a [Move],
}

/// A named, described decision policy.
///
/// Contract for plug-in strategies:
/// - `decide` must depend only on the histories and the supplied source -
///   no retained mutable state, no ambient randomness.
/// - Draw from `rng` only when randomness is actually needed, so a
///   deterministic strategy leaves the stream untouched.
/// - Names must be unique within any set handed to the engine; they are
///   used as map keys everywhere.
pub trait Strategy {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn decide(&self, history: GameHistory<'_>, rng: &mut dyn RandomSource) -> Move;
}

// ──────────────────────────── Classic strategies ────────────────────────────

/// Cooperates every round regardless of opponent behavior.
pub struct AlwaysCooperate;

impl Strategy for AlwaysCooperate {
    fn name(&self) -> &str {
        "Always Cooperate"
    }

    fn description(&self) -> &str {
        "Cooperates every round regardless of opponent behavior."
    }

    fn decide(&self, _history: GameHistory<'_>, _rng: &mut dyn RandomSource) -> Move {
        Move::Cooperate
    }
}

/// Defects every round regardless of opponent behavior.
pub struct AlwaysDefect;

impl Strategy for AlwaysDefect {
    fn name(&self) -> &str {
        "Always Defect"
    }

    fn description(&self) -> &str {
        "Defects every round regardless of opponent behavior."
    }

    fn decide(&self, _history: GameHistory<'_>, _rng: &mut dyn RandomSource) -> Move {
        Move::Defect
    }
}

/// Cooperates or defects with equal probability each round.
pub struct RandomStrategy;

impl Strategy for RandomStrategy {
    fn name(&self) -> &str {
        "Random"
    }

    fn description(&self) -> &str {
        "Cooperates or defects with equal probability each round."
    }

    fn decide(&self, _history: GameHistory<'_>, rng: &mut dyn RandomSource) -> Move {
        if rng.next_f64() < 0.5 {
            Move::Cooperate
        } else {
            Move::Defect
        }
    }
}

/// Copies the opponent's last move, starting with cooperation.
pub struct TitForTat;

impl Strategy for TitForTat {
    fn name(&self) -> &str {
        "Tit for Tat"
    }

    fn description(&self) -> &str {
        "Cooperates on the first move, then copies the opponent's last move. \
         Simple, nice, provocable, forgiving."
    }

    fn decide(&self, history: GameHistory<'_>, _rng: &mut dyn RandomSource) -> Move {
        history.opponent.last().copied().unwrap_or(Move::Cooperate)
    }
}

/// Tit for Tat that opens with a defection.
pub struct SuspiciousTitForTat;

impl Strategy for SuspiciousTitForTat {
    fn name(&self) -> &str {
        "Suspicious TFT"
    }

    fn description(&self) -> &str {
        "Like Tit for Tat but opens with Defect. Can trigger conflict spirals \
         against TFT."
    }

    fn decide(&self, history: GameHistory<'_>, _rng: &mut dyn RandomSource) -> Move {
        history.opponent.last().copied().unwrap_or(Move::Defect)
    }
}

/// Retaliates only after two consecutive opponent defections.
pub struct TitForTwoTats;

impl Strategy for TitForTwoTats {
    fn name(&self) -> &str {
        "Tit for Two Tats"
    }

    fn description(&self) -> &str {
        "Cooperates unless the opponent defected on both of the last two \
         rounds. More forgiving than TFT."
    }

    fn decide(&self, history: GameHistory<'_>, _rng: &mut dyn RandomSource) -> Move {
        let opp = history.opponent;
        if opp.len() < 2 {
            return Move::Cooperate;
        }
        if opp[opp.len() - 1] == Move::Defect && opp[opp.len() - 2] == Move::Defect {
            Move::Defect
        } else {
            Move::Cooperate
        }
    }
}

/// Cooperates until the opponent's first defection, then defects forever.
pub struct Grudger;

impl Strategy for Grudger {
    fn name(&self) -> &str {
        "Grudger"
    }

    fn description(&self) -> &str {
        "Cooperates until the opponent defects once, then defects forever. \
         Never forgives."
    }

    fn decide(&self, history: GameHistory<'_>, _rng: &mut dyn RandomSource) -> Move {
        if history.opponent.contains(&Move::Defect) {
            Move::Defect
        } else {
            Move::Cooperate
        }
    }
}

/// Win-Stay, Lose-Shift.
pub struct Pavlov;

impl Strategy for Pavlov {
    fn name(&self) -> &str {
        "Pavlov"
    }

    fn description(&self) -> &str {
        "Win-Stay, Lose-Shift. Repeats its last move after a good outcome, \
         switches after a bad one."
    }

    fn decide(&self, history: GameHistory<'_>, _rng: &mut dyn RandomSource) -> Move {
        // Reward (C,C) and Temptation (D,C) are wins; Sucker (C,D) and
        // Punishment (D,D) are losses. A win is exactly "the opponent
        // cooperated last round".
        match (history.mine.last(), history.opponent.last()) {
            (Some(&mine), Some(&opp)) => {
                if opp == Move::Cooperate {
                    mine
                } else {
                    mine.flipped()
                }
            }
            _ => Move::Cooperate,
        }
    }
}

/// Tit for Tat that forgives a defection with fixed probability.
pub struct GenerousTitForTat {
    forgiveness: f64,
}

impl GenerousTitForTat {
    /// The canonical variant with ~33% forgiveness.
    pub fn new() -> Self {
        Self { forgiveness: 0.33 }
    }

    /// Arbitrary forgiveness probability in [0, 1] for sweep experiments.
    /// 0 degenerates to plain TFT, 1 to Always Cooperate.
    pub fn with_forgiveness(p: f64) -> Self {
        Self {
            forgiveness: p.clamp(0.0, 1.0),
        }
    }
}

impl Default for GenerousTitForTat {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for GenerousTitForTat {
    fn name(&self) -> &str {
        "Generous TFT"
    }

    fn description(&self) -> &str {
        "Like TFT but forgives a defection with ~33% probability. Resistant \
         to noise."
    }

    fn decide(&self, history: GameHistory<'_>, rng: &mut dyn RandomSource) -> Move {
        match history.opponent.last() {
            Some(Move::Defect) => {
                if rng.next_f64() < self.forgiveness {
                    Move::Cooperate
                } else {
                    Move::Defect
                }
            }
            _ => Move::Cooperate,
        }
    }
}

/// Tit for Tat that atones after its own defections.
pub struct ContriteTitForTat;

impl Strategy for ContriteTitForTat {
    fn name(&self) -> &str {
        "Contrite TFT"
    }

    fn description(&self) -> &str {
        "Like TFT, but cooperates unconditionally on the round after it \
         defected itself, regardless of what the opponent did."
    }

    fn decide(&self, history: GameHistory<'_>, _rng: &mut dyn RandomSource) -> Move {
        match history.mine.last() {
            None => Move::Cooperate,
            // Self-directed atonement: always cooperate after own defection.
            Some(Move::Defect) => Move::Cooperate,
            Some(Move::Cooperate) => history
                .opponent
                .last()
                .copied()
                .unwrap_or(Move::Cooperate),
        }
    }
}

/// Proportional retaliation with a forgiveness pause.
pub struct Gradual;

impl Strategy for Gradual {
    fn name(&self) -> &str {
        "Gradual"
    }

    fn description(&self) -> &str {
        "Punishes the opponent's Nth defection with a burst of N defections, \
         then cooperates for two rounds before resuming normal play."
    }

    fn decide(&self, history: GameHistory<'_>, _rng: &mut dyn RandomSource) -> Move {
        // Replay the match to reconstruct the punishment and calm counters.
        // A defection observed while neither counter is active starts a
        // punishment burst equal to the cumulative defection count; one
        // observed mid-burst or mid-calm only feeds the next burst.
        let mut punish = 0usize;
        let mut calm = 0usize;
        let mut defections = 0usize;

        for &opp in history.opponent {
            // Account for the move we already played this round.
            if punish > 0 {
                punish -= 1;
                if punish == 0 {
                    calm = 2;
                }
            } else if calm > 0 {
                calm -= 1;
            }
            if opp == Move::Defect {
                defections += 1;
                if punish == 0 && calm == 0 {
                    punish = defections;
                }
            }
        }

        if punish > 0 {
            Move::Defect
        } else {
            Move::Cooperate
        }
    }
}

// ──────────────── Zero-Determinant strategies (Press & Dyson 2012) ──────────

/// ZD extortioner with extortion factor χ=3.
///
/// Cooperation probabilities keyed by the previous round's (own, opponent)
/// moves, chosen so that in expectation the extorter's payoff above the
/// mutual-defection baseline P=1 is exactly 3x the opponent's.
pub struct ZdExtorter;

impl ZdExtorter {
    fn cooperation_probability(mine: Move, opp: Move) -> f64 {
        match (mine, opp) {
            (Move::Cooperate, Move::Cooperate) => 8.0 / 9.0,
            (Move::Cooperate, Move::Defect) => 0.0,
            (Move::Defect, Move::Cooperate) => 1.0,
            (Move::Defect, Move::Defect) => 1.0 / 9.0,
        }
    }
}

impl Strategy for ZdExtorter {
    fn name(&self) -> &str {
        "ZD Extorter (χ=3)"
    }

    fn description(&self) -> &str {
        "Zero-Determinant extortion strategy (Press & Dyson 2012). \
         Unilaterally enforces that its score exceeds the opponent's by \
         factor χ=3 above mutual defection."
    }

    fn decide(&self, history: GameHistory<'_>, rng: &mut dyn RandomSource) -> Move {
        match (history.mine.last(), history.opponent.last()) {
            (Some(&mine), Some(&opp)) => {
                let p = Self::cooperation_probability(mine, opp);
                if rng.next_f64() < p {
                    Move::Cooperate
                } else {
                    Move::Defect
                }
            }
            _ => Move::Cooperate,
        }
    }
}

// ──────────────────────────────── Registry ──────────────────────────────────

/// The canonical strategy set used by the default experiments.
///
/// The order is fixed for display purposes only; it has no effect on
/// correctness.
pub fn all_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(TitForTat),
        Box::new(TitForTwoTats),
        Box::new(Grudger),
        Box::new(Pavlov),
        Box::new(GenerousTitForTat::new()),
        Box::new(ContriteTitForTat),
        Box::new(Gradual),
        Box::new(AlwaysCooperate),
        Box::new(AlwaysDefect),
        Box::new(SuspiciousTitForTat),
        Box::new(ZdExtorter),
        Box::new(RandomStrategy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    /// Source that returns the same value forever; lets tests pin the exact
    /// branch a probability threshold takes.
    struct ConstRng(f64);

    impl RandomSource for ConstRng {
        fn next_f64(&mut self) -> f64 {
            self.0
        }
    }

    fn decide(s: &dyn Strategy, mine: &[Move], opponent: &[Move]) -> Move {
        let mut rng = SeededRng::new(0);
        s.decide(GameHistory { mine, opponent }, &mut rng)
    }

    use Move::{Cooperate as C, Defect as D};

    #[test]
    fn test_always_cooperate_and_defect_ignore_history() {
        assert_eq!(decide(&AlwaysCooperate, &[], &[]), C);
        assert_eq!(decide(&AlwaysCooperate, &[D, D], &[D, D]), C);
        assert_eq!(decide(&AlwaysDefect, &[], &[]), D);
        assert_eq!(decide(&AlwaysDefect, &[C, C], &[C, C]), D);
    }

    #[test]
    fn test_random_threshold() {
        let mut low = ConstRng(0.49);
        let mut high = ConstRng(0.5);
        let h = GameHistory { mine: &[], opponent: &[] };
        assert_eq!(RandomStrategy.decide(h, &mut low), C);
        assert_eq!(RandomStrategy.decide(h, &mut high), D);
    }

    #[test]
    fn test_tit_for_tat() {
        assert_eq!(decide(&TitForTat, &[], &[]), C);
        assert_eq!(decide(&TitForTat, &[C], &[C]), C);
        assert_eq!(decide(&TitForTat, &[C], &[D]), D);
        assert_eq!(decide(&TitForTat, &[C, D], &[D, C]), C);
    }

    #[test]
    fn test_suspicious_tft_opens_with_defect() {
        assert_eq!(decide(&SuspiciousTitForTat, &[], &[]), D);
        assert_eq!(decide(&SuspiciousTitForTat, &[D], &[C]), C);
        assert_eq!(decide(&SuspiciousTitForTat, &[D], &[D]), D);
    }

    #[test]
    fn test_tit_for_two_tats_needs_two_defections() {
        assert_eq!(decide(&TitForTwoTats, &[], &[]), C);
        assert_eq!(decide(&TitForTwoTats, &[C], &[D]), C);
        assert_eq!(decide(&TitForTwoTats, &[C, C], &[C, D]), C);
        assert_eq!(decide(&TitForTwoTats, &[C, C], &[D, D]), D);
        // A defection followed by cooperation resets the countdown.
        assert_eq!(decide(&TitForTwoTats, &[C, C], &[D, C]), C);
    }

    #[test]
    fn test_grudger_never_forgives() {
        assert_eq!(decide(&Grudger, &[], &[]), C);
        assert_eq!(decide(&Grudger, &[C, C], &[C, C]), C);
        // One defection anywhere in the history is enough, forever.
        assert_eq!(decide(&Grudger, &[C, C, C], &[D, C, C]), D);
        assert_eq!(decide(&Grudger, &[C, D, D, D], &[D, C, C, C]), D);
    }

    #[test]
    fn test_pavlov_win_stay() {
        assert_eq!(decide(&Pavlov, &[], &[]), C);
        // (C,C) reward: stay with C. (D,C) temptation: stay with D.
        assert_eq!(decide(&Pavlov, &[C], &[C]), C);
        assert_eq!(decide(&Pavlov, &[D], &[C]), D);
    }

    #[test]
    fn test_pavlov_lose_shift() {
        // (C,D) sucker: shift to D. (D,D) punishment: shift to C.
        assert_eq!(decide(&Pavlov, &[C], &[D]), D);
        assert_eq!(decide(&Pavlov, &[D], &[D]), C);
    }

    #[test]
    fn test_generous_tft_cooperates_without_provocation() {
        let gtft = GenerousTitForTat::new();
        let mut rng = ConstRng(0.99);
        assert_eq!(gtft.decide(GameHistory { mine: &[], opponent: &[] }, &mut rng), C);
        assert_eq!(gtft.decide(GameHistory { mine: &[C], opponent: &[C] }, &mut rng), C);
    }

    #[test]
    fn test_generous_tft_forgiveness_threshold() {
        let gtft = GenerousTitForTat::new();
        let h = GameHistory { mine: &[C], opponent: &[D] };
        let mut forgiving = ConstRng(0.32);
        let mut strict = ConstRng(0.34);
        assert_eq!(gtft.decide(h, &mut forgiving), C);
        assert_eq!(gtft.decide(h, &mut strict), D);
    }

    #[test]
    fn test_generous_tft_factory_endpoints() {
        // p=0 degenerates to TFT, p=1 to Always Cooperate.
        let tft_like = GenerousTitForTat::with_forgiveness(0.0);
        let coop_like = GenerousTitForTat::with_forgiveness(1.0);
        let h = GameHistory { mine: &[C], opponent: &[D] };
        let mut zero = ConstRng(0.0);
        assert_eq!(tft_like.decide(h, &mut zero), D);
        let mut near_one = ConstRng(0.999);
        assert_eq!(coop_like.decide(h, &mut near_one), C);
    }

    #[test]
    fn test_generous_tft_factory_clamps() {
        let s = GenerousTitForTat::with_forgiveness(7.0);
        let h = GameHistory { mine: &[C], opponent: &[D] };
        let mut near_one = ConstRng(0.999);
        assert_eq!(s.decide(h, &mut near_one), C);
    }

    #[test]
    fn test_contrite_tft_atones_after_own_defection() {
        assert_eq!(decide(&ContriteTitForTat, &[], &[]), C);
        // Own last move was D: cooperate no matter what the opponent did.
        assert_eq!(decide(&ContriteTitForTat, &[D], &[D]), C);
        assert_eq!(decide(&ContriteTitForTat, &[D], &[C]), C);
        // Otherwise mirror the opponent.
        assert_eq!(decide(&ContriteTitForTat, &[C], &[D]), D);
        assert_eq!(decide(&ContriteTitForTat, &[C], &[C]), C);
    }

    #[test]
    fn test_gradual_schedule_against_constant_defector() {
        // Against an all-defector: punish the 1st defection with 1 D, calm
        // for 2 rounds, then (4 defections seen) punish with 4 Ds, calm
        // again, and so on.
        let expected = [C, D, C, C, D, D, D, D, C, C, D];
        for (len, want) in expected.iter().enumerate() {
            let opp = vec![D; len];
            let mine = vec![C; len]; // own moves are irrelevant to the replay
            assert_eq!(
                decide(&Gradual, &mine, &opp),
                *want,
                "wrong move with {len} opponent defections"
            );
        }
    }

    #[test]
    fn test_gradual_stays_calm_against_cooperator() {
        let opp = vec![C; 20];
        let mine = vec![C; 20];
        assert_eq!(decide(&Gradual, &mine, &opp), C);
    }

    #[test]
    fn test_zd_extorter_conditional_probabilities() {
        assert_eq!(decide(&ZdExtorter, &[], &[]), C);

        let zd = ZdExtorter;
        // (C,C): cooperate with 8/9.
        let h_cc = GameHistory { mine: &[C], opponent: &[C] };
        assert_eq!(zd.decide(h_cc, &mut ConstRng(0.5)), C);
        assert_eq!(zd.decide(h_cc, &mut ConstRng(0.95)), D);
        // (C,D): never cooperate.
        let h_cd = GameHistory { mine: &[C], opponent: &[D] };
        assert_eq!(zd.decide(h_cd, &mut ConstRng(0.0)), D);
        // (D,C): always cooperate.
        let h_dc = GameHistory { mine: &[D], opponent: &[C] };
        assert_eq!(zd.decide(h_dc, &mut ConstRng(0.999)), C);
        // (D,D): cooperate with 1/9.
        let h_dd = GameHistory { mine: &[D], opponent: &[D] };
        assert_eq!(zd.decide(h_dd, &mut ConstRng(0.05)), C);
        assert_eq!(zd.decide(h_dd, &mut ConstRng(0.2)), D);
    }

    #[test]
    fn test_registry_names_are_unique() {
        let strategies = all_strategies();
        let mut names: Vec<&str> = strategies.iter().map(|s| s.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total, "duplicate strategy names in registry");
    }

    #[test]
    fn test_registry_has_descriptions() {
        for s in all_strategies() {
            assert!(!s.name().is_empty());
            assert!(!s.description().is_empty(), "{} lacks a description", s.name());
        }
    }

    #[test]
    fn test_deterministic_strategies_do_not_touch_rng() {
        // A panicking source proves these strategies never draw.
        struct PanicRng;
        impl RandomSource for PanicRng {
            fn next_f64(&mut self) -> f64 {
                panic!("deterministic strategy consumed randomness");
            }
        }

        let deterministic: Vec<Box<dyn Strategy>> = vec![
            Box::new(AlwaysCooperate),
            Box::new(AlwaysDefect),
            Box::new(TitForTat),
            Box::new(SuspiciousTitForTat),
            Box::new(TitForTwoTats),
            Box::new(Grudger),
            Box::new(Pavlov),
            Box::new(ContriteTitForTat),
            Box::new(Gradual),
        ];
        let mut rng = PanicRng;
        for s in &deterministic {
            s.decide(GameHistory { mine: &[C, D], opponent: &[D, C] }, &mut rng);
        }
    }
}
