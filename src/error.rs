//! Configuration validation
//!
//! Bad input is rejected at the entry points, never silently coerced.
//! Numeric edge cases inside a run (zero mean fitness, zero-round rates)
//! are handled locally where they occur and are not errors.

use std::collections::HashSet;

use thiserror::Error;

use crate::strategy::Strategy;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("strategy set is empty")]
    EmptyStrategySet,

    #[error("duplicate strategy name: {0}")]
    DuplicateName(String),

    #[error("rounds per match must be at least 1")]
    ZeroRounds,

    #[error("run count must be at least 1")]
    ZeroRuns,
}

/// Strategy names are map keys throughout the engine, so the set must be
/// non-empty and free of duplicates.
pub(crate) fn validate_strategies(strategies: &[Box<dyn Strategy>]) -> Result<(), ConfigError> {
    if strategies.is_empty() {
        return Err(ConfigError::EmptyStrategySet);
    }
    let mut seen = HashSet::new();
    for s in strategies {
        if !seen.insert(s.name()) {
            return Err(ConfigError::DuplicateName(s.name().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{AlwaysCooperate, TitForTat};

    #[test]
    fn test_empty_set_rejected() {
        let strategies: Vec<Box<dyn Strategy>> = Vec::new();
        assert_eq!(
            validate_strategies(&strategies),
            Err(ConfigError::EmptyStrategySet)
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(TitForTat),
            Box::new(AlwaysCooperate),
            Box::new(TitForTat),
        ];
        assert_eq!(
            validate_strategies(&strategies),
            Err(ConfigError::DuplicateName("Tit for Tat".to_string()))
        );
    }

    #[test]
    fn test_unique_names_accepted() {
        let strategies: Vec<Box<dyn Strategy>> =
            vec![Box::new(TitForTat), Box::new(AlwaysCooperate)];
        assert!(validate_strategies(&strategies).is_ok());
    }
}
