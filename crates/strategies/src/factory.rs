use crate::Strategy;
use crate::adx::DirectionalMovement;
use crate::error::StrategyError;
use crate::momentum::SmaCrossover;
use configuration::Strategies;
use core_types::StrategyId;

/// Creates a new strategy instance based on the provided ID and parameters.
///
/// The match is exhaustive, so adding a `StrategyId` without wiring it here
/// is a compile error.
pub fn create_strategy(
    id: StrategyId,
    params: &Strategies,
) -> Result<Box<dyn Strategy>, StrategyError> {
    match id {
        StrategyId::Momentum => Ok(Box::new(SmaCrossover::new(params.momentum)?)),
        StrategyId::Adx => Ok(Box::new(DirectionalMovement::new(params.adx)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::MomentumParams;

    #[test]
    fn builds_each_strategy_with_matching_id() {
        let params = Strategies::default();
        for id in [StrategyId::Momentum, StrategyId::Adx] {
            assert_eq!(create_strategy(id, &params).unwrap().id(), id);
        }
    }

    #[test]
    fn propagates_parameter_errors() {
        let mut params = Strategies::default();
        params.momentum = MomentumParams { short_window: 10, long_window: 10 };
        assert!(create_strategy(StrategyId::Momentum, &params).is_err());
    }
}
