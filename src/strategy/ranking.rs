//! Ranking & Selection
//!
//! Orders qualifying contracts by annualized return, best first, breaking
//! ties with the further out-of-the-money strike. The sort is stable, so
//! contracts tied on both keys keep discovery order.

use std::cmp::Ordering;

use crate::domain::EvaluatedContract;
use crate::strategy::params::RuleConfig;

/// Descending order on (annual return, strike distance)
pub fn rank_order(a: &EvaluatedContract, b: &EvaluatedContract) -> Ordering {
    b.annual_return
        .total_cmp(&a.annual_return)
        .then_with(|| b.strike_distance.total_cmp(&a.strike_distance))
}

/// Sort and keep the best `top_contracts_per_ticker`
pub fn select_top(mut contracts: Vec<EvaluatedContract>, config: &RuleConfig) -> Vec<EvaluatedContract> {
    contracts.sort_by(rank_order);
    contracts.truncate(config.top_contracts_per_ticker);
    contracts
}
