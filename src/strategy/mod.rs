//! Strategy Layer - Short PUT screening rules
//!
//! The deterministic core of the screener:
//! - Volatility gate on the underlying (price, volume, average ATM IV)
//! - Per-contract eligibility rules and derived metrics
//! - Ranking and top-N selection
//!
//! Nothing in here performs I/O or reads the clock. Diagnostics go to the
//! `EventSink` passed in by the caller.

pub mod contract_screener;
pub mod params;
pub mod ranking;
pub mod volatility_gate;

pub use contract_screener::{
    annualized_return, evaluate_contract, net_risk, screen_contracts, ContractContext,
    RejectReason, RejectTally,
};
pub use params::{ParamsError, RuleConfig};
pub use ranking::{rank_order, select_top};
pub use volatility_gate::{
    at_the_money, check_underlying, evaluate_volatility, VolatilityProfile, VolatilityVerdict,
};
