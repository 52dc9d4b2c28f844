//! Domain Layer - Value objects for one screening pass
//!
//! Pure data with no external dependencies. Everything here is built and
//! consumed inside a single ticker's analysis; nothing is shared across
//! tickers.

pub mod evaluated;
pub mod option;
pub mod outcome;
pub mod underlying;

pub use evaluated::EvaluatedContract;
pub use option::{days_to_expiration, ExpirationChain, OptionChain, OptionContract};
pub use outcome::{total_contracts, DiscardReason, TickerOutcome, TickerResult};
pub use underlying::UnderlyingSnapshot;
