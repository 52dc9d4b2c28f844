pub mod analyzer;
pub mod orchestrator;

pub use analyzer::{analyze_ticker, fetch_snapshot, screen_snapshot, MarketSnapshot};
pub use orchestrator::{
    select_groups, DeliveryStatus, GroupReport, OrchestratorError, ScreenOrchestrator,
};
