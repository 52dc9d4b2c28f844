//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Market data (underlying quote, expirations, option chains)
//! - Notification delivery (Discord webhook, stdout)
//! - Screening diagnostics (structured event sink)

pub mod events;
pub mod market_data;
pub mod mocks;
pub mod notifier;

pub use events::{EventSink, NullSink, ScreenEvent};
pub use market_data::{MarketDataError, MarketDataPort};
pub use notifier::{NotifierPort, NotifyError};
